use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;

use yqe_core::host_io::HostValue;
use yqe_core::programs::ProgramKind;
use yqe_io::{params, results};

use crate::config::DeviceConfig;
use crate::sim::SimulatedDevice;

/// Runs `kind` on a simulated device with `params` in SRAM.
///
/// Returns the values the program emitted, in emission order.
pub fn simulate(kind: ProgramKind, config: DeviceConfig, params: Vec<f64>) -> Result<Vec<HostValue>> {
    let device = SimulatedDevice::new(config, params);
    let device = kind
        .execute(device)
        .with_context(|| format!("Program {kind} aborted"))?;
    log::info!("{} finished after {} triggers", kind, device.triggers());
    Ok(device.into_output())
}

/// Loads the parameter and device files, runs `kind` and writes the
/// records to `out`, or stdout when no path is given.
pub fn run_program(
    kind: ProgramKind,
    params_path: &Path,
    device_path: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let params = params::load_params_file(params_path)?;
    let config = DeviceConfig::load(device_path)?;

    let start = Instant::now();
    let values = simulate(kind, config, params)?;
    log::info!("{} emitted {} values in {:?}", kind, values.len(), start.elapsed());

    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            results::write_records(BufWriter::new(file), kind, &values)
        }
        None => results::write_records(io::stdout().lock(), kind, &values),
    }
}
