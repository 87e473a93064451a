//! Randomized benchmarking over many seeds in parallel.
//!
//! Every seed is an independent RB run on its own simulated device, so the
//! runs fan out over the rayon pool and only the per-length failure counts
//! come back for aggregation.

use anyhow::{Result, ensure};
use rayon::prelude::*;
use std::time::Instant;

use yqe_core::host_io::HostValue;
use yqe_core::programs::ProgramKind;
use yqe_core::rb::{MAX_NUM_LENGTHS, RB_REPEAT};
use yqe_io::{params, results};

use crate::config::DeviceConfig;
use crate::runner;
use crate::stats::SurvivalStats;

/// Runs `seeds` RB runs (seeds `first_seed..first_seed + seeds`) and
/// returns the survival statistics per length, in sweep order.
pub fn run_rb_sweep(
    config: &DeviceConfig,
    lengths: &[u32],
    circuits: u32,
    first_seed: u32,
    seeds: u32,
) -> Result<Vec<SurvivalStats>> {
    ensure!(!lengths.is_empty(), "no circuit lengths given");
    ensure!(
        lengths.len() <= MAX_NUM_LENGTHS,
        "{} lengths given, the firmware holds at most {}",
        lengths.len(),
        MAX_NUM_LENGTHS
    );

    println!(
        "Running {} RB seeds x {} lengths x {} circuits...",
        seeds,
        lengths.len(),
        circuits
    );
    let start = Instant::now();

    let runs: Vec<Vec<HostValue>> = (0..seeds)
        .into_par_iter()
        .map(|i| {
            let seed = first_seed.wrapping_add(i);
            let mut device = config.clone();
            device.shot_seed = config.shot_seed ^ u64::from(seed);
            runner::simulate(ProgramKind::Rb, device, params::rb_params(seed, circuits, lengths))
        })
        .collect::<Result<_>>()?;

    let shots = u64::from(RB_REPEAT) * u64::from(circuits);
    let mut stats: Vec<SurvivalStats> = lengths.iter().map(|&l| SurvivalStats::new(l)).collect();
    for run in &runs {
        for (record, stat) in results::records(ProgramKind::Rb, run)?.into_iter().zip(&mut stats) {
            if let [HostValue::Word(_), HostValue::Word(failures)] = record {
                stat.update(*failures, shots);
            }
        }
    }

    let seconds = start.elapsed().as_secs_f64();
    println!(
        "Done in {:.3} s ({:.1} runs/s)",
        seconds,
        f64::from(seeds) / seconds.max(f64::EPSILON)
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noiseless_device_always_survives() {
        let stats = run_rb_sweep(&DeviceConfig::noiseless(1), &[1, 4, 12], 2, 10, 4).unwrap();
        assert_eq!(stats.len(), 3);
        for s in &stats {
            assert_eq!(s.count, 4);
            assert_eq!(s.min, 1.0);
        }
        assert_eq!(stats[2].length, 12);
    }

    #[test]
    fn rejects_empty_sweep() {
        assert!(run_rb_sweep(&DeviceConfig::default(), &[], 1, 0, 1).is_err());
    }
}
