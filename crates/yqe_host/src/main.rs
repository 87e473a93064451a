use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use yqe_core::clifford::{self, GROUP_ORDER};
use yqe_core::programs::ProgramKind;
use yqe_host::config::DeviceConfig;
use yqe_host::{rb_sweep, runner};

#[derive(Parser)]
#[command(about = "Run pulse control programs against a simulated device")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one program with parameters from a file.
    Run {
        /// Program name, e.g. rb, t1, t2, rabi-amp.
        program: String,
        #[arg(short, long)]
        params: PathBuf,
        #[arg(short, long)]
        device: Option<PathBuf>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Randomized benchmarking over many seeds in parallel.
    Rb {
        #[arg(short, long, value_delimiter = ',', default_values_t = [1, 2, 4, 8, 16, 32, 64, 128])]
        lengths: Vec<u32>,
        #[arg(short, long, default_value_t = 10)]
        circuits: u32,
        #[arg(short, long, default_value_t = 8)]
        seeds: u32,
        #[arg(long, default_value_t = 1)]
        first_seed: u32,
        #[arg(short, long)]
        device: Option<PathBuf>,
    },
    /// Check the Clifford tables against the group laws.
    CheckTables,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            program,
            params,
            device,
            out,
        } => {
            let kind: ProgramKind = program
                .parse()
                .map_err(|_| anyhow!("unknown program `{program}`"))?;
            runner::run_program(kind, &params, device.as_deref(), out.as_deref())?;
        }
        Commands::Rb {
            lengths,
            circuits,
            seeds,
            first_seed,
            device,
        } => {
            let config = DeviceConfig::load(device.as_deref())?;
            let stats = rb_sweep::run_rb_sweep(&config, &lengths, circuits, first_seed, seeds)?;
            println!("Survival per length");
            for s in &stats {
                s.print_report();
            }
        }
        Commands::CheckTables => {
            clifford::verify_tables()?;
            println!("Clifford tables OK ({GROUP_ORDER} elements)");
        }
    }
    Ok(())
}
