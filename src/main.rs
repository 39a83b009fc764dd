use clap::Parser;
use log::{debug, info};
use serde_json::to_writer_pretty;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use qsel::config::Invocation;
use qsel::random::time_seed;
use qsel::{parse_file, QselError, QubitMap, SeededRandom, SimConfig, Simulator};


const QSEL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "qsel", version = QSEL_VERSION,
    about = "Simulates quantum circuits written with two symbols.\n\
             Usage: qsel <file.qsel> [<superposition token> <entanglement token>]",
    long_about = None)]
struct Cli {
    /// Program file, optionally followed by the two vocabulary tokens.
    #[arg(value_name = "ARGS", num_args = 0..)]
    args: Vec<String>,
    /// Seed the measurement random source instead of using the clock.
    #[arg(long)]
    seed: Option<u64>,
    /// Largest register the simulator will allocate.
    #[arg(long, value_name = "N")]
    max_qubits: Option<usize>,
    /// JSON configuration file (superposition, entanglement, max_qubits, seed).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write a JSON run report (qubit map and measurement outcomes).
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug_mode: bool) {
    let level = if debug_mode { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<(), QselError> {
    // positional arity is checked before anything touches the disk
    let invocation = Invocation::from_args(&cli.args)?;

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    invocation.apply_to(&mut config);
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(max_qubits) = cli.max_qubits {
        config.max_qubits = max_qubits;
    }
    config.validate()?;
    debug!("effective config: {:?}", config);

    let vocab = config.vocabulary()?;
    let program = parse_file(&invocation.program, &vocab)?;
    let map = QubitMap::for_program(&program, config.max_qubits)?;
    let gates = map.map_program(&program)?;

    let seed = config.seed.unwrap_or_else(time_seed);
    info!("measurement seed: {}", seed);
    let mut simulator = Simulator::new(map, SeededRandom::new(seed))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let measurements = simulator.run(&gates, &mut out)?;

    if let Some(path) = &cli.report {
        let file = File::create(path).map_err(|e| QselError::io(path, e))?;
        to_writer_pretty(file, &simulator.report(measurements, Some(seed)))?;
        info!("wrote run report to {}", path.display());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
