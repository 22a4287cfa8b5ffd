//! Terminal Lines game.
mod command;
mod session;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lines_core::{Coord, DiagnosticReport, GameConfig, MAX_COLORS};
use tracing_subscriber::filter::LevelFilter;
use web_time::{SystemTime, UNIX_EPOCH};

use session::Session;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board width in cells
    #[arg(long, default_value_t = 9)]
    width: Coord,

    /// Board height in cells
    #[arg(long, default_value_t = 9)]
    height: Coord,

    /// Number of ball colors in play
    #[arg(short, long, default_value_t = MAX_COLORS)]
    colors: u8,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Where to write the report when the game stops on an error
    #[arg(long, default_value = "error.log")]
    error_log: PathBuf,
}

fn init_logging(verbose: &clap_verbosity_flag::Verbosity) {
    let level = match verbose.log_level() {
        Some(log::Level::Error) => LevelFilter::ERROR,
        Some(log::Level::Warn) => LevelFilter::WARN,
        Some(log::Level::Info) => LevelFilter::INFO,
        Some(log::Level::Debug) => LevelFilter::DEBUG,
        Some(log::Level::Trace) => LevelFilter::TRACE,
        None => LevelFilter::OFF,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.verbose);

    let config = GameConfig::new((args.height, args.width), args.colors);
    let seed = args.seed.unwrap_or_else(random_seed);
    log::debug!("seed: {}, config: {:?}", seed, config);

    let mut session = Session::new(config, seed);
    let result = session.run(io::stdin().lock(), io::stdout().lock());

    let Err(err) = result else {
        return ExitCode::SUCCESS;
    };
    log::error!("Game stopped: {err:#}");

    let report = DiagnosticReport::new(session.engine(), format!("{err:#}"));
    if let Err(write_err) = fs::write(&args.error_log, report.to_string()) {
        log::error!("Could not write {}: {}", args.error_log.display(), write_err);
    }
    eprintln!("{err:#}");
    ExitCode::FAILURE
}
