use clap::Parser;
use finsheet::args::{Args, Command};
use finsheet::{commands, error_type, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match error_type(&e) {
                Some(kind) => error!("Exiting with {kind} error: {e:#}"),
                None => error!("Exiting with error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().finsheet_home().path();

    // This allows for running the program without calling Gemini. When FINSHEET_IN_TEST_MODE is
    // set and non-zero in length, then the mode will be Mode::Testing, otherwise it will be
    // Mode::Gemini.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_key()).await?.print(),

        Command::Analyze(analyze_args) => {
            let config = Config::load(home).await?;
            commands::analyze(config, analyze_args).await?.print()
        }

        Command::Project(project_args) => {
            let config = match project_args.file() {
                Some(_) => Some(Config::load(home).await?),
                None => None,
            };
            commands::project(config, project_args).await?.print()
        }

        Command::Advise(advise_args) => {
            let config = Config::load(home).await?;
            commands::advise(config, mode, advise_args).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
