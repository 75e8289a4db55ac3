use billed_cli::args::{Args, Command};
use billed_cli::{commands, Config, Mode, Result};
use clap::Parser;
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
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().billed_home().path();

    // This allows for testing the program without hitting the real API. When
    // BILLED_IN_TEST_MODE is set and non-zero in length, then the mode will be
    // Mode::Test, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.api_url(), init_args.email())
                .await?
                .print()
        }

        Command::List => {
            let config = Config::load(home).await?;
            commands::list(config, mode).await?.print()
        }

        Command::Submit(submit_args) => {
            let config = Config::load(home).await?;
            commands::submit(config, mode, submit_args.clone())
                .await?
                .print()
        }

        Command::Receipt(receipt_args) => {
            let config = Config::load(home).await?;
            commands::receipt(config, mode, receipt_args.bill_id())
                .await?
                .print()
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
            // RUST_LOG does not exist; use the default log level for the
            // library and binary crates only.
            EnvFilter::new(format!(
                "billed_cli={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
