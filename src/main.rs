use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use lastlayer_params::{ParameterService, ParamsAction, ParamsArgs, ParamsResult};

/// Inspect, migrate, and apply Hyprland parameter overrides for themes.
#[derive(Debug, Parser)]
#[command(name = "lastlayer-params", version)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    params: ParamsArgs,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut builder = ParameterService::builder();
    if let Some(path) = &cli.settings {
        builder = builder.settings_file(path);
    }
    let service = match builder.build() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Could not start");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let action: ParamsAction = cli.params.into_action();
    match service.handle(&action) {
        Ok(result) => {
            print!("{result}");
            match result {
                ParamsResult::Applied(apply) if !apply.success => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
