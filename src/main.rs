use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use geoglow::{Demo, GeoglowConfig, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "geoglow", version, about = "Progressive wgpu earth and flight demos")]
struct Cli {
    /// Which demo to run.
    #[arg(long, value_enum, default_value_t = Demo::PostFx)]
    demo: Demo,

    /// TOML file overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging for geoglow.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    geoglow::init_logging(if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    });

    let config = match &cli.config {
        Some(path) => match geoglow::load_from_path(path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => GeoglowConfig::default(),
    };

    match geoglow::run(cli.demo, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
