use dotnet_launch::cli::commands::{CliArgs, Commands};
use dotnet_launch::cli::handlers::{handle_build, handle_detect, handle_port_chooser, EXIT_ERROR};
use dotnet_launch::util::logging::{init_logging, parse_level, LoggingConfig};
use dotnet_launch::{BehaviorConfig, VERSION};

use clap::Parser;
use tracing::{debug, error};

fn main() {
    let args = CliArgs::parse();
    let config = BehaviorConfig::from_env();
    init_logging_from_args(&args, config.as_ref().ok());

    debug!("dotnet-launch v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match (&args.command, config) {
        (Commands::PortChooser, _) => handle_port_chooser(),
        (_, Err(e)) => {
            error!("Invalid environment configuration: {}", e);
            EXIT_ERROR
        }
        (Commands::Detect(detect_args), Ok(config)) => {
            debug!("Configuration:\n{}", config);
            handle_detect(detect_args, config)
        }
        (Commands::Build(build_args), Ok(config)) => {
            debug!("Configuration:\n{}", config);
            handle_build(build_args, config)
        }
    };

    std::process::exit(exit_code);
}

/// `--log-level` wins over `BP_LOG_LEVEL`; INFO when neither is usable
fn init_logging_from_args(args: &CliArgs, config: Option<&BehaviorConfig>) {
    let level = args
        .log_level
        .as_deref()
        .or_else(|| config.map(|c| c.log_level.as_str()))
        .map(parse_level)
        .unwrap_or(tracing::Level::INFO);

    init_logging(LoggingConfig {
        level,
        use_json: args.log_json,
        ..Default::default()
    });
}
