//! landing-preload entry point.
//!
//! ## CLI Subcommands
//!
//! - `landing-preload preload <MANIFEST>` - Preload above-the-fold images
//! - `landing-preload config show|defaults|validate` - Inspect configuration
//! - `landing-preload version` - Print version

use std::process::ExitCode;

use landing_preload::cli::{config_cmd, has_flag, run_preload};
use landing_preload::config as preload_config;
use landing_preload::telemetry::init_logging;
use landing_preload::RuntimeConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "preload" => {
            let env = preload_config::load();
            if let Err(e) = init_logging(&env.logging) {
                eprintln!("Logging disabled: {}", e);
            }
            let code = run_preload(&args[2..], RuntimeConfig::from(&env)).await;
            ExitCode::from(code as u8)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            let json = has_flag(&args, "--json");
            let code = match subcommand {
                "show" => config_cmd::run_show(json),
                "defaults" => config_cmd::run_defaults(json),
                "validate" => config_cmd::run_validate(),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    1
                }
            };
            ExitCode::from(code as u8)
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("landing-preload {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "landing-preload - Priority-based image preloading v{}

USAGE:
    landing-preload <COMMAND> [OPTIONS]

COMMANDS:
    preload      Preload a manifest's above-the-fold images and report
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

EXAMPLES:
    landing-preload preload site.toml
    landing-preload preload site.toml --selected scout --timeout-secs 10
    landing-preload config show --json

ENVIRONMENT:
    LANDING_PRELOAD_ASSET_ROOT   Root directory for local assets (default: .)
    LANDING_PRELOAD_CDN_URL      Asset base url stripped before disk lookup
    LANDING_PRELOAD_LOG_LEVEL    Log filter (default: info)
    LANDING_PRELOAD_LOG_FORMAT   json or pretty (default: json)

EXIT CODES:
    0  Success
    1  Failure (an image failed or the preload timed out)
    2  Usage or manifest error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "preload" => {
            eprintln!(
                "landing-preload preload - Preload images from a manifest

USAGE:
    landing-preload preload <MANIFEST> [OPTIONS]

OPTIONS:
    --selected NAME     Thumbnail loaded at CRITICAL priority (default: first)
    --timeout-secs N    Give up after N seconds (default: 30)

DESCRIPTION:
    Loads the hero thumbnails and the first image of every reason track
    from LANDING_PRELOAD_ASSET_ROOT in priority order, then prints a JSON
    report with per-image status and loader statistics.
"
            );
        }
        "config" => {
            eprintln!(
                "landing-preload config - Inspect configuration

USAGE:
    landing-preload config <SUBCOMMAND> [--json]

SUBCOMMANDS:
    show           Show effective configuration
    defaults       Show default configuration
    validate       Check for obvious misconfigurations
"
            );
        }
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'landing-preload help' for general usage.",
                command
            );
        }
    }
}
