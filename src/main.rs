//! Req-Capture - Main Entry Point
//!
//! Resolves the capture configuration from file, environment and CLI flags,
//! opens a browser on the configured page and captures JSON API requests
//! until Ctrl+C.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use req_capture::{
    capture::export_captures,
    config::{CliArgs, Config},
    logging, App, CaptureEvent, ChromiumSession, ExportFormat, LaunchOptions, RequestInfo, NAME,
    VERSION,
};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
}

fn print_banner() {
    println!(
        "{cyan}{bold}{name}{reset} {dim}v{version}{reset}",
        cyan = colors::CYAN,
        bold = colors::BOLD,
        reset = colors::RESET,
        dim = colors::DIM,
        name = NAME,
        version = VERSION
    );
    println!();
}

fn print_config_summary(config: &Config) {
    println!(
        "{bold}{blue}Configuration:{reset}",
        bold = colors::BOLD,
        blue = colors::BLUE,
        reset = colors::RESET
    );
    println!(
        "  {dim}URL:{reset}            {}",
        config.effective_url(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Debug:{reset}          {}",
        if config.is_debug() {
            format!("{green}on{reset}", green = colors::GREEN, reset = colors::RESET)
        } else {
            format!("{yellow}off{reset}", yellow = colors::YELLOW, reset = colors::RESET)
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Browser:{reset}        {}",
        LaunchOptions::from_config(config)
            .executable_path
            .unwrap_or_else(|| "system default".to_string()),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!();
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .about("Capture JSON API requests made by a web page")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Page to open (default: https://studygolang.com/topics)"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("PATH")
                .help("Path to the browser executable"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory to write captured requests to")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Format of written captures: toml or json")
                .value_parser(["toml", "json"])
                .default_value("toml"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .help("Print the resolved configuration as JSON and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        url: matches.get_one::<String>("url").cloned(),
        debug: matches.get_flag("debug").then_some(true),
        browser_path: matches.get_one::<String>("path").cloned(),
        config_file: matches.get_one::<PathBuf>("config").cloned(),
    }
}

/// Where and how captured requests are written.
struct OutputOptions {
    dir: Option<PathBuf>,
    format: ExportFormat,
}

fn parse_output_options(matches: &clap::ArgMatches) -> Result<OutputOptions> {
    let format = match matches.get_one::<String>("format") {
        Some(format) => format.parse()?,
        None => ExportFormat::default(),
    };

    Ok(OutputOptions {
        dir: matches.get_one::<PathBuf>("output").cloned(),
        format,
    })
}

/// Prints captures as they arrive until Ctrl+C or until the session ends on
/// its own. Returns the session result in the latter case.
async fn watch_session(
    app: &App,
    running: &mut tokio::task::JoinHandle<Result<Vec<RequestInfo>>>,
) -> Option<Result<Vec<RequestInfo>>> {
    let mut events = app.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(CaptureEvent::RequestCaptured { request }) => {
                    println!(
                        "{green}captured{reset} {} {} ({})",
                        request.method,
                        request.url,
                        request.validator.status_code,
                        green = colors::GREEN,
                        reset = colors::RESET
                    );
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} capture events", skipped),
                Err(RecvError::Closed) => return None,
            },
            result = &mut *running => {
                return Some(result.context("Capture task panicked").and_then(|r| r));
            }
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received shutdown signal, stopping capture..."),
                    Err(e) => error!("Failed to listen for shutdown signal: {}", e),
                }
                return None;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    let cli_args = parse_cli_args(&matches);
    let output = parse_output_options(&matches)?;
    let config = cli_args
        .load_settings()
        .context("Failed to load configuration")?;

    logging::init(&config, verbosity, quiet).context("Failed to initialize logging")?;
    debug!(?config, "configuration loaded");

    if matches.get_flag("print-config") {
        println!("{}", config.to_json().context("Failed to encode configuration")?);
        return Ok(());
    }

    if !quiet {
        print_banner();
        print_config_summary(&config);
    }

    let app = App::new(config);
    let session = ChromiumSession::launch(&app.launch_options()).await?;
    let mut running = app.open_browser(session);

    if !quiet {
        println!(
            "{dim}Press Ctrl+C to stop capturing{reset}",
            dim = colors::DIM,
            reset = colors::RESET
        );
        println!();
    }

    let result = match watch_session(&app, &mut running).await {
        Some(result) => result,
        None => {
            app.close_browser();
            running.await.context("Capture task panicked")?
        }
    };
    let captured = result.context("Capture session failed")?;

    info!("Captured {} requests", captured.len());

    if let Some(ref dir) = output.dir {
        let written = export_captures(dir, &captured, output.format)?;
        println!(
            "{green}Wrote {} captures to {}{reset}",
            written.len(),
            dir.display(),
            green = colors::GREEN,
            reset = colors::RESET
        );
    }

    Ok(())
}
