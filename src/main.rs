//! horizons-expect - fetch osculating orbital elements from JPL Horizons
//!
//! Connects to the Horizons telnet service, walks its menu dialogue and
//! prints one JSON object per ephemeris record on stdout.

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use tracing::{debug, error, info};

use horizons_expect::config::loader::CONFIG_ENV_VAR;
use horizons_expect::{fetch_orbital_elements, Config, ConfigLoader, ReferencePlane};

/// Command line arguments
#[derive(Debug, Default)]
struct AppArgs {
    /// Target body designation
    designation: String,
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    center: Option<String>,
    plane: Option<ReferencePlane>,
    start: Option<String>,
    end: Option<String>,
    interval: Option<String>,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(env::args().collect())
    }

    fn parse_from(args: Vec<String>) -> anyhow::Result<Self> {
        let mut app_args = AppArgs::default();
        let mut designation = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    app_args.config_path = Some(PathBuf::from(take_value(&args, &mut i)?))
                }
                "--center" => app_args.center = Some(take_value(&args, &mut i)?),
                "--plane" => app_args.plane = Some(take_value(&args, &mut i)?.parse()?),
                "--start" => app_args.start = Some(take_value(&args, &mut i)?),
                "--end" => app_args.end = Some(take_value(&args, &mut i)?),
                "--interval" => app_args.interval = Some(take_value(&args, &mut i)?),
                "--debug" | "-d" => app_args.debug = true,
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-v" => {
                    println!("horizons-expect v{}", env!("CARGO_PKG_VERSION"));
                    process::exit(0);
                }
                arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
                arg => {
                    if designation.is_some() {
                        bail!("Unexpected argument: {}", arg);
                    }
                    designation = Some(arg.to_string());
                }
            }
            i += 1;
        }

        let Some(designation) = designation else {
            bail!("Missing target designation");
        };
        app_args.designation = designation;
        Ok(app_args)
    }
}

/// Value following the option at `args[*i]`
fn take_value(args: &[String], i: &mut usize) -> anyhow::Result<String> {
    let option = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.clone()),
        None => bail!("Missing value for {}", option),
    }
}

/// Print help information
fn print_help() {
    println!("horizons-expect - fetch osculating orbital elements from JPL Horizons");
    println!();
    println!("USAGE:");
    println!("    horizons-expect [OPTIONS] <DESIGNATION>");
    println!();
    println!("ARGS:");
    println!("    <DESIGNATION>          Target body, e.g. \"DES=C/2012 S1;\"");
    println!();
    println!("OPTIONS:");
    println!("        --center <BODY>    Coordinate system center (default: Sun)");
    println!("        --plane <PLANE>    Reference plane: eclip, frame, body (default: eclip)");
    println!("        --start <DATE>     Start time (default: 01-Sep-2012)");
    println!("        --end <DATE>       End time (default: 31-Dec-2012)");
    println!("        --interval <STEP>  Output interval (default: 1d)");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -h, --help             Print this help message");
    println!("    -v, --version          Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}       Path to configuration file", CONFIG_ENV_VAR);
    println!("    HORIZONS_DEBUG        Enable debug logging (1 or true)");
    println!("    RUST_LOG              Set logging level (error, warn, info, debug, trace)");
}

#[tokio::main]
async fn main() {
    let args = match AppArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            process::exit(2);
        }
    };

    init_logging(args.debug);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn init_logging(debug_flag: bool) {
    let debug_env = env::var("HORIZONS_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let log_level = if debug_flag || debug_env { "debug" } else { "info" };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

async fn run(args: AppArgs) -> anyhow::Result<()> {
    let config = load_configuration(&args)?;
    let mut request = config.request.request_for(args.designation.clone());
    if let Some(center) = args.center {
        request = request.with_center(center);
    }
    if let Some(plane) = args.plane {
        request = request.with_reference_plane(plane);
    }
    if args.start.is_some() || args.end.is_some() {
        let start = args.start.unwrap_or(request.start.clone());
        let end = args.end.unwrap_or(request.end.clone());
        request = request.with_span(start, end);
    }
    if let Some(interval) = args.interval {
        request = request.with_interval(interval);
    }
    debug!("Request: {:?}", request);

    let records = fetch_orbital_elements(&config, &request)
        .await
        .with_context(|| format!("Ephemeris request for {:?} failed", request.designation))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }
    info!("Wrote {} records", records.len());
    Ok(())
}

/// Load configuration from an explicit path, the environment or the search paths
fn load_configuration(args: &AppArgs) -> anyhow::Result<Config> {
    let config = match &args.config_path {
        Some(path) => {
            debug!("Loading config from: {}", path.display());
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => ConfigLoader::load().context("Failed to load configuration")?,
    };
    Ok(config)
}
