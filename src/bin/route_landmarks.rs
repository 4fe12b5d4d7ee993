//! route-landmarks CLI - list notable landmarks along a GPX track
//!
//! Usage:
//!   route-landmarks <file.gpx> [--json] [--endpoint <url>] [--timeout <secs>]
//!
//! Features are fetched from an Overpass API instance once per run.

use clap::Parser;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use route_landmarks::{
    annotate_route, gpx_input::load_track_points, FilteredResult, FnObserver, LandmarkConfig,
    OverpassConfig, OverpassSource,
};

#[derive(Parser)]
#[command(name = "route-landmarks")]
#[command(about = "List mountain passes, rivers and towns along a GPX track", long_about = None)]
struct Cli {
    /// GPX file to annotate
    file: PathBuf,

    /// Print the result as JSON instead of one line per landmark
    #[arg(long)]
    json: bool,

    /// Overpass interpreter URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Lookup timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Show per-marker progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(result) => {
            print_result(&result, cli.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<FilteredResult, Box<dyn std::error::Error>> {
    let file = File::open(&cli.file)?;
    let points = load_track_points(BufReader::new(file))?;

    let mut overpass = OverpassConfig {
        timeout_secs: cli.timeout,
        ..OverpassConfig::default()
    };
    if let Some(endpoint) = &cli.endpoint {
        overpass.endpoint = endpoint.clone();
    }
    let source = OverpassSource::new(overpass)?;

    let verbose = cli.verbose;
    let observer = FnObserver::new(
        move |processed, total| {
            if verbose {
                eprint!("\r  Classifying marker {}/{}", processed, total);
                if processed == total {
                    eprintln!();
                }
            }
        },
        |_: &FilteredResult| {},
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(annotate_route(
        &points,
        &source,
        &LandmarkConfig::default(),
        &observer,
    ))?;

    Ok(result)
}

fn print_result(result: &FilteredResult, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }

    if result.is_empty() {
        println!("No landmarks found");
        return;
    }

    for entry in result.values() {
        println!("{:>5} km  {:<6} {}", entry.km, entry.kind, entry.name);
    }
}
