mod error;
mod run;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::error::ErrorCode;
use crate::run::RunOptions;

#[derive(Parser, Debug)]
#[command(
    name = "pixelring",
    version,
    about = "Lay out a ring of LED pixels with spokes on a KiCad board",
    long_about = None
)]
struct Cli {
    /// Path to the .kicad_pcb file
    #[arg(short, long, value_name = "PCB")]
    path: PathBuf,

    /// Layout parameters (YAML); built-in defaults when omitted
    #[arg(short, long, value_name = "YAML")]
    config: Option<PathBuf>,

    /// Delete every track on the board instead of laying out
    #[arg(long)]
    delete_all_traces: bool,

    /// Delete every board drawing instead of laying out
    #[arg(long)]
    delete_all_drawings: bool,

    /// Delete zero or near-zero length tracks instead of laying out
    #[arg(long)]
    delete_short_traces: bool,

    /// Run everything but do not save the board
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,

    /// Place components without adding tracks
    #[arg(long)]
    skip_traces: bool,

    /// Write the placement report as JSON
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,
}

impl From<Cli> for RunOptions {
    fn from(cli: Cli) -> Self {
        RunOptions {
            path: cli.path,
            config: cli.config,
            delete_all_traces: cli.delete_all_traces,
            delete_all_drawings: cli.delete_all_drawings,
            delete_short_traces: cli.delete_short_traces,
            dry_run: cli.dry_run,
            skip_traces: cli.skip_traces,
            report: cli.report,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => ErrorCode::Usage as i32,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_tracing(cli.verbose);

    if let Err(err) = run::run(&cli.into()) {
        eprintln!("error: {err}");
        std::process::exit(err.code as i32);
    }
}
