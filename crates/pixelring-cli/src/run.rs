use std::path::{Path, PathBuf};

use tracing::{info, warn};

use pixelring_config::LayoutConfig;
use pixelring_layout::{run_layout, PlacementReport};
use pixelring_pcb::{
    delete_all_drawings, delete_all_tracks, delete_short_tracks, BoardDocument, KicadBoard,
    DEFAULT_SHORT_TRACK_LENGTH,
};

use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub delete_all_traces: bool,
    pub delete_all_drawings: bool,
    pub delete_short_traces: bool,
    pub dry_run: bool,
    pub skip_traces: bool,
    pub report: Option<PathBuf>,
}

impl RunOptions {
    fn bulk(&self) -> bool {
        self.delete_all_traces || self.delete_all_drawings || self.delete_short_traces
    }
}

pub fn run(opts: &RunOptions) -> Result<(), CliError> {
    if opts.bulk() && (opts.config.is_some() || opts.skip_traces || opts.report.is_some()) {
        return Err(CliError::usage(
            "bulk delete flags cannot be combined with --config, --skip-traces or --report",
        ));
    }

    let mut board = KicadBoard::open(&opts.path)?;
    info!(path = %opts.path.display(), version = board.version(), "opened board");

    if opts.bulk() {
        run_bulk(&mut board, opts)?;
    } else {
        let mut cfg = match &opts.config {
            Some(path) => LayoutConfig::from_path(path)?,
            None => LayoutConfig::default(),
        };
        if opts.skip_traces {
            cfg.routing.enabled = false;
        }
        let report = run_layout(&mut board, &cfg)?;
        print_summary(&report);
        if let Some(path) = &opts.report {
            write_report(path, &report)?;
        }
    }

    if opts.dry_run {
        info!("dry run, board not saved");
        return Ok(());
    }
    board.commit()?;
    println!("Saved {}", opts.path.display());
    Ok(())
}

fn run_bulk(board: &mut dyn BoardDocument, opts: &RunOptions) -> Result<(), CliError> {
    if opts.delete_all_traces {
        let n = delete_all_tracks(board)?;
        println!("Deleted {n} tracks");
    }
    if opts.delete_all_drawings {
        let n = delete_all_drawings(board)?;
        println!("Deleted {n} drawings");
    }
    if opts.delete_short_traces {
        let n = delete_short_tracks(board, DEFAULT_SHORT_TRACK_LENGTH)?;
        println!("Deleted {n} short tracks");
    }
    Ok(())
}

fn print_summary(report: &PlacementReport) {
    println!(
        "Placed {} components ({:?}), {} spokes, {} tracks added, {} stale tracks removed, {} outline primitives",
        report.placements.len(),
        report.terminal,
        report.spoke_order.len(),
        report.tracks_created,
        report.stale_tracks_cleared,
        report.outline_primitives,
    );
    if report.placements.is_empty() {
        warn!("no components were placed");
    }
}

fn write_report(path: &Path, report: &PlacementReport) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| CliError::processing(format!("could not encode report: {e}")))?;
    std::fs::write(path, json).map_err(|e| {
        CliError::processing(format!("could not write report {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), "wrote placement report");
    Ok(())
}
