//! Procedural layout of a pixel ring: outline, placement and adjacency routing.

mod error;
pub mod router;
pub mod sequencer;
pub mod spoke;
mod supply;

use tracing::info;

use pixelring_config::LayoutConfig;
use pixelring_outline::{generate_outline, Outline, OutlineParams};
use pixelring_pcb::BoardDocument;

pub use error::LayoutError;
pub use router::{Router, RoutingParams};
pub use sequencer::{Placement, PlacementReport, Sequencer, TerminalState};
pub use spoke::{PlacementKind, Slot, SpokeGeometry};
pub use supply::{ComponentSupply, SupplyItem};

/// Outline for `cfg`, drawn on `doc`'s outline layer.
pub fn build_outline(
    doc: &dyn BoardDocument,
    cfg: &LayoutConfig,
) -> Result<Outline, LayoutError> {
    let params = OutlineParams {
        center: cfg.board.center,
        radius: cfg.board.circle_radius + cfg.outline.radius_offset,
        spoke_angles: cfg.spokes.spokes.iter().map(|s| s.angle).collect(),
        spoke_arc_width: cfg.outline.spoke_arc_width,
        spoke_length: cfg.outline.spoke_length,
        line_width: cfg.outline.line_width,
        layer: doc.resolve_layer(&cfg.outline.layer)?,
    };
    Ok(generate_outline(&params)?)
}

/// Replace the outline layer's drawings with a fresh outline. Returns the number of
/// primitives added.
pub fn redraw_outline(
    doc: &mut dyn BoardDocument,
    cfg: &LayoutConfig,
) -> Result<usize, LayoutError> {
    let outline = build_outline(doc, cfg)?;
    let layer = doc.resolve_layer(&cfg.outline.layer)?;
    let stale = doc.list_drawings(Some(layer));
    for id in &stale {
        doc.delete_drawing(*id)?;
    }
    let primitives = outline.into_primitives();
    let count = primitives.len();
    for primitive in primitives {
        doc.add_drawing(primitive);
    }
    info!(
        removed = stale.len(),
        added = count,
        layer = %cfg.outline.layer,
        "outline redrawn"
    );
    Ok(count)
}

/// Full run: outline, stale-track cleanup, then placement with routing.
pub fn run_layout(
    doc: &mut dyn BoardDocument,
    cfg: &LayoutConfig,
) -> Result<PlacementReport, LayoutError> {
    let outline_primitives = if cfg.outline.enabled {
        redraw_outline(doc, cfg)?
    } else {
        0
    };

    let mut supply = ComponentSupply::resolve(doc, &cfg.board.reference_prefix)?;
    let mut router = Router::new(RoutingParams::resolve(&cfg.routing, doc)?);

    let ids: Vec<_> = supply.ids().collect();
    let mut stale_tracks_cleared = 0;
    for id in ids {
        stale_tracks_cleared += router.clear_stale(doc, id)?;
    }
    info!(
        components = supply.len(),
        cleared = stale_tracks_cleared,
        "cleared tracks at old positions"
    );

    let report = Sequencer::new(&cfg.board, &cfg.spokes).run(doc, &mut supply, &mut router)?;
    Ok(PlacementReport {
        stale_tracks_cleared,
        outline_primitives,
        ..report
    })
}
