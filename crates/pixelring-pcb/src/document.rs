use pixelring_core::{
    Component, ComponentId, DrawingId, DrawingPrimitive, LayerId, Net, NetId, Pad, Point,
    Track, TrackId,
};

use crate::sexpr::SExprError;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("unknown layer \"{0}\"")]
    UnknownLayer(String),
    #[error("unknown net \"{0}\"")]
    UnknownNet(String),
    #[error("no component with handle {0:?}")]
    UnknownComponent(ComponentId),
    #[error("no drawing with handle {0:?}")]
    UnknownDrawing(DrawingId),
    #[error("no track with handle {0:?}")]
    UnknownTrack(TrackId),
    #[error("could not {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed board file: {0}")]
    Syntax(#[from] SExprError),
    #[error("not a KiCad board: {0}")]
    Format(String),
}

/// The board as seen by the layout algorithm.
///
/// Every mutation takes effect immediately and is visible to later queries. Nothing is
/// persisted until [`BoardDocument::commit`].
pub trait BoardDocument {
    fn resolve_layer(&self, name: &str) -> Result<LayerId, BoardError>;

    fn add_drawing(&mut self, primitive: DrawingPrimitive) -> DrawingId;
    fn delete_drawing(&mut self, id: DrawingId) -> Result<(), BoardError>;
    /// Drawings in document order, optionally only those on `layer`.
    fn list_drawings(&self, layer: Option<LayerId>) -> Vec<DrawingId>;

    fn add_track(&mut self, track: Track) -> TrackId;
    fn delete_track(&mut self, id: TrackId) -> Result<(), BoardError>;
    /// Tracks in document order, optionally only those on `net`.
    fn list_tracks(&self, net: Option<NetId>) -> Vec<(TrackId, Track)>;

    fn list_components(&self) -> Vec<ComponentId>;
    fn get_component_by_reference(&self, reference: &str) -> Option<ComponentId>;
    fn component(&self, id: ComponentId) -> Result<Component, BoardError>;
    /// Move and rotate a component; `orientation` is in kernel radians.
    fn set_placement(
        &mut self,
        id: ComponentId,
        position: Point,
        orientation: f64,
    ) -> Result<(), BoardError>;

    /// Pads with absolute positions, in footprint order.
    fn list_pads(&self, id: ComponentId) -> Result<Vec<Pad>, BoardError> {
        Ok(self.component(id)?.pads)
    }

    fn get_net(&self, name: &str) -> Result<Net, BoardError>;

    fn commit(&mut self) -> Result<(), BoardError>;
}
