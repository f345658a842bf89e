use indexmap::IndexMap;
use tracing::trace;

use pixelring_core::{
    Component, ComponentId, DrawingId, DrawingPrimitive, LayerId, Net, NetId, Pad, Point,
    Track, TrackId, ORIENTATION_SIGN,
};

use crate::document::{BoardDocument, BoardError};

/// KiCad 5 layer numbering for the layers the layout touches.
pub const DEFAULT_LAYERS: [(&str, u32); 5] = [
    ("F.Cu", 0),
    ("B.Cu", 31),
    ("B.SilkS", 36),
    ("F.SilkS", 37),
    ("Edge.Cuts", 44),
];

/// A pad as stored on its footprint: offset from the footprint origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PadDef {
    pub name: String,
    pub offset: Point,
    pub net: Option<NetId>,
}

impl PadDef {
    #[must_use]
    pub fn new(name: impl Into<String>, offset: Point, net: Option<NetId>) -> Self {
        Self {
            name: name.into(),
            offset,
            net,
        }
    }
}

#[derive(Debug, Clone)]
struct ComponentRecord {
    reference: String,
    position: Point,
    orientation: f64,
    pads: Vec<PadDef>,
}

/// Absolute pad position for a footprint at `position` rotated by `orientation` radians.
///
/// The document's rotation turns local offsets the opposite way to the kernel angle.
#[must_use]
pub fn pad_position(position: Point, orientation: f64, offset: Point) -> Point {
    position.translated(offset.rotated_about(Point::default(), -ORIENTATION_SIGN * orientation))
}

/// Board document held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBoard {
    layers: IndexMap<String, LayerId>,
    nets: IndexMap<NetId, String>,
    components: Vec<ComponentRecord>,
    drawings: IndexMap<DrawingId, DrawingPrimitive>,
    tracks: IndexMap<TrackId, Track>,
    next_drawing: usize,
    next_track: usize,
    commits: usize,
}

impl MemoryBoard {
    /// A board with the default layer table and the unnamed net 0.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (name, id) in DEFAULT_LAYERS {
            board.add_layer(name, LayerId(id));
        }
        board.add_net_with_id(NetId(0), "");
        board
    }

    /// A board with no layers and no nets.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, name: &str, id: LayerId) {
        self.layers.insert(name.to_string(), id);
    }

    #[must_use]
    pub fn layer_name(&self, id: LayerId) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, l)| **l == id)
            .map(|(name, _)| name.as_str())
    }

    /// Add a net with the next free id, or return the existing one.
    pub fn add_net(&mut self, name: &str) -> Net {
        if let Ok(net) = self.get_net(name) {
            return net;
        }
        let id = NetId(self.nets.keys().map(|n| n.0 + 1).max().unwrap_or(0));
        self.add_net_with_id(id, name)
    }

    pub fn add_net_with_id(&mut self, id: NetId, name: &str) -> Net {
        self.nets.insert(id, name.to_string());
        Net {
            id,
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn net(&self, id: NetId) -> Option<Net> {
        self.nets.get(&id).map(|name| Net {
            id,
            name: name.clone(),
        })
    }

    #[must_use]
    pub fn nets(&self) -> Vec<Net> {
        self.nets
            .iter()
            .map(|(id, name)| Net {
                id: *id,
                name: name.clone(),
            })
            .collect()
    }

    pub fn add_component(
        &mut self,
        reference: &str,
        position: Point,
        orientation: f64,
        pads: Vec<PadDef>,
    ) -> ComponentId {
        self.components.push(ComponentRecord {
            reference: reference.to_string(),
            position,
            orientation,
            pads,
        });
        ComponentId(self.components.len() - 1)
    }

    #[must_use]
    pub fn drawing(&self, id: DrawingId) -> Option<&DrawingPrimitive> {
        self.drawings.get(&id)
    }

    #[must_use]
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    #[must_use]
    pub fn drawings(&self) -> impl Iterator<Item = &DrawingPrimitive> {
        self.drawings.values()
    }

    #[must_use]
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Number of successful `commit` calls.
    #[must_use]
    pub fn commits(&self) -> usize {
        self.commits
    }

    fn record(&self, id: ComponentId) -> Result<&ComponentRecord, BoardError> {
        self.components
            .get(id.0)
            .ok_or(BoardError::UnknownComponent(id))
    }
}

impl BoardDocument for MemoryBoard {
    fn resolve_layer(&self, name: &str) -> Result<LayerId, BoardError> {
        self.layers
            .get(name)
            .copied()
            .ok_or_else(|| BoardError::UnknownLayer(name.to_string()))
    }

    fn add_drawing(&mut self, primitive: DrawingPrimitive) -> DrawingId {
        let id = DrawingId(self.next_drawing);
        self.next_drawing += 1;
        self.drawings.insert(id, primitive);
        id
    }

    fn delete_drawing(&mut self, id: DrawingId) -> Result<(), BoardError> {
        self.drawings
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(BoardError::UnknownDrawing(id))
    }

    fn list_drawings(&self, layer: Option<LayerId>) -> Vec<DrawingId> {
        self.drawings
            .iter()
            .filter(|(_, d)| layer.map_or(true, |l| d.layer() == l))
            .map(|(id, _)| *id)
            .collect()
    }

    fn add_track(&mut self, track: Track) -> TrackId {
        let id = TrackId(self.next_track);
        self.next_track += 1;
        trace!(?id, start = %track.start, end = %track.end, "track added");
        self.tracks.insert(id, track);
        id
    }

    fn delete_track(&mut self, id: TrackId) -> Result<(), BoardError> {
        self.tracks
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(BoardError::UnknownTrack(id))
    }

    fn list_tracks(&self, net: Option<NetId>) -> Vec<(TrackId, Track)> {
        self.tracks
            .iter()
            .filter(|(_, t)| net.map_or(true, |n| t.net == Some(n)))
            .map(|(id, t)| (*id, t.clone()))
            .collect()
    }

    fn list_components(&self) -> Vec<ComponentId> {
        (0..self.components.len()).map(ComponentId).collect()
    }

    fn get_component_by_reference(&self, reference: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.reference == reference)
            .map(ComponentId)
    }

    fn component(&self, id: ComponentId) -> Result<Component, BoardError> {
        let rec = self.record(id)?;
        let pads = rec
            .pads
            .iter()
            .map(|p| Pad {
                name: p.name.clone(),
                position: pad_position(rec.position, rec.orientation, p.offset),
                net: p.net.and_then(|n| self.net(n)),
            })
            .collect();
        Ok(Component {
            reference: rec.reference.clone(),
            position: rec.position,
            orientation: rec.orientation,
            pads,
        })
    }

    fn set_placement(
        &mut self,
        id: ComponentId,
        position: Point,
        orientation: f64,
    ) -> Result<(), BoardError> {
        let rec = self
            .components
            .get_mut(id.0)
            .ok_or(BoardError::UnknownComponent(id))?;
        rec.position = position;
        rec.orientation = orientation;
        Ok(())
    }

    fn get_net(&self, name: &str) -> Result<Net, BoardError> {
        self.nets
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, n)| Net {
                id: *id,
                name: n.clone(),
            })
            .ok_or_else(|| BoardError::UnknownNet(name.to_string()))
    }

    fn commit(&mut self) -> Result<(), BoardError> {
        self.commits += 1;
        Ok(())
    }
}
