//! Board value types shared by the layout algorithm and the document adapters.

use serde::{Deserialize, Serialize};

use crate::point::{circle_point, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DrawingId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Net {
    pub id: NetId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub name: String,
    /// Absolute board position.
    pub position: Point,
    pub net: Option<Net>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub reference: String,
    pub position: Point,
    /// Kernel radians.
    pub orientation: f64,
    pub pads: Vec<Pad>,
}

impl Component {
    #[must_use]
    pub fn pad(&self, name: &str) -> Option<&Pad> {
        self.pads.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawingPrimitive {
    Segment {
        start: Point,
        end: Point,
        layer: LayerId,
        width: f64,
    },
    /// Arc from `arc_start` around `center`; positive `swept_angle` turns towards
    /// increasing kernel angle.
    Arc {
        center: Point,
        arc_start: Point,
        swept_angle: f64,
        layer: LayerId,
        width: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        layer: LayerId,
        width: f64,
    },
}

impl DrawingPrimitive {
    #[must_use]
    pub fn layer(&self) -> LayerId {
        match self {
            DrawingPrimitive::Segment { layer, .. }
            | DrawingPrimitive::Arc { layer, .. }
            | DrawingPrimitive::Circle { layer, .. } => *layer,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        match self {
            DrawingPrimitive::Segment { width, .. }
            | DrawingPrimitive::Arc { width, .. }
            | DrawingPrimitive::Circle { width, .. } => *width,
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Point {
        match *self {
            DrawingPrimitive::Segment { start, .. } => start,
            DrawingPrimitive::Arc { arc_start, .. } => arc_start,
            DrawingPrimitive::Circle { center, radius, .. } => circle_point(center, 0.0, radius),
        }
    }

    #[must_use]
    pub fn end_point(&self) -> Point {
        match *self {
            DrawingPrimitive::Segment { end, .. } => end,
            DrawingPrimitive::Arc {
                center,
                arc_start,
                swept_angle,
                ..
            } => arc_start.rotated_about(center, swept_angle),
            DrawingPrimitive::Circle { center, radius, .. } => circle_point(center, 0.0, radius),
        }
    }

    /// Point halfway along the primitive (used by three-point arc formats).
    #[must_use]
    pub fn mid_point(&self) -> Point {
        match *self {
            DrawingPrimitive::Segment { start, end, .. } => start.midpoint(end),
            DrawingPrimitive::Arc {
                center,
                arc_start,
                swept_angle,
                ..
            } => arc_start.rotated_about(center, swept_angle / 2.0),
            DrawingPrimitive::Circle { center, radius, .. } => {
                circle_point(center, std::f64::consts::PI, radius)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub start: Point,
    pub end: Point,
    pub layer: LayerId,
    pub width: f64,
    pub net: Option<NetId>,
}

impl Track {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// True when either endpoint lies strictly within `threshold` of `p`.
    #[must_use]
    pub fn touches(&self, p: Point, threshold: f64) -> bool {
        self.start.distance_to(p) < threshold || self.end.distance_to(p) < threshold
    }
}
