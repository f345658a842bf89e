//! Spoke clusters: a radial line of components, an optional arrow head at its tip and an
//! optional cross bar part way along.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use serde::Serialize;

use pixelring_config::{BoardParams, Spoke, SpokeParams};
use pixelring_core::{circle_point, normalize_angle, Point, PolarOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementKind {
    Circle,
    SpokeLine,
    Arrow,
    Cross,
}

/// A position and kernel orientation, not yet bound to a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub kind: PlacementKind,
    pub position: Point,
    pub orientation: f64,
}

/// Radius fraction of the line where the cross bar sits, with and without an arrow.
pub const CROSS_FRACTION_WITH_ARROW: f64 = 3.0 / 8.0;
pub const CROSS_FRACTION_WITHOUT_ARROW: f64 = 5.0 / 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SpokeGeometry {
    pub center: Point,
    pub circle_radius: f64,
    pub spacing: f64,
    pub length: usize,
    pub arrow_pixels: usize,
    pub cross_pixels: usize,
    pub arrow_inset: f64,
}

impl SpokeGeometry {
    #[must_use]
    pub fn new(board: &BoardParams, spokes: &SpokeParams) -> Self {
        Self {
            center: board.center,
            circle_radius: board.circle_radius,
            spacing: board.pixel_spacing,
            length: spokes.length,
            arrow_pixels: spokes.arrow_pixels,
            cross_pixels: spokes.cross_pixels,
            arrow_inset: spokes.arrow_inset,
        }
    }

    /// Every slot of one spoke, in placement order: line, arrow, cross.
    #[must_use]
    pub fn slots(&self, spoke: &Spoke) -> Vec<Slot> {
        let mut slots = self.line(spoke.angle);
        if spoke.has_arrow {
            slots.extend(self.arrow(spoke.angle));
        }
        if spoke.has_cross {
            slots.extend(self.cross(spoke.angle, spoke.has_arrow));
        }
        slots
    }

    /// Number of components one spoke consumes.
    #[must_use]
    pub fn count(&self, spoke: &Spoke) -> usize {
        self.length
            + if spoke.has_arrow { self.arrow_pixels } else { 0 }
            + if spoke.has_cross { self.cross_pixels } else { 0 }
    }

    fn line(&self, angle: f64) -> Vec<Slot> {
        (0..self.length)
            .map(|k| Slot {
                kind: PlacementKind::SpokeLine,
                position: circle_point(
                    self.center,
                    angle,
                    self.circle_radius + self.spacing * (k + 1) as f64,
                ),
                orientation: radial_orientation(angle),
            })
            .collect()
    }

    fn arrow(&self, angle: f64) -> Vec<Slot> {
        let half = self.arrow_pixels / 2;
        if half == 0 {
            return Vec::new();
        }
        let tip = circle_point(
            self.center,
            angle,
            self.circle_radius + self.spacing * self.length as f64,
        );
        (0..self.arrow_pixels)
            .map(|j| {
                let sign = if j < half { 1.0 } else { -1.0 };
                let tilt = FRAC_PI_2 + sign * FRAC_PI_4;
                let side = (1 + j % half) as f64;
                let along = PolarOffset::new(
                    angle + tilt,
                    sign * (self.arrow_inset + side * self.spacing),
                );
                let nudge = PolarOffset::new(angle + sign * FRAC_PI_4, self.arrow_inset);
                Slot {
                    kind: PlacementKind::Arrow,
                    position: tip
                        .translated(along.to_vector())
                        .translated(nudge.to_vector()),
                    orientation: normalize_angle(PI - angle + tilt),
                }
            })
            .collect()
    }

    fn cross(&self, angle: f64, has_arrow: bool) -> Vec<Slot> {
        let half = self.cross_pixels / 2;
        if half == 0 {
            return Vec::new();
        }
        let fraction = if has_arrow {
            CROSS_FRACTION_WITH_ARROW
        } else {
            CROSS_FRACTION_WITHOUT_ARROW
        };
        let anchor = circle_point(
            self.center,
            angle,
            self.circle_radius + self.spacing * self.length as f64 * fraction,
        );
        (0..self.cross_pixels)
            .map(|j| {
                let sign = if j < half { -1.0 } else { 1.0 };
                let side = (1 + j % half) as f64;
                let mut position = anchor;
                position.translate(
                    PolarOffset::new(angle + FRAC_PI_2, sign * side * self.spacing).to_vector(),
                );
                Slot {
                    kind: PlacementKind::Cross,
                    position,
                    orientation: radial_orientation(angle),
                }
            })
            .collect()
    }
}

/// Orientation of a component facing along the radius at `angle`.
#[must_use]
pub fn radial_orientation(angle: f64) -> f64 {
    normalize_angle(PI - angle)
}
