//! Board outline: a closed contour of spacer arcs and rounded spoke notches.

use std::f64::consts::{PI, TAU};

use cavalier_contours::polyline::{PlineSource, PlineVertex, Polyline};
use pixelring_core::{circle_point, DrawingPrimitive, LayerId, Point, PolarOffset};
use tracing::debug;

/// Maximum gap (mm) tolerated between one primitive's end and the next one's start.
pub const CONTINUITY_TOLERANCE: f64 = 0.01;

#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("outline radius must be positive, got {0}")]
    Radius(f64),
    #[error(
        "spacer arc after spoke {index} has non-positive sweep {sweep} rad \
         (spoke wedges too wide or spokes not sorted)"
    )]
    DegenerateSpacer { index: usize, sweep: f64 },
    #[error("outline is not closed: primitive {index} ends {gap:.4} mm away from primitive {next}")]
    Discontinuity { index: usize, next: usize, gap: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineParams {
    pub center: Point,
    pub radius: f64,
    /// Spoke angles in radians, ascending, each within `[0, 2π)`.
    pub spoke_angles: Vec<f64>,
    /// Angular width of each spoke wedge (radians).
    pub spoke_arc_width: f64,
    /// How far each notch reaches beyond the circle (mm).
    pub spoke_length: f64,
    pub line_width: f64,
    pub layer: LayerId,
}

/// Ordered primitives forming one closed loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    primitives: Vec<DrawingPrimitive>,
}

impl Outline {
    #[must_use]
    pub fn primitives(&self) -> &[DrawingPrimitive] {
        &self.primitives
    }

    #[must_use]
    pub fn into_primitives(self) -> Vec<DrawingPrimitive> {
        self.primitives
    }

    /// Verify that each primitive ends where the next (wrapping) one starts.
    pub fn check_closed(&self) -> Result<(), OutlineError> {
        check_closed(&self.primitives)
    }

    /// The contour as a closed polyline (arcs carried as bulges).
    #[must_use]
    pub fn to_polyline(&self) -> Polyline<f64> {
        let mut pl = Polyline::new_closed();
        for prim in &self.primitives {
            match *prim {
                DrawingPrimitive::Segment { start, .. } => {
                    pl.vertex_data.push(PlineVertex::new(start.x, start.y, 0.0));
                }
                DrawingPrimitive::Arc {
                    arc_start,
                    swept_angle,
                    ..
                } => {
                    let bulge = (swept_angle / 4.0).tan();
                    pl.vertex_data
                        .push(PlineVertex::new(arc_start.x, arc_start.y, bulge));
                }
                DrawingPrimitive::Circle { center, radius, .. } => {
                    // Two half circles.
                    pl.vertex_data
                        .push(PlineVertex::new(center.x - radius, center.y, 1.0));
                    pl.vertex_data
                        .push(PlineVertex::new(center.x + radius, center.y, 1.0));
                }
            }
        }
        pl
    }

    /// Enclosed area (mm²); positive for a counter-clockwise contour.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.to_polyline().area()
    }
}

pub fn generate_outline(params: &OutlineParams) -> Result<Outline, OutlineError> {
    if !(params.radius > 0.0) {
        return Err(OutlineError::Radius(params.radius));
    }

    let angles = &params.spoke_angles;
    if angles.is_empty() {
        let outline = Outline {
            primitives: vec![DrawingPrimitive::Circle {
                center: params.center,
                radius: params.radius,
                layer: params.layer,
                width: params.line_width,
            }],
        };
        return Ok(outline);
    }

    let wedge = params.spoke_arc_width;
    let spacers = spacer_sweeps(angles, wedge)?;
    let mut primitives = Vec::with_capacity(spacers.len() * 4);
    let mut accum = angles[0] + wedge / 2.0;

    for sweep in spacers {
        primitives.push(DrawingPrimitive::Arc {
            center: params.center,
            arc_start: circle_point(params.center, accum, params.radius),
            swept_angle: sweep,
            layer: params.layer,
            width: params.line_width,
        });
        accum += sweep;

        let reach = PolarOffset::new(accum + wedge / 2.0, params.spoke_length).to_vector();
        let base_1 = circle_point(params.center, accum, params.radius);
        let base_2 = circle_point(params.center, accum + wedge, params.radius);
        let tip_1 = base_1.translated(reach);
        let tip_2 = base_2.translated(reach);
        debug!(
            %base_1, %tip_1, %base_2, %tip_2,
            "spoke notch at {:.4} rad",
            accum + wedge / 2.0
        );

        primitives.push(DrawingPrimitive::Segment {
            start: base_1,
            end: tip_1,
            layer: params.layer,
            width: params.line_width,
        });
        primitives.push(DrawingPrimitive::Arc {
            center: tip_1.midpoint(tip_2),
            arc_start: tip_1,
            swept_angle: PI,
            layer: params.layer,
            width: params.line_width,
        });
        primitives.push(DrawingPrimitive::Segment {
            start: tip_2,
            end: base_2,
            layer: params.layer,
            width: params.line_width,
        });

        accum += wedge;
    }

    check_closed(&primitives)?;
    Ok(Outline { primitives })
}

/// Sweep of the spacer arc following each spoke, wrapping past the last one.
fn spacer_sweeps(angles: &[f64], wedge: f64) -> Result<Vec<f64>, OutlineError> {
    let n = angles.len();
    (0..n)
        .map(|index| {
            let next = if index + 1 >= n {
                angles[0] + TAU
            } else {
                angles[index + 1]
            };
            let sweep = next - angles[index] - wedge;
            if sweep > 0.0 {
                Ok(sweep)
            } else {
                Err(OutlineError::DegenerateSpacer { index, sweep })
            }
        })
        .collect()
}

pub fn check_closed(primitives: &[DrawingPrimitive]) -> Result<(), OutlineError> {
    let n = primitives.len();
    for index in 0..n {
        let next = (index + 1) % n;
        let gap = primitives[index]
            .end_point()
            .distance_to(primitives[next].start_point());
        if gap > CONTINUITY_TOLERANCE {
            return Err(OutlineError::Discontinuity { index, next, gap });
        }
    }
    Ok(())
}
