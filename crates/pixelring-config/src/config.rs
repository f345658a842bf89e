use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use pixelring_core::Point;

use crate::error::ConfigError;
use crate::expr::ScalarExpr;
use crate::vars::Variables;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub variables: Option<IndexMap<String, ScalarExpr>>,
    #[serde(default)]
    pub board: RawBoard,
    #[serde(default)]
    pub spokes: RawSpokes,
    #[serde(default)]
    pub outline: RawOutline,
    #[serde(default)]
    pub routing: RawRouting,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBoard {
    pub center: Option<[ScalarExpr; 2]>,
    pub circle_radius: Option<ScalarExpr>,
    pub pixel_count: Option<ScalarExpr>,
    pub base_angle: Option<ScalarExpr>,
    pub pixel_spacing: Option<ScalarExpr>,
    pub reference_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpokes {
    pub length: Option<ScalarExpr>,
    pub arrow_pixels: Option<ScalarExpr>,
    pub cross_pixels: Option<ScalarExpr>,
    pub arrow_inset: Option<ScalarExpr>,
    pub list: Option<Vec<RawSpoke>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSpoke {
    pub angle: ScalarExpr,
    #[serde(default)]
    pub arrow: bool,
    #[serde(default)]
    pub cross: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutline {
    pub enabled: Option<bool>,
    pub layer: Option<String>,
    pub radius_offset: Option<ScalarExpr>,
    pub spoke_arc_width: Option<ScalarExpr>,
    pub spoke_length: Option<ScalarExpr>,
    pub line_width: Option<ScalarExpr>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRouting {
    pub enabled: Option<bool>,
    pub layer: Option<String>,
    pub width: Option<ScalarExpr>,
    pub proximity: Option<ScalarExpr>,
    pub pad_map: Option<IndexMap<String, String>>,
}

/// One radial cluster around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spoke {
    /// Radians, CCW from +x, within `[0, 2π)`.
    pub angle: f64,
    pub has_arrow: bool,
    pub has_cross: bool,
}

impl Spoke {
    #[must_use]
    pub const fn new(angle: f64, has_arrow: bool, has_cross: bool) -> Self {
        Self {
            angle,
            has_arrow,
            has_cross,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardParams {
    pub center: Point,
    pub circle_radius: f64,
    pub pixel_count: usize,
    pub base_angle: f64,
    pub pixel_spacing: f64,
    pub reference_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpokeParams {
    /// Components along each radial line.
    pub length: usize,
    pub arrow_pixels: usize,
    pub cross_pixels: usize,
    /// Lateral pad and diagonal nudge applied to arrow components (mm).
    pub arrow_inset: f64,
    pub spokes: Vec<Spoke>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineConfig {
    pub enabled: bool,
    pub layer: String,
    /// Outline radius minus circle radius (mm).
    pub radius_offset: f64,
    pub spoke_arc_width: f64,
    pub spoke_length: f64,
    pub line_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingConfig {
    pub enabled: bool,
    pub layer: String,
    pub width: f64,
    pub proximity: f64,
    pub pad_map: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub board: BoardParams,
    pub spokes: SpokeParams,
    pub outline: OutlineConfig,
    pub routing: RoutingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            board: BoardParams {
                center: Point::new(90.0, 90.0),
                circle_radius: 20.0,
                pixel_count: 34,
                base_angle: FRAC_PI_2,
                pixel_spacing: 3.5,
                reference_prefix: "D".to_string(),
            },
            spokes: SpokeParams {
                length: 8,
                arrow_pixels: 6,
                cross_pixels: 4,
                arrow_inset: 0.75,
                spokes: vec![
                    Spoke::new(FRAC_PI_2, false, true),
                    Spoke::new(5.0 * PI / 4.0, true, true),
                    Spoke::new(7.0 * PI / 4.0, true, false),
                ],
            },
            outline: OutlineConfig {
                enabled: true,
                layer: "Edge.Cuts".to_string(),
                radius_offset: 4.0,
                spoke_arc_width: PI / 3.0,
                spoke_length: 20.0,
                line_width: 0.05,
            },
            routing: RoutingConfig {
                enabled: true,
                layer: "F.Cu".to_string(),
                width: 0.25,
                proximity: 1e-4,
                pad_map: IndexMap::from([
                    ("2".to_string(), "5".to_string()),
                    ("3".to_string(), "4".to_string()),
                ]),
            },
        }
    }
}

impl LayoutConfig {
    /// Resolve a raw config on top of the defaults, then validate it.
    pub fn resolve(raw: &RawConfig) -> Result<Self, ConfigError> {
        let vars = Variables::parse(raw.variables.as_ref())?;
        let mut cfg = Self::default();

        let b = &raw.board;
        if let Some([x, y]) = &b.center {
            cfg.board.center = Point::new(
                vars.eval("board.center.x", x)?,
                vars.eval("board.center.y", y)?,
            );
        }
        set_f64(&vars, "board.circle_radius", &b.circle_radius, &mut cfg.board.circle_radius)?;
        set_count(&vars, "board.pixel_count", &b.pixel_count, &mut cfg.board.pixel_count)?;
        set_f64(&vars, "board.base_angle", &b.base_angle, &mut cfg.board.base_angle)?;
        set_f64(&vars, "board.pixel_spacing", &b.pixel_spacing, &mut cfg.board.pixel_spacing)?;
        if let Some(prefix) = &b.reference_prefix {
            cfg.board.reference_prefix = prefix.clone();
        }

        let s = &raw.spokes;
        set_count(&vars, "spokes.length", &s.length, &mut cfg.spokes.length)?;
        set_count(&vars, "spokes.arrow_pixels", &s.arrow_pixels, &mut cfg.spokes.arrow_pixels)?;
        set_count(&vars, "spokes.cross_pixels", &s.cross_pixels, &mut cfg.spokes.cross_pixels)?;
        set_f64(&vars, "spokes.arrow_inset", &s.arrow_inset, &mut cfg.spokes.arrow_inset)?;
        if let Some(list) = &s.list {
            cfg.spokes.spokes = list
                .iter()
                .enumerate()
                .map(|(i, spoke)| {
                    let angle = vars.eval(&format!("spokes.list.{i}.angle"), &spoke.angle)?;
                    Ok(Spoke::new(angle, spoke.arrow, spoke.cross))
                })
                .collect::<Result<_, ConfigError>>()?;
        }

        let o = &raw.outline;
        if let Some(enabled) = o.enabled {
            cfg.outline.enabled = enabled;
        }
        if let Some(layer) = &o.layer {
            cfg.outline.layer = layer.clone();
        }
        set_f64(&vars, "outline.radius_offset", &o.radius_offset, &mut cfg.outline.radius_offset)?;
        set_f64(
            &vars,
            "outline.spoke_arc_width",
            &o.spoke_arc_width,
            &mut cfg.outline.spoke_arc_width,
        )?;
        set_f64(&vars, "outline.spoke_length", &o.spoke_length, &mut cfg.outline.spoke_length)?;
        set_f64(&vars, "outline.line_width", &o.line_width, &mut cfg.outline.line_width)?;

        let r = &raw.routing;
        if let Some(enabled) = r.enabled {
            cfg.routing.enabled = enabled;
        }
        if let Some(layer) = &r.layer {
            cfg.routing.layer = layer.clone();
        }
        set_f64(&vars, "routing.width", &r.width, &mut cfg.routing.width)?;
        set_f64(&vars, "routing.proximity", &r.proximity, &mut cfg.routing.proximity)?;
        if let Some(map) = &r.pad_map {
            cfg.routing.pad_map = map.clone();
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("board.circle_radius", self.board.circle_radius)?;
        positive("board.pixel_spacing", self.board.pixel_spacing)?;
        positive("board.pixel_count", self.board.pixel_count as f64)?;
        even("spokes.arrow_pixels", self.spokes.arrow_pixels)?;
        even("spokes.cross_pixels", self.spokes.cross_pixels)?;
        positive("outline.line_width", self.outline.line_width)?;
        positive("outline.spoke_arc_width", self.outline.spoke_arc_width)?;
        positive("outline.spoke_length", self.outline.spoke_length)?;
        non_negative("outline.radius_offset", self.outline.radius_offset)?;
        non_negative("spokes.arrow_inset", self.spokes.arrow_inset)?;
        positive("routing.width", self.routing.width)?;
        positive("routing.proximity", self.routing.proximity)?;

        let mut previous: Option<f64> = None;
        for (index, spoke) in self.spokes.spokes.iter().enumerate() {
            if !(0.0..TAU).contains(&spoke.angle) {
                return Err(ConfigError::SpokeAngleRange {
                    index,
                    angle: spoke.angle,
                });
            }
            if let Some(previous) = previous {
                if spoke.angle <= previous {
                    return Err(ConfigError::SpokeOrder {
                        index,
                        angle: spoke.angle,
                        previous,
                    });
                }
            }
            previous = Some(spoke.angle);
        }
        Ok(())
    }
}

fn set_f64(
    vars: &Variables,
    key: &str,
    raw: &Option<ScalarExpr>,
    target: &mut f64,
) -> Result<(), ConfigError> {
    if let Some(expr) = raw {
        *target = vars.eval(key, expr)?;
    }
    Ok(())
}

fn set_count(
    vars: &Variables,
    key: &str,
    raw: &Option<ScalarExpr>,
    target: &mut usize,
) -> Result<(), ConfigError> {
    if let Some(expr) = raw {
        *target = vars.eval_count(key, expr)?;
    }
    Ok(())
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            key: key.to_string(),
            value,
        })
    }
}

fn non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            key: key.to_string(),
            value,
        })
    }
}

fn even(key: &str, value: usize) -> Result<(), ConfigError> {
    if value % 2 == 0 {
        Ok(())
    } else {
        Err(ConfigError::OddCount {
            key: key.to_string(),
            value,
        })
    }
}
