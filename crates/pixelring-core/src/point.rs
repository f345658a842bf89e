use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Board position in millimetres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move this point in place by `delta`.
    pub fn translate(&mut self, delta: Point) -> &mut Self {
        self.x += delta.x;
        self.y += delta.y;
        self
    }

    #[must_use]
    pub fn translated(self, delta: Point) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }

    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        distance(self, other)
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Vector from `self` to `other`.
    #[must_use]
    pub fn to(self, other: Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    /// Angle (radians, CCW from +x) of the vector from `self` to `other`.
    #[must_use]
    pub fn angle_to(self, other: Point) -> f64 {
        let d = self.to(other);
        d.y.atan2(d.x)
    }

    /// Rotate this point by `radians` around `origin`.
    #[must_use]
    pub fn rotated_about(self, origin: Point, radians: f64) -> Point {
        let v = rotate_vec(origin.to(self), radians);
        origin.translated(v)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// An offset expressed as angle (radians) and radius.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PolarOffset {
    pub angle: f64,
    pub radius: f64,
}

impl PolarOffset {
    #[must_use]
    pub const fn new(angle: f64, radius: f64) -> Self {
        Self { angle, radius }
    }

    /// The offset as a cartesian vector.
    #[must_use]
    pub fn to_vector(self) -> Point {
        let (s, c) = self.angle.sin_cos();
        Point::new(self.radius * c, self.radius * s)
    }

    /// `center + radius·(cos angle, sin angle)`.
    #[must_use]
    pub fn to_point(self, center: Point) -> Point {
        center.translated(self.to_vector())
    }
}

#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

#[must_use]
pub fn circle_point(center: Point, theta: f64, radius: f64) -> Point {
    PolarOffset::new(theta, radius).to_point(center)
}

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

fn rotate_vec(v: Point, radians: f64) -> Point {
    let (s, c) = radians.sin_cos();
    Point::new(v.x * c - v.y * s, v.x * s + v.y * c)
}
