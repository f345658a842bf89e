//! Geometry kernel and board value types.

pub mod angle;
pub mod board;
pub mod point;

pub use angle::{
    document_degrees_to_radians, radians_to_document_degrees, sweep_to_document_degrees,
    DEGREES_PER_RADIAN, ORIENTATION_SIGN,
};
pub use board::{
    Component, ComponentId, DrawingId, DrawingPrimitive, LayerId, Net, NetId, Pad, Track,
    TrackId,
};
pub use point::{circle_point, distance, normalize_angle, Point, PolarOffset};
