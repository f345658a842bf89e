//! Conversion between the geometry kernel's radians and the board document's degrees.
//!
//! Geometry angles are radians measured from +x towards +y. Board documents use a y-down
//! canvas where the same direction reads as clockwise, so the only conversion needed at
//! the boundary is a scale; the sign factor is kept as a named constant so that a
//! document with the opposite handedness only has to change it here.

use std::f64::consts::PI;

/// Sign applied when converting kernel radians to document degrees.
pub const ORIENTATION_SIGN: f64 = 1.0;

/// Degrees per radian.
pub const DEGREES_PER_RADIAN: f64 = 180.0 / PI;

/// Kernel radians to document degrees, normalised into `[0, 360)`.
#[must_use]
pub fn radians_to_document_degrees(radians: f64) -> f64 {
    let deg = ORIENTATION_SIGN * radians * DEGREES_PER_RADIAN;
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Document degrees back to kernel radians (not normalised).
#[must_use]
pub fn document_degrees_to_radians(degrees: f64) -> f64 {
    ORIENTATION_SIGN * degrees / DEGREES_PER_RADIAN
}

/// Swept angle (radians) to document degrees, keeping sign and magnitude.
#[must_use]
pub fn sweep_to_document_degrees(radians: f64) -> f64 {
    ORIENTATION_SIGN * radians * DEGREES_PER_RADIAN
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_is_ninety_degrees() {
        assert_abs_diff_eq!(radians_to_document_degrees(FRAC_PI_2), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radians_to_document_degrees(-FRAC_PI_2), 270.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radians_to_document_degrees(2.0 * PI + FRAC_PI_2), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn sweep_keeps_sign() {
        assert_abs_diff_eq!(sweep_to_document_degrees(-PI), -180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sweep_to_document_degrees(PI / 3.0), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn degrees_round_trip() {
        let r = 1.234;
        let back = document_degrees_to_radians(radians_to_document_degrees(r));
        assert_abs_diff_eq!(back, r, epsilon = 1e-9);
    }
}
