use pixelring_core::{circle_point, distance, normalize_angle, Point, PolarOffset};
use proptest::prelude::*;
use std::f64::consts::TAU;

proptest! {
    #[test]
    fn circle_point_lies_on_the_circle(
        cx in -200.0f64..200.0,
        cy in -200.0f64..200.0,
        theta in -10.0f64..10.0,
        radius in 0.0f64..100.0,
    ) {
        let c = Point::new(cx, cy);
        let p = circle_point(c, theta, radius);
        prop_assert!((distance(c, p) - radius).abs() < 1e-9);
    }

    #[test]
    fn polar_offset_angle_round_trips(theta in 0.0f64..TAU, radius in 0.1f64..100.0) {
        let origin = Point::new(0.0, 0.0);
        let p = PolarOffset::new(theta, radius).to_point(origin);
        let back = normalize_angle(origin.angle_to(p));
        let diff = (back - theta).abs();
        prop_assert!(diff < 1e-9 || (TAU - diff) < 1e-9);
    }

    #[test]
    fn normalized_angle_stays_in_one_turn(theta in -100.0f64..100.0) {
        let n = normalize_angle(theta);
        prop_assert!((0.0..TAU).contains(&n));
    }
}
