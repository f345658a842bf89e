use std::f64::consts::TAU;

use pixelring_config::{LayoutConfig, Spoke};
use pixelring_core::{normalize_angle, Point};
use pixelring_layout::{run_layout, PlacementKind, TerminalState};
use pixelring_pcb::MemoryBoard;
use proptest::prelude::*;

fn bare_board(count: usize) -> MemoryBoard {
    let mut board = MemoryBoard::new();
    for i in 1..=count {
        board.add_component(&format!("D{i}"), Point::default(), 0.0, vec![]);
    }
    board
}

fn spoke_angles() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::btree_set(0u32..3600, 0..6).prop_map(|set| {
        set.into_iter()
            .map(|tenth_degree| f64::from(tenth_degree) / 3600.0 * TAU)
            .collect()
    })
}

proptest! {
    #[test]
    fn spokes_trigger_once_in_walking_order(
        angles in spoke_angles(),
        pixel_count in 3usize..40,
        base_angle in 0.0f64..TAU,
    ) {
        let mut cfg = LayoutConfig::default();
        cfg.outline.enabled = false;
        cfg.board.pixel_count = pixel_count;
        cfg.board.base_angle = base_angle;
        cfg.spokes.length = 2;
        cfg.spokes.spokes = angles.iter().map(|a| Spoke::new(*a, false, false)).collect();

        let mut board = bare_board(pixel_count + 2 * angles.len() + 5);
        let report = run_layout(&mut board, &cfg).unwrap();
        prop_assert_eq!(report.terminal, TerminalState::Complete);

        let mut seen = report.spoke_order.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..angles.len()).collect::<Vec<_>>());

        // spokes up to one step past the base angle come after the last circle step
        let sweep = TAU / pixel_count as f64;
        let walked = |i: usize| {
            let ahead = normalize_angle(angles[i] - base_angle);
            if ahead == 0.0 {
                TAU
            } else if ahead <= sweep {
                TAU + ahead
            } else {
                ahead
            }
        };
        for pair in report.spoke_order.windows(2) {
            prop_assert!(walked(pair[0]) < walked(pair[1]));
        }

        let circles = report
            .placements
            .iter()
            .filter(|p| p.kind == PlacementKind::Circle)
            .count();
        prop_assert_eq!(circles, pixel_count);
    }
}
