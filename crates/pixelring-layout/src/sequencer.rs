//! Walks the circle one angular step at a time, inserting spoke clusters as their angle
//! is passed.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use serde::Serialize;
use tracing::{debug, info};

use pixelring_config::{BoardParams, Spoke, SpokeParams};
use pixelring_core::{circle_point, normalize_angle, Point};
use pixelring_pcb::BoardDocument;

use crate::error::LayoutError;
use crate::router::Router;
use crate::spoke::{radial_orientation, PlacementKind, Slot, SpokeGeometry};
use crate::supply::ComponentSupply;

/// Slack on the upper end of a step's angular interval.
pub const ANGLE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerminalState {
    /// The supply ran out; the normal end when there are fewer components than slots.
    Exhausted,
    /// All circle steps were placed.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub reference: String,
    pub kind: PlacementKind,
    pub position: Point,
    /// Kernel radians.
    pub orientation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementReport {
    pub placements: Vec<Placement>,
    /// Indices into the spoke list, in the order they were laid out.
    pub spoke_order: Vec<usize>,
    pub terminal: TerminalState,
    pub tracks_created: usize,
    pub stale_tracks_cleared: usize,
    pub outline_primitives: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Walking { step: usize },
    SpokeInsertion { step: usize, pending: VecDeque<usize> },
    Done(TerminalState),
}

pub struct Sequencer<'a> {
    board: &'a BoardParams,
    spokes: &'a [Spoke],
    geometry: SpokeGeometry,
    consumed: Vec<bool>,
    spoke_order: Vec<usize>,
    placements: Vec<Placement>,
}

impl<'a> Sequencer<'a> {
    #[must_use]
    pub fn new(board: &'a BoardParams, spokes: &'a SpokeParams) -> Self {
        Self {
            board,
            spokes: &spokes.spokes,
            geometry: SpokeGeometry::new(board, spokes),
            consumed: vec![false; spokes.spokes.len()],
            spoke_order: Vec::new(),
            placements: Vec::new(),
        }
    }

    /// Circle angle of step `i` (`theta(0)` is the base angle, as is `theta(N)`).
    #[must_use]
    pub fn theta(&self, i: usize) -> f64 {
        let n = self.board.pixel_count;
        normalize_angle(self.board.base_angle + TAU * (i % n) as f64 / n as f64)
    }

    /// Angular sweep of one step.
    #[must_use]
    pub fn step_sweep(&self) -> f64 {
        TAU / self.board.pixel_count as f64
    }

    /// Unconsumed spokes whose angle lies in `(theta(step - 1), theta(step)]`, walking
    /// order. Nothing is crossed before the first circle component; the interval just
    /// past the base angle is checked once more at step `N + 1`.
    fn crossed(&self, step: usize) -> VecDeque<usize> {
        if step <= 1 {
            return VecDeque::new();
        }
        let from = self.theta(step - 1);
        let sweep = self.step_sweep();
        let mut hits: Vec<(f64, usize)> = self
            .spokes
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.consumed[*i])
            .filter_map(|(i, spoke)| {
                let ahead = normalize_angle(spoke.angle - from);
                (ahead > 0.0 && ahead <= sweep + ANGLE_EPSILON).then_some((ahead, i))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, i)| i).collect()
    }

    pub fn run(
        mut self,
        doc: &mut dyn BoardDocument,
        supply: &mut ComponentSupply,
        router: &mut Router,
    ) -> Result<PlacementReport, LayoutError> {
        let created_before = router.tracks_created();
        let mut state = State::Walking { step: 1 };

        let terminal = loop {
            state = match state {
                State::Done(terminal) => break terminal,
                State::Walking { step } if step > self.board.pixel_count => {
                    let pending = self.crossed(step);
                    if pending.is_empty() {
                        State::Done(TerminalState::Complete)
                    } else {
                        State::SpokeInsertion { step, pending }
                    }
                }
                State::Walking { step } => {
                    let pending = self.crossed(step);
                    if pending.is_empty() {
                        let theta = self.theta(step);
                        let slot = Slot {
                            kind: PlacementKind::Circle,
                            position: circle_point(
                                self.board.center,
                                theta,
                                self.board.circle_radius,
                            ),
                            orientation: radial_orientation(theta),
                        };
                        if self.place(doc, supply, router, slot)? {
                            State::Walking { step: step + 1 }
                        } else {
                            State::Done(TerminalState::Exhausted)
                        }
                    } else {
                        State::SpokeInsertion { step, pending }
                    }
                }
                State::SpokeInsertion { step, mut pending } => match pending.pop_front() {
                    None => State::Walking { step },
                    Some(index) => {
                        self.consumed[index] = true;
                        self.spoke_order.push(index);
                        let spoke = self.spokes[index];
                        debug!(index, angle = spoke.angle, "laying out spoke");
                        let mut exhausted = false;
                        for slot in self.geometry.slots(&spoke) {
                            if !self.place(doc, supply, router, slot)? {
                                exhausted = true;
                                break;
                            }
                        }
                        if exhausted {
                            State::Done(TerminalState::Exhausted)
                        } else {
                            State::SpokeInsertion { step, pending }
                        }
                    }
                },
            };
        };

        info!(
            placed = self.placements.len(),
            spokes = self.spoke_order.len(),
            ?terminal,
            "placement finished"
        );
        Ok(PlacementReport {
            placements: self.placements,
            spoke_order: self.spoke_order,
            terminal,
            tracks_created: router.tracks_created() - created_before,
            stale_tracks_cleared: 0,
            outline_primitives: 0,
        })
    }

    /// Put the next supply component on `slot` and route it. `false` when the supply is
    /// empty.
    fn place(
        &mut self,
        doc: &mut dyn BoardDocument,
        supply: &mut ComponentSupply,
        router: &mut Router,
        slot: Slot,
    ) -> Result<bool, LayoutError> {
        let Some(item) = supply.next() else {
            return Ok(false);
        };
        doc.set_placement(item.id, slot.position, slot.orientation)?;
        debug!(
            reference = %item.reference,
            kind = ?slot.kind,
            at = %slot.position,
            orientation = slot.orientation,
            "placed"
        );
        router.connect(doc, item.id)?;
        self.placements.push(Placement {
            reference: item.reference,
            kind: slot.kind,
            position: slot.position,
            orientation: slot.orientation,
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    use pixelring_config::LayoutConfig;

    fn sequencer_for(cfg: &LayoutConfig) -> Sequencer<'_> {
        Sequencer::new(&cfg.board, &cfg.spokes)
    }

    #[test]
    fn theta_wraps_back_to_base() {
        let cfg = LayoutConfig::default();
        let seq = sequencer_for(&cfg);
        assert_eq!(seq.theta(34), FRAC_PI_2);
        assert_eq!(seq.theta(0), FRAC_PI_2);
        assert_abs_diff_eq!(seq.theta(17), 3.0 * FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn every_spoke_is_crossed_exactly_once_per_turn() {
        let mut cfg = LayoutConfig::default();
        cfg.spokes.spokes = vec![
            Spoke::new(0.0, false, false),
            Spoke::new(0.05, false, false),
            Spoke::new(FRAC_PI_2, false, false),
            Spoke::new(PI, false, false),
            Spoke::new(TAU - 0.01, false, false),
        ];
        let seq = sequencer_for(&cfg);
        let mut seen = vec![0; cfg.spokes.spokes.len()];
        for step in 1..=cfg.board.pixel_count + 1 {
            for i in seq.crossed(step) {
                seen[i] += 1;
            }
        }
        assert_eq!(seen, vec![1; 5]);
        // the spoke at the base angle closes the final step
        assert!(seq.crossed(34).contains(&2));
    }

    #[test]
    fn spokes_in_one_step_come_out_in_walking_order() {
        let mut cfg = LayoutConfig::default();
        cfg.board.pixel_count = 4;
        cfg.board.base_angle = 0.0;
        cfg.spokes.spokes = vec![
            Spoke::new(0.2, false, false),
            Spoke::new(0.1, false, false),
            Spoke::new(5.0, false, false),
        ];
        let seq = sequencer_for(&cfg);
        assert!(seq.crossed(1).is_empty());
        assert_eq!(seq.crossed(4), VecDeque::from([2]));
        // just past the base angle: laid out after the last circle component
        assert_eq!(seq.crossed(5), VecDeque::from([1, 0]));
    }
}
