//! Adjacency routing: one straight track per mapped pad pair between consecutive
//! placements.

use indexmap::IndexMap;
use tracing::{debug, trace};

use pixelring_config::RoutingConfig;
use pixelring_core::{ComponentId, LayerId, Track};
use pixelring_pcb::BoardDocument;

use crate::error::LayoutError;

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingParams {
    pub enabled: bool,
    pub layer: LayerId,
    pub width: f64,
    /// Tracks with an endpoint closer than this (mm) to a pad belong to that pad.
    pub proximity: f64,
    /// Previous component's pad name to the current component's pad name.
    pub pad_map: IndexMap<String, String>,
}

impl RoutingParams {
    pub fn resolve(cfg: &RoutingConfig, doc: &dyn BoardDocument) -> Result<Self, LayoutError> {
        Ok(Self {
            enabled: cfg.enabled,
            layer: doc.resolve_layer(&cfg.layer)?,
            width: cfg.width,
            proximity: cfg.proximity,
            pad_map: cfg.pad_map.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    params: RoutingParams,
    previous: Option<ComponentId>,
    created: usize,
    cleared: usize,
}

impl Router {
    #[must_use]
    pub fn new(params: RoutingParams) -> Self {
        Self {
            params,
            previous: None,
            created: 0,
            cleared: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &RoutingParams {
        &self.params
    }

    /// The component placed most recently.
    #[must_use]
    pub fn previous(&self) -> Option<ComponentId> {
        self.previous
    }

    #[must_use]
    pub fn tracks_created(&self) -> usize {
        self.created
    }

    #[must_use]
    pub fn tracks_cleared(&self) -> usize {
        self.cleared
    }

    /// Delete every track with an endpoint on one of `component`'s pads.
    pub fn clear_stale(
        &mut self,
        doc: &mut dyn BoardDocument,
        component: ComponentId,
    ) -> Result<usize, LayoutError> {
        let pads = doc.list_pads(component)?;
        let mut removed = 0;
        for (id, track) in doc.list_tracks(None) {
            if let Some(pad) = pads
                .iter()
                .find(|pad| track.touches(pad.position, self.params.proximity))
            {
                trace!(?id, pad = %pad.name, at = %pad.position, "deleting stale track");
                doc.delete_track(id)?;
                removed += 1;
            }
        }
        self.cleared += removed;
        Ok(removed)
    }

    /// Clean up around `current`, wire it to the previous component and make it the
    /// new previous component. Returns the number of tracks added.
    pub fn connect(
        &mut self,
        doc: &mut dyn BoardDocument,
        current: ComponentId,
    ) -> Result<usize, LayoutError> {
        self.clear_stale(doc, current)?;

        let mut added = 0;
        if let (true, Some(previous)) = (self.params.enabled, self.previous) {
            let from = doc.component(previous)?;
            let to = doc.component(current)?;

            for prev_pad in &from.pads {
                let Some(target_name) = self.params.pad_map.get(&prev_pad.name) else {
                    continue;
                };
                if let Some(net) = &prev_pad.net {
                    if !doc.list_tracks(Some(net.id)).is_empty() {
                        debug!(
                            component = %from.reference,
                            pad = %prev_pad.name,
                            net = %net.name,
                            "pad already routed, skipping"
                        );
                        continue;
                    }
                }
                let target = to.pad(target_name).ok_or_else(|| LayoutError::MissingPad {
                    reference: to.reference.clone(),
                    pad: target_name.clone(),
                })?;

                doc.add_track(Track {
                    start: prev_pad.position,
                    end: target.position,
                    layer: self.params.layer,
                    width: self.params.width,
                    net: target.net.as_ref().map(|n| n.id),
                });
                debug!(
                    "track {}:{} -> {}:{}",
                    from.reference, prev_pad.name, to.reference, target.name
                );
                added += 1;
            }
        }

        self.created += added;
        self.previous = Some(current);
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelring_core::{NetId, Point};
    use pixelring_pcb::{MemoryBoard, PadDef};

    fn params() -> RoutingParams {
        RoutingParams {
            enabled: true,
            layer: LayerId(0),
            width: 0.25,
            proximity: 1e-4,
            pad_map: IndexMap::from([
                ("2".to_string(), "5".to_string()),
                ("3".to_string(), "4".to_string()),
            ]),
        }
    }

    /// LED footprint with pads 1..=6 at unit spacing, nets per pad name.
    fn led(
        board: &mut MemoryBoard,
        reference: &str,
        x: f64,
        nets: &[(&str, Option<NetId>)],
    ) -> ComponentId {
        let pads = (1..=6)
            .map(|n| {
                let name = n.to_string();
                let net = nets
                    .iter()
                    .find(|(p, _)| *p == name)
                    .and_then(|(_, net)| *net);
                PadDef::new(name, Point::new(f64::from(n), 0.0), net)
            })
            .collect();
        board.add_component(reference, Point::new(x, 0.0), 0.0, pads)
    }

    fn two_leds() -> (MemoryBoard, ComponentId, ComponentId) {
        let mut board = MemoryBoard::new();
        let sck = board.add_net("SCK").id;
        let sd = board.add_net("SD").id;
        let a = led(&mut board, "D1", 0.0, &[("2", Some(sck)), ("3", Some(sd))]);
        let b = led(&mut board, "D2", 10.0, &[("5", Some(sck)), ("4", Some(sd))]);
        (board, a, b)
    }

    #[test]
    fn first_component_only_becomes_previous() {
        let (mut board, a, _) = two_leds();
        let mut router = Router::new(params());
        assert_eq!(router.connect(&mut board, a).unwrap(), 0);
        assert_eq!(router.previous(), Some(a));
        assert!(board.list_tracks(None).is_empty());
    }

    #[test]
    fn connects_mapped_pads_only() {
        let (mut board, a, b) = two_leds();
        let mut router = Router::new(params());
        router.connect(&mut board, a).unwrap();
        assert_eq!(router.connect(&mut board, b).unwrap(), 2);

        let mut ends: Vec<(Point, Point)> =
            board.tracks().map(|t| (t.start, t.end)).collect();
        ends.sort_by(|x, y| x.0.x.total_cmp(&y.0.x));
        // D1 pad 2 (x=2) -> D2 pad 5 (x=15); D1 pad 3 (x=3) -> D2 pad 4 (x=14)
        assert_eq!(ends[0], (Point::new(2.0, 0.0), Point::new(15.0, 0.0)));
        assert_eq!(ends[1], (Point::new(3.0, 0.0), Point::new(14.0, 0.0)));
        assert!(board.tracks().all(|t| t.layer == LayerId(0) && t.width == 0.25));
    }

    #[test]
    fn reconnecting_the_same_pair_keeps_one_track_per_pad_pair() {
        let (mut board, a, b) = two_leds();
        let mut router = Router::new(params());
        router.connect(&mut board, a).unwrap();
        router.connect(&mut board, b).unwrap();

        router.previous = Some(a);
        router.connect(&mut board, b).unwrap();
        assert_eq!(board.list_tracks(None).len(), 2);
        assert_eq!(board.list_tracks(Some(board.get_net("SCK").unwrap().id)).len(), 1);
    }

    #[test]
    fn routed_net_is_skipped_but_other_pad_is_processed() {
        let mut board = MemoryBoard::new();
        let a_net = board.add_net("A").id;
        let prev = led(&mut board, "D1", 0.0, &[("2", Some(a_net))]);
        let cur = led(&mut board, "D2", 10.0, &[]);
        board.add_track(Track {
            start: Point::new(50.0, 50.0),
            end: Point::new(60.0, 50.0),
            layer: LayerId(0),
            width: 0.25,
            net: Some(a_net),
        });

        let mut router = Router::new(params());
        router.connect(&mut board, prev).unwrap();
        assert_eq!(router.connect(&mut board, cur).unwrap(), 1);
        let new: Vec<&Track> = board.tracks().filter(|t| t.net != Some(a_net)).collect();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].start, Point::new(3.0, 0.0));
        assert_eq!(new[0].end, Point::new(14.0, 0.0));
        // a pad without a net is never considered routed
        assert_eq!(new[0].net, None);
    }

    #[test]
    fn missing_target_pad_is_fatal() {
        let mut board = MemoryBoard::new();
        let prev = led(&mut board, "D1", 0.0, &[]);
        let cur = board.add_component(
            "D2",
            Point::new(10.0, 0.0),
            0.0,
            vec![PadDef::new("5", Point::default(), None)],
        );
        let mut router = Router::new(params());
        router.connect(&mut board, prev).unwrap();
        let err = router.connect(&mut board, cur).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::MissingPad { ref reference, ref pad } if reference == "D2" && pad == "4"
        ));
    }

    #[test]
    fn disabled_router_still_clears_but_adds_nothing() {
        let (mut board, a, b) = two_leds();
        board.add_track(Track {
            start: Point::new(15.0, 0.0),
            end: Point::new(30.0, 0.0),
            layer: LayerId(0),
            width: 0.25,
            net: None,
        });
        let mut router = Router::new(RoutingParams {
            enabled: false,
            ..params()
        });
        router.connect(&mut board, a).unwrap();
        assert_eq!(router.connect(&mut board, b).unwrap(), 0);
        assert!(board.list_tracks(None).is_empty());
        assert_eq!(router.tracks_cleared(), 1);
    }
}
