//! Serialized edit coordinator.
//!
//! Every user edit (add, delete, move, reload) is an [`EditIntent`] sent to
//! a single coordinator task that owns the [`Hike`] aggregate. Intents are
//! applied strictly in arrival order; each applied intent triggers one
//! recompute pipeline run. A recompute still in flight when a newer intent
//! arrives is cancelled by dropping its future mid-await, so provider calls
//! for superseded edits never land.
//!
//! Observers read an [`EngineSnapshot`] through a watch channel. Snapshots
//! are published only for *completed* recomputes of the *latest* applied
//! edit: a failed or superseded recompute leaves the previous snapshot - the
//! last-known-good route, summary, and POI lists - untouched.

use log::{debug, error, warn};
use tokio::sync::{mpsc, watch};

use crate::error::{Result, RoutePlanError};
use crate::pipeline::{recompute_route, RecomputeOptions};
use crate::providers::{PoiProvider, RoutingProvider};
use crate::{planner, Coordinate, Hike, HikePoint, Poi, RouteSummary};

/// A user edit, queued for the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum EditIntent {
    AddPoint {
        coordinate: Coordinate,
        at_end: bool,
    },
    DeletePoint {
        index: usize,
    },
    MovePoint {
        index: usize,
        coordinate: Coordinate,
    },
    /// Recompute without editing (initial load, provider retry)
    Reload,
}

/// State visible to the rest of the system.
///
/// Always reflects the most recently completed recompute for the most
/// recently requested edit at that time.
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    /// Sequence number of the edit this snapshot belongs to
    pub generation: u64,
    /// User-placed waypoints after the edit
    pub waypoints: Vec<HikePoint>,
    /// Dense routed path
    pub route: Vec<HikePoint>,
    pub summary: RouteSummary,
    pub refuges: Vec<Poi>,
    pub water_points: Vec<Poi>,
}

/// Handle to a spawned edit coordinator.
///
/// Cheap to clone; the coordinator task stops when every handle is dropped
/// and all queued intents are processed.
#[derive(Clone)]
pub struct HikeEngine {
    intents: mpsc::UnboundedSender<EditIntent>,
    snapshots: watch::Receiver<EngineSnapshot>,
}

impl HikeEngine {
    /// Spawn the coordinator task for one hike.
    ///
    /// No recompute runs until the first intent arrives; submit
    /// [`EditIntent::Reload`] to populate the initial snapshot.
    pub fn spawn<R, P>(routing: R, pois: P, hike: Hike, options: RecomputeOptions) -> Self
    where
        R: RoutingProvider + 'static,
        P: PoiProvider + 'static,
    {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(EngineSnapshot {
            waypoints: hike.waypoints(),
            ..EngineSnapshot::default()
        });

        tokio::spawn(run_loop(routing, pois, hike, options, intent_rx, snapshot_tx));

        Self {
            intents: intent_tx,
            snapshots: snapshot_rx,
        }
    }

    /// Queue an edit. Fails only if the coordinator has stopped.
    pub fn submit(&self, intent: EditIntent) -> Result<()> {
        self.intents
            .send(intent)
            .map_err(|_| RoutePlanError::internal("edit coordinator has stopped"))
    }

    /// Current snapshot (last-known-good state).
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait for the next published snapshot.
    pub async fn changed(&mut self) -> Result<EngineSnapshot> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| RoutePlanError::internal("edit coordinator has stopped"))?;
        Ok(self.snapshots.borrow().clone())
    }
}

async fn run_loop<R, P>(
    routing: R,
    pois: P,
    mut hike: Hike,
    options: RecomputeOptions,
    mut intents: mpsc::UnboundedReceiver<EditIntent>,
    snapshots: watch::Sender<EngineSnapshot>,
) where
    R: RoutingProvider,
    P: PoiProvider,
{
    let mut generation: u64 = 0;
    let mut pending: Option<EditIntent> = None;

    loop {
        let intent = match pending.take() {
            Some(intent) => intent,
            None => match intents.recv().await {
                Some(intent) => intent,
                None => break,
            },
        };

        generation += 1;
        if let Err(err) = apply_intent(&mut hike, &intent) {
            // Upstream logic error: fatal to this edit, never retried.
            error!("Edit {:?} rejected: {}", intent, err);
            continue;
        }

        let waypoints = hike.waypoints();

        tokio::select! {
            biased;

            next = intents.recv() => {
                match next {
                    Some(intent) => {
                        debug!("Recompute for edit {} superseded, discarding", generation);
                        pending = Some(intent);
                    }
                    None => break,
                }
            }

            result = recompute_route(&routing, &pois, &waypoints, &options) => {
                match result {
                    Ok(update) => {
                        snapshots.send_replace(EngineSnapshot {
                            generation,
                            waypoints: waypoints.clone(),
                            route: update.points,
                            summary: update.summary,
                            refuges: update.refuges,
                            water_points: update.water_points,
                        });
                    }
                    Err(err) => {
                        warn!(
                            "Recompute for edit {} failed, keeping previous route: {}",
                            generation, err
                        );
                    }
                }
            }
        }
    }

    debug!("Edit coordinator stopped after {} edits", generation);
}

fn apply_intent(hike: &mut Hike, intent: &EditIntent) -> Result<()> {
    match intent {
        EditIntent::AddPoint { coordinate, at_end } => {
            let position = planner::plan_insertion(&hike.waypoints(), *coordinate, *at_end)?;
            hike.insert_at(position, HikePoint::from(*coordinate))?;
        }
        EditIntent::DeletePoint { index } => {
            hike.remove_at(*index)?;
        }
        EditIntent::MovePoint { index, coordinate } => {
            hike.move_point(*index, *coordinate)?;
        }
        EditIntent::Reload => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hike() -> Hike {
        Hike::from_points(
            1,
            "test",
            vec![
                HikePoint::new(0.0, 0.0, 0.0),
                HikePoint::new(0.0, 1.0, 0.0),
                HikePoint::new(0.0, 2.0, 0.0),
            ],
        )
    }

    #[test]
    fn test_apply_add_point_uses_planner() {
        let mut hike = hike();
        apply_intent(
            &mut hike,
            &EditIntent::AddPoint {
                coordinate: Coordinate::new(0.1, 1.7),
                at_end: false,
            },
        )
        .unwrap();

        let waypoints = hike.waypoints();
        assert_eq!(waypoints.len(), 4);
        assert_eq!(waypoints[2].longitude, 1.7);
    }

    #[test]
    fn test_apply_delete_and_move() {
        let mut hike = hike();
        apply_intent(&mut hike, &EditIntent::DeletePoint { index: 1 }).unwrap();
        assert_eq!(hike.len(), 2);

        apply_intent(
            &mut hike,
            &EditIntent::MovePoint {
                index: 0,
                coordinate: Coordinate::new(0.5, 0.5),
            },
        )
        .unwrap();
        assert_eq!(hike.waypoints()[0].latitude, 0.5);

        assert!(apply_intent(&mut hike, &EditIntent::DeletePoint { index: 9 }).is_err());
    }

    #[test]
    fn test_reload_leaves_hike_untouched() {
        let mut hike = hike();
        let before = hike.waypoints();
        apply_intent(&mut hike, &EditIntent::Reload).unwrap();
        assert_eq!(hike.waypoints(), before);
    }
}
