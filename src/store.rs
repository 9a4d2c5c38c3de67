//! In-memory hike store.
//!
//! Reference implementation of the [`HikeStore`] seam, used by tests and
//! demos. Real persistence (the CRUD backend of the original application)
//! is an external collaborator and stays out of this crate.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Result, RoutePlanError};
use crate::providers::HikeStore;
use crate::Hike;

/// Hike storage backed by a map in memory.
#[derive(Default)]
pub struct MemoryHikeStore {
    hikes: Mutex<HashMap<u64, Hike>>,
}

impl MemoryHikeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HikeStore for MemoryHikeStore {
    async fn load(&self, id: u64) -> Result<Hike> {
        let hikes = self.hikes.lock().await;
        hikes
            .get(&id)
            .cloned()
            .ok_or_else(|| RoutePlanError::internal(format!("hike {} not found", id)))
    }

    /// Saving finalizes point indices: the stored copy is renumbered
    /// 0..n-1 in route order and returned.
    async fn save(&self, id: u64, hike: &Hike) -> Result<Hike> {
        let mut saved = hike.clone();
        saved.renumber();

        let mut hikes = self.hikes.lock().await;
        hikes.insert(id, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HikePoint;

    #[tokio::test]
    async fn test_save_renumbers_and_load_round_trips() {
        let store = MemoryHikeStore::new();
        let hike = Hike::from_points(
            7,
            "Aravis crossing",
            vec![
                HikePoint::new(45.0, 6.0, 0.0),
                HikePoint::new(45.1, 6.1, 0.0),
            ],
        );

        let saved = store.save(7, &hike).await.unwrap();
        assert_eq!(saved.waypoints()[1].index, 1);

        let loaded = store.load(7).await.unwrap();
        assert_eq!(loaded.name, "Aravis crossing");
        assert_eq!(loaded.len(), 2);

        // The caller's copy is untouched.
        assert_eq!(hike.waypoints()[1].index, -1);
    }

    #[tokio::test]
    async fn test_load_missing_hike_fails() {
        let store = MemoryHikeStore::new();
        assert!(store.load(99).await.is_err());
    }
}
