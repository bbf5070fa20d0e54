//! Concurrent area storage and the capacity ledger.
//!
//! [`AreaRegistry`] stores all parking areas in a `BTreeMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. Capacity
//! operations on distinct areas run in parallel; operations on the same
//! area serialize on the entry lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use geo::{Point, Polygon};
use tokio::sync::RwLock;

use super::spatial::AreaIndex;
use crate::domain::{AreaId, AreaSnapshot, EventKind, ParkingArea};
use crate::error::GatewayError;

/// Central store for all parking areas, including the capacity ledger and
/// the spatial resolver index.
///
/// # Concurrency
///
/// - The outer map lock is held in **read** mode for the whole critical
///   section of every capacity mutation, while the entry lock is held in
///   write mode. Two mutations on the same area serialize on the entry
///   lock; mutations on different areas do not block each other.
/// - [`AreaRegistry::snapshot_all`] takes the outer lock in **write** mode,
///   which excludes every in-flight mutation, so multi-area aggregates see
///   one consistent snapshot.
#[derive(Debug)]
pub struct AreaRegistry {
    areas: RwLock<BTreeMap<AreaId, Arc<RwLock<ParkingArea>>>>,
    names: RwLock<HashMap<String, AreaId>>,
    index: AreaIndex,
    next_id: AtomicI64,
}

impl AreaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            areas: RwLock::new(BTreeMap::new()),
            names: RwLock::new(HashMap::new()),
            index: AreaIndex::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates a new area with all slots free and indexes its boundary.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateAreaName`] when the name is taken
    /// and [`GatewayError::InvalidInput`] when the boundary polygon is
    /// degenerate.
    pub async fn create(
        &self,
        name: &str,
        boundary: Polygon<f64>,
        max_capacity: u32,
    ) -> Result<AreaSnapshot, GatewayError> {
        if name.trim().is_empty() {
            return Err(GatewayError::InvalidInput("area name is empty".to_string()));
        }

        let mut names = self.names.write().await;
        if names.contains_key(name) {
            return Err(GatewayError::DuplicateAreaName(name.to_string()));
        }

        let id = AreaId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.index.insert(id, boundary.clone()).await?;

        let area = ParkingArea::new(id, name.to_string(), boundary, max_capacity);
        let snapshot = AreaSnapshot::from(&area);

        let mut map = self.areas.write().await;
        map.insert(id, Arc::new(RwLock::new(area)));
        names.insert(name.to_string(), id);

        Ok(snapshot)
    }

    /// Applies one bounded capacity delta: park consumes a slot, leave
    /// frees one. The exhaustive match over [`EventKind`] is the single
    /// place where kind drives the delta sign.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AreaNotFound`] for an unknown id,
    /// [`GatewayError::AreaFull`] for a park on a full area, and
    /// [`GatewayError::AreaEmpty`] for a leave on an all-free area. On
    /// rejection the counter is unchanged.
    pub async fn apply_delta(
        &self,
        id: AreaId,
        kind: EventKind,
    ) -> Result<AreaSnapshot, GatewayError> {
        // Outer read guard held across the mutation; see the concurrency
        // notes on the type.
        let map = self.areas.read().await;
        let entry = map.get(&id).cloned().ok_or(GatewayError::AreaNotFound(id))?;
        let mut area = entry.write().await;
        match kind {
            EventKind::Park => area.try_park()?,
            EventKind::Leave => area.try_leave()?,
        }
        Ok(AreaSnapshot::from(&*area))
    }

    /// Resolves a WGS84 point to the id of its containing area.
    ///
    /// `None` means no polygon contains the point; this is empty-result
    /// semantics, not an error.
    pub async fn resolve(&self, point: &Point<f64>) -> Option<AreaId> {
        self.index.resolve(point).await
    }

    /// Returns a point-in-time copy of one area.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AreaNotFound`] for an unknown id.
    pub async fn snapshot(&self, id: AreaId) -> Result<AreaSnapshot, GatewayError> {
        let map = self.areas.read().await;
        let entry = map.get(&id).cloned().ok_or(GatewayError::AreaNotFound(id))?;
        let area = entry.read().await;
        Ok(AreaSnapshot::from(&*area))
    }

    /// Returns a point-in-time copy of the area with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AreaNameNotFound`] for an unknown name.
    pub async fn snapshot_by_name(&self, name: &str) -> Result<AreaSnapshot, GatewayError> {
        let id = {
            let names = self.names.read().await;
            names
                .get(name)
                .copied()
                .ok_or_else(|| GatewayError::AreaNameNotFound(name.to_string()))?
        };
        self.snapshot(id).await
    }

    /// Returns `true` when an area with the given id exists.
    pub async fn contains(&self, id: AreaId) -> bool {
        self.areas.read().await.contains_key(&id)
    }

    /// Returns consistent snapshots of every area, in ascending id order.
    ///
    /// Takes the outer lock in write mode so no capacity mutation is
    /// observed mid-aggregate.
    pub async fn snapshot_all(&self) -> Vec<AreaSnapshot> {
        let map = self.areas.write().await;
        let mut snapshots = Vec::with_capacity(map.len());
        for entry in map.values() {
            let area = entry.read().await;
            snapshots.push(AreaSnapshot::from(&*area));
        }
        snapshots
    }

    /// Returns the number of areas in the registry.
    pub async fn len(&self) -> usize {
        self.areas.read().await.len()
    }

    /// Returns `true` when the registry contains no areas.
    pub async fn is_empty(&self) -> bool {
        self.areas.read().await.is_empty()
    }
}

impl Default for AreaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 10.0),
            (x: 10.0, y: 10.0),
            (x: 10.0, y: 0.0),
        ]
    }

    #[tokio::test]
    async fn create_assigns_ascending_ids() {
        let registry = AreaRegistry::new();
        let Ok(a) = registry.create("a", square(), 5).await else {
            panic!("create failed");
        };
        let Ok(b) = registry.create("b", square(), 5).await else {
            panic!("create failed");
        };
        assert!(a.id < b.id);
        assert_eq!(a.residual_capacity, a.max_capacity);
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let registry = AreaRegistry::new();
        let _ = registry.create("pza", square(), 5).await;
        let dup = registry.create("pza", square(), 5).await;
        assert!(matches!(dup, Err(GatewayError::DuplicateAreaName(_))));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn apply_delta_park_and_leave() {
        let registry = AreaRegistry::new();
        let Ok(area) = registry.create("pza", square(), 2).await else {
            panic!("create failed");
        };

        let Ok(after_park) = registry.apply_delta(area.id, EventKind::Park).await else {
            panic!("park failed");
        };
        assert_eq!(after_park.residual_capacity, 1);

        let Ok(after_leave) = registry.apply_delta(area.id, EventKind::Leave).await else {
            panic!("leave failed");
        };
        assert_eq!(after_leave.residual_capacity, 2);
    }

    #[tokio::test]
    async fn park_on_unknown_area_fails() {
        let registry = AreaRegistry::new();
        let result = registry.apply_delta(AreaId::new(99), EventKind::Park).await;
        assert!(matches!(result, Err(GatewayError::AreaNotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_parks_never_oversell() {
        let registry = Arc::new(AreaRegistry::new());
        let Ok(area) = registry.create("pza", square(), 3).await else {
            panic!("create failed");
        };

        let mut handles = Vec::new();
        for _ in 0..10 {
            let registry = Arc::clone(&registry);
            let id = area.id;
            handles.push(tokio::spawn(async move {
                registry.apply_delta(id, EventKind::Park).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.ok() == Some(true) {
                successes += 1;
            }
        }

        assert_eq!(successes, 3);
        let Ok(snapshot) = registry.snapshot(area.id).await else {
            panic!("snapshot failed");
        };
        assert_eq!(snapshot.residual_capacity, 0);
    }

    #[tokio::test]
    async fn resolve_finds_containing_area() {
        let registry = AreaRegistry::new();
        let Ok(area) = registry.create("pza", square(), 5).await else {
            panic!("create failed");
        };

        let hit = registry.resolve(&Point::new(5.0, 5.0)).await;
        assert_eq!(hit, Some(area.id));
        assert_eq!(registry.resolve(&Point::new(50.0, 50.0)).await, None);
    }

    #[tokio::test]
    async fn snapshot_by_name() {
        let registry = AreaRegistry::new();
        let _ = registry.create("pza", square(), 5).await;

        let found = registry.snapshot_by_name("pza").await;
        assert!(found.is_ok());

        let missing = registry.snapshot_by_name("duomo").await;
        assert!(matches!(missing, Err(GatewayError::AreaNameNotFound(_))));
    }

    #[tokio::test]
    async fn snapshot_all_is_id_ordered() {
        let registry = AreaRegistry::new();
        let _ = registry.create("a", square(), 1).await;
        let _ = registry.create("b", square(), 2).await;
        let _ = registry.create("c", square(), 3).await;

        let all = registry.snapshot_all().await;
        let ids: Vec<i64> = all.iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
