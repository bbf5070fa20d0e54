//! Indexed spatial lookup from a coordinate to its containing area.
//!
//! [`AreaIndex`] keeps an R-tree over the axis-aligned bounding boxes of
//! every area polygon. Resolution first narrows candidates through the tree,
//! then runs an exact point-in-polygon test on each candidate, so lookup
//! cost does not degrade into a full polygon scan as the area set grows.

use geo::{BoundingRect, Contains, Point, Polygon};
use rstar::{AABB, RTree, RTreeObject};
use tokio::sync::RwLock;

use crate::domain::AreaId;
use crate::error::GatewayError;

/// One indexed polygon: id, exact boundary, and precomputed envelope.
///
/// Boundaries are immutable after area creation, so the copy held here can
/// never go stale.
#[derive(Debug, Clone)]
struct IndexedArea {
    id: AreaId,
    boundary: Polygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedArea {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Geometry resolver backed by an R-tree of polygon bounding boxes.
///
/// # Semantics
///
/// - A point exactly on a polygon edge is treated as **outside** (the
///   containment test is boundary-exclusive).
/// - When overlapping polygons both contain the point, the lowest
///   [`AreaId`] wins; the pick is deterministic, never insertion-order
///   dependent.
/// - Resolution is read-only and safe to call concurrently.
#[derive(Debug, Default)]
pub struct AreaIndex {
    tree: RwLock<RTree<IndexedArea>>,
}

impl AreaIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(RTree::new()),
        }
    }

    /// Adds an area polygon to the index.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] when the polygon is degenerate
    /// and has no bounding rectangle.
    pub async fn insert(&self, id: AreaId, boundary: Polygon<f64>) -> Result<(), GatewayError> {
        let rect = boundary.bounding_rect().ok_or_else(|| {
            GatewayError::InvalidInput(format!("area {id} boundary has no extent"))
        })?;
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut tree = self.tree.write().await;
        tree.insert(IndexedArea {
            id,
            boundary,
            envelope,
        });
        Ok(())
    }

    /// Resolves a point to the id of its containing area, or `None` when no
    /// polygon contains it. An empty result is not an error condition.
    pub async fn resolve(&self, point: &Point<f64>) -> Option<AreaId> {
        let probe = AABB::from_point([point.x(), point.y()]);
        let tree = self.tree.read().await;
        tree.locate_in_envelope_intersecting(&probe)
            .filter(|entry| entry.boundary.contains(point))
            .map(|entry| entry.id)
            .min()
    }

    /// Returns the number of indexed polygons.
    pub async fn len(&self) -> usize {
        self.tree.read().await.size()
    }

    /// Returns `true` when no polygon is indexed.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(offset: f64, side: f64) -> Polygon<f64> {
        polygon![
            (x: offset, y: offset),
            (x: offset, y: offset + side),
            (x: offset + side, y: offset + side),
            (x: offset + side, y: offset),
        ]
    }

    #[tokio::test]
    async fn resolves_interior_point() {
        let index = AreaIndex::new();
        let inserted = index.insert(AreaId::new(1), square(0.0, 10.0)).await;
        assert!(inserted.is_ok());

        let hit = index.resolve(&Point::new(5.0, 5.0)).await;
        assert_eq!(hit, Some(AreaId::new(1)));
    }

    #[tokio::test]
    async fn point_outside_all_polygons_is_none() {
        let index = AreaIndex::new();
        let _ = index.insert(AreaId::new(1), square(0.0, 10.0)).await;

        assert_eq!(index.resolve(&Point::new(50.0, 50.0)).await, None);
    }

    #[tokio::test]
    async fn boundary_point_is_outside() {
        let index = AreaIndex::new();
        let _ = index.insert(AreaId::new(1), square(0.0, 10.0)).await;

        assert_eq!(index.resolve(&Point::new(0.0, 5.0)).await, None);
    }

    #[tokio::test]
    async fn overlapping_polygons_pick_lowest_id() {
        let index = AreaIndex::new();
        // Insert in descending id order to prove the pick is not
        // insertion-order dependent.
        let _ = index.insert(AreaId::new(9), square(0.0, 10.0)).await;
        let _ = index.insert(AreaId::new(2), square(4.0, 10.0)).await;

        let hit = index.resolve(&Point::new(5.0, 5.0)).await;
        assert_eq!(hit, Some(AreaId::new(2)));
    }

    #[tokio::test]
    async fn envelope_hit_but_polygon_miss_is_none() {
        let index = AreaIndex::new();
        // Triangle whose bounding box covers (9, 1) but whose interior
        // does not.
        let triangle = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 10.0),
            (x: 10.0, y: 10.0),
        ];
        let _ = index.insert(AreaId::new(1), triangle).await;

        assert_eq!(index.resolve(&Point::new(9.0, 1.0)).await, None);
    }

    #[tokio::test]
    async fn len_tracks_inserts() {
        let index = AreaIndex::new();
        assert!(index.is_empty().await);
        let _ = index.insert(AreaId::new(1), square(0.0, 1.0)).await;
        let _ = index.insert(AreaId::new(2), square(2.0, 1.0)).await;
        assert_eq!(index.len().await, 2);
    }
}
