use crate::error::{GeometryError, Result};
use crate::math::angle_2d::{ccw_offset, vector_angle};
use crate::math::Vector2;
use crate::topology::{HalfEdge, InsertSlot, PointId, Side, TopologyStore};

/// Finds the angular slot at an attached point into which a new segment
/// leaving in direction `vector` would be spliced.
///
/// The incident half-edges are visited in their circular order; the slot
/// is the first consecutive pair whose angular bracket contains `vector`.
/// On exact angle ties the earliest edge in that order wins.
pub struct InsertVector {
    point: PointId,
    vector: Vector2,
}

impl InsertVector {
    /// Creates a new `InsertVector` query.
    #[must_use]
    pub fn new(point: PointId, vector: Vector2) -> Self {
        Self { point, vector }
    }

    /// Executes the query. Returns `None` for a free point.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroVector` for a zero direction, or an error
    /// if the point or its incident segments are missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Option<InsertSlot>> {
        if self.vector.x == 0.0 && self.vector.y == 0.0 {
            return Err(GeometryError::ZeroVector.into());
        }
        let ring = store
            .point_half_edges(self.point)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if ring.is_empty() {
            return Ok(None);
        }

        let reference = vector_angle(&self.vector);
        let mut offsets = Vec::with_capacity(ring.len());
        for he in &ring {
            let [a, b] = store.segment_points(he.segment)?;
            // Direction away from the point.
            let outward = if he.side == Side::IN { a - b } else { b - a };
            offsets.push(ccw_offset(vector_angle(&outward), reference));
        }

        let n = ring.len();
        let split = (1..=n)
            .find(|&i| offsets[i % n] >= offsets[i - 1])
            .unwrap_or(n);
        let prev = ring[split - 1];
        let after = ring[split % n];
        Ok(Some(InsertSlot {
            prev,
            next: HalfEdge::new(after.segment, after.side.opposite()),
            wire: store.wire_of(prev)?,
        }))
    }
}
