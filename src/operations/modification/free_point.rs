use tracing::debug;

use crate::error::{OperationError, Result};
use crate::math::Point2;
use crate::operations::query::PolygonContainsPoint;
use crate::topology::{Attachment, PointId, PolygonId, TopologyStore};

/// Inserts an isolated point into a polygon.
pub struct AddFreePoint {
    xy: Point2,
    polygon: PolygonId,
}

impl AddFreePoint {
    /// Creates a new `AddFreePoint` operation.
    #[must_use]
    pub fn new(xy: Point2, polygon: PolygonId) -> Self {
        Self { xy, polygon }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the coordinates lie outside
    /// the polygon.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<PointId> {
        if !PolygonContainsPoint::new(self.polygon, self.xy).execute(store)? {
            return Err(OperationError::InvalidInput(format!(
                "free point {} lies outside {:?}",
                self.xy, self.polygon
            ))
            .into());
        }
        let point = store.insert_free_point(self.xy, self.polygon)?;
        debug!(?point, polygon = ?self.polygon, "free point added");
        Ok(point)
    }
}

/// Removes a point that has no incident segments.
pub struct RemoveFreePoint {
    point: PointId,
}

impl RemoveFreePoint {
    /// Creates a new `RemoveFreePoint` operation.
    #[must_use]
    pub fn new(point: PointId) -> Self {
        Self { point }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if segments still end at the
    /// point.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let Attachment::Free(polygon) = store.point(self.point)?.attachment else {
            return Err(OperationError::InvalidInput(format!(
                "{:?} still has segments",
                self.point
            ))
            .into());
        };
        store.polygon_mut(polygon)?.free_points.remove(&self.point);
        store.remove_point(self.point);
        debug!(point = ?self.point, "free point removed");
        Ok(())
    }
}
