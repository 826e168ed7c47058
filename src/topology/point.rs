use crate::math::Point2;

use super::polygon::PolygonId;
use super::segment::HalfEdge;

slotmap::new_key_type! {
    /// Unique identifier for a point in the topology store.
    pub struct PointId;
}

/// How a point is held by the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// No incident segment; owned by the free-point set of a polygon.
    Free(PolygonId),
    /// One incoming half-edge of the circular list around the point.
    Attached(HalfEdge),
}

/// Data associated with a point.
#[derive(Debug, Clone)]
pub struct PointData {
    pub xy: Point2,
    pub attachment: Attachment,
}

impl PointData {
    #[must_use]
    pub fn new(xy: Point2, attachment: Attachment) -> Self {
        Self { xy, attachment }
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        matches!(self.attachment, Attachment::Free(_))
    }

    /// Polygon owning a free point.
    #[must_use]
    pub fn polygon(&self) -> Option<PolygonId> {
        match self.attachment {
            Attachment::Free(polygon) => Some(polygon),
            Attachment::Attached(_) => None,
        }
    }

    /// Representative incoming half-edge of an attached point.
    #[must_use]
    pub fn half_edge(&self) -> Option<HalfEdge> {
        match self.attachment {
            Attachment::Free(_) => None,
            Attachment::Attached(he) => Some(he),
        }
    }

    /// Returns `true` if `xy` lies strictly within `tol` of this point.
    #[must_use]
    pub fn colocated(&self, xy: &Point2, tol: f64) -> bool {
        (self.xy - xy).norm() < tol
    }
}
