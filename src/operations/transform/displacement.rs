use std::collections::BTreeSet;

use tracing::debug;

use crate::change::PolygonChange;
use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::segment_intersection;
use crate::math::Vector2;
use crate::topology::{HalfEdge, PointId, SegmentId, Side, TopologyStore};

/// Shortens a displacement of a group of points so that none of them
/// crosses a segment of the faces around the group.
///
/// The envelope is collected by walking each wire from where it leaves the
/// moving group until it returns to it. Every time the path of a moving
/// point meets an envelope segment the displacement is scaled to stop short
/// of it by `margin`, a fraction of the allowed step.
pub struct CheckDisplacement<'a> {
    points: &'a [PointId],
    displacement: Vector2,
    margin: f64,
}

impl<'a> CheckDisplacement<'a> {
    /// Creates a new `CheckDisplacement` query.
    #[must_use]
    pub fn new(points: &'a [PointId], displacement: Vector2, margin: f64) -> Self {
        Self {
            points,
            displacement,
            margin,
        }
    }

    /// Executes the query, returning the admissible displacement and the
    /// polygons touched by the move.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `margin` is outside
    /// `[0, 1)`, or an error if a point is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<(Vector2, PolygonChange)> {
        if !(0.0..1.0).contains(&self.margin) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "margin",
                value: self.margin,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }

        // Half-edges arriving at the group from fixed points; segments with
        // both ends in the group cancel out.
        let mut boundary: BTreeSet<HalfEdge> = BTreeSet::new();
        let mut polygons = Vec::new();
        for &pt in self.points {
            for he in store.point_half_edges(pt)? {
                let he = he?;
                let seg = store.segment(he.segment)?;
                for side in Side::BOTH {
                    polygons.push(store.wire(seg.wire(side))?.polygon);
                }
                if !boundary.remove(&he.opposite()) {
                    boundary.insert(he);
                }
            }
        }

        let mut envelope: Vec<SegmentId> = Vec::new();
        for he in &boundary {
            let start = store.next_of(*he)?;
            for e in store.half_edge_cycle(start, None) {
                let e = e?;
                if boundary.contains(&e) {
                    break;
                }
                if !envelope.contains(&e.segment) {
                    envelope.push(e.segment);
                }
            }
        }

        let mut displacement = self.displacement;
        for seg in envelope {
            let [a, b] = store.segment_points(seg)?;
            for &pt in self.points {
                let xy = store.xy(pt)?;
                if let Some((_, t)) = segment_intersection(&a, &b, &xy, &(xy + displacement)) {
                    displacement *= (1.0 - self.margin) * t;
                }
            }
        }
        debug!(
            requested = ?self.displacement,
            allowed = ?displacement,
            "displacement checked"
        );
        Ok((displacement, PolygonChange::shape_of(polygons)))
    }
}

/// Moves points by a displacement vector without any topology check.
pub struct MovePoints<'a> {
    points: &'a [PointId],
    displacement: Vector2,
}

impl<'a> MovePoints<'a> {
    /// Creates a new `MovePoints` operation.
    #[must_use]
    pub fn new(points: &'a [PointId], displacement: Vector2) -> Self {
        Self {
            points,
            displacement,
        }
    }

    /// Executes the move.
    ///
    /// # Errors
    ///
    /// Returns an error if a point is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        for &pt in self.points {
            store.point_mut(pt)?.xy += self.displacement;
        }
        Ok(())
    }
}
