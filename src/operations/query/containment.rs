use crate::error::Result;
use crate::math::angle_2d::left_normal;
use crate::math::intersect_2d::{crosses_x_ray, point_at};
use crate::math::{Point2, TOLERANCE};
use crate::topology::{PolygonId, Side, TopologyStore, WireId};

/// Tests whether a point lies inside a wire by ray parity.
///
/// Every half-edge of the wire is tested against the rightward horizontal ray
/// from the point. Dendrites are walked on both sides and cancel out. The
/// root wire contains every point.
pub struct WireContainsPoint {
    wire: WireId,
    xy: Point2,
}

impl WireContainsPoint {
    /// Creates a new `WireContainsPoint` query.
    #[must_use]
    pub fn new(wire: WireId, xy: Point2) -> Self {
        Self { wire, xy }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire or one of its entities is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<bool> {
        if store.wire(self.wire)?.is_root() {
            return Ok(true);
        }
        let mut inside = false;
        for he in store.wire_half_edges(self.wire)? {
            let [a, b] = store.segment_points(he?.segment)?;
            if crosses_x_ray(&a, &b, &self.xy) {
                inside = !inside;
            }
        }
        Ok(inside)
    }
}

/// Tests whether wire `outer` contains wire `inner`.
///
/// A point just off the middle of `inner`'s representative half-edge, on its
/// face side, is tested against `outer`.
pub struct WireContainsWire {
    outer: WireId,
    inner: WireId,
}

impl WireContainsWire {
    /// Creates a new `WireContainsWire` query.
    #[must_use]
    pub fn new(outer: WireId, inner: WireId) -> Self {
        Self { outer, inner }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if either wire or one of its entities is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<bool> {
        if store.wire(self.outer)?.is_root() {
            return Ok(true);
        }
        let Some(he) = store.wire(self.inner)?.segment else {
            return Ok(false);
        };
        let [a, b] = store.segment_points(he.segment)?;
        WireContainsPoint::new(self.outer, face_point(&a, &b, he.side)).execute(store)
    }
}

/// Point `TOLERANCE` away from the middle of `a`-`b`, on the face `side`.
fn face_point(a: &Point2, b: &Point2, side: Side) -> Point2 {
    let mut normal = left_normal(&(b - a)).normalize();
    if side == Side::Right {
        normal = -normal;
    }
    point_at(a, b, 0.5) + normal * TOLERANCE
}

/// Tests whether a point lies inside a polygon: inside its outer wire and
/// outside all of its holes.
pub struct PolygonContainsPoint {
    polygon: PolygonId,
    xy: Point2,
}

impl PolygonContainsPoint {
    /// Creates a new `PolygonContainsPoint` query.
    #[must_use]
    pub fn new(polygon: PolygonId, xy: Point2) -> Self {
        Self { polygon, xy }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon or one of its wires is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<bool> {
        let outer = store.polygon(self.polygon)?.outer_wire;
        if !WireContainsPoint::new(outer, self.xy).execute(store)? {
            return Ok(false);
        }
        for &hole in &store.wire(outer)?.children {
            if WireContainsPoint::new(hole, self.xy).execute(store)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
