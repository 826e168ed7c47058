use tracing::debug;

use crate::change::PolygonChange;
use crate::error::{GeometryError, OperationError, Result};
use crate::math::intersect_2d::point_at;
use crate::topology::{
    Attachment, HalfEdge, InsertSlot, PointData, PointId, SegmentId, Side, TopologyStore,
};

/// Splits a segment at parameter `t` by inserting a new point.
///
/// The original segment keeps its out-vertex and ends at the new point; a
/// new segment runs from the new point to the old in-vertex. Wires and
/// polygons are unchanged apart from the extra vertex.
pub struct SplitSegment {
    segment: SegmentId,
    t: f64,
}

impl SplitSegment {
    /// Creates a new `SplitSegment` operation.
    #[must_use]
    pub fn new(segment: SegmentId, t: f64) -> Self {
        Self { segment, t }
    }

    /// Executes the split, returning the new point and the new segment.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` unless `0 < t < 1`, or an
    /// error if the segment is missing.
    pub fn execute(
        &self,
        store: &mut TopologyStore,
    ) -> Result<(PointId, SegmentId, PolygonChange)> {
        if !(self.t > 0.0 && self.t < 1.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: self.t,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        let seg = self.segment;
        let [a, b] = store.segment_points(seg)?;
        let data = store.segment(seg)?;
        let b_pt = data.vtx(Side::IN);
        let left_wire = data.wire(Side::Left);
        let right_wire = data.wire(Side::Right);

        let b_slot = store.vtx_insert_info(seg, Side::IN)?;
        let tip_slot = InsertSlot {
            prev: HalfEdge::new(seg, Side::Left),
            next: HalfEdge::new(seg, Side::Right),
            wire: right_wire,
        };
        store.disconnect_vtx(seg, Side::IN)?;

        let mid = store.add_point(PointData::new(
            point_at(&a, &b, self.t),
            Attachment::Attached(HalfEdge::new(seg, Side::Left)),
        ));
        store.segment_mut(seg)?.vtxs[Side::IN.index()] = mid;
        let new_seg = store.make_segment([mid, b_pt], right_wire)?;
        store.connect_vtx(new_seg, Side::OUT, tip_slot)?;
        match b_slot {
            Some(slot) => store.connect_vtx(new_seg, Side::IN, slot)?,
            None => store.connect_free_vtx(new_seg, Side::IN, left_wire)?,
        }

        let change = PolygonChange::shape_of([
            store.wire(right_wire)?.polygon,
            store.wire(left_wire)?.polygon,
        ]);
        debug!(?seg, ?new_seg, ?mid, t = self.t, "segment split");
        Ok((mid, new_seg, change))
    }
}

/// Merges the two segments meeting at a point of degree two and removes the
/// point. Inverse of [`SplitSegment`].
pub struct JoinSegments {
    point: PointId,
}

impl JoinSegments {
    /// Creates a new `JoinSegments` operation.
    #[must_use]
    pub fn new(point: PointId) -> Self {
        Self { point }
    }

    /// Executes the join, returning the surviving segment.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` unless exactly two segments
    /// meet at the point, or `GeometryError::Degenerate` if their far ends
    /// coincide.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<(SegmentId, PolygonChange)> {
        let ring = store
            .point_half_edges(self.point)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let &[kept, dropped] = ring.as_slice() else {
            return Err(OperationError::InvalidInput(format!(
                "{} segments meet at the point, expected 2",
                ring.len()
            ))
            .into());
        };
        let (s0, k0) = (kept.segment, kept.side);
        let (s1, k1) = (dropped.segment, dropped.side);
        let far = store.segment(s1)?.vtx(k1.opposite());
        if far == store.segment(s0)?.vtx(k0.opposite()) {
            return Err(GeometryError::Degenerate("joined segment would be a loop".into()).into());
        }
        let far_slot = store.vtx_insert_info(s1, k1.opposite())?;

        // Representatives on the dropped segment move to the merged half-edges.
        let remap = [
            (HalfEdge::new(s1, k1.opposite()), HalfEdge::new(s0, k0)),
            (HalfEdge::new(s1, k1), HalfEdge::new(s0, k0.opposite())),
        ];
        for (from, to) in remap {
            let wire = store.wire_of(from)?;
            if store.wire(wire)?.segment == Some(from) {
                store.wire_mut(wire)?.segment = Some(to);
            }
        }

        store.disconnect_vtx(s1, k1.opposite())?;
        store.disconnect_vtx(s1, k1)?;
        store.disconnect_vtx(s0, k0)?;
        store.segment_mut(s0)?.vtxs[k0.index()] = far;
        match far_slot {
            Some(slot) => store.connect_vtx(s0, k0, slot)?,
            None => {
                let wire = store.segment(s0)?.wire(k0.opposite());
                store.connect_free_vtx(s0, k0, wire)?;
            }
        }
        store.destroy_segment(s1)?;

        if let Attachment::Free(polygon) = store.point(self.point)?.attachment {
            store.polygon_mut(polygon)?.free_points.remove(&self.point);
        }
        store.remove_point(self.point);

        let data = store.segment(s0)?;
        let change = PolygonChange::shape_of([
            store.wire(data.wire(Side::Right))?.polygon,
            store.wire(data.wire(Side::Left))?.polygon,
        ]);
        debug!(kept = ?s0, removed = ?s1, "segments joined");
        Ok((s0, change))
    }
}
