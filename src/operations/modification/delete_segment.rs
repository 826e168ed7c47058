use tracing::debug;

use crate::change::PolygonChange;
use crate::error::{Result, TopologyError};
use crate::operations::query::WireContainsWire;
use crate::topology::{HalfEdge, PointId, SegmentId, Side, TopologyStore, WireData, WireId};

/// Removes a segment, undoing whichever topological event adding it caused.
///
/// Removing an isolated segment drops its wire; removing a dendrite tip
/// frees the tip point; removing a bridge splits its wire in two; removing a
/// segment between two polygons merges them.
pub struct DeleteSegment {
    segment: SegmentId,
}

impl DeleteSegment {
    /// Creates a new `DeleteSegment` operation.
    #[must_use]
    pub fn new(segment: SegmentId) -> Self {
        Self { segment }
    }

    /// Executes the operation. End points stay in the store; those left
    /// without segments become free points.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is missing or the store is
    /// inconsistent.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<PolygonChange> {
        let seg = self.segment;
        let data = store.segment(seg)?;
        let left_tip = data.next(Side::Left) == HalfEdge::new(seg, Side::Right);
        let right_tip = data.next(Side::Right) == HalfEdge::new(seg, Side::Left);
        let dendrite = data.is_dendrite();

        let change = match (left_tip, right_tip) {
            (true, true) => Self::rm_wire(store, seg)?,
            (true, false) => Self::rm_dendrite(store, seg, Side::IN)?,
            (false, true) => Self::rm_dendrite(store, seg, Side::OUT)?,
            (false, false) if dendrite => Self::split_wire(store, seg)?,
            (false, false) => Self::join_polygons(store, seg)?,
        };
        debug!(?seg, change = change.kind(), "segment deleted");
        Ok(change)
    }

    fn rm_wire(store: &mut TopologyStore, seg: SegmentId) -> Result<PolygonChange> {
        let wire = store.segment(seg)?.wire(Side::Left);
        store.set_parent(wire, None)?;
        store.destroy_segment(seg)?;
        store.remove_wire(wire);
        Ok(PolygonChange::None)
    }

    fn rm_dendrite(store: &mut TopologyStore, seg: SegmentId, tip: Side) -> Result<PolygonChange> {
        let polygon = store.wire(store.segment(seg)?.wire(Side::Right))?.polygon;
        store.release_wire_refs(seg)?;
        store.disconnect_vtx(seg, tip.opposite())?;
        store.destroy_segment(seg)?;
        Ok(PolygonChange::shape(polygon))
    }

    fn split_wire(store: &mut TopologyStore, seg: SegmentId) -> Result<PolygonChange> {
        let a_wire = store.segment(seg)?.wire(Side::Left);
        let polygon = store.wire(a_wire)?.polygon;
        let orig_parent = store.wire(a_wire)?.parent;
        let b_wire = store.add_wire(WireData::new(polygon));

        // The part hanging off the in-vertex moves to the new wire.
        let b_start = store.segment(seg)?.next(Side::Left);
        let a_start = store.segment(seg)?.next(Side::Right);
        store.relabel(b_start, Some(HalfEdge::new(seg, Side::Right)), b_wire)?;
        store.wire_mut(b_wire)?.segment = Some(b_start);
        store.wire_mut(a_wire)?.segment = Some(a_start);

        store.disconnect_vtx(seg, Side::OUT)?;
        store.disconnect_vtx(seg, Side::IN)?;
        store.destroy_segment(seg)?;

        if store.polygon(polygon)?.outer_wire == a_wire {
            // One part now encloses the other, which becomes a hole.
            let (outer, inner) = if WireContainsWire::new(a_wire, b_wire).execute(store)? {
                (a_wire, b_wire)
            } else {
                (b_wire, a_wire)
            };
            store.polygon_mut(polygon)?.outer_wire = outer;
            store.set_parent(outer, orig_parent)?;
            if outer == b_wire {
                let holes: Vec<WireId> = store.wire(a_wire)?.children.iter().copied().collect();
                for hole in holes {
                    store.set_parent(hole, Some(b_wire))?;
                }
            }
            store.set_parent(inner, Some(outer))?;
            if let Some(parent) = orig_parent {
                let siblings: Vec<WireId> = store.wire(parent)?.children.iter().copied().collect();
                for wire in siblings {
                    if wire != outer && WireContainsWire::new(inner, wire).execute(store)? {
                        store.set_parent(wire, Some(inner))?;
                    }
                }
            }
        } else {
            // Both parts are holes of the polygon.
            store.set_parent(b_wire, orig_parent)?;
            let children: Vec<WireId> = store.wire(a_wire)?.children.iter().copied().collect();
            for wire in children {
                if WireContainsWire::new(b_wire, wire).execute(store)? {
                    store.set_parent(wire, Some(b_wire))?;
                }
            }
        }
        Ok(PolygonChange::shape(polygon))
    }

    fn join_polygons(store: &mut TopologyStore, seg: SegmentId) -> Result<PolygonChange> {
        let left = store.segment(seg)?.wire(Side::Left);
        let right = store.segment(seg)?.wire(Side::Right);
        let left_parent = store.wire(left)?.parent;
        let right_parent = store.wire(right)?.parent;
        let left_poly = store.wire(left)?.polygon;
        let right_poly = store.wire(right)?.polygon;

        let (keep, orig_poly, rm_poly, change) = if left_parent == right_parent {
            (
                right,
                right_poly,
                left_poly,
                PolygonChange::Join {
                    original: right_poly,
                    removed: left_poly,
                },
            )
        } else if left_parent == Some(right) {
            (
                right,
                right_poly,
                left_poly,
                PolygonChange::Remove {
                    outer: right_poly,
                    inner: left_poly,
                },
            )
        } else if right_parent == Some(left) {
            (
                left,
                left_poly,
                right_poly,
                PolygonChange::Remove {
                    outer: left_poly,
                    inner: right_poly,
                },
            )
        } else {
            return Err(TopologyError::InvalidTopology(format!(
                "wires on both sides of {seg:?} are unrelated"
            ))
            .into());
        };
        let rm_wire = if keep == left { right } else { left };
        let orig_outer = store.polygon(orig_poly)?.outer_wire;

        let holes: Vec<WireId> = store.wire(rm_wire)?.children.iter().copied().collect();
        for hole in holes {
            store.set_parent(hole, Some(orig_outer))?;
            store.wire_mut(hole)?.polygon = orig_poly;
        }
        let free_points: Vec<PointId> = store.polygon(rm_poly)?.free_points.iter().copied().collect();
        for pt in free_points {
            store.set_point_polygon(pt, orig_poly)?;
        }
        store.set_parent(rm_wire, None)?;

        let rm_start = HalfEdge::new(seg, if keep == left { Side::Right } else { Side::Left });
        store.relabel(rm_start, None, keep)?;
        store.release_wire_refs(seg)?;
        store.disconnect_vtx(seg, Side::OUT)?;
        store.disconnect_vtx(seg, Side::IN)?;
        store.destroy_segment(seg)?;
        store.remove_wire(rm_wire);
        store.remove_polygon(rm_poly);
        Ok(change)
    }
}
