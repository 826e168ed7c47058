use tracing::debug;

use crate::change::PolygonChange;
use crate::error::{OperationError, Result};
use crate::operations::query::{InsertVector, WireContainsPoint, WireContainsWire};
use crate::topology::{
    Attachment, HalfEdge, InsertSlot, PointId, PolygonData, PolygonId, SegmentId, Side,
    TopologyStore, WireData, WireId,
};

/// Connects two existing points by a new segment.
///
/// The caller guarantees that the segment crosses no existing segment.
/// Depending on how the end points are attached the segment becomes a new
/// isolated wire, a dendrite tip, a bridge joining two wires of one polygon,
/// or a cut splitting a polygon in two. If the points are already connected
/// the existing segment is returned unchanged.
pub struct NewSegment {
    a: PointId,
    b: PointId,
}

enum Case {
    Existing(SegmentId),
    NewWire,
    Dendrite { root: Side, slot: InsertSlot },
    JoinWires { a_slot: InsertSlot, b_slot: InsertSlot },
    SplitPolygon { a_slot: InsertSlot, b_slot: InsertSlot },
}

impl NewSegment {
    /// Creates a new `NewSegment` operation from `a` (out-vertex) to `b`
    /// (in-vertex).
    #[must_use]
    pub fn new(a: PointId, b: PointId) -> Self {
        Self { a, b }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide, lie in different polygons,
    /// or the store is inconsistent.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<(SegmentId, PolygonChange)> {
        match self.classify(store)? {
            Case::Existing(seg) => Ok((seg, PolygonChange::None)),
            Case::NewWire => self.new_wire(store),
            Case::Dendrite { root, slot } => self.add_dendrite(store, root, slot),
            Case::JoinWires { a_slot, b_slot } => self.join_wires(store, a_slot, b_slot),
            Case::SplitPolygon { a_slot, b_slot } => self.split_polygon(store, a_slot, b_slot),
        }
    }

    fn classify(&self, store: &TopologyStore) -> Result<Case> {
        for he in store.point_half_edges(self.a)? {
            let he = he?;
            if store.segment(he.segment)?.vtx(he.side.opposite()) == self.b {
                return Ok(Case::Existing(he.segment));
            }
        }

        let vector = store.xy(self.b)? - store.xy(self.a)?;
        if vector.x == 0.0 && vector.y == 0.0 {
            return Err(OperationError::InvalidInput("segment end points coincide".into()).into());
        }
        let a_slot = InsertVector::new(self.a, vector).execute(store)?;
        let b_slot = InsertVector::new(self.b, -vector).execute(store)?;
        let a_free = store.point(self.a)?.polygon();
        let b_free = store.point(self.b)?.polygon();

        match (a_slot, b_slot) {
            (None, None) => {
                if a_free != b_free {
                    return Err(OperationError::InvalidInput(
                        "free end points lie in different polygons".into(),
                    )
                    .into());
                }
                Ok(Case::NewWire)
            }
            (Some(slot), None) => {
                Self::check_dendrite(store, slot, b_free)?;
                Ok(Case::Dendrite {
                    root: Side::OUT,
                    slot,
                })
            }
            (None, Some(slot)) => {
                Self::check_dendrite(store, slot, a_free)?;
                Ok(Case::Dendrite {
                    root: Side::IN,
                    slot,
                })
            }
            (Some(a_slot), Some(b_slot)) => {
                if a_slot.wire == b_slot.wire {
                    Ok(Case::SplitPolygon { a_slot, b_slot })
                } else {
                    let a_poly = store.wire(a_slot.wire)?.polygon;
                    if a_poly != store.wire(b_slot.wire)?.polygon {
                        return Err(OperationError::InvalidInput(
                            "segment would connect wires of different polygons".into(),
                        )
                        .into());
                    }
                    Ok(Case::JoinWires { a_slot, b_slot })
                }
            }
        }
    }

    fn check_dendrite(
        store: &TopologyStore,
        slot: InsertSlot,
        free_polygon: Option<PolygonId>,
    ) -> Result<()> {
        if Some(store.wire(slot.wire)?.polygon) != free_polygon {
            return Err(OperationError::InvalidInput(
                "free end point lies outside the polygon of the attached end".into(),
            )
            .into());
        }
        Ok(())
    }

    fn new_wire(&self, store: &mut TopologyStore) -> Result<(SegmentId, PolygonChange)> {
        let polygon = match store.point(self.a)?.attachment {
            Attachment::Free(polygon) => polygon,
            Attachment::Attached(_) => {
                return Err(OperationError::InvalidInput("point is not free".into()).into())
            }
        };
        let outer = store.polygon(polygon)?.outer_wire;
        let wire = store.add_wire(WireData::new(polygon));
        store.set_parent(wire, Some(outer))?;

        let seg = store.make_segment([self.a, self.b], wire)?;
        store.connect_free_vtx(seg, Side::OUT, wire)?;
        store.connect_free_vtx(seg, Side::IN, wire)?;
        store.wire_mut(wire)?.segment = Some(HalfEdge::new(seg, Side::Right));
        debug!(?seg, ?wire, "new wire");
        Ok((seg, PolygonChange::None))
    }

    fn add_dendrite(
        &self,
        store: &mut TopologyStore,
        root: Side,
        slot: InsertSlot,
    ) -> Result<(SegmentId, PolygonChange)> {
        let polygon = store.wire(slot.wire)?.polygon;
        let seg = store.make_segment([self.a, self.b], slot.wire)?;
        store.connect_vtx(seg, root, slot)?;
        store.connect_free_vtx(seg, root.opposite(), slot.wire)?;
        debug!(?seg, ?polygon, "dendrite added");
        Ok((seg, PolygonChange::shape(polygon)))
    }

    fn join_wires(
        &self,
        store: &mut TopologyStore,
        a_slot: InsertSlot,
        b_slot: InsertSlot,
    ) -> Result<(SegmentId, PolygonChange)> {
        let polygon = store.wire(a_slot.wire)?.polygon;
        let outer = store.polygon(polygon)?.outer_wire;

        // The polygon's outer wire always survives; its hole children then
        // move up to whatever encloses the polygon.
        let (keep, rm, keep_side, children_parent) = if a_slot.wire == outer {
            let parent = store.wire(outer)?.parent;
            (a_slot.wire, b_slot.wire, Side::Right, parent)
        } else if b_slot.wire == outer {
            let parent = store.wire(outer)?.parent;
            (b_slot.wire, a_slot.wire, Side::Left, parent)
        } else {
            (b_slot.wire, a_slot.wire, Side::Left, Some(b_slot.wire))
        };

        let seg = store.make_segment([self.a, self.b], keep)?;
        store.connect_vtx(seg, Side::OUT, a_slot)?;
        store.connect_vtx(seg, Side::IN, b_slot)?;
        store.relabel(
            HalfEdge::new(seg, keep_side.opposite()),
            Some(HalfEdge::new(seg, keep_side)),
            keep,
        )?;
        for side in Side::BOTH {
            store.set_wire_of(HalfEdge::new(seg, side), keep)?;
        }

        let children: Vec<WireId> = store.wire(rm)?.children.iter().copied().collect();
        for child in children {
            store.set_parent(child, children_parent)?;
        }
        store.set_parent(rm, None)?;
        store.remove_wire(rm);
        debug!(?seg, ?keep, ?rm, "wires joined");
        Ok((seg, PolygonChange::shape(polygon)))
    }

    fn split_polygon(
        &self,
        store: &mut TopologyStore,
        a_slot: InsertSlot,
        b_slot: InsertSlot,
    ) -> Result<(SegmentId, PolygonChange)> {
        let orig = a_slot.wire;
        let orig_poly = store.wire(orig)?.polygon;
        let orig_parent = store.wire(orig)?.parent;
        let left = store.add_wire(WireData::new(orig_poly));

        let seg = store.make_segment([self.a, self.b], orig)?;
        store.connect_vtx(seg, Side::OUT, a_slot)?;
        store.connect_vtx(
            seg,
            Side::IN,
            InsertSlot {
                wire: left,
                ..b_slot
            },
        )?;
        let left_start = store.segment(seg)?.next(Side::Left);
        store.relabel(left_start, Some(HalfEdge::new(seg, Side::Left)), left)?;
        store.wire_mut(left)?.segment = Some(HalfEdge::new(seg, Side::Left));
        store.wire_mut(orig)?.segment = Some(HalfEdge::new(seg, Side::Right));

        let new_poly = store.add_polygon(PolygonData::new(left));
        store.wire_mut(left)?.polygon = new_poly;

        let change = if store.polygon(orig_poly)?.outer_wire == orig {
            // Two disjoint polygons side by side.
            store.set_parent(left, orig_parent)?;
            PolygonChange::Split {
                original: orig_poly,
                new: new_poly,
            }
        } else {
            // A closed loop inside a hole: one wire now bounds the other.
            let (outer, inner) = if WireContainsWire::new(orig, left).execute(store)? {
                (orig, left)
            } else {
                (left, orig)
            };
            let children: Vec<WireId> = store.wire(orig)?.children.iter().copied().collect();
            for child in children {
                store.set_parent(child, Some(outer))?;
            }
            store.wire_mut(outer)?.polygon = orig_poly;
            store.wire_mut(inner)?.polygon = new_poly;
            store.polygon_mut(new_poly)?.outer_wire = inner;
            store.set_parent(outer, orig_parent)?;
            store.set_parent(inner, Some(outer))?;
            PolygonChange::Add {
                outer: orig_poly,
                inner: new_poly,
            }
        };

        let new_outer = store.polygon(new_poly)?.outer_wire;
        let free_points: Vec<PointId> = store.polygon(orig_poly)?.free_points.iter().copied().collect();
        for pt in free_points {
            if WireContainsPoint::new(new_outer, store.xy(pt)?).execute(store)? {
                store.set_point_polygon(pt, new_poly)?;
            }
        }
        let orig_outer = store.polygon(orig_poly)?.outer_wire;
        let holes: Vec<WireId> = store.wire(orig_outer)?.children.iter().copied().collect();
        for hole in holes {
            if hole != orig && hole != left && WireContainsWire::new(new_outer, hole).execute(store)? {
                store.set_parent(hole, Some(new_outer))?;
                store.wire_mut(hole)?.polygon = new_poly;
            }
        }

        debug!(?seg, change = change.kind(), ?orig_poly, ?new_poly, "polygon split");
        Ok((seg, change))
    }
}
