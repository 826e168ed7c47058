use crate::error::{GeometryError, Result, TopologyError};

use super::{
    Attachment, HalfEdge, PointId, PolygonId, SegmentData, SegmentId, Side, TopologyStore, WireId,
};

/// Angular position at an attached point where a new half-edge pair fits.
///
/// `prev` is the incoming half-edge that will continue into the new segment,
/// `next` the outgoing half-edge the new segment will continue into, and
/// `wire` the wire being cut at that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertSlot {
    pub prev: HalfEdge,
    pub next: HalfEdge,
    pub wire: WireId,
}

/// Link surgery shared by the topology mutators.
///
/// These primitives keep `next` chains continuous but may leave wire labels
/// and representatives temporarily inconsistent; each mutator restores them
/// before returning.
impl TopologyStore {
    /// Creates an unconnected segment; both half-edges turn back on themselves.
    pub(crate) fn make_segment(&mut self, vtxs: [PointId; 2], wire: WireId) -> Result<SegmentId> {
        if vtxs[0] == vtxs[1] {
            return Err(GeometryError::Degenerate("segment endpoints coincide".into()).into());
        }
        let [a, b] = [self.xy(vtxs[0])?, self.xy(vtxs[1])?];
        if a == b {
            return Err(GeometryError::Degenerate(format!("zero-length segment at {a}")).into());
        }
        Ok(self.add_segment_with(|id| SegmentData {
            vtxs,
            wire: [wire; 2],
            next: [
                HalfEdge::new(id, Side::Left),
                HalfEdge::new(id, Side::Right),
            ],
        }))
    }

    /// Moves a free point out of its polygon and attaches it at `he`.
    /// Attached points are left untouched.
    pub(crate) fn attach_point(&mut self, point: PointId, he: HalfEdge) -> Result<()> {
        let attachment = self.point(point)?.attachment;
        if let Attachment::Free(polygon) = attachment {
            self.polygon_mut(polygon)?.free_points.remove(&point);
            self.point_mut(point)?.attachment = Attachment::Attached(he);
        }
        Ok(())
    }

    /// Makes `point` a free point of `polygon`.
    pub(crate) fn set_point_polygon(&mut self, point: PointId, polygon: PolygonId) -> Result<()> {
        if let Attachment::Free(old) = self.point(point)?.attachment {
            self.polygon_mut(old)?.free_points.remove(&point);
        }
        self.polygon_mut(polygon)?.free_points.insert(point);
        self.point_mut(point)?.attachment = Attachment::Free(polygon);
        Ok(())
    }

    fn set_next(&mut self, he: HalfEdge, next: HalfEdge) -> Result<()> {
        debug_assert_eq!(
            self.segment(next.segment)?.vtx(next.side.opposite()),
            self.segment(he.segment)?.vtx(he.side),
            "{next:?} does not continue {he:?}"
        );
        self.segment_mut(he.segment)?.next[he.side.index()] = next;
        Ok(())
    }

    pub(crate) fn set_wire_of(&mut self, he: HalfEdge, wire: WireId) -> Result<()> {
        self.segment_mut(he.segment)?.wire[he.side.index()] = wire;
        Ok(())
    }

    /// Connects end `vtx` of `seg` to an attached point at `slot`.
    pub(crate) fn connect_vtx(&mut self, seg: SegmentId, vtx: Side, slot: InsertSlot) -> Result<()> {
        let point = self.segment(seg)?.vtx(vtx);
        self.attach_point(point, HalfEdge::new(seg, vtx))?;
        self.set_next(HalfEdge::new(seg, vtx), slot.next)?;
        self.set_next(slot.prev, HalfEdge::new(seg, vtx.opposite()))?;
        self.set_wire_of(HalfEdge::new(seg, vtx), slot.wire)
    }

    /// Connects end `vtx` of `seg` to a free point, making it a tip.
    pub(crate) fn connect_free_vtx(&mut self, seg: SegmentId, vtx: Side, wire: WireId) -> Result<()> {
        let point = self.segment(seg)?.vtx(vtx);
        self.attach_point(point, HalfEdge::new(seg, vtx))?;
        self.set_next(HalfEdge::new(seg, vtx), HalfEdge::new(seg, vtx.opposite()))?;
        self.set_wire_of(HalfEdge::new(seg, vtx), wire)
    }

    /// The half-edge whose successor is `he`, found by walking around the
    /// point `he` starts from.
    pub(crate) fn previous(&self, he: HalfEdge) -> Result<HalfEdge> {
        for incoming in self.half_edges_around(Some(he.opposite())) {
            let incoming = incoming?;
            if self.next_of(incoming)? == he {
                return Ok(incoming);
            }
        }
        Err(TopologyError::InvalidTopology(format!("no predecessor of {he:?}")).into())
    }

    /// Slot that reconnects end `vtx` of `seg` where it currently sits, or
    /// `None` when that end is a tip.
    pub(crate) fn vtx_insert_info(&self, seg: SegmentId, vtx: Side) -> Result<Option<InsertSlot>> {
        let data = self.segment(seg)?;
        let next = data.next(vtx);
        if next.segment == seg {
            return Ok(None);
        }
        let wire = data.wire(vtx);
        let prev = self.previous(HalfEdge::new(seg, vtx.opposite()))?;
        Ok(Some(InsertSlot { prev, next, wire }))
    }

    /// Unlinks end `vtx` of `seg` from the other segments at that point.
    pub(crate) fn disconnect_vtx(&mut self, seg: SegmentId, vtx: Side) -> Result<()> {
        let point = self.segment(seg)?.vtx(vtx);
        self.detach_point(point, seg)?;
        let prev = self.previous(HalfEdge::new(seg, vtx.opposite()))?;
        let next = self.segment(seg)?.next(vtx);
        self.segment_mut(prev.segment)?.next[prev.side.index()] = next;
        self.segment_mut(seg)?.next[vtx.index()] = HalfEdge::new(seg, vtx.opposite());
        Ok(())
    }

    /// Moves the representative of `point` off `seg`. A point left with no
    /// other segment becomes free in the polygon on the left of `seg`.
    pub(crate) fn detach_point(&mut self, point: PointId, seg: SegmentId) -> Result<()> {
        let Attachment::Attached(rep) = self.point(point)?.attachment else {
            return Ok(());
        };
        if rep.segment != seg {
            return Ok(());
        }
        let mut other = None;
        for he in self.half_edges_around(Some(rep)) {
            let he = he?;
            if he.segment != seg {
                other = Some(he);
                break;
            }
        }
        match other {
            Some(he) => self.point_mut(point)?.attachment = Attachment::Attached(he),
            None => {
                let polygon = self.wire(self.segment(seg)?.wire(Side::Left))?.polygon;
                self.set_point_polygon(point, polygon)?;
            }
        }
        Ok(())
    }

    /// Detaches both ends of `seg` and drops it from the arena.
    pub(crate) fn destroy_segment(&mut self, seg: SegmentId) -> Result<()> {
        let vtxs = self.segment(seg)?.vtxs;
        for point in vtxs {
            self.detach_point(point, seg)?;
        }
        self.remove_segment(seg);
        Ok(())
    }

    /// Moves wire representatives that point at `seg` to another half-edge of
    /// the same wire, or clears them if the wire has no other half-edge.
    pub(crate) fn release_wire_refs(&mut self, seg: SegmentId) -> Result<()> {
        for side in Side::BOTH {
            let wire = self.segment(seg)?.wire(side);
            if self.wire(wire)?.segment != Some(HalfEdge::new(seg, side)) {
                continue;
            }
            let mut replacement = None;
            for he in self.half_edge_cycle(HalfEdge::new(seg, side), None) {
                let he = he?;
                if he.segment != seg {
                    replacement = Some(he);
                    break;
                }
            }
            self.wire_mut(wire)?.segment = replacement;
        }
        Ok(())
    }

    /// Relabels the half-edges from `start` up to (excluding) `end` to `wire`.
    pub(crate) fn relabel(
        &mut self,
        start: HalfEdge,
        end: Option<HalfEdge>,
        wire: WireId,
    ) -> Result<()> {
        let chain = self
            .half_edge_cycle(start, end)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for he in chain {
            self.set_wire_of(he, wire)?;
        }
        Ok(())
    }

    /// Re-parents `wire`, keeping both children sets in sync.
    pub(crate) fn set_parent(&mut self, wire: WireId, parent: Option<WireId>) -> Result<()> {
        if let Some(old) = self.wire(wire)?.parent {
            self.wire_mut(old)?.children.remove(&wire);
        }
        self.wire_mut(wire)?.parent = parent;
        if let Some(new) = parent {
            self.wire_mut(new)?.children.insert(wire);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::topology::{PointData, WireData};

    fn free_point(store: &mut TopologyStore, x: f64, y: f64) -> PointId {
        let polygon = store.outer_polygon();
        let id = store.add_point(PointData::new(Point2::new(x, y), Attachment::Free(polygon)));
        store.polygon_mut(polygon).unwrap().free_points.insert(id);
        id
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        let mut store = TopologyStore::new();
        let root = store.root_wire();
        let a = free_point(&mut store, 1.0, 1.0);
        let b = free_point(&mut store, 1.0, 1.0);
        assert!(store.make_segment([a, a], root).is_err());
        assert!(store.make_segment([a, b], root).is_err());
    }

    #[test]
    fn free_ends_form_a_closed_dendrite() {
        let mut store = TopologyStore::new();
        let root = store.root_wire();
        let a = free_point(&mut store, 0.0, 0.0);
        let b = free_point(&mut store, 1.0, 0.0);
        let seg = store.make_segment([a, b], root).unwrap();
        store.connect_free_vtx(seg, Side::OUT, root).unwrap();
        store.connect_free_vtx(seg, Side::IN, root).unwrap();

        let data = store.segment(seg).unwrap();
        assert_eq!(data.next(Side::Right), HalfEdge::new(seg, Side::Left));
        assert_eq!(data.next(Side::Left), HalfEdge::new(seg, Side::Right));
        assert!(!store.point(a).unwrap().is_free());
        assert!(store
            .polygon(store.outer_polygon())
            .unwrap()
            .free_points
            .is_empty());

        assert_eq!(
            store.previous(HalfEdge::new(seg, Side::Left)).unwrap(),
            HalfEdge::new(seg, Side::Right)
        );
        assert!(store.vtx_insert_info(seg, Side::IN).unwrap().is_none());

        store.destroy_segment(seg).unwrap();
        assert!(store.point(a).unwrap().is_free());
        assert!(store.point(b).unwrap().is_free());
        assert_eq!(
            store.polygon(store.outer_polygon()).unwrap().free_points.len(),
            2
        );
    }

    #[test]
    fn set_parent_tracks_children() {
        let mut store = TopologyStore::new();
        let root = store.root_wire();
        let polygon = store.outer_polygon();
        let a = store.add_wire(WireData::new(polygon));
        let b = store.add_wire(WireData::new(polygon));
        store.set_parent(a, Some(root)).unwrap();
        store.set_parent(b, Some(a)).unwrap();
        assert!(store.wire(root).unwrap().children.contains(&a));
        store.set_parent(b, Some(root)).unwrap();
        assert!(store.wire(a).unwrap().children.is_empty());
        assert_eq!(store.wire(root).unwrap().children.len(), 2);
    }
}
