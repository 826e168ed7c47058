use std::collections::BTreeSet;

use crate::error::{DecompError, Result, TopologyError};
use crate::math::intersect_2d::segment_intersection;
use crate::math::TOLERANCE;
use crate::topology::{Attachment, HalfEdge, Side, TopologyStore, WireId};

use super::containment::PolygonContainsPoint;

/// Validates the topological and geometric consistency of a decomposition.
///
/// Checks link continuity, wire cycles and labels, the wire tree, point
/// attachments, and that no two segments cross.
#[derive(Default)]
pub struct IsValid;

fn invalid(msg: String) -> DecompError {
    TopologyError::InvalidTopology(msg).into()
}

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the validation.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidTopology` describing the first
    /// violation found.
    pub fn execute(&self, store: &TopologyStore) -> Result<()> {
        Self::check_links(store)?;
        Self::check_wires(store)?;
        Self::check_points(store)?;
        Self::check_crossings(store)
    }

    fn check_links(store: &TopologyStore) -> Result<()> {
        for (id, seg) in store.segments() {
            for side in Side::BOTH {
                let next = seg.next(side);
                let next_seg = store.segment(next.segment)?;
                if next_seg.vtx(next.side.opposite()) != seg.vtx(side) {
                    return Err(invalid(format!(
                        "{next:?} does not continue {:?}",
                        HalfEdge::new(id, side)
                    )));
                }
                store.wire(seg.wire(side))?;
                store.point(seg.vtx(side))?;
            }
        }
        Ok(())
    }

    fn check_wires(store: &TopologyStore) -> Result<()> {
        let root = store.root_wire();
        let mut labelled = 0;
        for (id, wire) in store.wires() {
            if store.polygon(wire.polygon).is_err() {
                return Err(invalid(format!("{id:?} refers to a missing polygon")));
            }
            for &child in &wire.children {
                if store.wire(child)?.parent != Some(id) {
                    return Err(invalid(format!("{child:?} does not point back to {id:?}")));
                }
            }
            if let Some(parent) = wire.parent {
                if !store.wire(parent)?.children.contains(&id) {
                    return Err(invalid(format!("{parent:?} does not list {id:?}")));
                }
            }
            Self::check_ancestry(store, id)?;

            if id == root {
                if wire.segment.is_some() || wire.parent.is_some() {
                    return Err(invalid("root wire has segments or a parent".into()));
                }
                continue;
            }
            if wire.segment.is_none() {
                return Err(invalid(format!("{id:?} has no segment")));
            }
            for he in store.wire_half_edges(id)? {
                let he = he?;
                if store.wire_of(he)? != id {
                    return Err(invalid(format!("{he:?} in cycle of {id:?} is mislabelled")));
                }
                labelled += 1;
            }
        }
        if labelled != 2 * store.num_segments() {
            return Err(invalid(format!(
                "wire cycles cover {labelled} of {} half-edges",
                2 * store.num_segments()
            )));
        }

        for (id, polygon) in store.polygons() {
            let outer = store.wire(polygon.outer_wire)?;
            if outer.polygon != id {
                return Err(invalid(format!("outer wire of {id:?} belongs elsewhere")));
            }
            let is_unbounded = id == store.outer_polygon();
            if is_unbounded != (polygon.outer_wire == root) {
                return Err(invalid(format!("{id:?} and the root wire disagree")));
            }
            for &hole in &outer.children {
                if store.wire(hole)?.polygon != id {
                    return Err(invalid(format!("hole {hole:?} belongs elsewhere")));
                }
            }
        }
        Ok(())
    }

    fn check_ancestry(store: &TopologyStore, wire: WireId) -> Result<()> {
        let mut seen = BTreeSet::new();
        let mut current = Some(wire);
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(invalid(format!("parent chain of {wire:?} loops")));
            }
            current = store.wire(id)?.parent;
            if current.is_none() && id != store.root_wire() {
                return Err(invalid(format!("parent chain of {wire:?} misses the root")));
            }
        }
        Ok(())
    }

    fn check_points(store: &TopologyStore) -> Result<()> {
        for (id, point) in store.points() {
            match point.attachment {
                Attachment::Attached(he) => {
                    if store.head_of(he)? != id {
                        return Err(invalid(format!("{id:?} is not the head of {he:?}")));
                    }
                }
                Attachment::Free(polygon) => {
                    if !store.polygon(polygon)?.free_points.contains(&id) {
                        return Err(invalid(format!("{polygon:?} does not list {id:?}")));
                    }
                    if !PolygonContainsPoint::new(polygon, point.xy).execute(store)? {
                        return Err(invalid(format!("{id:?} lies outside {polygon:?}")));
                    }
                }
            }
        }
        for (id, polygon) in store.polygons() {
            for &pt in &polygon.free_points {
                if store.point(pt)?.polygon() != Some(id) {
                    return Err(invalid(format!("{pt:?} is listed by {id:?} but not free in it")));
                }
            }
        }
        Ok(())
    }

    fn check_crossings(store: &TopologyStore) -> Result<()> {
        let segments: Vec<_> = store.segments().map(|(id, seg)| (id, seg.vtxs)).collect();
        for (i, &(s0, v0)) in segments.iter().enumerate() {
            let [a, b] = store.segment_points(s0)?;
            for &(s1, v1) in &segments[i + 1..] {
                if v1.iter().any(|pt| v0.contains(pt)) {
                    continue;
                }
                let [c, d] = store.segment_points(s1)?;
                if let Some((t0, _)) = segment_intersection(&a, &b, &c, &d) {
                    if t0 > TOLERANCE && t0 < 1.0 - TOLERANCE {
                        return Err(invalid(format!("{s0:?} crosses {s1:?}")));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decomposition::Decomposition;
    use crate::math::Point2;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn empty_store_is_valid() {
        IsValid::new().execute(&TopologyStore::new()).unwrap();
    }

    #[test]
    fn detects_broken_links() {
        let mut decomp = Decomposition::new();
        decomp.add_line(p(0.0, 0.0), p(1.0, 0.0)).unwrap();
        let seg = decomp.add_line(p(1.0, 0.0), p(1.0, 1.0)).unwrap()[0];
        IsValid::new().execute(decomp.store()).unwrap();

        let store = decomp.store_mut();
        store.segment_mut(seg).unwrap().next[Side::Right.index()] = HalfEdge::new(seg, Side::Right);
        assert!(IsValid::new().execute(store).is_err());
    }

    #[test]
    fn detects_crossing_segments() {
        let mut decomp = Decomposition::new();
        decomp.add_line(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        decomp.add_line(p(1.0, 1.0), p(1.0, 2.0)).unwrap();
        IsValid::new().execute(decomp.store()).unwrap();

        // Drag one end below the other segment without any topology update.
        let pt = decomp.snap_point(p(1.0, 2.0)).unwrap().point().unwrap();
        decomp.store_mut().point_mut(pt).unwrap().xy = p(1.0, -1.0);
        let err = IsValid::new().execute(decomp.store()).unwrap_err();
        assert!(err.to_string().contains("crosses"), "{err}");
    }
}
