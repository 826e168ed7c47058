use crate::error::TopologyError;

use super::{HalfEdge, PointId, TopologyStore, WireId};

/// Lazy walk along `next` links from a start half-edge.
///
/// Stops before yielding `end` (the start itself for a full cycle). The walk
/// is bounded by the number of half-edges in the store; exceeding the bound
/// or hitting a dangling link yields an error and ends the iteration.
pub struct HalfEdgeCycle<'a> {
    store: &'a TopologyStore,
    end: Option<HalfEdge>,
    current: Option<HalfEdge>,
    remaining: usize,
}

impl<'a> HalfEdgeCycle<'a> {
    fn new(store: &'a TopologyStore, start: Option<HalfEdge>, end: Option<HalfEdge>) -> Self {
        Self {
            store,
            end: end.or(start),
            current: start,
            remaining: 2 * store.num_segments() + 1,
        }
    }
}

impl Iterator for HalfEdgeCycle<'_> {
    type Item = Result<HalfEdge, TopologyError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        if self.remaining == 0 {
            return Some(Err(TopologyError::InvalidTopology(format!(
                "half-edge walk from {current:?} does not close"
            ))));
        }
        self.remaining -= 1;
        match self.store.next_of(current) {
            Ok(next) => {
                if Some(next) != self.end {
                    self.current = Some(next);
                }
                Some(Ok(current))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Lazy walk around a point over its incoming half-edges.
///
/// Each yielded half-edge `(segment, side)` has the point at
/// `segment.vtxs[side]`. The same loop bound as [`HalfEdgeCycle`] applies.
pub struct PointHalfEdges<'a> {
    store: &'a TopologyStore,
    start: Option<HalfEdge>,
    current: Option<HalfEdge>,
    remaining: usize,
}

impl Iterator for PointHalfEdges<'_> {
    type Item = Result<HalfEdge, TopologyError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        if self.remaining == 0 {
            return Some(Err(TopologyError::InvalidTopology(format!(
                "walk around the vertex of {current:?} does not close"
            ))));
        }
        self.remaining -= 1;
        match self.store.next_of(current) {
            Ok(out) => {
                let incoming = out.opposite();
                if Some(incoming) != self.start {
                    self.current = Some(incoming);
                }
                Some(Ok(current))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl TopologyStore {
    /// Half-edges of a wire in traversal order; empty for the root wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is not found in the store.
    pub fn wire_half_edges(&self, wire: WireId) -> Result<HalfEdgeCycle<'_>, TopologyError> {
        let start = self.wire(wire)?.segment;
        Ok(HalfEdgeCycle::new(self, start, None))
    }

    /// Half-edges from `start` along `next` links, up to but excluding `end`
    /// (or back to `start` when `end` is `None`).
    #[must_use]
    pub fn half_edge_cycle(&self, start: HalfEdge, end: Option<HalfEdge>) -> HalfEdgeCycle<'_> {
        HalfEdgeCycle::new(self, Some(start), end)
    }

    /// Incoming half-edges around a point; empty for a free point.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not found in the store.
    pub fn point_half_edges(&self, point: PointId) -> Result<PointHalfEdges<'_>, TopologyError> {
        let start = self.point(point)?.half_edge();
        Ok(self.half_edges_around(start))
    }

    /// Incoming half-edges around the head of `start`, beginning with `start`.
    #[must_use]
    pub fn half_edges_around(&self, start: Option<HalfEdge>) -> PointHalfEdges<'_> {
        PointHalfEdges {
            store: self,
            start,
            current: start,
            remaining: 2 * self.num_segments() + 1,
        }
    }
}
