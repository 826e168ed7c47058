use std::collections::BTreeSet;

use super::polygon::PolygonId;
use super::segment::HalfEdge;

slotmap::new_key_type! {
    /// Unique identifier for a wire in the topology store.
    pub struct WireId;
}

/// Data associated with a wire.
///
/// A wire is a closed chain of half-edges linked through `SegmentData::next`,
/// possibly degenerate (a dendritic tree walked around on both sides). The
/// root wire bounds the unbounded polygon and has neither a segment nor a
/// parent.
#[derive(Debug, Clone)]
pub struct WireData {
    /// Any half-edge of the chain; `None` only for the root wire.
    pub segment: Option<HalfEdge>,
    /// The polygon this wire bounds, as outer boundary or as a hole.
    pub polygon: PolygonId,
    /// The enclosing wire; `None` only for the root wire.
    pub parent: Option<WireId>,
    /// Wires whose parent is this wire.
    pub children: BTreeSet<WireId>,
}

impl WireData {
    /// Creates a detached wire of `polygon` with no half-edges yet.
    #[must_use]
    pub fn new(polygon: PolygonId) -> Self {
        Self {
            segment: None,
            polygon,
            parent: None,
            children: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
