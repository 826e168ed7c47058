use super::point::PointId;
use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a segment in the topology store.
    pub struct SegmentId;
}

/// One side of a directed segment.
///
/// The side index doubles as a vertex index: `Right` is the out-vertex
/// (index 0) and `Left` the in-vertex (index 1). The half-edge on side `s`
/// ends at `vtxs[s]` and its successor `next[s]` continues through that
/// vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Right = 0,
    Left = 1,
}

impl Side {
    /// Vertex the segment leaves from.
    pub const OUT: Side = Side::Right;
    /// Vertex the segment arrives at.
    pub const IN: Side = Side::Left;
    /// Both sides, in index order.
    pub const BOTH: [Side; 2] = [Side::Right, Side::Left];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
        }
    }
}

/// A segment traversed along one of its sides.
///
/// The face on `side` of the segment lies to the left of the traversal, so
/// wires enclosing a face run counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdge {
    /// The segment identifier.
    pub segment: SegmentId,
    /// The side of the segment being traversed.
    pub side: Side,
}

impl HalfEdge {
    /// Creates a new half-edge.
    #[must_use]
    pub fn new(segment: SegmentId, side: Side) -> Self {
        Self { segment, side }
    }

    /// The half-edge on the other side of the same segment.
    #[must_use]
    pub fn opposite(self) -> Self {
        Self::new(self.segment, self.side.opposite())
    }
}

/// Data associated with a segment.
#[derive(Debug, Clone)]
pub struct SegmentData {
    /// `[out_vertex, in_vertex]`.
    pub vtxs: [PointId; 2],
    /// Wire bordering each side, indexed by [`Side::index`].
    pub wire: [WireId; 2],
    /// Successor of each side's half-edge.
    pub next: [HalfEdge; 2],
}

impl SegmentData {
    #[must_use]
    pub fn vtx(&self, side: Side) -> PointId {
        self.vtxs[side.index()]
    }

    #[must_use]
    pub fn wire(&self, side: Side) -> WireId {
        self.wire[side.index()]
    }

    #[must_use]
    pub fn next(&self, side: Side) -> HalfEdge {
        self.next[side.index()]
    }

    /// A segment is a dendrite when both of its sides border the same wire.
    #[must_use]
    pub fn is_dendrite(&self) -> bool {
        self.wire[0] == self.wire[1]
    }
}
