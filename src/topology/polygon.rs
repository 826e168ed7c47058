use std::collections::BTreeSet;

use super::point::PointId;
use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a polygon in the topology store.
    pub struct PolygonId;
}

/// Data associated with a polygon (a face of the decomposition).
///
/// Holes are the children of `outer_wire`; they are not stored separately.
#[derive(Debug, Clone)]
pub struct PolygonData {
    /// Outer boundary; the root wire for the unbounded polygon.
    pub outer_wire: WireId,
    /// Points inside the polygon with no incident segment.
    pub free_points: BTreeSet<PointId>,
}

impl PolygonData {
    #[must_use]
    pub fn new(outer_wire: WireId) -> Self {
        Self {
            outer_wire,
            free_points: BTreeSet::new(),
        }
    }
}
