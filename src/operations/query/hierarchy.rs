use crate::error::Result;
use crate::topology::{PointId, PolygonId, TopologyStore, WireId};

/// Collects a polygon together with every polygon nested inside it.
pub struct ChildPolygons {
    polygon: PolygonId,
}

impl ChildPolygons {
    /// Creates a new `ChildPolygons` query.
    #[must_use]
    pub fn new(polygon: PolygonId) -> Self {
        Self { polygon }
    }

    /// Executes the query. The polygon itself comes first.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon or one of its wires is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<PolygonId>> {
        let mut result = vec![self.polygon];
        let mut stack: Vec<WireId> = vec![store.polygon(self.polygon)?.outer_wire];
        while let Some(wire) = stack.pop() {
            for &child in &store.wire(wire)?.children {
                if store.is_outer_wire(child)? {
                    result.push(store.wire(child)?.polygon);
                }
                stack.push(child);
            }
        }
        Ok(result)
    }
}

/// Number of polygons enclosing a polygon; zero for the unbounded polygon.
pub struct PolygonDepth {
    polygon: PolygonId,
}

impl PolygonDepth {
    /// Creates a new `PolygonDepth` query.
    #[must_use]
    pub fn new(polygon: PolygonId) -> Self {
        Self { polygon }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon or one of its ancestors is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<usize> {
        let mut depth = 0;
        let mut wire = store.wire(store.polygon(self.polygon)?.outer_wire)?.parent;
        while let Some(id) = wire {
            // Each enclosing polygon contributes the hole we sit in.
            if !store.is_outer_wire(id)? {
                depth += 1;
            }
            wire = store.wire(id)?.parent;
        }
        Ok(depth)
    }
}

/// Points of a polygon's outer boundary in counter-clockwise order.
///
/// Dendrite points appear once per visit. Empty for the unbounded polygon.
pub struct PolygonVertices {
    polygon: PolygonId,
}

impl PolygonVertices {
    /// Creates a new `PolygonVertices` query.
    #[must_use]
    pub fn new(polygon: PolygonId) -> Self {
        Self { polygon }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon or its boundary is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<PointId>> {
        let outer = store.polygon(self.polygon)?.outer_wire;
        store
            .wire_half_edges(outer)?
            .map(|he| Ok(store.head_of(he?)?))
            .collect()
    }
}
