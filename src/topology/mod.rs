pub mod point;
pub mod polygon;
pub mod segment;
pub mod splice;
pub mod traverse;
pub mod wire;

pub use point::{Attachment, PointData, PointId};
pub use polygon::{PolygonData, PolygonId};
pub use segment::{HalfEdge, SegmentData, SegmentId, Side};
pub use splice::InsertSlot;
pub use traverse::{HalfEdgeCycle, PointHalfEdges};
pub use wire::{WireData, WireId};

use crate::error::TopologyError;
use crate::math::Point2;
use slotmap::SlotMap;

/// Central arena that owns all entities of a decomposition.
///
/// Entities reference each other via typed IDs (generational indices), which
/// keeps the cyclic point/segment/wire/polygon graph free of shared
/// ownership while allowing in-place editing.
#[derive(Debug)]
pub struct TopologyStore {
    points: SlotMap<PointId, PointData>,
    segments: SlotMap<SegmentId, SegmentData>,
    wires: SlotMap<WireId, WireData>,
    polygons: SlotMap<PolygonId, PolygonData>,
    outer_polygon: PolygonId,
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyStore {
    /// Creates a store holding only the unbounded polygon and its root wire.
    #[must_use]
    pub fn new() -> Self {
        let mut wires = SlotMap::with_key();
        let mut polygons = SlotMap::with_key();
        let root = wires.insert(WireData::new(PolygonId::default()));
        let outer_polygon = polygons.insert(PolygonData::new(root));
        wires[root].polygon = outer_polygon;
        Self {
            points: SlotMap::with_key(),
            segments: SlotMap::with_key(),
            wires,
            polygons,
            outer_polygon,
        }
    }

    /// The unbounded polygon.
    #[must_use]
    pub fn outer_polygon(&self) -> PolygonId {
        self.outer_polygon
    }

    /// The wire bounding the unbounded polygon.
    #[must_use]
    pub fn root_wire(&self) -> WireId {
        self.polygons[self.outer_polygon].outer_wire
    }

    // --- Point operations ---

    /// Inserts a point and returns its ID.
    pub fn add_point(&mut self, data: PointData) -> PointId {
        self.points.insert(data)
    }

    /// Inserts a free point and registers it with `polygon`.
    pub(crate) fn insert_free_point(
        &mut self,
        xy: Point2,
        polygon: PolygonId,
    ) -> Result<PointId, TopologyError> {
        self.polygon(polygon)?;
        let id = self.points.insert(PointData::new(xy, Attachment::Free(polygon)));
        self.polygon_mut(polygon)?.free_points.insert(id);
        Ok(id)
    }

    /// Removes a point from the arena without touching references to it.
    pub(crate) fn remove_point(&mut self, id: PointId) -> Option<PointData> {
        self.points.remove(id)
    }

    /// Returns a reference to the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: PointId) -> Result<&PointData, TopologyError> {
        self.points
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("point {id:?}")))
    }

    /// Returns a mutable reference to the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point_mut(&mut self, id: PointId) -> Result<&mut PointData, TopologyError> {
        self.points
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("point {id:?}")))
    }

    /// Coordinates of a point.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn xy(&self, id: PointId) -> Result<Point2, TopologyError> {
        Ok(self.point(id)?.xy)
    }

    pub fn points(&self) -> impl Iterator<Item = (PointId, &PointData)> {
        self.points.iter()
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    // --- Segment operations ---

    /// Inserts a segment built from its own ID and returns that ID.
    pub(crate) fn add_segment_with(
        &mut self,
        f: impl FnOnce(SegmentId) -> SegmentData,
    ) -> SegmentId {
        self.segments.insert_with_key(f)
    }

    pub(crate) fn remove_segment(&mut self, id: SegmentId) -> Option<SegmentData> {
        self.segments.remove(id)
    }

    /// Returns a reference to the segment data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn segment(&self, id: SegmentId) -> Result<&SegmentData, TopologyError> {
        self.segments
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("segment {id:?}")))
    }

    /// Returns a mutable reference to the segment data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn segment_mut(&mut self, id: SegmentId) -> Result<&mut SegmentData, TopologyError> {
        self.segments
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("segment {id:?}")))
    }

    /// End points `[out, in]` of a segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment or one of its points is missing.
    pub fn segment_points(&self, id: SegmentId) -> Result<[Point2; 2], TopologyError> {
        let seg = self.segment(id)?;
        Ok([self.xy(seg.vtxs[0])?, self.xy(seg.vtxs[1])?])
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &SegmentData)> {
        self.segments.iter()
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    // --- Half-edge helpers ---

    /// Successor of a half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found in the store.
    pub fn next_of(&self, he: HalfEdge) -> Result<HalfEdge, TopologyError> {
        Ok(self.segment(he.segment)?.next(he.side))
    }

    /// Wire a half-edge belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found in the store.
    pub fn wire_of(&self, he: HalfEdge) -> Result<WireId, TopologyError> {
        Ok(self.segment(he.segment)?.wire(he.side))
    }

    /// Point a half-edge arrives at.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is not found in the store.
    pub fn head_of(&self, he: HalfEdge) -> Result<PointId, TopologyError> {
        Ok(self.segment(he.segment)?.vtx(he.side))
    }

    // --- Wire operations ---

    /// Inserts a wire and returns its ID.
    pub fn add_wire(&mut self, data: WireData) -> WireId {
        self.wires.insert(data)
    }

    pub(crate) fn remove_wire(&mut self, id: WireId) -> Option<WireData> {
        self.wires.remove(id)
    }

    /// Returns a reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> Result<&WireData, TopologyError> {
        self.wires
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("wire {id:?}")))
    }

    /// Returns a mutable reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire_mut(&mut self, id: WireId) -> Result<&mut WireData, TopologyError> {
        self.wires
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("wire {id:?}")))
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireId, &WireData)> {
        self.wires.iter()
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    // --- Polygon operations ---

    /// Inserts a polygon and returns its ID.
    pub fn add_polygon(&mut self, data: PolygonData) -> PolygonId {
        self.polygons.insert(data)
    }

    pub(crate) fn remove_polygon(&mut self, id: PolygonId) -> Option<PolygonData> {
        self.polygons.remove(id)
    }

    /// Returns a reference to the polygon data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn polygon(&self, id: PolygonId) -> Result<&PolygonData, TopologyError> {
        self.polygons
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("polygon {id:?}")))
    }

    /// Returns a mutable reference to the polygon data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn polygon_mut(&mut self, id: PolygonId) -> Result<&mut PolygonData, TopologyError> {
        self.polygons
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("polygon {id:?}")))
    }

    pub fn polygons(&self) -> impl Iterator<Item = (PolygonId, &PolygonData)> {
        self.polygons.iter()
    }

    #[must_use]
    pub fn num_polygons(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if `wire` is the outer boundary of its polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire or its polygon is not found in the store.
    pub fn is_outer_wire(&self, wire: WireId) -> Result<bool, TopologyError> {
        let polygon = self.wire(wire)?.polygon;
        Ok(self.polygon(polygon)?.outer_wire == wire)
    }
}
