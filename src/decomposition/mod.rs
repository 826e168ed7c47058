
use tracing::debug;

use crate::change::PolygonChange;
use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::{point_at, segment_intersection};
use crate::math::{Point2, Vector2, DEFAULT_SNAP_TOLERANCE};
use crate::operations::modification::{
    AddFreePoint, DeleteSegment, JoinSegments, NewSegment, RemoveFreePoint, SplitSegment,
};
use crate::operations::query::{
    ChildPolygons, InsertVector, IsValid, PolygonContainsPoint, PolygonDepth, PolygonVertices,
    Snap, SnapPoint,
};
use crate::operations::transform::{CheckDisplacement, MovePoints};
use crate::topology::{
    HalfEdgeCycle, InsertSlot, PointHalfEdges, PointId, PolygonId, SegmentId, Side,
    TopologyStore, WireId,
};

/// Parameters controlling snapping and dragging.
#[derive(Debug, Clone, Copy)]
pub struct DecompositionParams {
    /// Distance within which a coordinate snaps to existing geometry.
    pub tolerance: f64,
    /// Fraction of the admissible step kept free when shortening a drag.
    pub displacement_margin: f64,
}

impl Default for DecompositionParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_SNAP_TOLERANCE,
            displacement_margin: 0.1,
        }
    }
}

impl DecompositionParams {
    fn validate(&self) -> Result<()> {
        check_tolerance(self.tolerance)?;
        if !(0.0..1.0).contains(&self.displacement_margin) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "displacement_margin",
                value: self.displacement_margin,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        Ok(())
    }
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance > 0.0 && tolerance.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: "tolerance",
            value: tolerance,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into())
    }
}

/// Planar subdivision of the plane into polygons, edited incrementally.
///
/// This is the editing facade over [`TopologyStore`]. It resolves raw
/// coordinates to points, segments and polygons and splits crossed segments.
/// It also remembers the polygon change of the last mutation.
#[derive(Debug)]
pub struct Decomposition {
    store: TopologyStore,
    params: DecompositionParams,
    last_change: PolygonChange,
}

impl Default for Decomposition {
    fn default() -> Self {
        Self::new()
    }
}

impl Decomposition {
    /// Creates an empty decomposition holding only the unbounded polygon.
    #[must_use]
    pub fn new() -> Self {
        let store = TopologyStore::new();
        let outer = store.outer_polygon();
        Self {
            store,
            params: DecompositionParams::default(),
            last_change: PolygonChange::Add {
                outer,
                inner: outer,
            },
        }
    }

    /// Creates an empty decomposition with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` for a non-positive
    /// tolerance or a margin outside `[0, 1)`.
    pub fn with_params(params: DecompositionParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::new()
        })
    }

    /// Changes the snap tolerance, typically after a zoom.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` for a non-positive value.
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<()> {
        check_tolerance(tolerance)?;
        self.params.tolerance = tolerance;
        Ok(())
    }

    #[must_use]
    pub fn params(&self) -> &DecompositionParams {
        &self.params
    }

    /// Read access to the underlying entity store.
    #[must_use]
    pub fn store(&self) -> &TopologyStore {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut TopologyStore {
        &mut self.store
    }

    /// Polygon change caused by the last mutation.
    #[must_use]
    pub fn last_change(&self) -> &PolygonChange {
        &self.last_change
    }

    // --- Editing ---

    /// Resolves a coordinate to a point, creating one if needed.
    ///
    /// Snaps to an existing point, splits a segment the coordinate lies on,
    /// or adds a free point to the polygon containing it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store is inconsistent.
    pub fn add_point(&mut self, xy: Point2) -> Result<PointId> {
        match self.snap_point(xy)? {
            Snap::Point(pt) => Ok(pt),
            Snap::Segment { segment, t } => self.point_on_segment(segment, t),
            Snap::Polygon(polygon) => {
                let pt = self.store.insert_free_point(xy, polygon)?;
                self.last_change = PolygonChange::None;
                debug!(?pt, ?polygon, "free point added");
                Ok(pt)
            }
        }
    }

    /// Adds the polyline from `a` to `b`, splitting every segment it crosses.
    ///
    /// Points already lying on the line within tolerance, free or attached,
    /// become vertices of the polyline. Returns the new segments in order
    /// from `a` to `b`; segments that were only split are not listed. Empty
    /// if both ends snap to the same point.
    ///
    /// # Errors
    ///
    /// Returns an error if a split produces degenerate geometry or the store
    /// is inconsistent.
    pub fn add_line(&mut self, a: Point2, b: Point2) -> Result<Vec<SegmentId>> {
        let a_pt = self.add_point(a)?;
        let b_pt = self.add_point(b)?;
        if a_pt == b_pt {
            return Ok(Vec::new());
        }
        let a = self.store.xy(a_pt)?;
        let b = self.store.xy(b_pt)?;
        let d = b - a;

        let mut mids = Vec::new();
        for (id, pt) in self.store.points() {
            if id == a_pt || id == b_pt {
                continue;
            }
            let t = (pt.xy - a).dot(&d) / d.norm_squared();
            if t > 0.0 && t < 1.0 && pt.colocated(&point_at(&a, &b, t), self.params.tolerance) {
                mids.push((t, id));
            }
        }
        let mut hits = Vec::new();
        for (id, _) in self.store.segments() {
            let [p0, p1] = self.store.segment_points(id)?;
            if let Some((t0, t1)) = segment_intersection(&p0, &p1, &a, &b) {
                hits.push((t1, id, t0));
            }
        }
        for (t1, seg, t0) in hits {
            mids.push((t1, self.point_on_segment(seg, t0)?));
        }
        mids.sort_by(|l, r| l.0.total_cmp(&r.0));

        // A vertex on the line shows up once per incident crossed segment.
        let mut visited = vec![a_pt, b_pt];
        let mut segments = Vec::new();
        let mut start = a_pt;
        for (_, mid) in mids {
            if visited.contains(&mid) {
                continue;
            }
            visited.push(mid);
            segments.push(self.new_segment(start, mid)?);
            start = mid;
        }
        segments.push(self.new_segment(start, b_pt)?);
        debug!(count = segments.len(), "line added");
        Ok(segments)
    }

    /// Connects two existing points; see [`NewSegment`].
    ///
    /// # Errors
    ///
    /// Returns an error if the points coincide, lie in different polygons,
    /// or are unknown.
    pub fn new_segment(&mut self, a: PointId, b: PointId) -> Result<SegmentId> {
        let (seg, change) = NewSegment::new(a, b).execute(&mut self.store)?;
        self.last_change = change;
        Ok(seg)
    }

    /// Removes a segment; see [`DeleteSegment`].
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is unknown.
    pub fn delete_segment(&mut self, segment: SegmentId) -> Result<()> {
        self.last_change = DeleteSegment::new(segment).execute(&mut self.store)?;
        Ok(())
    }

    /// Removes a point together with all segments ending at it.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is unknown.
    pub fn delete_point(&mut self, point: PointId) -> Result<()> {
        let mut segments: Vec<SegmentId> = Vec::new();
        for he in self.store.point_half_edges(point)? {
            let seg = he?.segment;
            if !segments.contains(&seg) {
                segments.push(seg);
            }
        }
        for seg in segments {
            self.delete_segment(seg)?;
        }
        RemoveFreePoint::new(point).execute(&mut self.store)
    }

    /// Splits a segment at parameter `t`, returning the new point.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < t < 1` or if the segment is unknown.
    pub fn split_segment(&mut self, segment: SegmentId, t: f64) -> Result<PointId> {
        let (mid, _, change) = SplitSegment::new(segment, t).execute(&mut self.store)?;
        self.last_change = change;
        Ok(mid)
    }

    /// Removes a point of degree two, merging its segments.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly two segments meet at the point.
    pub fn join_segments(&mut self, point: PointId) -> Result<SegmentId> {
        let (seg, change) = JoinSegments::new(point).execute(&mut self.store)?;
        self.last_change = change;
        Ok(seg)
    }

    /// Adds a free point to a given polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates lie outside the polygon.
    pub fn add_free_point(&mut self, xy: Point2, polygon: PolygonId) -> Result<PointId> {
        let pt = AddFreePoint::new(xy, polygon).execute(&mut self.store)?;
        self.last_change = PolygonChange::None;
        Ok(pt)
    }

    /// Removes a point with no segments.
    ///
    /// # Errors
    ///
    /// Returns an error if segments still end at the point.
    pub fn remove_free_point(&mut self, point: PointId) -> Result<()> {
        RemoveFreePoint::new(point).execute(&mut self.store)
    }

    /// Shortens `vector` so that moving `points` by it crosses no segment.
    ///
    /// # Errors
    ///
    /// Returns an error if a point is unknown.
    pub fn check_displacement(&mut self, points: &[PointId], vector: Vector2) -> Result<Vector2> {
        let (allowed, change) =
            CheckDisplacement::new(points, vector, self.params.displacement_margin)
                .execute(&self.store)?;
        self.last_change = change;
        Ok(allowed)
    }

    /// Moves points without any check; pair with
    /// [`check_displacement`](Self::check_displacement).
    ///
    /// # Errors
    ///
    /// Returns an error if a point is unknown.
    pub fn move_points(&mut self, points: &[PointId], vector: Vector2) -> Result<()> {
        MovePoints::new(points, vector).execute(&mut self.store)
    }

    fn point_on_segment(&mut self, segment: SegmentId, t: f64) -> Result<PointId> {
        let tol = self.params.tolerance;
        if t < tol {
            return Ok(self.store.segment(segment)?.vtx(Side::OUT));
        }
        if t > 1.0 - tol {
            return Ok(self.store.segment(segment)?.vtx(Side::IN));
        }
        self.split_segment(segment, t)
    }

    // --- Queries ---

    /// Locates a coordinate; see [`SnapPoint`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the store is inconsistent.
    pub fn snap_point(&self, xy: Point2) -> Result<Snap> {
        SnapPoint::new(xy, self.params.tolerance).execute(&self.store)
    }

    /// Angular slot for a new segment leaving `point` along `vector`.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero vector or an unknown point.
    pub fn insert_vector(&self, point: PointId, vector: Vector2) -> Result<Option<InsertSlot>> {
        InsertVector::new(point, vector).execute(&self.store)
    }

    /// The unbounded polygon.
    #[must_use]
    pub fn outer_polygon(&self) -> PolygonId {
        self.store.outer_polygon()
    }

    /// Outer boundary of a polygon; `None` for the unbounded polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is unknown.
    pub fn polygon_boundary(&self, polygon: PolygonId) -> Result<Option<WireId>> {
        let wire = self.store.polygon(polygon)?.outer_wire;
        Ok((wire != self.store.root_wire()).then_some(wire))
    }

    /// Hole wires of a polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is unknown.
    pub fn holes(&self, polygon: PolygonId) -> Result<Vec<WireId>> {
        let outer = self.store.polygon(polygon)?.outer_wire;
        Ok(self.store.wire(outer)?.children.iter().copied().collect())
    }

    /// The polygon and all polygons nested inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is unknown.
    pub fn child_polygons(&self, polygon: PolygonId) -> Result<Vec<PolygonId>> {
        ChildPolygons::new(polygon).execute(&self.store)
    }

    /// Number of polygons enclosing `polygon`.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is unknown.
    pub fn polygon_depth(&self, polygon: PolygonId) -> Result<usize> {
        PolygonDepth::new(polygon).execute(&self.store)
    }

    /// Outer boundary points of a polygon in counter-clockwise order.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is unknown.
    pub fn polygon_vertices(&self, polygon: PolygonId) -> Result<Vec<PointId>> {
        PolygonVertices::new(polygon).execute(&self.store)
    }

    /// Whether `xy` lies inside `polygon` and outside its holes.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon is unknown.
    pub fn polygon_contains_point(&self, polygon: PolygonId, xy: Point2) -> Result<bool> {
        PolygonContainsPoint::new(polygon, xy).execute(&self.store)
    }

    /// Half-edges of a wire in traversal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire is unknown.
    pub fn wire_half_edges(&self, wire: WireId) -> Result<HalfEdgeCycle<'_>> {
        Ok(self.store.wire_half_edges(wire)?)
    }

    /// Incoming half-edges around a point.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is unknown.
    pub fn point_half_edges(&self, point: PointId) -> Result<PointHalfEdges<'_>> {
        Ok(self.store.point_half_edges(point)?)
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.store.num_points()
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.store.num_segments()
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.store.num_wires()
    }

    #[must_use]
    pub fn num_polygons(&self) -> usize {
        self.store.num_polygons()
    }

    /// Runs the full consistency check; see [`IsValid`].
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidTopology` on the first violation.
    pub fn check_consistency(&self) -> Result<()> {
        IsValid::new().execute(&self.store)
    }
}
