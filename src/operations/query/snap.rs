use tracing::trace;

use crate::error::Result;
use crate::math::intersect_2d::{point_at, project_along_axis, x_line_intersections};
use crate::math::Point2;
use crate::topology::{PointId, PolygonId, SegmentId, Side, TopologyStore};

use super::insert_slot::InsertVector;

/// Result of point location: the lowest-dimensional entity within tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Snap {
    /// Coincides with an existing point.
    Point(PointId),
    /// Lies on a segment at parameter `t` (measured from its out-vertex).
    Segment { segment: SegmentId, t: f64 },
    /// Falls inside a polygon, away from any point or segment.
    Polygon(PolygonId),
}

impl Snap {
    /// Dimension of the snapped entity: 0, 1 or 2.
    #[must_use]
    pub fn dim(&self) -> u8 {
        match self {
            Snap::Point(_) => 0,
            Snap::Segment { .. } => 1,
            Snap::Polygon(_) => 2,
        }
    }

    #[must_use]
    pub fn point(&self) -> Option<PointId> {
        match *self {
            Snap::Point(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn polygon(&self) -> Option<PolygonId> {
        match *self {
            Snap::Polygon(id) => Some(id),
            _ => None,
        }
    }
}

/// Locates a query coordinate within the decomposition.
///
/// Every segment is intersected with the horizontal line through the query;
/// the crossings nearest on the left and on the right are tried for
/// snapping first, then every other segment. The nearest right crossing
/// decides the containing polygon. Free points of that polygon are checked
/// last.
pub struct SnapPoint {
    xy: Point2,
    tolerance: f64,
}

struct Crossing {
    x: f64,
    segment: SegmentId,
}

impl SnapPoint {
    /// Creates a new `SnapPoint` query.
    #[must_use]
    pub fn new(xy: Point2, tolerance: f64) -> Self {
        Self { xy, tolerance }
    }

    /// Executes the query. Always resolves to some entity.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store is internally inconsistent.
    pub fn execute(&self, store: &TopologyStore) -> Result<Snap> {
        let mut crossings = Vec::new();
        for (id, seg) in store.segments() {
            let a = store.xy(seg.vtx(Side::OUT))?;
            let b = store.xy(seg.vtx(Side::IN))?;
            for x in x_line_intersections(&a, &b, &self.xy, self.tolerance) {
                crossings.push(Crossing { x, segment: id });
            }
        }
        crossings.sort_by(|l, r| l.x.total_cmp(&r.x).then(l.segment.cmp(&r.segment)));
        let (before, after) = crossings.split_at(crossings.partition_point(|c| c.x < self.xy.x));

        // Segments meeting at a vertex or ending a horizontal extent share
        // the nearest abscissa; every one of them is a candidate.
        let left_x = before.last().map(|c| c.x);
        let right_x = after.first().map(|c| c.x);
        let nearest = before
            .iter()
            .rev()
            .take_while(|c| Some(c.x) == left_x)
            .chain(after.iter().take_while(|c| Some(c.x) == right_x));
        for crossing in nearest {
            if let Some(snap) = self.snap_to_segment(store, crossing.segment)? {
                return Ok(snap);
            }
        }
        for (id, _) in store.segments() {
            if let Some(snap) = self.snap_to_segment(store, id)? {
                return Ok(snap);
            }
        }

        let polygon = match after.first() {
            Some(crossing) => self.polygon_left_of(store, crossing)?,
            None => store.outer_polygon(),
        };
        self.snap_to_polygon(store, polygon)
    }

    fn snap_to_segment(&self, store: &TopologyStore, segment: SegmentId) -> Result<Option<Snap>> {
        let seg = store.segment(segment)?;
        let [a, b] = store.segment_points(segment)?;
        let Some(t) = project_along_axis(&a, &b, &self.xy, self.tolerance) else {
            return Ok(None);
        };
        let on_segment = point_at(&a, &b, t);
        for side in [Side::OUT, Side::IN] {
            let vtx = seg.vtx(side);
            if store.point(vtx)?.colocated(&on_segment, self.tolerance) {
                trace!(?vtx, "snapped to point");
                return Ok(Some(Snap::Point(vtx)));
            }
        }
        trace!(?segment, t, "snapped to segment");
        Ok(Some(Snap::Segment { segment, t }))
    }

    /// Polygon on the query's side of the nearest crossing to its right.
    fn polygon_left_of(&self, store: &TopologyStore, crossing: &Crossing) -> Result<PolygonId> {
        let seg = store.segment(crossing.segment)?;
        let [a, b] = store.segment_points(crossing.segment)?;

        // The ray meets the segment at (or next to) a vertex: the sector of
        // that vertex facing the query decides.
        let vertex = if (b.y - a.y).abs() < self.tolerance {
            Some(if (a.x - crossing.x).abs() <= (b.x - crossing.x).abs() {
                Side::OUT
            } else {
                Side::IN
            })
        } else if (self.xy.y - a.y).abs() < self.tolerance {
            Some(Side::OUT)
        } else if (self.xy.y - b.y).abs() < self.tolerance {
            Some(Side::IN)
        } else {
            None
        };

        let wire = match vertex {
            Some(side) => {
                let vtx = seg.vtx(side);
                let direction = self.xy - store.xy(vtx)?;
                match InsertVector::new(vtx, direction).execute(store)? {
                    Some(slot) => slot.wire,
                    None => seg.wire(Side::Left),
                }
            }
            None => {
                let side = if b.y > a.y { Side::Left } else { Side::Right };
                seg.wire(side)
            }
        };
        Ok(store.wire(wire)?.polygon)
    }

    fn snap_to_polygon(&self, store: &TopologyStore, polygon: PolygonId) -> Result<Snap> {
        for &pt in &store.polygon(polygon)?.free_points {
            if store.point(pt)?.colocated(&self.xy, self.tolerance) {
                trace!(?pt, "snapped to free point");
                return Ok(Snap::Point(pt));
            }
        }
        trace!(?polygon, "located in polygon");
        Ok(Snap::Polygon(polygon))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decomposition::{Decomposition, DecompositionParams};
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn snap(decomp: &Decomposition, x: f64, y: f64) -> Snap {
        SnapPoint::new(p(x, y), 0.01).execute(decomp.store()).unwrap()
    }

    #[test]
    fn empty_decomposition_snaps_to_outer_polygon() {
        let decomp = Decomposition::new();
        assert_eq!(
            snap(&decomp, 3.0, 4.0),
            Snap::Polygon(decomp.store().outer_polygon())
        );
    }

    #[test]
    fn snaps_to_free_points() {
        let mut decomp = Decomposition::new();
        let a = decomp.add_point(p(0.0, 0.0)).unwrap();
        let b = decomp.add_point(p(1.0, 0.0)).unwrap();
        assert_eq!(snap(&decomp, 0.0, 5e-3), Snap::Point(a));
        assert_eq!(snap(&decomp, 5e-3, 5e-3), Snap::Point(a));
        assert_eq!(snap(&decomp, 1.0 + 5e-3, 5e-3), Snap::Point(b));
    }

    #[test]
    fn snaps_to_segments_and_their_ends() {
        let mut decomp = Decomposition::new();
        let sg_c = decomp.add_line(p(0.0, 0.0), p(1.0, 0.0)).unwrap()[0];
        let sg_d = decomp.add_line(p(0.0, 0.0), p(0.0, 1.0)).unwrap()[0];
        decomp.add_line(p(2.0, 0.0), p(3.0, 1.0)).unwrap();
        let pt_b = decomp.store().segment(sg_c).unwrap().vtx(Side::IN);

        match snap(&decomp, 0.5, 5e-3) {
            Snap::Segment { segment, t } => {
                assert_eq!(segment, sg_c);
                assert_abs_diff_eq!(t, 0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        match snap(&decomp, 5e-3, 0.3) {
            Snap::Segment { segment, t } => {
                assert_eq!(segment, sg_d);
                assert_abs_diff_eq!(t, 0.3, epsilon = 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(snap(&decomp, 1.0 + 5e-3, 5e-3), Snap::Point(pt_b));
    }

    #[test]
    fn locates_polygons_through_vertex_aligned_rays() {
        let mut decomp = Decomposition::new();
        // Diamond: the horizontal ray through its centre hits two vertices.
        decomp.add_line(p(0.0, -1.0), p(1.0, 0.0)).unwrap();
        decomp.add_line(p(1.0, 0.0), p(0.0, 1.0)).unwrap();
        decomp.add_line(p(0.0, 1.0), p(-1.0, 0.0)).unwrap();
        decomp.add_line(p(-1.0, 0.0), p(0.0, -1.0)).unwrap();
        let outer = decomp.store().outer_polygon();

        let inside = snap(&decomp, 0.0, 0.0).polygon().unwrap();
        assert_ne!(inside, outer);
        assert_eq!(snap(&decomp, 0.0, 0.5).polygon(), Some(inside));
        assert_eq!(snap(&decomp, -3.0, 0.0).polygon(), Some(outer));
        assert_eq!(snap(&decomp, 3.0, 0.0).polygon(), Some(outer));
        assert_eq!(snap(&decomp, 0.9, 0.9).polygon(), Some(outer));
    }

    #[test]
    fn horizontal_edges_resolve_by_vertex_sector() {
        let mut decomp = Decomposition::new();
        // Square whose top edge lies on the query line.
        decomp.add_line(p(0.0, 0.0), p(2.0, 0.0)).unwrap();
        decomp.add_line(p(2.0, 0.0), p(2.0, 2.0)).unwrap();
        decomp.add_line(p(2.0, 2.0), p(0.0, 2.0)).unwrap();
        decomp.add_line(p(0.0, 2.0), p(0.0, 0.0)).unwrap();
        let outer = decomp.store().outer_polygon();
        assert_eq!(snap(&decomp, -1.0, 2.005).polygon(), Some(outer));
        let inside = snap(&decomp, 1.0, 1.0).polygon().unwrap();
        assert_ne!(inside, outer);
    }

    #[test]
    fn tied_crossings_are_all_tried() {
        let params = DecompositionParams {
            tolerance: 1e-6,
            ..DecompositionParams::default()
        };
        let mut decomp = Decomposition::with_params(params).unwrap();
        decomp.add_line(p(5.0, 5.0), p(0.0, 1.0)).unwrap();
        decomp.add_line(p(2.0, 5.0), p(5.0, 5.0)).unwrap();
        decomp.add_line(p(3.0, 5.0), p(5.0, 1.0)).unwrap();
        decomp.check_consistency().unwrap();

        // Three segments cross the query line at x = 3 and two at x = 5.
        let Snap::Segment { segment, t } = decomp.snap_point(p(4.0, 5.0)).unwrap() else {
            panic!("expected a segment snap");
        };
        let [a, b] = decomp.store().segment_points(segment).unwrap();
        assert_abs_diff_eq!(a.y, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.y, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.x.min(b.x), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.x.max(b.x), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(point_at(&a, &b, t).x, 4.0, epsilon = 1e-12);

        let segments = decomp.num_segments();
        let pt = decomp.add_point(p(4.0, 5.0)).unwrap();
        assert_eq!(decomp.num_segments(), segments + 1);
        assert!(decomp.store().point(pt).unwrap().polygon().is_none());
        decomp.check_consistency().unwrap();
    }
}
