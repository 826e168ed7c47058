use crate::topology::PolygonId;

/// How the polygons of a decomposition changed during the last mutation.
///
/// Forwarded to rendering layers so they can refresh only what moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolygonChange {
    /// No polygon changed (existing segment, isolated wire, free point).
    None,
    /// The listed polygons changed shape but kept their identity.
    Shape(Vec<PolygonId>),
    /// `inner` was created inside a hole of `outer`.
    Add { outer: PolygonId, inner: PolygonId },
    /// `inner`, nested in `outer`, was merged into `outer`.
    Remove { outer: PolygonId, inner: PolygonId },
    /// `new` was cut off `original`; neither contains the other.
    Split { original: PolygonId, new: PolygonId },
    /// `removed` was merged into its sibling `original`.
    Join {
        original: PolygonId,
        removed: PolygonId,
    },
}

impl PolygonChange {
    /// Shape change over one polygon.
    #[must_use]
    pub fn shape(polygon: PolygonId) -> Self {
        Self::Shape(vec![polygon])
    }

    /// Shape change over several polygons, deduplicated in first-seen order.
    #[must_use]
    pub fn shape_of(polygons: impl IntoIterator<Item = PolygonId>) -> Self {
        let mut list: Vec<PolygonId> = Vec::new();
        for polygon in polygons {
            if !list.contains(&polygon) {
                list.push(polygon);
            }
        }
        Self::Shape(list)
    }

    /// Short name of the change kind, used in log events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shape(_) => "shape",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Split { .. } => "split",
            Self::Join { .. } => "join",
        }
    }
}
