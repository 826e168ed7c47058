mod containment;
mod hierarchy;
mod insert_slot;
mod is_valid;
mod snap;

pub use containment::{PolygonContainsPoint, WireContainsPoint, WireContainsWire};
pub use hierarchy::{ChildPolygons, PolygonDepth, PolygonVertices};
pub use insert_slot::InsertVector;
pub use is_valid::IsValid;
pub use snap::{Snap, SnapPoint};
