mod delete_segment;
mod free_point;
mod new_segment;
mod split_segment;

pub use delete_segment::DeleteSegment;
pub use free_point::{AddFreePoint, RemoveFreePoint};
pub use new_segment::NewSegment;
pub use split_segment::{JoinSegments, SplitSegment};
