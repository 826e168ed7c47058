pub mod change;
pub mod decomposition;
pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use change::PolygonChange;
pub use decomposition::{Decomposition, DecompositionParams};
pub use error::{DecompError, Result};
pub use operations::query::Snap;
