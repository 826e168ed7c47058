mod displacement;

pub use displacement::{CheckDisplacement, MovePoints};
