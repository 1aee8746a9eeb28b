pub(crate) mod finder;
pub(crate) mod types;

pub use finder::find_closest;
pub use types::{NeighborSet, QueryPoint};
