pub(crate) mod counter;
pub(crate) mod types;

pub use counter::PhylumCounter;
pub use types::{GenusRecord, PhylumProfile};
