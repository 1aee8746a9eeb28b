pub(crate) mod healthy;
pub(crate) mod summary;
pub(crate) mod types;

pub use healthy::healthiest;
pub use summary::describe;
pub use types::{Attribute, CohortSummary, ReferencePoint, SummaryValue};
