pub(crate) mod loader;
pub(crate) mod types;

pub use loader::{Dataset, LoadOptions, DEFAULT_SUBSAMPLE};
pub use types::{
    Condition, Diagnosis, Flag, Frequency, MetadataRecord, MetadataTable, SampleTable, Sex,
};
