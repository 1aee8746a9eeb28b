pub(crate) mod reader;
pub(crate) mod writer;

pub use reader::{read_genera, OrdinationRow};
pub use writer::{
    open_output, write_error_line, write_json_line, write_ordination, write_reference, write_view,
    ReportFormat,
};
