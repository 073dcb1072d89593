mod report;

pub(crate) use report::deserialize_timestamp;
pub use report::{Report, ReportRecord};
