mod report_api_client;

pub use report_api_client::{ReportApi, ReportApiClient};
