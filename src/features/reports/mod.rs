pub mod clients;
pub mod dtos;
pub mod models;
pub mod services;
pub mod store;

pub use clients::{ReportApi, ReportApiClient};
pub use models::{Report, ReportRecord};
pub use services::ReportWorkflowService;
pub use store::{ReportCollectionState, ReportStore, RequestTicket};
