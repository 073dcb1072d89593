//! Client for the flood report service.
//!
//! [`ReportStore`] holds the observable report collection and is changed only
//! through its six operations. [`ReportWorkflowService`] and
//! [`SessionService`] talk to the remote services and mirror each outcome into
//! their stores. [`FloodwatchClient`] wires everything from configuration.

pub mod app;
pub mod core;
pub mod features;
pub mod shared;

pub use app::FloodwatchClient;
pub use crate::core::config::Config;
pub use crate::core::error::{AppError, Result};
pub use crate::core::telemetry::init_tracing;
pub use features::auth::{SessionService, SessionState, SessionStore, UserSession};
pub use features::reports::dtos::{ImageUpload, ReportDraft};
pub use features::reports::{
    Report, ReportCollectionState, ReportRecord, ReportStore, ReportWorkflowService,
};
