mod report_workflow_service;

pub use report_workflow_service::ReportWorkflowService;
