mod report_dto;

pub use report_dto::{
    content_type_from_extension, is_image_type_allowed, CreateReportResponseDto, ImageUpload,
    ReportDraft, ReportPayload,
};
