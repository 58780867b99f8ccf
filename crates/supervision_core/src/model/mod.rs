mod report;
mod task;

pub use report::{ReportDraft, ReportPatch, ReportStatus, SupervisionReport};
pub use task::{SupervisionTask, TaskDraft, TaskPatch, TaskStatus, is_valid_monthly_date};
