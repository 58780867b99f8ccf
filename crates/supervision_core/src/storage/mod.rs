pub mod json_store;
mod state;

pub use json_store::JsonStore;
pub use state::SupervisionState;

use crate::error::AppError;
use crate::model::{
    ReportDraft, ReportPatch, SupervisionReport, SupervisionTask, TaskDraft, TaskPatch,
};

/// Durable home of tasks and reports.
///
/// Implementations assign `id` and `created_at` on create and answer
/// `not_found` for unknown ids. Referential integrity between reports and
/// tasks is not the store's concern.
pub trait SupervisionStore {
    fn list_tasks(&self) -> Result<Vec<SupervisionTask>, AppError>;

    fn list_reports(&self) -> Result<Vec<SupervisionReport>, AppError>;

    fn create_task(&mut self, draft: TaskDraft) -> Result<SupervisionTask, AppError>;

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<SupervisionTask, AppError>;

    fn delete_task(&mut self, id: &str) -> Result<SupervisionTask, AppError>;

    fn create_report(&mut self, draft: ReportDraft) -> Result<SupervisionReport, AppError>;

    fn update_report(
        &mut self,
        id: &str,
        patch: &ReportPatch,
    ) -> Result<SupervisionReport, AppError>;

    fn delete_report(&mut self, id: &str) -> Result<SupervisionReport, AppError>;
}
