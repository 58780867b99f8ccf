use super::SupervisionStore;
use crate::dates::now_timestamp;
use crate::error::AppError;
use crate::model::{
    ReportDraft, ReportPatch, SupervisionReport, SupervisionTask, TaskDraft, TaskPatch,
};
use time::OffsetDateTime;

/// Both collections held in memory, in store order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SupervisionState {
    pub tasks: Vec<SupervisionTask>,
    pub reports: Vec<SupervisionReport>,
}

fn next_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{prefix}-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());
    if !taken(&base) {
        return base;
    }

    let mut suffix = 1u32;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

impl SupervisionStore for SupervisionState {
    fn list_tasks(&self) -> Result<Vec<SupervisionTask>, AppError> {
        Ok(self.tasks.clone())
    }

    fn list_reports(&self) -> Result<Vec<SupervisionReport>, AppError> {
        Ok(self.reports.clone())
    }

    fn create_task(&mut self, draft: TaskDraft) -> Result<SupervisionTask, AppError> {
        let id = next_id("task", |candidate| {
            self.tasks.iter().any(|task| task.id == candidate)
        });
        let task = draft.into_task(id, now_timestamp()?);
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<SupervisionTask, AppError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    fn delete_task(&mut self, id: &str) -> Result<SupervisionTask, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found("task not found"))?;
        Ok(self.tasks.remove(index))
    }

    fn create_report(&mut self, draft: ReportDraft) -> Result<SupervisionReport, AppError> {
        let id = next_id("report", |candidate| {
            self.reports.iter().any(|report| report.id == candidate)
        });
        let report = draft.into_report(id, now_timestamp()?);
        self.reports.push(report.clone());
        Ok(report)
    }

    fn update_report(
        &mut self,
        id: &str,
        patch: &ReportPatch,
    ) -> Result<SupervisionReport, AppError> {
        let report = self
            .reports
            .iter_mut()
            .find(|report| report.id == id)
            .ok_or_else(|| AppError::not_found("report not found"))?;
        patch.apply_to(report);
        Ok(report.clone())
    }

    fn delete_report(&mut self, id: &str) -> Result<SupervisionReport, AppError> {
        let index = self
            .reports
            .iter()
            .position(|report| report.id == id)
            .ok_or_else(|| AppError::not_found("report not found"))?;
        Ok(self.reports.remove(index))
    }
}
