use crate::dates::{format_date, month_key, parse_date};
use crate::error::AppError;
use crate::lifecycle;
use crate::model::{
    ReportDraft, ReportPatch, ReportStatus, SupervisionReport, SupervisionTask, TaskDraft,
    TaskPatch, TaskStatus, is_valid_monthly_date,
};
use crate::reports::{self, MonthGroup};
use crate::storage::SupervisionStore;
use serde::Serialize;
use time::Date;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct ReminderEntry<'a> {
    pub task: &'a SupervisionTask,
    pub reported: bool,
}

/// In-memory copy of the store plus the operations the dashboard offers.
///
/// Every mutation goes to the store first; the record it hands back then
/// replaces the local copy.
pub struct Dashboard<S: SupervisionStore> {
    store: S,
    tasks: Vec<SupervisionTask>,
    reports: Vec<SupervisionReport>,
}

impl<S: SupervisionStore> Dashboard<S> {
    pub fn load(store: S) -> Result<Self, AppError> {
        let tasks = store.list_tasks()?;
        let reports = store.list_reports()?;
        debug!(
            tasks = tasks.len(),
            reports = reports.len(),
            "dashboard loaded"
        );
        Ok(Self {
            store,
            tasks,
            reports,
        })
    }

    pub fn tasks(&self) -> &[SupervisionTask] {
        &self.tasks
    }

    pub fn reports(&self) -> &[SupervisionReport] {
        &self.reports
    }

    pub fn task(&self, id: &str) -> Result<&SupervisionTask, AppError> {
        let trimmed_id = required_id(id)?;
        self.tasks
            .iter()
            .find(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::not_found("task not found"))
    }

    pub fn task_name(&self, task_id: &str) -> &str {
        reports::resolve_task_name(task_id, &self.tasks)
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<SupervisionTask, AppError> {
        let draft = normalize_draft(draft)?;
        let task = self.store.create_task(draft)?;
        info!(task_id = %task.id, "task created");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Applies a partial edit. A first change of `deadline` records the old
    /// value as the original deadline.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<SupervisionTask, AppError> {
        let current = self.task(id)?.clone();
        let mut patch = normalize_patch(patch)?;
        if patch.is_empty() {
            return Err(AppError::invalid_input("nothing to update"));
        }

        if let Some(deadline) = patch.deadline.as_deref()
            && deadline != current.deadline
            && current.original_deadline.is_none()
        {
            patch.original_deadline = Some(current.deadline.clone());
        }

        let updated = self.store.update_task(&current.id, &patch)?;
        info!(task_id = %updated.id, "task updated");
        self.replace_task(updated.clone());
        Ok(updated)
    }

    pub fn complete_task(&mut self, id: &str) -> Result<SupervisionTask, AppError> {
        let current = self.task(id)?;
        if current.status == TaskStatus::Completed {
            return Err(AppError::invalid_input("task already completed"));
        }
        let task_id = current.id.clone();

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        let updated = self.store.update_task(&task_id, &patch)?;
        info!(task_id = %updated.id, "task completed");
        self.replace_task(updated.clone());
        Ok(updated)
    }

    /// Removes the task and every report filed against it.
    ///
    /// Reports go first and the local copy follows each store call, so a
    /// failure part way leaves the task in place and the delete can be
    /// retried.
    pub fn delete_task(&mut self, id: &str) -> Result<SupervisionTask, AppError> {
        let task_id = self.task(id)?.id.clone();

        let orphaned: Vec<String> = self
            .reports
            .iter()
            .filter(|report| report.task_id == task_id)
            .map(|report| report.id.clone())
            .collect();
        for report_id in &orphaned {
            self.store.delete_report(report_id)?;
            self.reports.retain(|report| &report.id != report_id);
        }

        let removed = self.store.delete_task(&task_id)?;
        self.tasks.retain(|task| task.id != task_id);

        info!(task_id = %task_id, reports = orphaned.len(), "task deleted");
        Ok(removed)
    }

    pub fn extend_deadline(
        &mut self,
        id: &str,
        new_deadline: &str,
        today: Date,
    ) -> Result<SupervisionTask, AppError> {
        let current = self.task(id)?;
        let extended = lifecycle::extend_deadline(current, new_deadline, today)?;

        let patch = TaskPatch {
            deadline: Some(extended.deadline.clone()),
            original_deadline: extended.original_deadline.clone(),
            new_deadline: extended.new_deadline.clone(),
            status: Some(extended.status),
            ..TaskPatch::default()
        };
        let updated = self.store.update_task(&extended.id, &patch)?;
        info!(
            task_id = %updated.id,
            deadline = %updated.deadline,
            status = updated.status.as_str(),
            "deadline extended"
        );
        self.replace_task(updated.clone());
        Ok(updated)
    }

    /// Files this month's report for a task. A task gets one report per
    /// month; a second submission is refused.
    pub fn add_report(
        &mut self,
        task_id: &str,
        content: &str,
        today: Date,
    ) -> Result<SupervisionReport, AppError> {
        let task_id = self.task(task_id)?.id.clone();
        let content = required_text(content, "report content")?;
        let month = month_key(today);
        if reports::has_report_for_month(&task_id, &month, &self.reports) {
            return Err(AppError::invalid_input(format!(
                "report already filed for {month}"
            )));
        }

        let report = self.store.create_report(ReportDraft {
            task_id,
            month,
            report_content: content,
            status: ReportStatus::Completed,
        })?;
        info!(report_id = %report.id, task_id = %report.task_id, month = %report.month, "report filed");
        self.reports.push(report.clone());
        Ok(report)
    }

    pub fn edit_report(&mut self, id: &str, content: &str) -> Result<SupervisionReport, AppError> {
        let report_id = self.report(id)?.id.clone();
        let patch = ReportPatch {
            report_content: Some(required_text(content, "report content")?),
            status: None,
        };

        let updated = self.store.update_report(&report_id, &patch)?;
        info!(report_id = %updated.id, "report edited");
        if let Some(slot) = self.reports.iter_mut().find(|report| report.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub fn delete_report(&mut self, id: &str) -> Result<SupervisionReport, AppError> {
        let report_id = self.report(id)?.id.clone();
        let removed = self.store.delete_report(&report_id)?;
        self.reports.retain(|report| report.id != report_id);
        info!(report_id = %report_id, "report deleted");
        Ok(removed)
    }

    pub fn delayed_tasks(&self, today: Date) -> Result<Vec<&SupervisionTask>, AppError> {
        lifecycle::delayed_tasks(&self.tasks, today)
    }

    pub fn reminder_entries(&self, today: Date) -> Vec<ReminderEntry<'_>> {
        let month = month_key(today);
        lifecycle::monthly_reminder_tasks(&self.tasks, &self.reports, today)
            .into_iter()
            .map(|task| ReminderEntry {
                task,
                reported: reports::has_report_for_month(&task.id, &month, &self.reports),
            })
            .collect()
    }

    pub fn report_history(&self) -> Vec<MonthGroup<'_>> {
        reports::group_by_month(&self.reports)
    }

    fn report(&self, id: &str) -> Result<&SupervisionReport, AppError> {
        let trimmed_id = required_id(id)?;
        self.reports
            .iter()
            .find(|report| report.id == trimmed_id)
            .ok_or_else(|| AppError::not_found("report not found"))
    }

    fn replace_task(&mut self, updated: SupervisionTask) {
        if let Some(slot) = self.tasks.iter_mut().find(|task| task.id == updated.id) {
            *slot = updated;
        }
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn checked_monthly_date(value: u8) -> Result<u8, AppError> {
    if !is_valid_monthly_date(value) {
        return Err(AppError::invalid_input("monthly date must be between 1 and 31"));
    }
    Ok(value)
}

fn normalized_deadline(value: &str) -> Result<String, AppError> {
    Ok(format_date(parse_date(value)?))
}

fn normalize_draft(draft: TaskDraft) -> Result<TaskDraft, AppError> {
    Ok(TaskDraft {
        task_name: required_text(&draft.task_name, "task name")?,
        department: required_text(&draft.department, "department")?,
        deadline: normalized_deadline(&draft.deadline)?,
        monthly_date: checked_monthly_date(draft.monthly_date)?,
        status: draft.status,
        remarks: draft
            .remarks
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
    })
}

fn normalize_patch(patch: TaskPatch) -> Result<TaskPatch, AppError> {
    Ok(TaskPatch {
        task_name: patch
            .task_name
            .map(|value| required_text(&value, "task name"))
            .transpose()?,
        department: patch
            .department
            .map(|value| required_text(&value, "department"))
            .transpose()?,
        deadline: patch
            .deadline
            .map(|value| normalized_deadline(&value))
            .transpose()?,
        original_deadline: None,
        new_deadline: None,
        monthly_date: patch.monthly_date.map(checked_monthly_date).transpose()?,
        status: patch.status,
        remarks: patch.remarks.map(|value| value.trim().to_string()),
    })
}
