//! Classification of supervision tasks against a given day.
//!
//! Nothing here reads a clock: callers pass `today` so that the same
//! inputs always produce the same answer.

use crate::dates::{days_in_month, format_date, month_key, parse_date};
use crate::error::AppError;
use crate::model::{SupervisionReport, SupervisionTask, TaskStatus};
use crate::reports::has_report_for_month;
use serde::Serialize;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Completed,
    Delayed,
    OnTrack,
}

impl Standing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Delayed => "delayed",
            Self::OnTrack => "on_track",
        }
    }
}

/// The date lateness is judged against: the first committed deadline when
/// the task has been extended, otherwise the live one.
pub fn effective_deadline(task: &SupervisionTask) -> &str {
    task.original_deadline.as_deref().unwrap_or(&task.deadline)
}

pub fn is_delayed(task: &SupervisionTask, today: Date) -> Result<bool, AppError> {
    if task.status == TaskStatus::Completed {
        return Ok(false);
    }

    let deadline = parse_date(effective_deadline(task))?;
    Ok(deadline < today)
}

pub fn classify(task: &SupervisionTask, today: Date) -> Result<Standing, AppError> {
    if task.status == TaskStatus::Completed {
        return Ok(Standing::Completed);
    }

    if is_delayed(task, today)? {
        Ok(Standing::Delayed)
    } else {
        Ok(Standing::OnTrack)
    }
}

pub fn status_for_deadline(deadline: Date, today: Date) -> TaskStatus {
    if deadline < today {
        TaskStatus::Delayed
    } else {
        TaskStatus::Pending
    }
}

/// Returns `task` with its deadline moved to `new_deadline`.
///
/// The pre-extension deadline is captured in `original_deadline` only on the
/// first extension. Completed tasks cannot be extended.
pub fn extend_deadline(
    task: &SupervisionTask,
    new_deadline: &str,
    today: Date,
) -> Result<SupervisionTask, AppError> {
    let parsed = parse_date(new_deadline)?;
    if task.status == TaskStatus::Completed {
        return Err(AppError::invalid_input("task already completed"));
    }

    let normalized = format_date(parsed);
    let mut updated = task.clone();
    if updated.original_deadline.is_none() {
        updated.original_deadline = Some(task.deadline.clone());
    }
    updated.deadline = normalized.clone();
    updated.new_deadline = Some(normalized);
    updated.status = status_for_deadline(parsed, today);

    Ok(updated)
}

/// Day of `today`'s month on which the check-in falls. Days past the end of
/// a short month collapse onto its last day.
pub fn check_in_day(task: &SupervisionTask, today: Date) -> u8 {
    task.monthly_date.min(days_in_month(today))
}

pub fn is_due_for_monthly_reminder(
    task: &SupervisionTask,
    reports: &[SupervisionReport],
    today: Date,
) -> bool {
    if task.status == TaskStatus::Completed {
        return false;
    }

    let has_reported = has_report_for_month(&task.id, &month_key(today), reports);
    let check_in = check_in_day(task, today);
    let day = today.day();

    // The exact check-in day is always surfaced, even once reported.
    (!has_reported && check_in <= day) || check_in == day
}

pub fn delayed_tasks(
    tasks: &[SupervisionTask],
    today: Date,
) -> Result<Vec<&SupervisionTask>, AppError> {
    let mut delayed = Vec::new();
    for task in tasks {
        if is_delayed(task, today)? {
            delayed.push(task);
        }
    }
    Ok(delayed)
}

pub fn monthly_reminder_tasks<'a>(
    tasks: &'a [SupervisionTask],
    reports: &[SupervisionReport],
    today: Date,
) -> Vec<&'a SupervisionTask> {
    tasks
        .iter()
        .filter(|task| is_due_for_monthly_reminder(task, reports, today))
        .collect()
}
