//! Associating monthly reports with their tasks.

use crate::model::{SupervisionReport, SupervisionTask};
use serde::Serialize;

/// Label shown for a report whose task is no longer known.
pub const UNKNOWN_TASK_LABEL: &str = "unknown task";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGroup<'a> {
    pub month: &'a str,
    pub reports: Vec<&'a SupervisionReport>,
}

pub fn has_report_for_month(task_id: &str, month: &str, reports: &[SupervisionReport]) -> bool {
    reports
        .iter()
        .any(|report| report.task_id == task_id && report.month == month)
}

/// Buckets reports by month. Buckets appear in the order their month is
/// first seen and keep the input order inside; nothing is re-sorted.
pub fn group_by_month<'a, I>(reports: I) -> Vec<MonthGroup<'a>>
where
    I: IntoIterator<Item = &'a SupervisionReport>,
{
    let mut groups: Vec<MonthGroup<'a>> = Vec::new();
    for report in reports {
        match groups
            .iter()
            .position(|group| group.month == report.month)
        {
            Some(index) => groups[index].reports.push(report),
            None => groups.push(MonthGroup {
                month: &report.month,
                reports: vec![report],
            }),
        }
    }
    groups
}

pub fn resolve_task_name<'a>(task_id: &str, tasks: &'a [SupervisionTask]) -> &'a str {
    tasks
        .iter()
        .find(|task| task.id == task_id)
        .map(|task| task.task_name.as_str())
        .unwrap_or(UNKNOWN_TASK_LABEL)
}
