use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisionReport {
    pub id: String,
    /// Back-reference to the task; the task may no longer exist.
    pub task_id: String,
    pub month: String,
    pub report_content: String,
    pub status: ReportStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Completed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub task_id: String,
    pub month: String,
    pub report_content: String,
    pub status: ReportStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportPatch {
    pub report_content: Option<String>,
    pub status: Option<ReportStatus>,
}

impl ReportDraft {
    pub fn into_report(self, id: String, created_at: String) -> SupervisionReport {
        SupervisionReport {
            id,
            task_id: self.task_id,
            month: self.month,
            report_content: self.report_content,
            status: self.status,
            created_at,
        }
    }
}

impl ReportPatch {
    pub fn apply_to(&self, report: &mut SupervisionReport) {
        if let Some(value) = &self.report_content {
            report.report_content = value.clone();
        }
        if let Some(value) = self.status {
            report.status = value;
        }
    }
}
