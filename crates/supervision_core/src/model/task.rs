use serde::{Deserialize, Serialize};

/// Whether `day` can serve as a monthly check-in day.
pub fn is_valid_monthly_date(day: u8) -> bool {
    (1..=31).contains(&day)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisionTask {
    pub id: String,
    pub task_name: String,
    pub department: String,
    pub deadline: String,
    /// The deadline as it stood before the first change; never overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_deadline: Option<String>,
    pub monthly_date: u8,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Delayed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
        }
    }
}

/// Fields supplied when creating a task; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub task_name: String,
    pub department: String,
    pub deadline: String,
    pub monthly_date: u8,
    pub status: TaskStatus,
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub task_name: Option<String>,
    pub department: Option<String>,
    pub deadline: Option<String>,
    pub original_deadline: Option<String>,
    pub new_deadline: Option<String>,
    pub monthly_date: Option<u8>,
    pub status: Option<TaskStatus>,
    pub remarks: Option<String>,
}

impl TaskDraft {
    pub fn into_task(self, id: String, created_at: String) -> SupervisionTask {
        SupervisionTask {
            id,
            task_name: self.task_name,
            department: self.department,
            deadline: self.deadline,
            original_deadline: None,
            new_deadline: None,
            monthly_date: self.monthly_date,
            status: self.status,
            remarks: self.remarks,
            created_at,
        }
    }
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, task: &mut SupervisionTask) {
        if let Some(value) = &self.task_name {
            task.task_name = value.clone();
        }
        if let Some(value) = &self.department {
            task.department = value.clone();
        }
        if let Some(value) = &self.deadline {
            task.deadline = value.clone();
        }
        // Write-once: a recorded original deadline is never replaced.
        if let Some(value) = &self.original_deadline
            && task.original_deadline.is_none()
        {
            task.original_deadline = Some(value.clone());
        }
        if let Some(value) = &self.new_deadline {
            task.new_deadline = Some(value.clone());
        }
        if let Some(value) = self.monthly_date {
            task.monthly_date = value;
        }
        if let Some(value) = self.status {
            task.status = value;
        }
        if let Some(value) = &self.remarks {
            task.remarks = if value.is_empty() {
                None
            } else {
                Some(value.clone())
            };
        }
    }
}
