pub mod config;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod reports;
pub mod storage;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{SupervisionTask, TaskStatus};

    #[test]
    fn task_serializes_with_wire_field_names() {
        let task = SupervisionTask {
            id: "1".to_string(),
            task_name: "Website redesign".to_string(),
            department: "IT".to_string(),
            deadline: "2025-10-20".to_string(),
            original_deadline: Some("2025-09-30".to_string()),
            new_deadline: Some("2025-10-20".to_string()),
            monthly_date: 15,
            status: TaskStatus::Delayed,
            remarks: None,
            created_at: "2025-07-01".to_string(),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["taskName"], "Website redesign");
        assert_eq!(value["originalDeadline"], "2025-09-30");
        assert_eq!(value["newDeadline"], "2025-10-20");
        assert_eq!(value["status"], "delayed");
        assert!(value.get("remarks").is_none());

        let parsed: SupervisionTask = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::not_found("task not found");
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.to_string(), "not_found - task not found");
        assert_eq!(AppError::invalid_date("bad").code(), "invalid_date");
    }
}
