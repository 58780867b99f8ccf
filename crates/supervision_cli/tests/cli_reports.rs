use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("supervision-{nanos}-{file_name}"))
}

fn write_store(path: &PathBuf, reports: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {
                "id": "task-web",
                "taskName": "Website redesign",
                "department": "IT",
                "deadline": "2025-12-31",
                "monthlyDate": 15,
                "status": "pending",
                "createdAt": "2025-07-01T00:00:00Z"
            },
            {
                "id": "task-budget",
                "taskName": "Annual budget",
                "department": "Finance",
                "deadline": "2025-12-31",
                "monthlyDate": 10,
                "status": "pending",
                "createdAt": "2025-07-01T00:00:00Z"
            },
            {
                "id": "task-closed",
                "taskName": "Archive move",
                "department": "Admin",
                "deadline": "2025-08-31",
                "monthlyDate": 1,
                "status": "completed",
                "createdAt": "2025-07-01T00:00:00Z"
            }
        ],
        "reports": reports
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn report(id: &str, task_id: &str, month: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "taskId": task_id,
        "month": month,
        "reportContent": content,
        "status": "completed",
        "createdAt": format!("{month}-15T00:00:00Z")
    })
}

fn run(store_path: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_supervision"))
        .args(args)
        .env("SUPERVISION_STORE_PATH", store_path)
        .env("SUPERVISION_CONFIG_PATH", temp_path("absent-config.json"))
        .output()
        .expect("failed to run supervision")
}

fn reminder_ids(output: &Output) -> Vec<(String, bool)> {
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    entries
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| {
            (
                entry["task"]["id"].as_str().unwrap().to_string(),
                entry["reported"].as_bool().unwrap(),
            )
        })
        .collect()
}

#[test]
fn reminders_follow_check_in_days() {
    let store_path = temp_path("reports-reminders.json");
    write_store(&store_path, serde_json::json!([]));

    let before = run(&store_path, &["reminders", "--json", "--today", "2025-10-09"]);
    assert!(before.status.success());
    assert!(reminder_ids(&before).is_empty());

    let on_day = run(&store_path, &["reminders", "--json", "--today", "2025-10-15"]);
    std::fs::remove_file(&store_path).ok();

    assert!(on_day.status.success());
    assert_eq!(
        reminder_ids(&on_day),
        vec![
            ("task-web".to_string(), false),
            ("task-budget".to_string(), false)
        ]
    );
}

#[test]
fn filing_a_report_clears_overdue_reminder_but_not_exact_day() {
    let store_path = temp_path("reports-file.json");
    write_store(&store_path, serde_json::json!([]));

    let filed = run(
        &store_path,
        &["report", "add", "task-budget", "Draft circulated", "--today", "2025-10-15"],
    );
    assert!(filed.status.success());
    assert!(String::from_utf8_lossy(&filed.stdout).contains("for Annual budget (2025-10)"));

    let web = run(
        &store_path,
        &["report", "add", "task-web", "Wireframes done", "--today", "2025-10-15"],
    );
    assert!(web.status.success());

    let on_day = run(&store_path, &["reminders", "--json", "--today", "2025-10-15"]);
    assert_eq!(reminder_ids(&on_day), vec![("task-web".to_string(), true)]);

    let later = run(&store_path, &["reminders", "--json", "--today", "2025-10-20"]);
    std::fs::remove_file(&store_path).ok();

    assert!(reminder_ids(&later).is_empty());
}

#[test]
fn second_report_in_a_month_is_refused() {
    let store_path = temp_path("reports-duplicate.json");
    write_store(
        &store_path,
        serde_json::json!([report("report-1", "task-web", "2025-10", "Wireframes done")]),
    );

    let output = run(
        &store_path,
        &["report", "add", "task-web", "More wireframes", "--today", "2025-10-28"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - report already filed for 2025-10"));
}

#[test]
fn report_for_unknown_task_is_not_found() {
    let store_path = temp_path("reports-unknown.json");
    write_store(&store_path, serde_json::json!([]));

    let output = run(
        &store_path,
        &["report", "add", "task-missing", "content", "--today", "2025-10-15"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: not_found"));
}

#[test]
fn report_list_groups_by_month_and_names_tasks() {
    let store_path = temp_path("reports-list.json");
    write_store(
        &store_path,
        serde_json::json!([
            report("report-1", "task-web", "2025-07", "Kickoff"),
            report("report-2", "task-budget", "2025-08", "Baseline"),
            report("report-3", "task-budget", "2025-07", "Scoping"),
            report("report-4", "task-gone", "2025-08", "Orphaned")
        ]),
    );

    let json = run(&store_path, &["report", "list", "--json"]);
    assert!(json.status.success());
    let groups: serde_json::Value = serde_json::from_slice(&json.stdout).unwrap();
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["month"], "2025-07");
    let july: Vec<&str> = groups[0]["reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|report| report["id"].as_str().unwrap())
        .collect();
    assert_eq!(july, vec!["report-1", "report-3"]);
    assert_eq!(groups[0]["reports"][0]["taskName"], "Website redesign");
    assert_eq!(groups[1]["month"], "2025-08");
    assert_eq!(groups[1]["reports"][1]["taskName"], "unknown task");

    let plain = run(&store_path, &["report", "list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(plain.status.success());
    let stdout = String::from_utf8_lossy(&plain.stdout);
    assert!(stdout.contains("== 2025-07 =="));
    assert!(stdout.contains("== 2025-08 =="));
    assert!(stdout.contains("unknown task"));
}

#[test]
fn report_edit_and_delete() {
    let store_path = temp_path("reports-edit.json");
    write_store(
        &store_path,
        serde_json::json!([
            report("report-1", "task-web", "2025-09", "Kickoff"),
            report("report-2", "task-web", "2025-10", "Design")
        ]),
    );

    let edited = run(&store_path, &["report", "edit", "report-1", "Kickoff complete"]);
    assert!(edited.status.success());

    let blank = run(&store_path, &["report", "edit", "report-1", "   "]);
    assert!(!blank.status.success());
    assert!(String::from_utf8_lossy(&blank.stderr).contains("ERROR: invalid_input"));

    let deleted = run(&store_path, &["report", "delete", "report-2"]);
    assert!(deleted.status.success());

    let missing = run(&store_path, &["report", "delete", "report-2"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("ERROR: not_found"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    let reports = stored["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["reportContent"], "Kickoff complete");
    assert_eq!(reports[0]["month"], "2025-09");
}
