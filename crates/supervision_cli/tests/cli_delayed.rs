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

fn write_tasks(path: &PathBuf, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": tasks,
        "reports": []
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(store_path: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_supervision"))
        .args(args)
        .env("SUPERVISION_STORE_PATH", store_path)
        .env("SUPERVISION_CONFIG_PATH", temp_path("absent-config.json"))
        .output()
        .expect("failed to run supervision")
}

fn task(id: &str, deadline: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "taskName": format!("Task {id}"),
        "department": "Research",
        "deadline": deadline,
        "monthlyDate": 5,
        "status": status,
        "createdAt": "2025-07-01T00:00:00Z"
    })
}

#[test]
fn delayed_lists_only_late_open_tasks() {
    let store_path = temp_path("delayed-list.json");
    write_tasks(
        &store_path,
        serde_json::json!([
            task("late", "2025-09-30", "pending"),
            task("future", "2025-12-31", "pending"),
            task("finished", "2025-09-01", "completed"),
            task("due-today", "2025-10-05", "pending")
        ]),
    );

    let output = run(&store_path, &["delayed", "--json", "--today", "2025-10-05"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let delayed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = delayed
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["late"]);
}

#[test]
fn extended_task_is_judged_by_original_deadline() {
    let store_path = temp_path("delayed-extended.json");
    let mut extended = task("extended", "2025-10-20", "pending");
    extended["originalDeadline"] = serde_json::json!("2025-09-30");
    extended["newDeadline"] = serde_json::json!("2025-10-20");
    write_tasks(&store_path, serde_json::json!([extended]));

    let output = run(&store_path, &["delayed", "--today", "2025-10-05"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 delayed task(s)"));
    assert!(stdout.contains("2025-09-30"));
    assert!(stdout.contains("2025-10-20"));
}

#[test]
fn delayed_with_nothing_late_says_so() {
    let store_path = temp_path("delayed-none.json");
    write_tasks(&store_path, serde_json::json!([task("future", "2025-12-31", "pending")]));

    let output = run(&store_path, &["delayed", "--today", "2025-10-05"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No delayed tasks."));
}

#[test]
fn extend_keeps_first_original_deadline() {
    let store_path = temp_path("delayed-extend.json");
    write_tasks(&store_path, serde_json::json!([task("late", "2025-09-30", "pending")]));

    let first = run(&store_path, &["extend", "late", "2025-10-20", "--today", "2025-10-05"]);
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("to 2025-10-20 [pending]"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    assert_eq!(stored["tasks"][0]["deadline"], "2025-10-20");
    assert_eq!(stored["tasks"][0]["originalDeadline"], "2025-09-30");
    assert_eq!(stored["tasks"][0]["newDeadline"], "2025-10-20");
    assert_eq!(stored["tasks"][0]["status"], "pending");

    let second = run(
        &store_path,
        &["extend", "late", "2025-10-01", "--json", "--today", "2025-10-05"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(second.status.success());
    let updated: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert_eq!(updated["deadline"], "2025-10-01");
    assert_eq!(updated["originalDeadline"], "2025-09-30");
    assert_eq!(updated["newDeadline"], "2025-10-01");
    assert_eq!(updated["status"], "delayed");
}

#[test]
fn extend_rejects_completed_tasks_and_bad_dates() {
    let store_path = temp_path("delayed-extend-invalid.json");
    write_tasks(
        &store_path,
        serde_json::json!([
            task("finished", "2025-09-01", "completed"),
            task("late", "2025-09-30", "pending")
        ]),
    );

    let completed = run(&store_path, &["extend", "finished", "2025-12-31"]);
    assert!(!completed.status.success());
    assert!(
        String::from_utf8_lossy(&completed.stderr)
            .contains("ERROR: invalid_input - task already completed")
    );

    let malformed = run(&store_path, &["extend", "late", "2025-13-01"]);
    assert!(!malformed.status.success());
    assert!(String::from_utf8_lossy(&malformed.stderr).contains("ERROR: invalid_date"));

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert_eq!(stored["tasks"][0]["deadline"], "2025-09-01");
    assert_eq!(stored["tasks"][1]["deadline"], "2025-09-30");
    assert!(stored["tasks"][1].get("originalDeadline").is_none());
}
