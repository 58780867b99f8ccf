use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::path::PathBuf;
use supervision_cli::cli::{Cli, Command, ReportCommand, collect_config_overrides};
use supervision_core::config::{
    Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use supervision_core::dashboard::Dashboard;
use supervision_core::dates::{local_today, month_key, parse_date};
use supervision_core::error::AppError;
use supervision_core::lifecycle::{classify, effective_deadline};
use supervision_core::model::{SupervisionReport, SupervisionTask, TaskDraft, TaskPatch, TaskStatus};
use supervision_core::storage::JsonStore;
use supervision_core::storage::json_store::resolve_store_path;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::Date;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "SUPERVISION_LOG";

struct Session {
    dashboard: Dashboard<JsonStore>,
    today: Date,
    palette: Palette,
    json: bool,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Check-in")]
    check_in: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Standing")]
    standing: String,
}

#[derive(Tabled)]
struct DelayRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Original deadline")]
    original_deadline: String,
    #[tabled(rename = "New deadline")]
    new_deadline: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct ReminderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Check-in")]
    check_in: String,
    #[tabled(rename = "Reported")]
    reported: String,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Content")]
    content: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn print_task_json(task: &SupervisionTask) -> Result<(), AppError> {
    println!("{}", to_json(task)?);
    Ok(())
}

fn print_report_json(report: &SupervisionReport) -> Result<(), AppError> {
    println!("{}", to_json(report)?);
    Ok(())
}

fn print_task_details(session: &Session, task: &SupervisionTask) -> Result<(), AppError> {
    let standing = classify(task, session.today)?;
    println!("ID: {}", task.id);
    println!("Task: {}", task.task_name);
    println!("Department: {}", task.department);
    println!("Deadline: {}", task.deadline);
    println!(
        "Original deadline: {}",
        task.original_deadline.as_deref().unwrap_or("-")
    );
    println!("New deadline: {}", task.new_deadline.as_deref().unwrap_or("-"));
    println!("Monthly date: {}", task.monthly_date);
    println!("Status: {}", task.status.as_str());
    println!("Standing: {}", standing.as_str());
    println!("Remarks: {}", task.remarks.as_deref().unwrap_or("-"));
    println!("Created at: {}", task.created_at);
    Ok(())
}

fn list_tasks(session: &Session) -> Result<(), AppError> {
    let tasks = session.dashboard.tasks();
    if session.json {
        let mut payload = Vec::with_capacity(tasks.len());
        for task in tasks {
            let mut value = to_json(task)?;
            value["standing"] = serde_json::Value::from(classify(task, session.today)?.as_str());
            payload.push(value);
        }
        println!("{}", serde_json::Value::Array(payload));
        return Ok(());
    }

    if tasks.is_empty() {
        println!("{}", session.palette.mutedize("No tasks."));
        return Ok(());
    }

    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        rows.push(TaskRow {
            id: task.id.clone(),
            name: task.task_name.clone(),
            department: task.department.clone(),
            deadline: task.deadline.clone(),
            check_in: task.monthly_date.to_string(),
            status: task.status.as_str().to_string(),
            standing: classify(task, session.today)?.as_str().to_string(),
        });
    }
    print_table(rows);
    Ok(())
}

fn list_delayed(session: &Session) -> Result<(), AppError> {
    let delayed = session.dashboard.delayed_tasks(session.today)?;
    if session.json {
        println!("{}", to_json(&delayed)?);
        return Ok(());
    }

    if delayed.is_empty() {
        println!("{}", session.palette.mutedize("No delayed tasks."));
        return Ok(());
    }

    println!(
        "{}",
        session
            .palette
            .accentize(&format!("{} delayed task(s)", delayed.len()))
    );
    let rows = delayed
        .into_iter()
        .map(|task| DelayRow {
            id: task.id.clone(),
            name: task.task_name.clone(),
            department: task.department.clone(),
            original_deadline: effective_deadline(task).to_string(),
            new_deadline: task.new_deadline.clone().unwrap_or_else(|| "-".to_string()),
            status: task.status.as_str().to_string(),
        })
        .collect();
    print_table::<DelayRow>(rows);
    Ok(())
}

fn list_reminders(session: &Session) -> Result<(), AppError> {
    let entries = session.dashboard.reminder_entries(session.today);
    if session.json {
        println!("{}", to_json(&entries)?);
        return Ok(());
    }

    let month = month_key(session.today);
    if entries.is_empty() {
        println!(
            "{}",
            session
                .palette
                .mutedize(&format!("No reminders for {month}."))
        );
        return Ok(());
    }

    let pending = entries.iter().filter(|entry| !entry.reported).count();
    println!(
        "{}",
        session.palette.accentize(&format!(
            "{} task(s) due for {month}, {pending} without a report",
            entries.len()
        ))
    );
    let rows = entries
        .iter()
        .map(|entry| ReminderRow {
            id: entry.task.id.clone(),
            name: entry.task.task_name.clone(),
            department: entry.task.department.clone(),
            check_in: entry.task.monthly_date.to_string(),
            reported: if entry.reported { "yes" } else { "no" }.to_string(),
        })
        .collect();
    print_table::<ReminderRow>(rows);
    Ok(())
}

fn list_reports(session: &Session) -> Result<(), AppError> {
    let history = session.dashboard.report_history();
    if session.json {
        let mut payload = Vec::with_capacity(history.len());
        for group in &history {
            let mut reports = Vec::with_capacity(group.reports.len());
            for report in &group.reports {
                let mut value = to_json(report)?;
                value["taskName"] =
                    serde_json::Value::from(session.dashboard.task_name(&report.task_id));
                reports.push(value);
            }
            payload.push(serde_json::json!({
                "month": group.month,
                "reports": reports,
            }));
        }
        println!("{}", serde_json::Value::Array(payload));
        return Ok(());
    }

    if history.is_empty() {
        println!("{}", session.palette.mutedize("No reports."));
        return Ok(());
    }

    for group in &history {
        println!("{}", session.palette.accentize(&format!("== {} ==", group.month)));
        let rows = group
            .reports
            .iter()
            .map(|report| ReportRow {
                id: report.id.clone(),
                task: session.dashboard.task_name(&report.task_id).to_string(),
                content: report.report_content.clone(),
                status: report.status.as_str().to_string(),
            })
            .collect();
        print_table::<ReportRow>(rows);
    }
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn open_session(cli: &Cli) -> Result<Session, AppError> {
    let overrides =
        collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let loaded = load_config_with_fallback();
    let config = merge_overrides(&loaded.config, &overrides);

    let store_path = match overrides.store_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => resolve_store_path(config.store_path.as_deref())?,
    };
    let today = match cli.today.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => local_today(),
    };

    debug!(store = %store_path.display(), today = %today, "opening session");

    Ok(Session {
        dashboard: Dashboard::load(JsonStore::new(store_path))?,
        today,
        palette: palette_for_theme(config.theme.as_deref()),
        json: cli.json,
    })
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let mut session = open_session(&cli)?;

    match cli.command {
        Command::Add {
            task_name,
            department,
            deadline,
            monthly_date,
            remarks,
        } => {
            let task = session.dashboard.add_task(TaskDraft {
                task_name,
                department,
                deadline,
                monthly_date,
                status: TaskStatus::Pending,
                remarks,
            })?;
            if session.json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.task_name, task.id);
            }
        }
        Command::Edit {
            id,
            task_name,
            department,
            deadline,
            monthly_date,
            status,
            remarks,
        } => {
            let patch = TaskPatch {
                task_name,
                department,
                deadline,
                monthly_date,
                status: status.map(TaskStatus::from),
                remarks,
                ..TaskPatch::default()
            };
            let task = session.dashboard.update_task(&id, patch)?;
            if session.json {
                print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.task_name, task.id);
            }
        }
        Command::Done { id } => {
            let task = session.dashboard.complete_task(&id)?;
            if session.json {
                print_task_json(&task)?;
            } else {
                println!("Completed task: {} ({})", task.task_name, task.id);
            }
        }
        Command::Delete { id } => {
            let task = session.dashboard.delete_task(&id)?;
            if session.json {
                print_task_json(&task)?;
            } else {
                println!("Deleted task: {} ({})", task.task_name, task.id);
            }
        }
        Command::Show { id } => {
            let task = session.dashboard.task(&id)?;
            if session.json {
                let mut value = to_json(task)?;
                value["standing"] =
                    serde_json::Value::from(classify(task, session.today)?.as_str());
                println!("{value}");
            } else {
                print_task_details(&session, task)?;
            }
        }
        Command::List => list_tasks(&session)?,
        Command::Delayed => list_delayed(&session)?,
        Command::Extend { id, deadline } => {
            let task = session
                .dashboard
                .extend_deadline(&id, &deadline, session.today)?;
            if session.json {
                print_task_json(&task)?;
            } else {
                println!(
                    "Extended task: {} ({}) to {} [{}]",
                    task.task_name,
                    task.id,
                    task.deadline,
                    task.status.as_str()
                );
            }
        }
        Command::Reminders => list_reminders(&session)?,
        Command::Report { report } => match report {
            ReportCommand::Add { task_id, content } => {
                let report = session
                    .dashboard
                    .add_report(&task_id, &content, session.today)?;
                if session.json {
                    print_report_json(&report)?;
                } else {
                    println!(
                        "Filed report: {} for {} ({})",
                        report.id,
                        session.dashboard.task_name(&report.task_id),
                        report.month
                    );
                }
            }
            ReportCommand::Edit { id, content } => {
                let report = session.dashboard.edit_report(&id, &content)?;
                if session.json {
                    print_report_json(&report)?;
                } else {
                    println!("Updated report: {} ({})", report.id, report.month);
                }
            }
            ReportCommand::Delete { id } => {
                let report = session.dashboard.delete_report(&id)?;
                if session.json {
                    print_report_json(&report)?;
                } else {
                    println!("Deleted report: {} ({})", report.id, report.month);
                }
            }
            ReportCommand::List => list_reports(&session)?,
        },
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("supervision".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_informational(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
