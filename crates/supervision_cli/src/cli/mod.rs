use clap::{Parser, Subcommand, ValueEnum};
use supervision_core::config::{ConfigOverrides, canonical_key};
use supervision_core::model::TaskStatus;

#[derive(Parser, Debug)]
#[command(name = "supervision", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a supervision task
    ///
    /// Example: supervision add "Annual budget" --department Finance --deadline 2025-11-15 --monthly-date 10
    Add {
        task_name: String,
        #[arg(long)]
        department: String,
        #[arg(long, value_name = "DATE")]
        deadline: String,
        #[arg(long = "monthly-date", value_name = "DAY", default_value_t = 1)]
        monthly_date: u8,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Edit fields of a task
    ///
    /// Example: supervision edit task-1 --department Treasury --status completed
    Edit {
        id: String,
        #[arg(long = "name")]
        task_name: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long, value_name = "DATE")]
        deadline: Option<String>,
        #[arg(long = "monthly-date", value_name = "DAY")]
        monthly_date: Option<u8>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Replace the remarks; an empty value clears them
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: supervision done task-1
    Done { id: String },
    /// Delete a task and its reports
    ///
    /// Example: supervision delete task-1
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: supervision show task-1
    Show { id: String },
    /// List all tasks with their standing
    ///
    /// Example: supervision list
    List,
    /// List tasks past their committed deadline
    ///
    /// Example: supervision delayed
    Delayed,
    /// Set a new deadline for a task
    ///
    /// Example: supervision extend task-1 2025-10-20
    Extend { id: String, deadline: String },
    /// List tasks due for this month's check-in
    ///
    /// Example: supervision reminders
    Reminders,
    /// Manage monthly reports
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// File this month's report for a task
    ///
    /// Example: supervision report add task-1 "Requirements signed off"
    Add { task_id: String, content: String },
    /// Replace the content of a report
    ///
    /// Example: supervision report edit report-1 "Requirements and design signed off"
    Edit { id: String, content: String },
    /// Delete a report
    ///
    /// Example: supervision report delete report-1
    Delete { id: String },
    /// List reports grouped by month
    ///
    /// Example: supervision report list
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Pending,
    Completed,
    Delayed,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::Completed => TaskStatus::Completed,
            StatusArg::Delayed => TaskStatus::Delayed,
        }
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonical_key(key_raw);
    if key.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Folds every `--config-override` argument into one set of overrides;
/// later values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|err| format!("{CONFIG_OVERRIDE_FLAG} {entry}: {err}"))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::StorePath => overrides.store_path = Some(parsed.value),
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, ConfigOverrideTarget, ReportCommand, StatusArg, collect_config_overrides,
        parse_config_override,
    };
    use clap::Parser;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Noir ").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Theme);
        assert_eq!(parsed.value, "Noir");

        let parsed = parse_config_override("Store-Path=/tmp/store.json").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::StorePath);
        assert_eq!(parsed.value, "/tmp/store.json");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("aliases.ls=list").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("theme").unwrap_err();
        assert!(err.contains("KEY=VALUE"));

        let err = parse_config_override(" = noir").unwrap_err();
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn collect_config_overrides_keeps_last_value() {
        let raw = vec![
            "theme=noir".to_string(),
            "store_path=/tmp/a.json".to_string(),
            "theme=solarized".to_string(),
        ];
        let overrides = collect_config_overrides(&raw).unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("solarized"));
        assert_eq!(overrides.store_path.as_deref(), Some("/tmp/a.json"));

        let err = collect_config_overrides(&["bogus".to_string()]).unwrap_err();
        assert!(err.starts_with("--config-override bogus"));
    }

    #[test]
    fn edit_parses_optional_fields() {
        let cli = Cli::try_parse_from([
            "supervision",
            "edit",
            "task-1",
            "--status",
            "completed",
            "--monthly-date",
            "20",
        ])
        .unwrap();

        match cli.command {
            Command::Edit {
                id,
                status,
                monthly_date,
                deadline,
                ..
            } => {
                assert_eq!(id, "task-1");
                assert_eq!(status, Some(StatusArg::Completed));
                assert_eq!(monthly_date, Some(20));
                assert_eq!(deadline, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "supervision",
            "report",
            "list",
            "--json",
            "--today",
            "2025-10-15",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.today.as_deref(), Some("2025-10-15"));
        assert!(matches!(
            cli.command,
            Command::Report {
                report: ReportCommand::List
            }
        ));
    }
}
