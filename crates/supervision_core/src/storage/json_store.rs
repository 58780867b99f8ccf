use super::{SupervisionState, SupervisionStore};
use crate::dates::{parse_date, parse_month};
use crate::error::AppError;
use crate::model::{
    ReportDraft, ReportPatch, SupervisionReport, SupervisionTask, TaskDraft, TaskPatch,
    is_valid_monthly_date,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "supervision.json";
const STORE_ENV_VAR: &str = "SUPERVISION_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    schema_version: u32,
    #[serde(default)]
    tasks: Vec<SupervisionTask>,
    #[serde(default)]
    reports: Vec<SupervisionReport>,
}

/// Local file store used when no remote store is reachable.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(
        &mut self,
        apply: impl FnOnce(&mut SupervisionState) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut state = load_state(&self.path)?;
        let result = apply(&mut state)?;
        save_state(&self.path, &state)?;
        Ok(result)
    }
}

impl SupervisionStore for JsonStore {
    fn list_tasks(&self) -> Result<Vec<SupervisionTask>, AppError> {
        Ok(load_state(&self.path)?.tasks)
    }

    fn list_reports(&self) -> Result<Vec<SupervisionReport>, AppError> {
        Ok(load_state(&self.path)?.reports)
    }

    fn create_task(&mut self, draft: TaskDraft) -> Result<SupervisionTask, AppError> {
        self.mutate(|state| state.create_task(draft))
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<SupervisionTask, AppError> {
        self.mutate(|state| state.update_task(id, patch))
    }

    fn delete_task(&mut self, id: &str) -> Result<SupervisionTask, AppError> {
        self.mutate(|state| state.delete_task(id))
    }

    fn create_report(&mut self, draft: ReportDraft) -> Result<SupervisionReport, AppError> {
        self.mutate(|state| state.create_report(draft))
    }

    fn update_report(
        &mut self,
        id: &str,
        patch: &ReportPatch,
    ) -> Result<SupervisionReport, AppError> {
        self.mutate(|state| state.update_report(id, patch))
    }

    fn delete_report(&mut self, id: &str) -> Result<SupervisionReport, AppError> {
        self.mutate(|state| state.delete_report(id))
    }
}

/// Resolves the store location: the environment wins over the configured
/// path, which wins over the per-user default.
pub fn resolve_store_path(configured: Option<&str>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path.trim()));
    }

    default_store_path()
}

fn default_store_path() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("supervision")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("supervision")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<SupervisionState, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "store file missing, starting empty");
        return Ok(SupervisionState::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredState =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    ensure_unique(stored.tasks.iter().map(|task| task.id.as_str()), "task")?;
    ensure_unique(stored.reports.iter().map(|report| report.id.as_str()), "report")?;
    stored.tasks.iter().try_for_each(ensure_task_well_formed)?;
    stored.reports.iter().try_for_each(ensure_report_well_formed)?;

    debug!(
        tasks = stored.tasks.len(),
        reports = stored.reports.len(),
        "loaded store"
    );
    Ok(SupervisionState {
        tasks: stored.tasks,
        reports: stored.reports,
    })
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>, kind: &str) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::invalid_data(format!("duplicate {kind} id '{id}'")));
        }
    }
    Ok(())
}

fn ensure_task_well_formed(task: &SupervisionTask) -> Result<(), AppError> {
    let dates = [
        Some(task.deadline.as_str()),
        task.original_deadline.as_deref(),
        task.new_deadline.as_deref(),
    ];
    for value in dates.into_iter().flatten() {
        parse_date(value).map_err(|err| {
            AppError::invalid_data(format!("task '{}': {}", task.id, err.message()))
        })?;
    }

    if !is_valid_monthly_date(task.monthly_date) {
        return Err(AppError::invalid_data(format!(
            "task '{}': monthly date {} is outside 1-31",
            task.id, task.monthly_date
        )));
    }
    Ok(())
}

fn ensure_report_well_formed(report: &SupervisionReport) -> Result<(), AppError> {
    parse_month(&report.month)
        .map(|_| ())
        .map_err(|err| AppError::invalid_data(format!("report '{}': {}", report.id, err.message())))
}

pub fn save_state(path: &Path, state: &SupervisionState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredState {
        schema_version: SCHEMA_VERSION,
        tasks: state.tasks.clone(),
        reports: state.reports.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
