use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, TimeZone, Utc};

use crate::events::StatePayload;
#[cfg(all(feature = "app", not(test)))]
use crate::events::EVENT_STATE_UPDATED;
use crate::models::{
    BackupSchedule, DataFile, Project, ProjectCreateRequest, ProjectUpdateRequest, Settings, Task,
    TaskCreateRequest, TaskStatus, TaskUpdateRequest,
};
use crate::query::{filter_projects, filter_tasks, TaskQuery};
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Manager, Runtime, State};

const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

trait CommandCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn payload(state: &AppState) -> StatePayload {
    let data = state.data_file();
    StatePayload {
        tasks: data.tasks,
        projects: data.projects,
        current_project_id: data.current_project_id,
        settings: state.settings(),
    }
}

fn persist(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    let root = ctx.app_data_dir()?;
    let storage = Storage::new(root);
    storage.ensure_dirs()?;
    let now = Utc::now().timestamp();
    let settings = state.settings();
    let should_backup = should_auto_backup(&settings, now);
    if should_backup {
        let mut settings = settings;
        settings.last_backup_at = Some(now);
        state.update_settings(settings);
        log::debug!("auto backup triggered at {now}");
    }
    storage.save_data(&state.data_file(), should_backup)?;
    storage.save_settings(&state.settings_file())?;
    ctx.emit_state_updated(payload(state));
    Ok(())
}

fn should_auto_backup(settings: &Settings, now: i64) -> bool {
    match settings.backup_schedule {
        BackupSchedule::None => false,
        BackupSchedule::Daily => is_new_day(settings.last_backup_at, now),
        BackupSchedule::Weekly => is_new_week(settings.last_backup_at, now),
        BackupSchedule::Monthly => is_new_month(settings.last_backup_at, now),
    }
}

fn is_new_day(last: Option<i64>, now: i64) -> bool {
    match last {
        None => true,
        Some(ts) => {
            let last_date = Local
                .timestamp_opt(ts, 0)
                .single()
                .map(|dt| dt.date_naive());
            let now_date = Local
                .timestamp_opt(now, 0)
                .single()
                .map(|dt| dt.date_naive());
            last_date != now_date
        }
    }
}

fn is_new_week(last: Option<i64>, now: i64) -> bool {
    match last {
        None => true,
        Some(ts) => {
            let last_date = Local.timestamp_opt(ts, 0).single().map(|dt| dt.iso_week());
            let now_date = Local.timestamp_opt(now, 0).single().map(|dt| dt.iso_week());
            last_date != now_date
        }
    }
}

fn is_new_month(last: Option<i64>, now: i64) -> bool {
    match last {
        None => true,
        Some(ts) => {
            let last_date = Local
                .timestamp_opt(ts, 0)
                .single()
                .map(|dt| (dt.year(), dt.month()));
            let now_date = Local
                .timestamp_opt(now, 0)
                .single()
                .map(|dt| (dt.year(), dt.month()));
            last_date != now_date
        }
    }
}

#[cfg(all(feature = "app", not(test)))]
struct TauriCommandCtx<'a, R: Runtime> {
    app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
        self.app
            .path()
            .app_data_dir()
            .map_err(|err| StorageError::Io(std::io::Error::other(err.to_string())))
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        let _ = self.app.emit(EVENT_STATE_UPDATED, payload);
    }
}

fn load_state_impl(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<StatePayload> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    let (tasks, projects, current_project_id) = match storage.load_data() {
        Ok(data) => (data.tasks, data.projects, data.current_project_id),
        Err(error) => {
            // Missing files are normal on first launch.
            log::debug!("no data file loaded: {error}");
            (Vec::new(), Vec::new(), None)
        }
    };
    let settings = storage
        .load_settings()
        .map(|data| data.settings)
        .unwrap_or_default();
    state.replace_data(tasks, projects, current_project_id);
    state.update_settings(settings);
    ok(payload(state))
}

// Task queries. Reads never persist; the engine runs over a state snapshot.

fn get_tasks_impl(state: &AppState) -> CommandResult<Vec<Task>> {
    ok(state.tasks())
}

fn get_tasks_by_project_impl(state: &AppState, project_id: u32) -> CommandResult<Vec<Task>> {
    ok(state.tasks_by_project(project_id))
}

fn query_tasks_impl(
    state: &AppState,
    project_id: Option<u32>,
    query: TaskQuery,
) -> CommandResult<Vec<Task>> {
    let tasks = match project_id {
        Some(id) => state.tasks_by_project(id),
        None => state.tasks(),
    };
    ok(filter_tasks(&tasks, &query, Utc::now().timestamp()))
}

fn query_projects_impl(state: &AppState, query: TaskQuery) -> CommandResult<Vec<Project>> {
    ok(filter_projects(&state.projects(), &query))
}

fn get_all_tags_impl(state: &AppState) -> CommandResult<Vec<String>> {
    let mut tags: Vec<String> = state
        .tasks()
        .iter()
        .flat_map(|t| t.tags.iter())
        .cloned()
        .collect();
    tags.sort();
    tags.dedup();
    ok(tags)
}

#[derive(Debug, serde::Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub progress_percentage: f64,
}

fn stats_for(tasks: &[Task]) -> TaskStats {
    let todo = tasks.iter().filter(|t| t.status == TaskStatus::Todo).count();
    let in_progress = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .count();
    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    let total = tasks.len();
    let progress_percentage = if total > 0 {
        (done as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    TaskStats {
        total,
        todo,
        in_progress,
        done,
        progress_percentage,
    }
}

fn get_task_stats_impl(state: &AppState) -> CommandResult<TaskStats> {
    ok(stats_for(&state.tasks()))
}

#[derive(Debug, serde::Serialize)]
pub struct ProjectStats {
    pub project_id: u32,
    #[serde(flatten)]
    pub tasks: TaskStats,
}

fn get_project_stats_impl(state: &AppState, project_id: u32) -> CommandResult<ProjectStats> {
    if state.project(project_id).is_none() {
        return err("project not found");
    }
    ok(ProjectStats {
        project_id,
        tasks: stats_for(&state.tasks_by_project(project_id)),
    })
}

// Task mutations.

fn create_task_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    request: TaskCreateRequest,
) -> CommandResult<Task> {
    let task = match state.create_task(request, Utc::now().timestamp()) {
        Some(task) => task,
        None => return err("project not found"),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(task)
}

fn update_task_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    request: TaskUpdateRequest,
) -> CommandResult<Task> {
    let task = match state.update_task(request, Utc::now().timestamp()) {
        Some(task) => task,
        None => return err("task not found"),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(task)
}

fn toggle_task_status_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
) -> CommandResult<Task> {
    let task = match state.toggle_task_status(task_id, Utc::now().timestamp()) {
        Some(task) => task,
        None => return err("task not found"),
    };
    log::debug!("task {task_id} moved to {}", task.status);
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(task)
}

fn delete_task_impl(ctx: &impl CommandCtx, state: &AppState, task_id: u32) -> CommandResult<bool> {
    if !state.remove_task(task_id) {
        return err("task not found");
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(true)
}

fn delete_tasks_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_ids: Vec<u32>,
) -> CommandResult<bool> {
    state.remove_tasks(&task_ids);
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(true)
}

/// Shared shape of the single-task mutation commands: run the state op, then
/// persist, mapping a missing task to an error.
fn mutate_task(
    ctx: &impl CommandCtx,
    state: &AppState,
    result: Option<Task>,
) -> CommandResult<Task> {
    let task = match result {
        Some(task) => task,
        None => return err("task not found"),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(task)
}

fn add_task_tag_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    tag: String,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.add_task_tag(task_id, &tag, now))
}

fn remove_task_tag_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    tag: String,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.remove_task_tag(task_id, &tag, now))
}

fn set_task_due_date_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    due_date: Option<i64>,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.set_task_due_date(task_id, due_date, now))
}

fn add_task_subtask_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    title: String,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.add_task_subtask(task_id, title, now))
}

fn toggle_task_subtask_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    subtask_id: u32,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(
        ctx,
        state,
        state.toggle_task_subtask(task_id, subtask_id, now),
    )
}

fn add_task_comment_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    text: String,
    author: String,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.add_task_comment(task_id, text, author, now))
}

fn add_task_time_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    minutes: u32,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.add_task_time(task_id, minutes, now))
}

fn reset_task_time_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(ctx, state, state.reset_task_time(task_id, now))
}

fn set_task_estimated_time_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: u32,
    estimated_minutes: Option<u32>,
) -> CommandResult<Task> {
    let now = Utc::now().timestamp();
    mutate_task(
        ctx,
        state,
        state.set_task_estimated_time(task_id, estimated_minutes, now),
    )
}

// Project commands.

fn create_project_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    request: ProjectCreateRequest,
) -> CommandResult<Project> {
    let project = state.create_project(request, Utc::now().timestamp());
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(project)
}

fn get_projects_impl(state: &AppState) -> CommandResult<Vec<Project>> {
    ok(state.projects())
}

fn get_current_project_impl(state: &AppState) -> CommandResult<Option<Project>> {
    ok(state.current_project())
}

fn switch_project_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    project_id: u32,
) -> CommandResult<Project> {
    let project = match state.switch_project(project_id) {
        Some(project) => project,
        None => return err("project not found"),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(project)
}

fn update_project_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    request: ProjectUpdateRequest,
) -> CommandResult<Project> {
    let project = match state.update_project(request, Utc::now().timestamp()) {
        Some(project) => project,
        None => return err("project not found"),
    };
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(project)
}

fn delete_project_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    project_id: u32,
) -> CommandResult<bool> {
    if state.project_count() <= 1 {
        return err("cannot delete the last project");
    }
    if !state.remove_project(project_id) {
        return err("project not found");
    }
    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(true)
}

// Settings.

fn update_settings_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    mut settings: Settings,
) -> CommandResult<Settings> {
    let previous = state.settings();

    // Normalize user input so the persisted config is stable.
    settings.theme = match settings.theme.trim().to_lowercase().as_str() {
        "light" => "light".to_string(),
        "dark" => "dark".to_string(),
        _ => Settings::default().theme,
    };

    state.update_settings(settings.clone());
    if let Err(error) = persist(ctx, state) {
        // Roll back in-memory settings to keep the running app consistent.
        state.update_settings(previous);
        return err(&format!("storage error: {error:?}"));
    }
    ok(settings)
}

// Import/export.

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ExportData {
    pub version: String,
    pub export_date: String,
    pub data: DataFile,
}

#[derive(Debug, serde::Serialize)]
pub struct ImportResult {
    pub success: bool,
    pub imported_tasks: usize,
    pub imported_projects: usize,
    pub message: String,
    pub export_version: String,
    pub export_date: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct ImportValidation {
    pub valid: bool,
    pub version: String,
    pub export_date: Option<String>,
    pub task_count: usize,
    pub project_count: usize,
    pub format_type: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

fn export_envelope(state: &AppState) -> ExportData {
    ExportData {
        version: EXPORT_VERSION.to_string(),
        export_date: Utc::now().to_rfc3339(),
        data: state.data_file(),
    }
}

fn export_data_impl(state: &AppState) -> CommandResult<String> {
    match serde_json::to_string_pretty(&export_envelope(state)) {
        Ok(json) => ok(json),
        Err(e) => err(&format!("json error: {e}")),
    }
}

fn write_atomic_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    std::fs::create_dir_all(
        path.parent()
            .ok_or_else(|| StorageError::Io(std::io::Error::other("invalid export path")))?,
    )?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(tmp, path)?;
    Ok(())
}

fn export_data_to_file_impl(state: &AppState, file_path: String) -> CommandResult<String> {
    let json = match serde_json::to_vec_pretty(&export_envelope(state)) {
        Ok(bytes) => bytes,
        Err(e) => return err(&format!("json error: {e}")),
    };
    let path = PathBuf::from(file_path);
    if let Err(error) = write_atomic_bytes(&path, &json) {
        return err(&format!("export error: {error:?}"));
    }
    ok(path.to_string_lossy().to_string())
}

fn validate_import_data_impl(json_content: String) -> CommandResult<ImportValidation> {
    if let Ok(export) = serde_json::from_str::<ExportData>(&json_content) {
        let mut warnings = Vec::new();
        if export.version != EXPORT_VERSION {
            warnings.push(format!(
                "export was produced by version {}, current is {EXPORT_VERSION}",
                export.version
            ));
        }
        return ok(ImportValidation {
            valid: true,
            version: export.version,
            export_date: Some(export.export_date),
            task_count: export.data.tasks.len(),
            project_count: export.data.projects.len(),
            format_type: "export".to_string(),
            warnings,
            errors: vec![],
        });
    }
    if let Ok(data) = serde_json::from_str::<DataFile>(&json_content) {
        return ok(ImportValidation {
            valid: true,
            version: format!("schema {}", data.schema_version),
            export_date: None,
            task_count: data.tasks.len(),
            project_count: data.projects.len(),
            format_type: "raw".to_string(),
            warnings: vec!["raw data file without export metadata".to_string()],
            errors: vec![],
        });
    }
    ok(ImportValidation {
        valid: false,
        version: "unknown".to_string(),
        export_date: None,
        task_count: 0,
        project_count: 0,
        format_type: "invalid".to_string(),
        warnings: vec![],
        errors: vec!["unrecognized JSON structure".to_string()],
    })
}

fn import_data_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    json_content: String,
    merge_mode: bool,
) -> CommandResult<ImportResult> {
    let (data, export_version, export_date) =
        if let Ok(export) = serde_json::from_str::<ExportData>(&json_content) {
            (export.data, export.version, Some(export.export_date))
        } else if let Ok(data) = serde_json::from_str::<DataFile>(&json_content) {
            if merge_mode {
                return err("merge mode is not supported for raw data files");
            }
            let version = format!("schema {}", data.schema_version);
            (data, version, None)
        } else {
            return err("invalid data format");
        };

    let (imported_tasks, imported_projects) = if merge_mode {
        state.merge_data(data.tasks, data.projects)
    } else {
        let counts = (data.tasks.len(), data.projects.len());
        state.replace_data(data.tasks, data.projects, data.current_project_id);
        counts
    };

    if let Err(error) = persist(ctx, state) {
        return err(&format!("storage error: {error:?}"));
    }

    let verb = if merge_mode { "merged" } else { "imported" };
    log::info!("{verb} {imported_tasks} tasks and {imported_projects} projects");
    ok(ImportResult {
        success: true,
        imported_tasks,
        imported_projects,
        message: format!("Successfully {verb} {imported_tasks} tasks and {imported_projects} projects"),
        export_version,
        export_date,
    })
}

// Backups.

#[derive(Debug, serde::Serialize)]
pub struct BackupEntry {
    pub name: String,
    pub modified_at: i64,
}

fn list_backups_impl(ctx: &impl CommandCtx) -> CommandResult<Vec<BackupEntry>> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);

    // If the backup directory does not exist yet, create it and return an empty list.
    let list = match storage.list_backups() {
        Ok(list) => list,
        Err(StorageError::Io(io)) if io.kind() == std::io::ErrorKind::NotFound => {
            if let Err(error) = storage.ensure_dirs() {
                return err(&format!("storage error: {error:?}"));
            }
            Vec::new()
        }
        Err(error) => return err(&format!("storage error: {error:?}")),
    };

    ok(list
        .into_iter()
        .map(|(name, modified_at)| BackupEntry { name, modified_at })
        .collect())
}

fn create_backup_impl(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<bool> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    if let Err(error) = storage.save_data(&state.data_file(), true) {
        return err(&format!("storage error: {error:?}"));
    }
    let now = Utc::now().timestamp();
    let mut settings = state.settings();
    settings.last_backup_at = Some(now);
    state.update_settings(settings);
    if let Err(error) = storage.save_settings(&state.settings_file()) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(true)
}

fn delete_backup_impl(ctx: &impl CommandCtx, filename: String) -> CommandResult<bool> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    if let Err(error) = storage.delete_backup(&filename) {
        return err(&format!("storage error: {error:?}"));
    }
    ok(true)
}

fn restore_backup_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    filename: String,
) -> CommandResult<StatePayload> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    let data = match storage.restore_backup(&filename) {
        Ok(data) => data,
        Err(error) => return err(&format!("storage error: {error:?}")),
    };
    state.replace_data(data.tasks, data.projects, data.current_project_id);
    let payload = payload(state);
    ctx.emit_state_updated(payload.clone());
    ok(payload)
}

fn import_backup_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    path: String,
) -> CommandResult<StatePayload> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error:?}"));
    }
    let data = match storage.restore_from_path(Path::new(&path)) {
        Ok(data) => data,
        Err(error) => return err(&format!("storage error: {error:?}")),
    };
    state.replace_data(data.tasks, data.projects, data.current_project_id);
    let payload = payload(state);
    ctx.emit_state_updated(payload.clone());
    ok(payload)
}

// Tauri wrappers. Each one binds the runtime context and delegates to the
// testable `_impl` above.

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_state(app: AppHandle, state: State<AppState>) -> CommandResult<StatePayload> {
    let ctx = TauriCommandCtx { app: &app };
    load_state_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_tasks(state: State<AppState>) -> CommandResult<Vec<Task>> {
    get_tasks_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_tasks_by_project(state: State<AppState>, project_id: u32) -> CommandResult<Vec<Task>> {
    get_tasks_by_project_impl(state.inner(), project_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn query_tasks(
    state: State<AppState>,
    project_id: Option<u32>,
    query: TaskQuery,
) -> CommandResult<Vec<Task>> {
    query_tasks_impl(state.inner(), project_id, query)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn query_projects(state: State<AppState>, query: TaskQuery) -> CommandResult<Vec<Project>> {
    query_projects_impl(state.inner(), query)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_all_tags(state: State<AppState>) -> CommandResult<Vec<String>> {
    get_all_tags_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_task_stats(state: State<AppState>) -> CommandResult<TaskStats> {
    get_task_stats_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_project_stats(state: State<AppState>, project_id: u32) -> CommandResult<ProjectStats> {
    get_project_stats_impl(state.inner(), project_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn create_task(
    app: AppHandle,
    state: State<AppState>,
    request: TaskCreateRequest,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    create_task_impl(&ctx, state.inner(), request)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn update_task(
    app: AppHandle,
    state: State<AppState>,
    request: TaskUpdateRequest,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    update_task_impl(&ctx, state.inner(), request)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn toggle_task_status(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    toggle_task_status_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_task(app: AppHandle, state: State<AppState>, task_id: u32) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    delete_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_tasks(
    app: AppHandle,
    state: State<AppState>,
    task_ids: Vec<u32>,
) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    delete_tasks_impl(&ctx, state.inner(), task_ids)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task_tag(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    tag: String,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_tag_impl(&ctx, state.inner(), task_id, tag)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn remove_task_tag(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    tag: String,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    remove_task_tag_impl(&ctx, state.inner(), task_id, tag)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn set_task_due_date(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    due_date: Option<i64>,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    set_task_due_date_impl(&ctx, state.inner(), task_id, due_date)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task_subtask(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    subtask_title: String,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_subtask_impl(&ctx, state.inner(), task_id, subtask_title)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn toggle_task_subtask(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    subtask_id: u32,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    toggle_task_subtask_impl(&ctx, state.inner(), task_id, subtask_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task_comment(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    comment_text: String,
    author: String,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_comment_impl(&ctx, state.inner(), task_id, comment_text, author)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task_time(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    minutes: u32,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_time_impl(&ctx, state.inner(), task_id, minutes)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn reset_task_time(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    reset_task_time_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn set_task_estimated_time(
    app: AppHandle,
    state: State<AppState>,
    task_id: u32,
    estimated_minutes: Option<u32>,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    set_task_estimated_time_impl(&ctx, state.inner(), task_id, estimated_minutes)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn create_project(
    app: AppHandle,
    state: State<AppState>,
    request: ProjectCreateRequest,
) -> CommandResult<Project> {
    let ctx = TauriCommandCtx { app: &app };
    create_project_impl(&ctx, state.inner(), request)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_projects(state: State<AppState>) -> CommandResult<Vec<Project>> {
    get_projects_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn get_current_project(state: State<AppState>) -> CommandResult<Option<Project>> {
    get_current_project_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn switch_project(
    app: AppHandle,
    state: State<AppState>,
    project_id: u32,
) -> CommandResult<Project> {
    let ctx = TauriCommandCtx { app: &app };
    switch_project_impl(&ctx, state.inner(), project_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn update_project(
    app: AppHandle,
    state: State<AppState>,
    request: ProjectUpdateRequest,
) -> CommandResult<Project> {
    let ctx = TauriCommandCtx { app: &app };
    update_project_impl(&ctx, state.inner(), request)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_project(
    app: AppHandle,
    state: State<AppState>,
    project_id: u32,
) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    delete_project_impl(&ctx, state.inner(), project_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn update_settings(
    app: AppHandle,
    state: State<AppState>,
    settings: Settings,
) -> CommandResult<Settings> {
    let ctx = TauriCommandCtx { app: &app };
    update_settings_impl(&ctx, state.inner(), settings)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn export_data(state: State<AppState>) -> CommandResult<String> {
    export_data_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn export_data_to_file(state: State<AppState>, file_path: String) -> CommandResult<String> {
    export_data_to_file_impl(state.inner(), file_path)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn validate_import_data(json_content: String) -> CommandResult<ImportValidation> {
    validate_import_data_impl(json_content)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn import_data(
    app: AppHandle,
    state: State<AppState>,
    json_content: String,
    merge_mode: bool,
) -> CommandResult<ImportResult> {
    let ctx = TauriCommandCtx { app: &app };
    import_data_impl(&ctx, state.inner(), json_content, merge_mode)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn list_backups(app: AppHandle) -> CommandResult<Vec<BackupEntry>> {
    let ctx = TauriCommandCtx { app: &app };
    list_backups_impl(&ctx)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn create_backup(app: AppHandle, state: State<AppState>) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    create_backup_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_backup(app: AppHandle, filename: String) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    delete_backup_impl(&ctx, filename)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn restore_backup(
    app: AppHandle,
    state: State<AppState>,
    filename: String,
) -> CommandResult<StatePayload> {
    let ctx = TauriCommandCtx { app: &app };
    restore_backup_impl(&ctx, state.inner(), filename)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn import_backup(
    app: AppHandle,
    state: State<AppState>,
    path: String,
) -> CommandResult<StatePayload> {
    let ctx = TauriCommandCtx { app: &app };
    import_backup_impl(&ctx, state.inner(), path)
}
