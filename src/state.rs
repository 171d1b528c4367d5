use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::models::{
    normalize_tag, DataFile, Project, ProjectCreateRequest, ProjectUpdateRequest, Settings,
    SettingsFile, Task, TaskCreateRequest, TaskStatus, TaskUpdateRequest, Timestamp,
};

const SCHEMA_VERSION: u32 = 1;
const DEFAULT_PROJECT_NAME: &str = "Default Project";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

#[derive(Debug)]
struct AppData {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    current_project_id: Option<u32>,
    settings: Settings,
}

impl AppState {
    pub fn new(
        tasks: Vec<Task>,
        projects: Vec<Project>,
        current_project_id: Option<u32>,
        settings: Settings,
    ) -> Self {
        let mut data = AppData {
            tasks,
            projects,
            current_project_id,
            settings,
        };
        normalize(&mut data);
        Self {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    pub fn data_file(&self) -> DataFile {
        let guard = self.inner.lock().expect("state poisoned");
        DataFile {
            schema_version: SCHEMA_VERSION,
            tasks: guard.tasks.clone(),
            projects: guard.projects.clone(),
            current_project_id: guard.current_project_id,
        }
    }

    pub fn settings_file(&self) -> SettingsFile {
        let guard = self.inner.lock().expect("state poisoned");
        SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: guard.settings.clone(),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn tasks_by_project(&self, project_id: u32) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn task(&self, task_id: u32) -> Option<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.iter().find(|t| t.id == task_id).cloned()
    }

    pub fn projects(&self) -> Vec<Project> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.projects.clone()
    }

    pub fn project(&self, project_id: u32) -> Option<Project> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.projects.iter().find(|p| p.id == project_id).cloned()
    }

    pub fn current_project_id(&self) -> Option<u32> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.current_project_id
    }

    pub fn current_project(&self) -> Option<Project> {
        let guard = self.inner.lock().expect("state poisoned");
        guard
            .current_project_id
            .and_then(|id| guard.projects.iter().find(|p| p.id == id).cloned())
    }

    pub fn settings(&self) -> Settings {
        let guard = self.inner.lock().expect("state poisoned");
        guard.settings.clone()
    }

    pub fn update_settings(&self, settings: Settings) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.settings = settings;
    }

    /// Creates a task in the requested (or current) project, applying the
    /// project's default priority, default tags, and task template. Returns
    /// None when the target project does not exist.
    pub fn create_task(&self, request: TaskCreateRequest, now: Timestamp) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let project_id = request.project_id.or(guard.current_project_id)?;
        let project = guard.projects.iter().find(|p| p.id == project_id)?.clone();

        let id = guard.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;

        let template = project.settings.task_template.as_ref();
        let title = match template.and_then(|t| t.title_prefix.as_deref()) {
            Some(prefix) if !request.title.starts_with(prefix) => {
                format!("{prefix}{}", request.title)
            }
            _ => request.title,
        };
        let description = if request.description.is_empty() {
            template
                .and_then(|t| t.default_description.clone())
                .unwrap_or_default()
        } else {
            request.description
        };

        let mut task = Task::new(id, project_id, title, description, now);
        task.priority = request
            .priority
            .unwrap_or(project.settings.default_priority);
        task.due_date = request.due_date;
        task.estimated_time = request
            .estimated_time
            .or_else(|| template.and_then(|t| t.default_estimated_time));

        for tag in &project.settings.default_tags {
            task.add_tag(tag, now);
        }
        if let Some(template) = template {
            for tag in &template.default_tags {
                task.add_tag(tag, now);
            }
        }
        for tag in request.tags.as_deref().unwrap_or_default() {
            task.add_tag(tag, now);
        }
        task.updated_at = now;

        guard.tasks.push(task.clone());
        recount(&mut guard);
        Some(task)
    }

    pub fn update_task(&self, request: TaskUpdateRequest, now: Timestamp) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == request.id)?;

        if let Some(title) = request.title {
            task.title = title;
        }
        if let Some(description) = request.description {
            task.description = description;
        }
        if let Some(status) = request.status {
            task.status = status;
        }
        if let Some(priority) = request.priority {
            task.priority = priority;
        }
        if let Some(due_date) = request.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = request.tags {
            task.set_tags(tags, now);
        }
        if let Some(estimated_time) = request.estimated_time {
            task.estimated_time = estimated_time;
        }
        task.updated_at = now;
        Some(task.clone())
    }

    /// Cycles todo -> in-progress -> done -> todo.
    pub fn toggle_task_status(&self, task_id: u32, now: Timestamp) -> Option<Task> {
        self.modify_task(task_id, |task| {
            let next = match task.status {
                TaskStatus::Todo => TaskStatus::InProgress,
                TaskStatus::InProgress => TaskStatus::Done,
                TaskStatus::Done => TaskStatus::Todo,
            };
            task.update_status(next, now);
        })
    }

    pub fn remove_task(&self, task_id: u32) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.tasks.len();
        guard.tasks.retain(|t| t.id != task_id);
        let removed = guard.tasks.len() != before;
        if removed {
            recount(&mut guard);
        }
        removed
    }

    pub fn remove_tasks(&self, task_ids: &[u32]) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.retain(|t| !task_ids.contains(&t.id));
        recount(&mut guard);
    }

    pub fn add_task_tag(&self, task_id: u32, tag: &str, now: Timestamp) -> Option<Task> {
        self.modify_task(task_id, |task| task.add_tag(tag, now))
    }

    pub fn remove_task_tag(&self, task_id: u32, tag: &str, now: Timestamp) -> Option<Task> {
        self.modify_task(task_id, |task| task.remove_tag(tag, now))
    }

    pub fn set_task_due_date(
        &self,
        task_id: u32,
        due_date: Option<Timestamp>,
        now: Timestamp,
    ) -> Option<Task> {
        self.modify_task(task_id, |task| task.set_due_date(due_date, now))
    }

    pub fn add_task_subtask(&self, task_id: u32, title: String, now: Timestamp) -> Option<Task> {
        self.modify_task(task_id, |task| {
            let subtask_id = task.subtasks.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            task.add_subtask(subtask_id, title, now);
        })
    }

    pub fn toggle_task_subtask(
        &self,
        task_id: u32,
        subtask_id: u32,
        now: Timestamp,
    ) -> Option<Task> {
        self.modify_task(task_id, |task| {
            task.toggle_subtask(subtask_id, now);
        })
    }

    pub fn add_task_comment(
        &self,
        task_id: u32,
        text: String,
        author: String,
        now: Timestamp,
    ) -> Option<Task> {
        self.modify_task(task_id, |task| {
            let comment_id = task.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            task.add_comment(comment_id, text, author, now);
        })
    }

    pub fn add_task_time(&self, task_id: u32, minutes: u32, now: Timestamp) -> Option<Task> {
        self.modify_task(task_id, |task| task.add_time(minutes, now))
    }

    pub fn reset_task_time(&self, task_id: u32, now: Timestamp) -> Option<Task> {
        self.modify_task(task_id, |task| task.reset_time(now))
    }

    pub fn set_task_estimated_time(
        &self,
        task_id: u32,
        minutes: Option<u32>,
        now: Timestamp,
    ) -> Option<Task> {
        self.modify_task(task_id, |task| task.set_estimated_time(minutes, now))
    }

    pub fn create_project(&self, request: ProjectCreateRequest, now: Timestamp) -> Project {
        let mut guard = self.inner.lock().expect("state poisoned");
        let id = guard.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let project = Project::new_with_details(
            id,
            request.name,
            request.description,
            request.color,
            request.icon,
            now,
        );
        guard.projects.push(project.clone());
        if guard.current_project_id.is_none() {
            guard.current_project_id = Some(id);
        }
        project
    }

    pub fn update_project(&self, request: ProjectUpdateRequest, now: Timestamp) -> Option<Project> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let project = guard.projects.iter_mut().find(|p| p.id == request.id)?;
        project.update_info(
            request.name,
            request.description,
            request.color,
            request.icon,
            now,
        );
        if let Some(is_active) = request.is_active {
            project.is_active = is_active;
        }
        if let Some(settings) = request.settings {
            project.settings = settings;
        }
        Some(project.clone())
    }

    /// Removes a project and all of its tasks. The caller is responsible for
    /// refusing to delete the last project; if the current project goes away
    /// the first remaining one becomes current.
    pub fn remove_project(&self, project_id: u32) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.projects.len();
        guard.projects.retain(|p| p.id != project_id);
        if guard.projects.len() == before {
            return false;
        }
        guard.tasks.retain(|t| t.project_id != project_id);
        if guard.current_project_id == Some(project_id) {
            guard.current_project_id = guard.projects.first().map(|p| p.id);
        }
        recount(&mut guard);
        true
    }

    pub fn switch_project(&self, project_id: u32) -> Option<Project> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let project = guard.projects.iter().find(|p| p.id == project_id)?.clone();
        guard.current_project_id = Some(project_id);
        Some(project)
    }

    pub fn project_count(&self) -> usize {
        let guard = self.inner.lock().expect("state poisoned");
        guard.projects.len()
    }

    /// Replaces the whole data set (restore/import), re-running load
    /// normalization.
    pub fn replace_data(
        &self,
        tasks: Vec<Task>,
        projects: Vec<Project>,
        current_project_id: Option<u32>,
    ) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
        guard.projects = projects;
        guard.current_project_id = current_project_id;
        normalize(&mut guard);
    }

    /// Merges imported projects and their tasks into the existing data set.
    /// Imported records get fresh ids past the current maxima so nothing
    /// collides; tasks keep following their (remapped) project. Returns
    /// (imported task count, imported project count).
    pub fn merge_data(&self, tasks: Vec<Task>, projects: Vec<Project>) -> (usize, usize) {
        let mut guard = self.inner.lock().expect("state poisoned");
        let mut next_task_id = guard.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let mut next_project_id = guard.projects.iter().map(|p| p.id).max().unwrap_or(0);

        let mut project_id_map: Vec<(u32, u32)> = Vec::with_capacity(projects.len());
        let mut imported_projects = 0usize;
        for mut project in projects {
            next_project_id += 1;
            project_id_map.push((project.id, next_project_id));
            project.id = next_project_id;
            guard.projects.push(project);
            imported_projects += 1;
        }

        let mut imported_tasks = 0usize;
        for mut task in tasks {
            // Tasks pointing at a project that was not part of the import are
            // dropped rather than attached to an arbitrary project.
            let Some(&(_, new_project_id)) = project_id_map
                .iter()
                .find(|(old, _)| *old == task.project_id)
            else {
                continue;
            };
            next_task_id += 1;
            task.id = next_task_id;
            task.project_id = new_project_id;
            guard.tasks.push(task);
            imported_tasks += 1;
        }

        normalize(&mut guard);
        (imported_tasks, imported_projects)
    }

    fn modify_task(&self, task_id: u32, mutate: impl FnOnce(&mut Task)) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == task_id)?;
        mutate(task);
        Some(task.clone())
    }
}

/// Load-time normalization: canonical tags, at least one project, a current
/// project that actually exists, fresh task counts. Does not bump updated_at;
/// this is repair, not mutation.
fn normalize(data: &mut AppData) {
    for task in &mut data.tasks {
        let mut tags: Vec<String> = Vec::with_capacity(task.tags.len());
        for tag in &task.tags {
            if let Some(tag) = normalize_tag(tag) {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        task.tags = tags;
    }

    if data.projects.is_empty() {
        data.projects.push(Project::new(
            1,
            DEFAULT_PROJECT_NAME.to_string(),
            Utc::now().timestamp(),
        ));
    }

    let current_is_valid = data
        .current_project_id
        .is_some_and(|id| data.projects.iter().any(|p| p.id == id));
    if !current_is_valid {
        data.current_project_id = data.projects.first().map(|p| p.id);
    }

    recount(data);
}

fn recount(data: &mut AppData) {
    for project in &mut data.projects {
        project.task_count = data
            .tasks
            .iter()
            .filter(|t| t.project_id == project.id)
            .count() as u32;
    }
}
