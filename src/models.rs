use std::fmt;

use serde::{Deserialize, Serialize};

pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Fixed total order used for sorting: high > medium > low.
    pub fn rank(self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Subtask {
    pub id: u32,
    pub title: String,
    pub completed: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Comment {
    pub id: u32,
    pub text: String,
    pub author: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: u32,
    pub project_id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Accumulated minutes. Only grows, except through `reset_time`.
    #[serde(default)]
    pub time_spent: u32,
    #[serde(default)]
    pub estimated_time: Option<u32>,
}

/// Lowercases and trims a tag. Returns `None` for tags that normalize to
/// nothing so they never reach the task's tag set.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let normalized = tag.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

impl Task {
    pub fn new(
        id: u32,
        project_id: u32,
        title: String,
        description: String,
        now: Timestamp,
    ) -> Self {
        Task {
            id,
            project_id,
            title,
            description,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            created_at: now,
            updated_at: now,
            due_date: None,
            tags: Vec::new(),
            subtasks: Vec::new(),
            comments: Vec::new(),
            time_spent: 0,
            estimated_time: None,
        }
    }

    pub fn update_status(&mut self, status: TaskStatus, now: Timestamp) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn update_priority(&mut self, priority: TaskPriority, now: Timestamp) {
        self.priority = priority;
        self.updated_at = now;
    }

    pub fn update_content(&mut self, title: String, description: String, now: Timestamp) {
        self.title = title;
        self.description = description;
        self.updated_at = now;
    }

    pub fn set_due_date(&mut self, due_date: Option<Timestamp>, now: Timestamp) {
        self.due_date = due_date;
        self.updated_at = now;
    }

    /// Tags are normalized (trimmed, lowercased) and deduplicated here, at the
    /// point of insertion. Readers can rely on the stored set being canonical.
    pub fn add_tag(&mut self, tag: &str, now: Timestamp) {
        let Some(tag) = normalize_tag(tag) else {
            return;
        };
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.updated_at = now;
        }
    }

    pub fn remove_tag(&mut self, tag: &str, now: Timestamp) {
        let Some(tag) = normalize_tag(tag) else {
            return;
        };
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        if self.tags.len() != before {
            self.updated_at = now;
        }
    }

    pub fn set_tags(&mut self, tags: Vec<String>, now: Timestamp) {
        let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
        for tag in &tags {
            if let Some(tag) = normalize_tag(tag) {
                if !normalized.contains(&tag) {
                    normalized.push(tag);
                }
            }
        }
        self.tags = normalized;
        self.updated_at = now;
    }

    pub fn add_subtask(&mut self, id: u32, title: String, now: Timestamp) {
        self.subtasks.push(Subtask {
            id,
            title,
            completed: false,
            created_at: now,
        });
        self.updated_at = now;
    }

    pub fn toggle_subtask(&mut self, subtask_id: u32, now: Timestamp) -> bool {
        if let Some(subtask) = self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            subtask.completed = !subtask.completed;
            self.updated_at = now;
            return true;
        }
        false
    }

    pub fn add_comment(&mut self, id: u32, text: String, author: String, now: Timestamp) {
        self.comments.push(Comment {
            id,
            text,
            author,
            created_at: now,
        });
        self.updated_at = now;
    }

    pub fn add_time(&mut self, minutes: u32, now: Timestamp) {
        self.time_spent = self.time_spent.saturating_add(minutes);
        self.updated_at = now;
    }

    pub fn reset_time(&mut self, now: Timestamp) {
        self.time_spent = 0;
        self.updated_at = now;
    }

    pub fn set_estimated_time(&mut self, minutes: Option<u32>, now: Timestamp) {
        self.estimated_time = minutes;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TaskTemplate {
    pub title_prefix: Option<String>,
    pub default_description: Option<String>,
    #[serde(default)]
    pub default_tags: Vec<String>,
    pub default_estimated_time: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ProjectSettings {
    #[serde(default)]
    pub task_template: Option<TaskTemplate>,
    #[serde(default = "default_project_priority")]
    pub default_priority: TaskPriority,
    #[serde(default)]
    pub auto_archive_done: bool,
    #[serde(default = "default_show_completed")]
    pub show_completed_tasks: bool,
    #[serde(default)]
    pub default_tags: Vec<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            task_template: None,
            default_priority: default_project_priority(),
            auto_archive_done: false,
            show_completed_tasks: default_show_completed(),
            default_tags: Vec::new(),
        }
    }
}

fn default_project_priority() -> TaskPriority {
    TaskPriority::Medium
}

fn default_show_completed() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub description: Option<String>,
    /// Hex color for the UI swatch.
    pub color: Option<String>,
    /// Emoji or icon identifier.
    pub icon: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub is_active: bool,
    /// Derived; recomputed by the state layer after task mutations.
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub settings: ProjectSettings,
}

impl Project {
    pub fn new(id: u32, name: String, now: Timestamp) -> Self {
        Project {
            id,
            name,
            description: None,
            color: None,
            icon: None,
            created_at: now,
            updated_at: now,
            is_active: true,
            task_count: 0,
            settings: ProjectSettings::default(),
        }
    }

    pub fn new_with_details(
        id: u32,
        name: String,
        description: Option<String>,
        color: Option<String>,
        icon: Option<String>,
        now: Timestamp,
    ) -> Self {
        Project {
            description: description.filter(|d| !d.is_empty()),
            color,
            icon,
            ..Project::new(id, name, now)
        }
    }

    pub fn update_info(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
        icon: Option<String>,
        now: Timestamp,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(color) = color {
            self.color = Some(color);
        }
        if let Some(icon) = icon {
            self.icon = Some(icon);
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackupSchedule {
    None,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    pub theme: String,
    #[serde(default)]
    pub backup_schedule: BackupSchedule,
    #[serde(default)]
    pub last_backup_at: Option<Timestamp>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            backup_schedule: BackupSchedule::Daily,
            last_backup_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataFile {
    pub schema_version: u32,
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub current_project_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SettingsFile {
    pub schema_version: u32,
    pub settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCreateRequest {
    pub title: String,
    pub description: String,
    /// If None, the task lands in the current project.
    pub project_id: Option<u32>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Timestamp>,
    pub tags: Option<Vec<String>>,
    pub estimated_time: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskUpdateRequest {
    pub id: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Outer None = leave alone, inner None = clear the due date.
    pub due_date: Option<Option<Timestamp>>,
    pub tags: Option<Vec<String>>,
    pub estimated_time: Option<Option<u32>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectUpdateRequest {
    pub id: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub settings: Option<ProjectSettings>,
}
