//! Project documents.
//!
//! A [`Project`] owns its whole task forest and is persisted as one
//! document. Mutations never edit a project in place: each method returns a
//! new snapshot whose `updated_at` moves forward only when the tree changed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::instant::InstantData;
use crate::task::{Task, TaskCounts, TaskUpdate};
use crate::tree::{self, TreeEdit};

/// Top-level container for a task forest and its captures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub instant_data: Vec<InstantData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Template the project was created from; `None` for ad-hoc projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoot_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoot_dates: Option<Vec<NaiveDate>>,
}

impl Project {
    /// Empty ad-hoc project
    pub fn blank(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            tasks: Vec::new(),
            instant_data: Vec::new(),
            created_at: now,
            updated_at: now,
            template: None,
            shoot_days: None,
            shoot_dates: None,
        }
    }

    fn with_tasks(&self, tasks: Vec<Task>, now: DateTime<Utc>) -> Project {
        Project {
            tasks,
            updated_at: now,
            ..self.clone_header()
        }
    }

    // Everything except the forest, which the caller supplies.
    fn clone_header(&self) -> Project {
        Project {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            tasks: Vec::new(),
            instant_data: self.instant_data.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            template: self.template.clone(),
            shoot_days: self.shoot_days,
            shoot_dates: self.shoot_dates.clone(),
        }
    }

    fn resolve(&self, edit: TreeEdit, now: DateTime<Utc>) -> Project {
        match edit {
            TreeEdit::Changed(tasks) => self.with_tasks(tasks, now),
            TreeEdit::NotFound | TreeEdit::Unchanged => self.clone(),
        }
    }

    fn resolve_strict(&self, edit: TreeEdit, id: &str, now: DateTime<Utc>) -> Result<Project> {
        match edit {
            TreeEdit::NotFound => Err(crate::error::Error::TaskNotFound(id.to_string())),
            other => Ok(self.resolve(other, now)),
        }
    }

    /// Snapshot with `task` appended under `parent_id` (or at the root)
    pub fn insert_task(&self, parent_id: Option<&str>, task: Task) -> Project {
        let now = Utc::now();
        self.resolve(tree::edit_insert(&self.tasks, parent_id, task, now), now)
    }

    pub fn try_insert_task(&self, parent_id: Option<&str>, task: Task) -> Result<Project> {
        let now = Utc::now();
        let edit = tree::edit_insert(&self.tasks, parent_id, task, now);
        self.resolve_strict(edit, parent_id.unwrap_or_default(), now)
    }

    /// Snapshot with `update` merged into task `id`
    pub fn update_task(&self, id: &str, update: &TaskUpdate) -> Project {
        let now = Utc::now();
        self.resolve(tree::edit_update(&self.tasks, id, update, now), now)
    }

    pub fn try_update_task(&self, id: &str, update: &TaskUpdate) -> Result<Project> {
        let now = Utc::now();
        self.resolve_strict(tree::edit_update(&self.tasks, id, update, now), id, now)
    }

    /// Snapshot with the node `task.id` replaced wholesale
    pub fn replace_task(&self, task: &Task) -> Project {
        self.resolve(tree::edit_replace(&self.tasks, task), Utc::now())
    }

    pub fn toggle_task(&self, id: &str) -> Project {
        let now = Utc::now();
        self.resolve(tree::edit_toggle(&self.tasks, id, now), now)
    }

    pub fn try_toggle_task(&self, id: &str) -> Result<Project> {
        let now = Utc::now();
        self.resolve_strict(tree::edit_toggle(&self.tasks, id, now), id, now)
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        tree::find_task(&self.tasks, id)
    }

    pub fn task_counts(&self) -> TaskCounts {
        tree::count_tasks(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn project_with_tasks() -> Project {
        let mut project = Project::blank("My Film");
        project.updated_at = project.created_at - chrono::Duration::hours(1);
        let chapter = Task::new("Chapter 1").with_subtasks(vec![Task::new("Intro")]);
        project.tasks = vec![chapter, Task::new("Editing")];
        project
    }

    #[test]
    fn blank_project_is_empty() {
        let project = Project::blank("Vlog");
        assert!(project.tasks.is_empty());
        assert!(project.instant_data.is_empty());
        assert_eq!(project.template, None);
        assert_eq!(project.created_at, project.updated_at);
    }

    #[test]
    fn mutation_returns_new_snapshot_and_bumps_updated_at() {
        let project = project_with_tasks();
        let chapter_id = project.tasks[0].id.clone();

        let next = project.insert_task(Some(&chapter_id), Task::new("Research"));
        assert_eq!(next.tasks[0].subtasks.len(), 2);
        assert_eq!(project.tasks[0].subtasks.len(), 1);
        assert!(next.updated_at > project.updated_at);
        assert_eq!(next.id, project.id);
        assert_eq!(next.created_at, project.created_at);
    }

    #[test]
    fn noop_mutation_keeps_snapshot_identical() {
        let project = project_with_tasks();
        assert_eq!(project.toggle_task("missing"), project);

        let intro_id = project.tasks[0].subtasks[0].id.clone();
        assert_eq!(
            project.update_task(&intro_id, &TaskUpdate::new().completed(false)),
            project
        );
    }

    #[test]
    fn strict_mutations_surface_not_found() {
        let project = project_with_tasks();
        assert!(matches!(
            project.try_toggle_task("missing"),
            Err(Error::TaskNotFound(_))
        ));
        assert!(matches!(
            project.try_insert_task(Some("missing"), Task::new("x")),
            Err(Error::TaskNotFound(_))
        ));
        let toggled = project
            .try_toggle_task(&project.tasks[1].id)
            .expect("existing task");
        assert_eq!(toggled.task_counts().completed, 1);
    }

    #[test]
    fn replace_task_swaps_node() {
        let project = project_with_tasks();
        let mut edited = project.tasks[1].clone();
        edited.completed = true;
        edited.name = "Final edit".to_string();

        let next = project.replace_task(&edited);
        assert_eq!(next.find_task(&edited.id), Some(&edited));
        assert_eq!(next.task_counts().total, 3);
    }
}
