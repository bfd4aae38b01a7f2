//! Task nodes and their partial updates.
//!
//! A project's checklist is a forest of [`Task`] values. Children are owned
//! inline (`subtasks`), so a tree is always acyclic and no child is shared
//! between parents. Identifiers are unique across a project's whole tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Annotation attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNote {
    #[serde(default)]
    pub text: String,
    /// Opaque image reference (URL or data URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl TaskNote {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// True when neither text nor photo carries content
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.photo.as_deref().map_or(true, str::is_empty)
    }

    /// Build a note from edited fields, `None` when the edit is empty.
    ///
    /// Text is trimmed and a blank photo reference is dropped. This is the
    /// caller-side normalization; the tree engine stores notes as given.
    pub fn from_parts(text: Option<&str>, photo: Option<&str>) -> Option<Self> {
        let text = text.map(str::trim).unwrap_or_default().to_string();
        let photo = photo
            .map(str::trim)
            .filter(|photo| !photo.is_empty())
            .map(str::to_string);
        let note = Self { text, photo };
        if note.is_empty() {
            None
        } else {
            Some(note)
        }
    }
}

/// A node in a project's task tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<TaskNote>,
    #[serde(default)]
    pub subtasks: Vec<Task>,
    /// Display-only expansion state
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_expanded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// New incomplete leaf task with a fresh identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self::at(name, Utc::now())
    }

    /// New incomplete leaf task stamped with `now`
    pub fn at(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            completed: false,
            note: None,
            subtasks: Vec::new(),
            is_expanded: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Task>) -> Self {
        self.subtasks = subtasks;
        self
    }

    /// True when a non-empty note is attached
    pub fn has_note(&self) -> bool {
        self.note.as_ref().is_some_and(|note| !note.is_empty())
    }

    /// Copy of this node's fields with a different child list
    pub(crate) fn with_children(&self, subtasks: Vec<Task>) -> Task {
        Task {
            id: self.id.clone(),
            name: self.name.clone(),
            completed: self.completed,
            note: self.note.clone(),
            subtasks,
            is_expanded: self.is_expanded,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update merged into a single task.
///
/// Unset fields leave the task untouched. `note` is tri-state: unset keeps
/// the current note, `Some(None)` clears it, `Some(Some(n))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub completed: Option<bool>,
    pub note: Option<Option<TaskNote>>,
    pub is_expanded: Option<bool>,
}

impl TaskUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn note(mut self, note: Option<TaskNote>) -> Self {
        self.note = Some(note);
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.is_expanded = Some(expanded);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.completed.is_none()
            && self.note.is_none()
            && self.is_expanded.is_none()
    }

    /// Merge into `task`, returning the new node only if a field changed
    pub(crate) fn merge(&self, task: &Task, now: DateTime<Utc>) -> Option<Task> {
        let mut changed = false;
        let mut merged = task.clone();

        if let Some(name) = &self.name {
            if merged.name != *name {
                merged.name = name.clone();
                changed = true;
            }
        }
        if let Some(completed) = self.completed {
            if merged.completed != completed {
                merged.completed = completed;
                changed = true;
            }
        }
        if let Some(note) = &self.note {
            if merged.note != *note {
                merged.note = note.clone();
                changed = true;
            }
        }
        if let Some(expanded) = self.is_expanded {
            if merged.is_expanded != expanded {
                merged.is_expanded = expanded;
                changed = true;
            }
        }

        if changed {
            merged.updated_at = now;
            Some(merged)
        } else {
            None
        }
    }
}

/// Aggregate progress over a task forest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// Whole-number completion percentage, 0 for an empty forest
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_emptiness() {
        assert!(TaskNote::new("").is_empty());
        assert!(TaskNote::new("").with_photo("").is_empty());
        assert!(!TaskNote::new("x").is_empty());
        assert!(!TaskNote::new("").with_photo("data:image/png;base64,AA").is_empty());
    }

    #[test]
    fn from_parts_normalizes_empty_edits_to_absent() {
        assert_eq!(TaskNote::from_parts(Some("   "), None), None);
        assert_eq!(TaskNote::from_parts(None, Some("")), None);
        assert_eq!(
            TaskNote::from_parts(Some("  call venue "), Some(" ")),
            Some(TaskNote::new("call venue"))
        );
        assert_eq!(
            TaskNote::from_parts(None, Some("img.png")),
            Some(TaskNote::new("").with_photo("img.png"))
        );
    }

    #[test]
    fn merge_reports_no_change_for_equal_values() {
        let task = Task::new("Daily Docket");
        let update = TaskUpdate::new().name("Daily Docket").completed(false);
        assert!(update.merge(&task, Utc::now()).is_none());
    }

    #[test]
    fn merge_touches_only_given_fields() {
        let task = Task::new("Hook");
        let later = task.updated_at + chrono::Duration::seconds(5);
        let merged = TaskUpdate::new()
            .completed(true)
            .merge(&task, later)
            .expect("changed");
        assert!(merged.completed);
        assert_eq!(merged.name, "Hook");
        assert_eq!(merged.note, None);
        assert_eq!(merged.created_at, task.created_at);
        assert_eq!(merged.updated_at, later);
    }

    #[test]
    fn empty_note_update_is_stored_as_given() {
        let task = Task::new("Recap");
        let merged = TaskUpdate::new()
            .note(Some(TaskNote::new("")))
            .merge(&task, Utc::now())
            .expect("changed");
        assert_eq!(merged.note, Some(TaskNote::new("")));
        assert!(!merged.has_note());
    }

    #[test]
    fn serialized_shape_uses_camel_case() {
        let mut task = Task::new("Tease the Video");
        task.is_expanded = true;
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("isExpanded").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("note").is_none());

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn counts_helpers() {
        let counts = TaskCounts {
            total: 8,
            completed: 2,
        };
        assert_eq!(counts.remaining(), 6);
        assert_eq!(counts.percent(), 25);
        assert_eq!(TaskCounts::default().percent(), 0);
    }
}
