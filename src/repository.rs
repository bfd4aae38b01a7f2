//! Project and capture repository.
//!
//! Owns the typed collections and the change log. Every call is a full
//! read-modify-write of one collection; storage failures are absorbed by
//! [`Collections`] and never reach the caller. Two repositories sharing a
//! directory can clobber each other's appends. That race is accepted.

use serde::Serialize;
use tracing::{debug, info};

use crate::changelog::{ChangeLog, ChangeLogEntry, EntityKind, SyncOperation};
use crate::error::Result;
use crate::instant::{InstantData, InstantKind};
use crate::project::Project;
use crate::storage::{Collections, StorageKey, Store};
use crate::task::Task;

/// Nominal local storage quota reported by [`Repository::storage_info`]
pub const STORAGE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Serialized size of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionUsage {
    pub key: String,
    pub bytes: u64,
}

/// Storage usage across every collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub collections: Vec<CollectionUsage>,
    pub used: u64,
    pub quota: u64,
    pub remaining: u64,
}

/// Repository over an injected [`Store`]
#[derive(Debug)]
pub struct Repository<S> {
    collections: Collections<S>,
}

impl<S: Store> Repository<S> {
    pub fn new(store: S) -> Self {
        Self {
            collections: Collections::new(store),
        }
    }

    pub fn store(&self) -> &S {
        self.collections.store()
    }

    pub fn change_log(&self) -> ChangeLog<'_, S> {
        ChangeLog::new(&self.collections)
    }

    // --- projects ---

    /// Upsert by id and log `create` or `update` with the full snapshot
    pub fn save_project(&self, project: &Project) {
        let mut projects: Vec<Project> = self.collections.get(StorageKey::Projects);
        let operation = match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => {
                *existing = project.clone();
                SyncOperation::Update
            }
            None => {
                projects.push(project.clone());
                SyncOperation::Create
            }
        };
        self.collections.set(StorageKey::Projects, &projects);
        self.change_log()
            .append(ChangeLogEntry::snapshot(operation, project.clone()));
        debug!(project = %project.id, operation = %operation, "saved project");
    }

    /// All projects in insertion order
    pub fn get_projects(&self) -> Vec<Project> {
        self.collections.get(StorageKey::Projects)
    }

    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.get_projects().into_iter().find(|p| p.id == id)
    }

    /// Remove by id and log a `delete`. Captures tagged with the project stay.
    pub fn delete_project(&self, id: &str) {
        let mut projects = self.get_projects();
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() != before {
            self.collections.set(StorageKey::Projects, &projects);
        }
        self.change_log()
            .append(ChangeLogEntry::deleted(EntityKind::Project, id));
        debug!(project = %id, removed = before - projects.len(), "deleted project");
    }

    /// Replace the node `task.id` inside project `project_id` and save.
    ///
    /// No-op when the project or the task is missing, or the node is
    /// already equal to `task`.
    pub fn update_task(&self, project_id: &str, task: &Task) {
        let updated = self.update_project_with(project_id, |project| {
            Ok(project.replace_task(task))
        });
        if let Ok(None) = updated {
            debug!(project = %project_id, task = %task.id, "update_task on unknown project ignored");
        }
    }

    /// Load project `id`, apply `edit`, and save the result if it differs.
    ///
    /// Returns `Ok(None)` when no project has that id; the edit's error is
    /// passed through without saving.
    pub fn update_project_with<F>(&self, id: &str, edit: F) -> Result<Option<Project>>
    where
        F: FnOnce(&Project) -> Result<Project>,
    {
        let Some(project) = self.get_project(id) else {
            return Ok(None);
        };
        let updated = edit(&project)?;
        if updated != project {
            self.save_project(&updated);
        }
        Ok(Some(updated))
    }

    // --- capture records ---

    /// Append to the collection for the record's kind and log a `create`
    pub fn save_instant_data(&self, record: &InstantData) {
        let key = record.kind().storage_key();
        let mut records: Vec<InstantData> = self.collections.get(key);
        records.push(record.clone());
        self.collections.set(key, &records);
        self.change_log()
            .append(ChangeLogEntry::snapshot(SyncOperation::Create, record.clone()));
        debug!(record = %record.id, kind = %record.kind(), "saved capture");
    }

    /// One kind in stored order, or every kind newest first
    pub fn get_instant_data(&self, kind: Option<InstantKind>) -> Vec<InstantData> {
        if let Some(kind) = kind {
            return self.collections.get(kind.storage_key());
        }

        let mut all: Vec<InstantData> = InstantKind::ALL
            .into_iter()
            .flat_map(|kind| self.collections.get::<InstantData>(kind.storage_key()))
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Every capture tagged with `project_id`, newest first
    pub fn instant_data_for_project(&self, project_id: &str) -> Vec<InstantData> {
        let mut records = self.get_instant_data(None);
        records.retain(|record| record.project_id.as_deref() == Some(project_id));
        records
    }

    // --- sync hand-off ---

    /// Full change log for an external sync process
    pub fn get_offline_sync_data(&self) -> Vec<ChangeLogEntry> {
        self.change_log().entries()
    }

    pub fn pending_sync_data(&self) -> Vec<ChangeLogEntry> {
        self.change_log().pending()
    }

    /// Acknowledge entry `id`; returns whether it exists
    pub fn mark_sync_complete(&self, id: &str) -> bool {
        self.change_log().mark_sync_complete(id)
    }

    // --- maintenance ---

    pub fn storage_info(&self) -> StorageInfo {
        let collections: Vec<CollectionUsage> = StorageKey::ALL
            .into_iter()
            .map(|key| CollectionUsage {
                key: key.as_str().to_string(),
                bytes: self.collections.raw_len(key) as u64,
            })
            .collect();
        let used = collections.iter().map(|usage| usage.bytes).sum();
        StorageInfo {
            collections,
            used,
            quota: STORAGE_QUOTA_BYTES,
            remaining: STORAGE_QUOTA_BYTES.saturating_sub(used),
        }
    }

    /// Remove every collection, change log included; nothing is logged
    pub fn clear_all_data(&self) {
        for key in StorageKey::ALL {
            self.collections.clear(key);
        }
        info!("cleared all local data");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::task::TaskUpdate;

    fn repo() -> Repository<MemoryStore> {
        Repository::new(MemoryStore::new())
    }

    #[test]
    fn save_project_upserts_and_logs() {
        let repo = repo();
        let project = Project::blank("Doc");
        repo.save_project(&project);

        let mut renamed = project.clone();
        renamed.name = "Documentary".to_string();
        repo.save_project(&renamed);

        let projects = repo.get_projects();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Documentary");

        let ops: Vec<SyncOperation> = repo
            .get_offline_sync_data()
            .into_iter()
            .map(|entry| entry.operation)
            .collect();
        assert_eq!(ops, vec![SyncOperation::Create, SyncOperation::Update]);
    }

    #[test]
    fn update_task_replaces_node_and_saves() {
        let repo = repo();
        let project = Project::blank("Doc").insert_task(None, Task::new("Hook"));
        repo.save_project(&project);

        let mut hook = project.tasks[0].clone();
        hook.completed = true;
        repo.update_task(&project.id, &hook);

        let stored = repo.get_project(&project.id).unwrap();
        assert!(stored.tasks[0].completed);
        assert_eq!(repo.get_offline_sync_data().len(), 2);
    }

    #[test]
    fn update_task_ignores_missing_project_and_task() {
        let repo = repo();
        let project = Project::blank("Doc");
        repo.save_project(&project);

        repo.update_task("missing", &Task::new("x"));
        repo.update_task(&project.id, &Task::new("orphan"));

        assert_eq!(repo.get_project(&project.id), Some(project));
        assert_eq!(repo.get_offline_sync_data().len(), 1);
    }

    #[test]
    fn update_project_with_surfaces_edit_errors() {
        let repo = repo();
        let project = Project::blank("Doc");
        repo.save_project(&project);

        let result = repo.update_project_with(&project.id, |p| {
            p.try_update_task("ghost", &TaskUpdate::new().completed(true))
        });
        assert!(result.is_err());
        assert!(repo.update_project_with("nope", |p| Ok(p.clone())).unwrap().is_none());
        assert_eq!(repo.get_offline_sync_data().len(), 1);
    }

    #[test]
    fn storage_info_tracks_usage() {
        let repo = repo();
        let empty = repo.storage_info();
        assert_eq!(empty.used, 0);
        assert_eq!(empty.remaining, STORAGE_QUOTA_BYTES);
        assert_eq!(empty.collections.len(), StorageKey::ALL.len());

        repo.save_project(&Project::blank("Doc"));
        let info = repo.storage_info();
        assert!(info.used > 0);
        assert_eq!(info.used + info.remaining, info.quota);
    }

    #[test]
    fn clear_all_data_empties_everything() {
        let repo = repo();
        repo.save_project(&Project::blank("Doc"));
        repo.save_instant_data(&InstantData::note("x", None));
        repo.clear_all_data();

        assert!(repo.get_projects().is_empty());
        assert!(repo.get_instant_data(None).is_empty());
        assert!(repo.get_offline_sync_data().is_empty());
        assert!(repo.store().keys().is_empty());
    }
}
