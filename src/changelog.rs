//! Offline sync queue.
//!
//! Every mutating repository call appends one [`ChangeLogEntry`] to the
//! `offline_sync` collection. An external sync process drains the log with
//! [`ChangeLog::entries`] / [`ChangeLog::pending`] and acknowledges pushed
//! entries with [`ChangeLog::mark_sync_complete`]. Entries are never removed
//! here; pruning synced entries belongs to the sync side.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::instant::InstantData;
use crate::project::Project;
use crate::storage::{Collections, StorageKey, Store};
use crate::task::Task;

/// Kind of mutation recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity a change refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Project,
    Task,
    InstantData,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::InstantData => "instantData",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full snapshot carried by a create/update entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangePayload {
    Project(Box<Project>),
    Task(Box<Task>),
    InstantData(Box<InstantData>),
}

impl ChangePayload {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ChangePayload::Project(_) => EntityKind::Project,
            ChangePayload::Task(_) => EntityKind::Task,
            ChangePayload::InstantData(_) => EntityKind::InstantData,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            ChangePayload::Project(project) => &project.id,
            ChangePayload::Task(task) => &task.id,
            ChangePayload::InstantData(record) => &record.id,
        }
    }
}

impl From<Project> for ChangePayload {
    fn from(project: Project) -> Self {
        ChangePayload::Project(Box::new(project))
    }
}

impl From<Task> for ChangePayload {
    fn from(task: Task) -> Self {
        ChangePayload::Task(Box::new(task))
    }
}

impl From<InstantData> for ChangePayload {
    fn from(record: InstantData) -> Self {
        ChangePayload::InstantData(Box::new(record))
    }
}

/// One queued mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub id: String,
    pub operation: SyncOperation,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    /// Snapshot after the change; `None` for deletes
    pub payload: Option<ChangePayload>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub synced: bool,
}

impl ChangeLogEntry {
    /// Create or update entry carrying a full snapshot
    pub fn snapshot(operation: SyncOperation, payload: impl Into<ChangePayload>) -> Self {
        let payload = payload.into();
        Self {
            id: Ulid::new().to_string(),
            operation,
            entity_kind: payload.entity_kind(),
            entity_id: payload.entity_id().to_string(),
            payload: Some(payload),
            timestamp: Utc::now(),
            synced: false,
        }
    }

    /// Delete entry; carries no payload
    pub fn deleted(entity_kind: EntityKind, entity_id: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            operation: SyncOperation::Delete,
            entity_kind,
            entity_id: entity_id.into(),
            payload: None,
            timestamp: Utc::now(),
            synced: false,
        }
    }
}

/// Change log view over a store's `offline_sync` collection
#[derive(Debug)]
pub struct ChangeLog<'a, S> {
    collections: &'a Collections<S>,
}

impl<'a, S: Store> ChangeLog<'a, S> {
    pub fn new(collections: &'a Collections<S>) -> Self {
        Self { collections }
    }

    /// Append one entry (read-modify-write of the whole log)
    pub fn append(&self, entry: ChangeLogEntry) {
        debug!(
            entry = %entry.id,
            operation = %entry.operation,
            entity = %entry.entity_kind,
            entity_id = %entry.entity_id,
            "queued change"
        );
        let mut entries = self.entries();
        entries.push(entry);
        self.collections.set(StorageKey::OfflineSync, &entries);
    }

    /// Full log in append order
    pub fn entries(&self) -> Vec<ChangeLogEntry> {
        self.collections.get(StorageKey::OfflineSync)
    }

    /// Entries not yet acknowledged, in append order
    pub fn pending(&self) -> Vec<ChangeLogEntry> {
        let mut entries = self.entries();
        entries.retain(|entry| !entry.synced);
        entries
    }

    /// Flag entry `id` as synced; returns whether an entry matched
    pub fn mark_sync_complete(&self, id: &str) -> bool {
        let mut entries = self.entries();
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        if !entry.synced {
            entry.synced = true;
            self.collections.set(StorageKey::OfflineSync, &entries);
        }
        true
    }
}

/// Single-line rendering for listings
pub fn format_entry(entry: &ChangeLogEntry) -> String {
    let state = if entry.synced { "synced" } else { "pending" };
    format!(
        "{ts} {id} {op} {kind}={entity} [{state}]",
        ts = entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        id = entry.id,
        op = entry.operation,
        kind = entry.entity_kind,
        entity = entry.entity_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn snapshot_entry_derives_kind_and_id() {
        let project = Project::blank("Doc");
        let entry = ChangeLogEntry::snapshot(SyncOperation::Create, project.clone());
        assert_eq!(entry.entity_kind, EntityKind::Project);
        assert_eq!(entry.entity_id, project.id);
        assert!(!entry.synced);
        assert_eq!(entry.payload, Some(ChangePayload::from(project)));
    }

    #[test]
    fn delete_entry_has_null_payload() {
        let entry = ChangeLogEntry::deleted(EntityKind::Project, "p1");
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value["payload"].is_null());
        assert_eq!(value["operation"], "delete");
        assert_eq!(value["entityKind"], "project");
        assert_eq!(value["entityId"], "p1");
    }

    #[test]
    fn append_preserves_order_and_marks_synced() {
        let collections = Collections::new(MemoryStore::new());
        let log = ChangeLog::new(&collections);

        let first = ChangeLogEntry::deleted(EntityKind::Project, "a");
        let second = ChangeLogEntry::snapshot(SyncOperation::Create, Task::new("x"));
        log.append(first.clone());
        log.append(second.clone());

        let ids: Vec<String> = log.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id.clone(), second.id.clone()]);

        assert!(log.mark_sync_complete(&first.id));
        assert!(log.mark_sync_complete(&first.id));
        assert!(!log.mark_sync_complete("unknown"));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].synced);
        assert!(!entries[1].synced);

        let pending = log.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);
    }

    #[test]
    fn payload_round_trips_through_json() {
        let entry = ChangeLogEntry::snapshot(
            SyncOperation::Create,
            InstantData::note("wrap at 6", None),
        );
        let json = serde_json::to_string(&entry).unwrap();
        let back: ChangeLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.entity_kind, EntityKind::InstantData);
    }

    #[test]
    fn format_entry_mentions_state() {
        let entry = ChangeLogEntry::deleted(EntityKind::Project, "p9");
        let line = format_entry(&entry);
        assert!(line.contains("delete project=p9 [pending]"));
    }
}
