//! creator-tools - offline-first creator project library
//!
//! Core of the `ct` CLI: template-driven project checklists, instant capture
//! records, and a change log for eventual reconciliation with a remote store.
//!
//! # Core Concepts
//!
//! - **Projects**: documents owning a nested task forest
//! - **Templates**: task skeletons expanded from shoot dates on creation
//! - **Captures**: timestamp, note, photo, receipt and voice records
//! - **Change log**: one queued entry per mutation, acknowledged by sync
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `storage`: Key/value stores and fail-soft typed collections
//! - `lock`: File locking and atomic writes
//! - `task` / `tree`: Task nodes and copy-on-write tree operations
//! - `project`: Project snapshots
//! - `template`: Template catalog and instantiation
//! - `instant`: Capture records
//! - `changelog`: Offline sync queue
//! - `repository`: Persistence of projects and captures
//! - `output`: Human and JSON command output

pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod instant;
pub mod lock;
pub mod output;
pub mod project;
pub mod repository;
pub mod storage;
pub mod task;
pub mod template;
pub mod tree;

pub use error::{Error, Result};
pub use project::Project;
pub use repository::Repository;
pub use task::{Task, TaskNote, TaskUpdate};
