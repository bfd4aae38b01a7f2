//! Command-line interface for ct
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::project::Project;
use crate::repository::Repository;
use crate::storage::FileStore;
use crate::tree;

mod capture;
mod project;
mod store;
mod sync;
mod task;
mod template;

/// ct - creator tools
///
/// Offline-first project checklists built from templates, instant capture
/// records, and a local change log awaiting sync.
#[derive(Parser, Debug)]
#[command(name = "ct")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "CT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml (defaults to <data-dir>/config.toml)
    #[arg(long, global = true, env = "CT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Fail on unknown project or task ids instead of ignoring them
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Built-in project templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Edit a project's task tree
    #[command(subcommand)]
    Task(TaskCommands),

    /// Record and list capture-tool data
    #[command(subcommand)]
    Capture(CaptureCommands),

    /// Offline sync queue
    #[command(subcommand)]
    Sync(SyncCommands),

    /// Show storage usage
    Info,

    /// Delete all local data, change log included
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List built-in templates
    List,
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project from a template
    New {
        /// Project name
        name: String,

        /// Template id (see `ct template list`)
        #[arg(short, long)]
        template: Option<String>,

        /// Number of shoot days (defaults to the number of --date values)
        #[arg(long)]
        days: Option<u32>,

        /// Shoot date, YYYY-MM-DD (repeatable)
        #[arg(long = "date", value_parser = parse_date)]
        dates: Vec<NaiveDate>,

        /// Override the generated description
        #[arg(long)]
        description: Option<String>,
    },

    /// List projects
    List,

    /// Show a project's task tree
    Show {
        /// Project id or unique prefix
        id: String,
    },

    /// Delete a project (captures tagged with it are kept)
    Rm {
        /// Project id or unique prefix
        id: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task at the root or under a parent
    Add {
        /// Project id or unique prefix
        project: String,

        /// Task name
        name: String,

        /// Parent task id or unique prefix
        #[arg(long)]
        parent: Option<String>,
    },

    /// Flip a task's completion
    Toggle {
        project: String,
        task: String,
    },

    /// Rename a task
    Rename {
        project: String,
        task: String,
        name: String,
    },

    /// Attach, replace, or clear a task note
    #[command(group(ArgGroup::new("note").required(true).args(["text", "photo", "clear"])))]
    Note {
        project: String,
        task: String,

        /// Note text
        #[arg(long)]
        text: Option<String>,

        /// Photo reference (URL or path)
        #[arg(long)]
        photo: Option<String>,

        /// Remove the note
        #[arg(long, conflicts_with_all = ["text", "photo"])]
        clear: bool,
    },

    /// Expand or collapse a task in tree views
    Expand {
        project: String,
        task: String,

        /// Collapse instead of expanding
        #[arg(long)]
        collapse: bool,
    },
}

/// Location flags shared by capture commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CaptureTarget {
    /// Associate the record with a project
    #[arg(long)]
    pub project: Option<String>,

    /// Latitude of the capture
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the capture
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Accuracy radius in meters
    #[arg(long, default_value_t = 0.0)]
    pub accuracy: f64,
}

/// Capture subcommands
#[derive(Subcommand, Debug)]
pub enum CaptureCommands {
    /// Record the current instant
    Timestamp {
        #[command(flatten)]
        target: CaptureTarget,
    },

    /// Record a text note
    Note {
        text: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        target: CaptureTarget,
    },

    /// Record one or more photos
    Photo {
        /// Image references (URL or path)
        #[arg(required = true)]
        images: Vec<String>,

        #[command(flatten)]
        target: CaptureTarget,
    },

    /// Record a receipt
    Receipt {
        /// Image references (URL or path)
        #[arg(required = true)]
        images: Vec<String>,

        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        vendor: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        target: CaptureTarget,
    },

    /// Record a voice memo
    Voice {
        /// Audio reference (URL or path)
        audio: String,

        /// Length in seconds
        #[arg(long)]
        duration: f64,

        /// File name shown in listings (defaults to the audio reference's last segment)
        #[arg(long)]
        filename: Option<String>,

        #[arg(long)]
        transcription: Option<String>,

        #[command(flatten)]
        target: CaptureTarget,
    },

    /// List capture records, newest first
    List {
        /// Only this kind: timestamp, note, photo, receipt, voice
        #[arg(long = "type")]
        kind: Option<String>,

        /// Only records tagged with this project
        #[arg(long)]
        project: Option<String>,
    },
}

/// Sync subcommands
#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Show queued changes
    Pending {
        /// Include entries already acknowledged
        #[arg(long)]
        all: bool,
    },

    /// Acknowledge pushed entries
    Ack {
        /// Change log entry ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

/// Resolved state shared by every command
pub(crate) struct Context {
    pub repository: Repository<FileStore>,
    pub config: Config,
    pub output: OutputOptions,
    pub strict: bool,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;
        let data_dir = config.data_dir(cli.data_dir.as_deref());
        let store = FileStore::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
        let strict = cli.strict || config.tasks.strict;
        tracing::debug!(dir = %store.dir().display(), strict, "opened data directory");
        Ok(Self {
            repository: Repository::new(store),
            config,
            output: OutputOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
            strict,
        })
    }

    /// Project whose id equals or uniquely starts with `id`.
    ///
    /// `Ok(None)` only in permissive mode; strict mode reports the miss.
    pub fn find_project(&self, id: &str) -> Result<Option<Project>> {
        let projects = self.repository.get_projects();
        let found = resolve_unique(id, projects.iter().map(|p| p.id.as_str()), "project")?
            .and_then(|resolved| projects.into_iter().find(|p| p.id == resolved));
        match found {
            Some(project) => Ok(Some(project)),
            None if self.strict => Err(Error::ProjectNotFound(id.to_string())),
            None => Ok(None),
        }
    }

    /// Full task id for `id` inside `project`, falling back to `id` itself
    pub fn resolve_task_id(&self, project: &Project, id: &str) -> Result<String> {
        let mut ids = Vec::new();
        tree::walk(&project.tasks, &mut |task, _| ids.push(task.id.as_str()));
        Ok(resolve_unique(id, ids.into_iter(), "task")?.unwrap_or_else(|| id.to_string()))
    }
}

/// Config file: explicit path must load; the default location may be absent or invalid
fn load_config(path: Option<&Path>, data_dir: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let dir = data_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(FileStore::default_dir);
            Ok(Config::load_or_default(&dir.join(CONFIG_FILE)))
        }
    }
}

/// Exact match wins; otherwise a prefix must match exactly one candidate
fn resolve_unique<'a>(
    needle: &str,
    candidates: impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<Option<String>> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} id cannot be empty")));
    }

    let mut matches = Vec::new();
    for candidate in candidates {
        if candidate == needle {
            return Ok(Some(candidate.to_string()));
        }
        if candidate.starts_with(needle) {
            matches.push(candidate);
        }
    }

    match matches.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only.to_string())),
        _ => Err(Error::InvalidArgument(format!(
            "{what} id prefix '{needle}' is ambiguous ({} matches)",
            matches.len()
        ))),
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = Context::load(&self)?;
        match self.command {
            Commands::Template(cmd) => match cmd {
                TemplateCommands::List => template::run_list(&ctx),
            },
            Commands::Project(cmd) => match cmd {
                ProjectCommands::New {
                    name,
                    template,
                    days,
                    dates,
                    description,
                } => project::run_new(
                    &ctx,
                    project::NewOptions {
                        name,
                        template,
                        days,
                        dates,
                        description,
                    },
                ),
                ProjectCommands::List => project::run_list(&ctx),
                ProjectCommands::Show { id } => project::run_show(&ctx, &id),
                ProjectCommands::Rm { id } => project::run_rm(&ctx, &id),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    project,
                    name,
                    parent,
                } => task::run_add(
                    &ctx,
                    task::AddOptions {
                        project,
                        name,
                        parent,
                    },
                ),
                TaskCommands::Toggle { project, task } => {
                    task::run_edit(&ctx, &project, &task, task::TaskEdit::Toggle)
                }
                TaskCommands::Rename {
                    project,
                    task,
                    name,
                } => task::run_edit(&ctx, &project, &task, task::TaskEdit::Rename(name)),
                TaskCommands::Note {
                    project,
                    task,
                    text,
                    photo,
                    clear,
                } => {
                    let edit = if clear {
                        task::TaskEdit::ClearNote
                    } else {
                        task::TaskEdit::Note { text, photo }
                    };
                    task::run_edit(&ctx, &project, &task, edit)
                }
                TaskCommands::Expand {
                    project,
                    task,
                    collapse,
                } => task::run_edit(&ctx, &project, &task, task::TaskEdit::Expand(!collapse)),
            },
            Commands::Capture(cmd) => capture::run(&ctx, cmd),
            Commands::Sync(cmd) => match cmd {
                SyncCommands::Pending { all } => sync::run_pending(&ctx, all),
                SyncCommands::Ack { ids } => sync::run_ack(&ctx, &ids),
            },
            Commands::Info => store::run_info(&ctx),
            Commands::Reset { yes } => store::run_reset(&ctx, yes),
        }
    }
}
