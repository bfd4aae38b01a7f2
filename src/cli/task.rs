//! ct task command implementations.
//!
//! Every command loads the project, applies one tree edit, and saves the new
//! snapshot only when the tree changed. Without `--strict`, unknown project or
//! task ids leave everything untouched and report a warning.

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::project::Project;
use crate::task::{Task, TaskNote, TaskUpdate};

use super::Context;

pub struct AddOptions {
    pub project: String,
    pub name: String,
    pub parent: Option<String>,
}

/// Single-task edit requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    Toggle,
    Rename(String),
    Note {
        text: Option<String>,
        photo: Option<String>,
    },
    ClearNote,
    Expand(bool),
}

impl TaskEdit {
    fn command(&self) -> &'static str {
        match self {
            TaskEdit::Toggle => "task toggle",
            TaskEdit::Rename(_) => "task rename",
            TaskEdit::Note { .. } | TaskEdit::ClearNote => "task note",
            TaskEdit::Expand(_) => "task expand",
        }
    }

    /// Partial update for every edit except toggle
    fn update(&self) -> Option<TaskUpdate> {
        match self {
            TaskEdit::Toggle => None,
            TaskEdit::Rename(name) => Some(TaskUpdate::new().name(name.trim())),
            TaskEdit::Note { text, photo } => Some(
                TaskUpdate::new().note(TaskNote::from_parts(text.as_deref(), photo.as_deref())),
            ),
            TaskEdit::ClearNote => Some(TaskUpdate::new().note(None)),
            TaskEdit::Expand(expanded) => Some(TaskUpdate::new().expanded(*expanded)),
        }
    }

    /// Reject edits that would store an empty task name
    fn validate(&self) -> Result<()> {
        match self {
            TaskEdit::Rename(name) => task_name(name).map(|_| ()),
            _ => Ok(()),
        }
    }

    fn apply(&self, project: &Project, id: &str, strict: bool) -> Result<Project> {
        match (self.update(), strict) {
            (None, true) => project.try_toggle_task(id),
            (None, false) => Ok(project.toggle_task(id)),
            (Some(update), true) => project.try_update_task(id, &update),
            (Some(update), false) => Ok(project.update_task(id, &update)),
        }
    }
}

#[derive(serde::Serialize)]
struct TaskChangeOutput {
    project_id: String,
    task_id: String,
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
}

fn task_name(raw: &str) -> Result<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("task name cannot be empty".to_string()));
    }
    Ok(name)
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let name = task_name(&options.name)?;
    let new_task = Task::new(name);
    let new_id = new_task.id.clone();

    let Some(project) = ctx.find_project(&options.project)? else {
        return emit_unchanged(ctx, "task add", &options.project, &new_id);
    };
    let parent = options
        .parent
        .as_deref()
        .map(|parent| ctx.resolve_task_id(&project, parent))
        .transpose()?;

    let updated = if ctx.strict {
        project.try_insert_task(parent.as_deref(), new_task)?
    } else {
        project.insert_task(parent.as_deref(), new_task)
    };
    emit_change(ctx, "task add", &project, updated, &new_id)
}

pub fn run_edit(ctx: &Context, project_id: &str, task_id: &str, edit: TaskEdit) -> Result<()> {
    let command = edit.command();
    edit.validate()?;
    let Some(project) = ctx.find_project(project_id)? else {
        return emit_unchanged(ctx, command, project_id, task_id);
    };
    let task_id = ctx.resolve_task_id(&project, task_id)?;
    let updated = edit.apply(&project, &task_id, ctx.strict)?;
    emit_change(ctx, command, &project, updated, &task_id)
}

fn emit_change(
    ctx: &Context,
    command: &str,
    before: &Project,
    after: Project,
    task_id: &str,
) -> Result<()> {
    let changed = after != *before;
    if changed {
        ctx.repository.save_project(&after);
    }

    let task = after.find_task(task_id).cloned();
    let mut human = HumanOutput::new(if changed {
        "Task updated"
    } else {
        "No task changes"
    });
    human.push_summary("Project", after.id.clone());
    human.push_summary("Task", task_id.to_string());
    match &task {
        Some(task) => {
            human.push_summary("Name", task.name.clone());
            human.push_summary("Completed", task.completed.to_string());
            if let Some(note) = task.note.as_ref().filter(|note| !note.is_empty()) {
                human.push_summary("Note", note.text.clone());
            }
        }
        None => human.push_warning(format!("no task matched '{task_id}'")),
    }
    let counts = after.task_counts();
    human.push_detail(format!(
        "{}/{} tasks done, {} remaining",
        counts.completed,
        counts.total,
        counts.remaining()
    ));

    let output = TaskChangeOutput {
        project_id: after.id.clone(),
        task_id: task_id.to_string(),
        changed,
        task,
    };
    emit_success(ctx.output, command, &output, Some(&human))
}

fn emit_unchanged(ctx: &Context, command: &str, project_id: &str, task_id: &str) -> Result<()> {
    let mut human = HumanOutput::new("No task changes");
    human.push_warning(format!("no project matched '{project_id}'"));
    let output = TaskChangeOutput {
        project_id: project_id.to_string(),
        task_id: task_id.to_string(),
        changed: false,
        task: None,
    };
    emit_success(ctx.output, command, &output, Some(&human))
}
