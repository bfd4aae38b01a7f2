//! ct project command implementations.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::project::Project;
use crate::task::TaskCounts;
use crate::template::{instantiate, template_by_id, InstantiateParams};
use crate::tree;

use super::Context;

pub struct NewOptions {
    pub name: String,
    pub template: Option<String>,
    pub days: Option<u32>,
    pub dates: Vec<NaiveDate>,
    pub description: Option<String>,
}

#[derive(serde::Serialize)]
struct ProjectCreateOutput {
    id: String,
    name: String,
    template: Option<String>,
    tasks: TaskCounts,
}

#[derive(serde::Serialize)]
struct ProjectSummary {
    id: String,
    name: String,
    template: Option<String>,
    tasks: TaskCounts,
    updated_at: String,
}

#[derive(serde::Serialize)]
struct ProjectListOutput {
    total: usize,
    projects: Vec<ProjectSummary>,
}

#[derive(serde::Serialize)]
struct ProjectChangeOutput {
    id: String,
    changed: bool,
}

pub fn run_new(ctx: &Context, options: NewOptions) -> Result<()> {
    let template_id = options
        .template
        .unwrap_or_else(|| ctx.config.projects.default_template.clone());
    let template =
        template_by_id(&template_id).ok_or_else(|| Error::TemplateNotFound(template_id.clone()))?;

    let mut params = InstantiateParams::new(options.name);
    params.shoot_days = options.days.or_else(|| {
        (!options.dates.is_empty()).then_some(options.dates.len() as u32)
    });
    if !options.dates.is_empty() {
        params.shoot_dates = Some(options.dates);
    }

    let mut project = instantiate(&template, params)?;
    if let Some(description) = options.description {
        project.description = Some(description);
    }
    ctx.repository.save_project(&project);

    let output = ProjectCreateOutput {
        id: project.id.clone(),
        name: project.name.clone(),
        template: project.template.clone(),
        tasks: project.task_counts(),
    };
    let mut human = HumanOutput::new("Project created");
    human.push_summary("ID", output.id.clone());
    human.push_summary("Name", output.name.clone());
    human.push_summary("Template", template.name);
    human.push_summary("Tasks", output.tasks.total.to_string());
    human.push_next_step(format!("ct project show {}", output.id));
    emit_success(ctx.output, "project new", &output, Some(&human))
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let projects: Vec<ProjectSummary> = ctx
        .repository
        .get_projects()
        .into_iter()
        .map(|project| ProjectSummary {
            tasks: project.task_counts(),
            updated_at: project.updated_at.to_rfc3339(),
            id: project.id,
            name: project.name,
            template: project.template,
        })
        .collect();
    let output = ProjectListOutput {
        total: projects.len(),
        projects,
    };

    let mut human = HumanOutput::new("Projects");
    human.push_summary("Total", output.total.to_string());
    for project in &output.projects {
        human.push_detail(format!(
            "{} {} ({}/{} done)",
            project.id, project.name, project.tasks.completed, project.tasks.total
        ));
    }
    emit_success(ctx.output, "project list", &output, Some(&human))
}

pub fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let project = ctx
        .find_project(id)?
        .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
    let human = render_project(&project);
    emit_success(ctx.output, "project show", &project, Some(&human))
}

pub fn run_rm(ctx: &Context, id: &str) -> Result<()> {
    let resolved = ctx.find_project(id)?;
    let target = resolved
        .as_ref()
        .map(|project| project.id.clone())
        .unwrap_or_else(|| id.to_string());
    ctx.repository.delete_project(&target);

    let output = ProjectChangeOutput {
        id: target.clone(),
        changed: resolved.is_some(),
    };
    let mut human = HumanOutput::new(if output.changed {
        "Project deleted"
    } else {
        "No project deleted"
    });
    human.push_summary("ID", target);
    if !output.changed {
        human.push_warning(format!("no project matched '{id}'"));
    }
    let kept = ctx.repository.instant_data_for_project(&output.id).len();
    if kept > 0 {
        human.push_detail(format!("{kept} capture record(s) still reference this project"));
    }
    emit_success(ctx.output, "project rm", &output, Some(&human))
}

/// Header, progress, and the indented task tree
pub(crate) fn render_project(project: &Project) -> HumanOutput {
    let mut human = HumanOutput::new(format!("Project {}", project.id));
    human.push_summary("Name", project.name.clone());
    if let Some(description) = project.description.as_ref() {
        human.push_summary("Description", description.clone());
    }
    if let Some(template) = project.template.as_ref() {
        human.push_summary("Template", template.clone());
    }
    let counts = project.task_counts();
    human.push_summary(
        "Progress",
        format!("{}/{} ({}%)", counts.completed, counts.total, counts.percent()),
    );
    human.push_summary("Remaining", counts.remaining().to_string());
    human.push_summary("Updated", project.updated_at.to_rfc3339());

    tree::walk(&project.tasks, &mut |task, depth| {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        let mut line = format!("{}{mark} {} ({})", "  ".repeat(depth), task.name, short_id(&task.id));
        if let Some(note) = task.note.as_ref().filter(|note| !note.is_empty()) {
            if !note.text.is_empty() {
                line.push_str(&format!(" - {}", note.text));
            }
            if note.photo.is_some() {
                line.push_str(" [photo]");
            }
        }
        human.push_detail(line);
    });
    human
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
