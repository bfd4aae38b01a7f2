//! ct template command implementations.

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::template::{builtin_templates, ProjectTemplate};

use super::Context;

#[derive(serde::Serialize)]
struct TemplateListOutput {
    total: usize,
    templates: Vec<ProjectTemplate>,
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let templates = builtin_templates();
    let mut human = HumanOutput::new("Templates");
    human.push_summary("Total", templates.len().to_string());
    for template in &templates {
        let mut line = format!("{} {} - {}", template.id, template.name, template.description);
        if template.requires_shoot_dates {
            line.push_str(" [needs --date]");
        }
        human.push_detail(line);
    }
    if templates.iter().any(|t| t.id == ctx.config.projects.default_template) {
        human.push_summary("Default", ctx.config.projects.default_template.clone());
    }

    let output = TemplateListOutput {
        total: templates.len(),
        templates,
    };
    emit_success(ctx.output, "template list", &output, Some(&human))
}
