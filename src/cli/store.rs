//! ct info / reset command implementations.

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct ResetOutput {
    dir: String,
    cleared: bool,
}

pub fn run_info(ctx: &Context) -> Result<()> {
    let info = ctx.repository.storage_info();
    let mut human = HumanOutput::new("Storage");
    human.push_summary("Directory", ctx.repository.store().dir().display().to_string());
    human.push_summary("Used", format!("{} bytes", info.used));
    human.push_summary("Remaining", format!("{} of {} bytes", info.remaining, info.quota));
    human.push_summary(
        "Pending changes",
        ctx.repository.pending_sync_data().len().to_string(),
    );
    for usage in &info.collections {
        human.push_detail(format!("{}: {} bytes", usage.key, usage.bytes));
    }
    emit_success(ctx.output, "info", &info, Some(&human))
}

pub fn run_reset(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        return Err(Error::InvalidArgument(
            "reset deletes every project, capture and queued change; pass --yes".to_string(),
        ));
    }
    ctx.repository.clear_all_data();

    let output = ResetOutput {
        dir: ctx.repository.store().dir().display().to_string(),
        cleared: true,
    };
    let mut human = HumanOutput::new("Local data cleared");
    human.push_summary("Directory", output.dir.clone());
    emit_success(ctx.output, "reset", &output, Some(&human))
}
