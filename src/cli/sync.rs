//! ct sync command implementations.

use crate::changelog::{format_entry, ChangeLogEntry};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct PendingOutput {
    total: usize,
    entries: Vec<ChangeLogEntry>,
}

#[derive(serde::Serialize)]
struct AckOutput {
    acknowledged: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unknown: Vec<String>,
}

pub fn run_pending(ctx: &Context, all: bool) -> Result<()> {
    let entries = if all {
        ctx.repository.get_offline_sync_data()
    } else {
        ctx.repository.pending_sync_data()
    };

    let mut human = HumanOutput::new(if all { "Change log" } else { "Pending changes" });
    human.push_summary("Total", entries.len().to_string());
    for entry in &entries {
        human.push_detail(format_entry(entry));
    }
    let output = PendingOutput {
        total: entries.len(),
        entries,
    };
    emit_success(ctx.output, "sync pending", &output, Some(&human))
}

pub fn run_ack(ctx: &Context, ids: &[String]) -> Result<()> {
    let mut acknowledged = Vec::new();
    let mut unknown = Vec::new();
    for id in ids {
        if ctx.repository.mark_sync_complete(id) {
            acknowledged.push(id.clone());
        } else {
            unknown.push(id.clone());
        }
    }

    if ctx.strict {
        if let Some(first) = unknown.first() {
            return Err(Error::SyncEntryNotFound(first.clone()));
        }
    }

    let mut human = HumanOutput::new("Changes acknowledged");
    human.push_summary("Acknowledged", acknowledged.len().to_string());
    for id in &unknown {
        human.push_warning(format!("no change log entry '{id}'"));
    }
    let output = AckOutput {
        acknowledged,
        unknown,
    };
    emit_success(ctx.output, "sync ack", &output, Some(&human))
}
