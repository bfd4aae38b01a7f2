//! ct capture command implementations.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::instant::{Geolocation, ImageRef, InstantContent, InstantData, InstantKind};
use crate::output::{emit_success, HumanOutput};

use super::{CaptureCommands, CaptureTarget, Context};

#[derive(serde::Serialize)]
struct CaptureListOutput {
    total: usize,
    records: Vec<InstantData>,
}

pub fn run(ctx: &Context, cmd: CaptureCommands) -> Result<()> {
    let (record, target) = match cmd {
        CaptureCommands::List { kind, project } => {
            return run_list(ctx, kind.as_deref(), project.as_deref())
        }
        CaptureCommands::Timestamp { target } => (InstantData::timestamp(Utc::now()), target),
        CaptureCommands::Note {
            text,
            title,
            target,
        } => {
            if text.trim().is_empty() {
                return Err(Error::InvalidArgument("note text cannot be empty".to_string()));
            }
            (InstantData::note(text, title), target)
        }
        CaptureCommands::Photo { images, target } => {
            (InstantData::photo(image_refs(&images)), target)
        }
        CaptureCommands::Receipt {
            images,
            amount,
            vendor,
            category,
            target,
        } => {
            let mut record = InstantData::receipt(image_refs(&images));
            if let InstantContent::Receipt(receipt) = &mut record.content {
                receipt.amount = amount;
                receipt.vendor = vendor;
                receipt.category = category;
            }
            (record, target)
        }
        CaptureCommands::Voice {
            audio,
            duration,
            filename,
            transcription,
            target,
        } => {
            if !duration.is_finite() || duration < 0.0 {
                return Err(Error::InvalidArgument(
                    "duration must be a non-negative number of seconds".to_string(),
                ));
            }
            let filename = filename.unwrap_or_else(|| file_name(&audio));
            let mut record = InstantData::voice(audio, duration, filename);
            if let InstantContent::Voice(voice) = &mut record.content {
                voice.transcription = transcription;
            }
            (record, target)
        }
    };

    run_save(ctx, record, target)
}

fn run_save(ctx: &Context, record: InstantData, target: CaptureTarget) -> Result<()> {
    let project_id = match target.project.as_deref() {
        Some(id) => Some(
            ctx.find_project(id)?
                .map(|project| project.id)
                .unwrap_or_else(|| id.to_string()),
        ),
        None => None,
    };
    let record = record
        .with_project(project_id)
        .with_geolocation(geolocation(&target));
    ctx.repository.save_instant_data(&record);

    let kind = record.kind();
    let mut human = HumanOutput::new(format!("Captured {kind}"));
    human.push_summary("ID", record.id.clone());
    human.push_summary("Summary", record.summary());
    if let Some(project) = record.project_id.as_ref() {
        human.push_summary("Project", project.clone());
    }
    if let InstantContent::Timestamp(capture) = &record.content {
        for option in &capture.format_options {
            human.push_detail(format!("{}: {}", option.label, option.value));
        }
    }
    emit_success(ctx.output, &format!("capture {kind}"), &record, Some(&human))
}

fn run_list(ctx: &Context, kind: Option<&str>, project: Option<&str>) -> Result<()> {
    let kind = kind.map(str::parse::<InstantKind>).transpose()?;
    let mut records = ctx.repository.get_instant_data(kind);
    if let Some(project) = project {
        let project_id = ctx
            .find_project(project)?
            .map(|project| project.id)
            .unwrap_or_else(|| project.to_string());
        records.retain(|record| record.project_id.as_deref() == Some(project_id.as_str()));
    }

    let mut human = HumanOutput::new("Captures");
    human.push_summary("Total", records.len().to_string());
    for record in &records {
        human.push_detail(format!(
            "{} {} {} {}",
            record.created_at.to_rfc3339(),
            record.kind(),
            record.id,
            record.summary()
        ));
    }
    let output = CaptureListOutput {
        total: records.len(),
        records,
    };
    emit_success(ctx.output, "capture list", &output, Some(&human))
}

fn geolocation(target: &CaptureTarget) -> Option<Geolocation> {
    match (target.lat, target.lon) {
        (Some(latitude), Some(longitude)) => Some(Geolocation {
            latitude,
            longitude,
            accuracy: target.accuracy,
        }),
        _ => None,
    }
}

/// Opaque image references; local files also report their size
fn image_refs(images: &[String]) -> Vec<ImageRef> {
    images
        .iter()
        .map(|image| {
            let size = std::fs::metadata(image).map(|meta| meta.len()).unwrap_or(0);
            ImageRef::new(image.clone(), file_name(image), size)
        })
        .collect()
}

fn file_name(reference: &str) -> String {
    reference
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(reference)
        .to_string()
}
