//! Capture-tool records (timestamp, note, photo, receipt, voice memo).
//!
//! Records are produced by capture collaborators (clock, camera, microphone,
//! geolocation) and handed over as plain values. Each kind is stored in its
//! own collection, routed by the `type` discriminant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::StorageKey;

/// Discriminant of a capture record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstantKind {
    Timestamp,
    Note,
    Photo,
    Receipt,
    Voice,
}

impl InstantKind {
    pub const ALL: [InstantKind; 5] = [
        InstantKind::Timestamp,
        InstantKind::Note,
        InstantKind::Photo,
        InstantKind::Receipt,
        InstantKind::Voice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstantKind::Timestamp => "timestamp",
            InstantKind::Note => "note",
            InstantKind::Photo => "photo",
            InstantKind::Receipt => "receipt",
            InstantKind::Voice => "voice",
        }
    }

    /// Collection holding records of this kind
    pub fn storage_key(self) -> StorageKey {
        match self {
            InstantKind::Timestamp => StorageKey::Timestamps,
            InstantKind::Note => StorageKey::Notes,
            InstantKind::Photo => StorageKey::Photos,
            InstantKind::Receipt => StorageKey::Receipts,
            InstantKind::Voice => StorageKey::VoiceNotes,
        }
    }
}

impl fmt::Display for InstantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstantKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        InstantKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownInstantKind(trimmed.to_string()))
    }
}

/// Position fix supplied by the geolocation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    pub accuracy: f64,
}

/// One rendering of a captured instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOption {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl FormatOption {
    fn new(id: &str, label: &str, value: String) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value,
        }
    }
}

/// Opaque reference to a captured image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: String,
    pub url: String,
    pub filename: String,
    /// Size in bytes
    pub size: u64,
}

impl ImageRef {
    pub fn new(url: impl Into<String>, filename: impl Into<String>, size: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            filename: filename.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampCapture {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub format_options: Vec<FormatOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCapture {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCapture {
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptCapture {
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCapture {
    pub audio_url: String,
    /// Recording length in seconds
    pub duration: f64,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

/// Kind-specific payload, tagged by `type` in the stored JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InstantContent {
    Timestamp(TimestampCapture),
    Note(NoteCapture),
    Photo(PhotoCapture),
    Receipt(ReceiptCapture),
    Voice(VoiceCapture),
}

impl InstantContent {
    pub fn kind(&self) -> InstantKind {
        match self {
            InstantContent::Timestamp(_) => InstantKind::Timestamp,
            InstantContent::Note(_) => InstantKind::Note,
            InstantContent::Photo(_) => InstantKind::Photo,
            InstantContent::Receipt(_) => InstantKind::Receipt,
            InstantContent::Voice(_) => InstantKind::Voice,
        }
    }
}

/// A capture record with its common metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantData {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub geolocation: Option<Geolocation>,
    /// Loose association with a project; not enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub content: InstantContent,
}

impl InstantData {
    pub fn new(content: InstantContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            geolocation: None,
            project_id: None,
            content,
        }
    }

    /// Timestamp capture of `at`, with every rendering precomputed
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        let options = timestamp_format_options(&at.with_timezone(&Local));
        Self::new(InstantContent::Timestamp(TimestampCapture {
            timestamp: at,
            format_options: options,
        }))
    }

    pub fn note(text: impl Into<String>, title: Option<String>) -> Self {
        Self::new(InstantContent::Note(NoteCapture {
            text: text.into(),
            title,
        }))
    }

    pub fn photo(images: Vec<ImageRef>) -> Self {
        Self::new(InstantContent::Photo(PhotoCapture { images }))
    }

    pub fn receipt(images: Vec<ImageRef>) -> Self {
        Self::new(InstantContent::Receipt(ReceiptCapture {
            images,
            amount: None,
            vendor: None,
            category: None,
        }))
    }

    pub fn voice(audio_url: impl Into<String>, duration: f64, filename: impl Into<String>) -> Self {
        Self::new(InstantContent::Voice(VoiceCapture {
            audio_url: audio_url.into(),
            duration,
            filename: filename.into(),
            transcription: None,
        }))
    }

    pub fn with_geolocation(mut self, geolocation: Option<Geolocation>) -> Self {
        self.geolocation = geolocation;
        self
    }

    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn kind(&self) -> InstantKind {
        self.content.kind()
    }

    /// Short human summary used in listings
    pub fn summary(&self) -> String {
        match &self.content {
            InstantContent::Timestamp(capture) => capture
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            InstantContent::Note(capture) => match &capture.title {
                Some(title) => format!("{title}: {}", capture.text),
                None => capture.text.clone(),
            },
            InstantContent::Photo(capture) => format!("{} image(s)", capture.images.len()),
            InstantContent::Receipt(capture) => {
                let mut parts = vec![format!("{} image(s)", capture.images.len())];
                if let Some(vendor) = &capture.vendor {
                    parts.push(vendor.clone());
                }
                if let Some(amount) = capture.amount {
                    parts.push(format!("{amount:.2}"));
                }
                parts.join(" ")
            }
            InstantContent::Voice(capture) => {
                format!("{} ({:.0}s)", capture.filename, capture.duration)
            }
        }
    }
}

/// Every rendering offered for a captured instant
///
/// Ids: `datetime-full`, `datetime-short`, `date-only`, `time-only`, `iso`,
/// `unix`, `relative`.
pub fn timestamp_format_options<Tz>(at: &DateTime<Tz>) -> Vec<FormatOption>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let utc = at.with_timezone(&Utc);
    vec![
        FormatOption::new(
            "datetime-full",
            "Full Date & Time",
            at.format("%A, %B %-d, %Y at %I:%M:%S %p").to_string(),
        ),
        FormatOption::new(
            "datetime-short",
            "Short Date & Time",
            at.format("%b %-d, %Y, %I:%M %p").to_string(),
        ),
        FormatOption::new("date-only", "Date Only", at.format("%B %-d, %Y").to_string()),
        FormatOption::new("time-only", "Time Only", at.format("%I:%M:%S %p").to_string()),
        FormatOption::new(
            "iso",
            "ISO Format",
            utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        FormatOption::new("unix", "Unix Timestamp", utc.timestamp().to_string()),
        FormatOption::new("relative", "Relative Time", "Now".to_string()),
    ]
}
