use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::json;
use transcribe_core::TranscriptionResult;

use crate::persist::{OutputBatch, PersistError};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Overrides the name derived from the audio file.
    pub output_filename: Option<String>,
    /// Writes `{stem}.json` with the result metadata next to the transcript.
    pub write_manifest: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_filename: None,
            write_manifest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub bytes_written: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no finished transcription to export")]
    NoResult,
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub fn export_transcript(
    dir: &Path,
    result: &TranscriptionResult,
    exported_at: DateTime<Utc>,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let filename = options
        .output_filename
        .clone()
        .unwrap_or_else(|| transcript_filename(&result.file_name));
    let mut batch = OutputBatch::new(dir)?;
    let output_path = batch.stage(&filename, &result.text)?;

    let manifest_path = if options.write_manifest {
        let manifest = json!({
            "file_name": result.file_name,
            "processing_time_seconds": result.processing_time_seconds,
            "transcript": filename,
            "exported_at": exported_at.to_rfc3339(),
        });
        let manifest_name = format!("{}.json", file_stem(&filename));
        Some(batch.stage(&manifest_name, &serde_json::to_string_pretty(&manifest)?)?)
    } else {
        None
    };
    batch.commit()?;

    Ok(ExportSummary {
        output_path,
        manifest_path,
        bytes_written: result.text.len() as u64,
    })
}

/// Portable transcript name for an audio file: `meeting.wav` -> `meeting.txt`.
pub fn transcript_filename(audio_name: &str) -> String {
    format!("{}.txt", sanitize_stem(file_stem(audio_name)))
}

fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let mut cleaned = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "transcript".to_string();
    }
    if cleaned.chars().count() > 80 {
        cleaned = cleaned.chars().take(80).collect();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
