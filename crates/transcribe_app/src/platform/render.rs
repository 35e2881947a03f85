use chrono::{DateTime, Local, TimeDelta, Utc};
use transcribe_core::{JobSnapshot, JobStatus, BYTES_PER_MEGABYTE};

const DEMO_NOTICE: &str =
    "Note: this is a demo. Real speech recognition needs an external API; the result is sample text.";

/// Lines printed when the controller reports a state change.
pub fn render_change(view: &JobSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    match view.status {
        JobStatus::Idle => {
            if let Some(input) = &view.input {
                lines.push(format!(
                    "Selected {} ({})",
                    input.name,
                    format_size(input.size_bytes)
                ));
            }
            if view.show_demo_notice {
                lines.push(DEMO_NOTICE.to_string());
            }
        }
        JobStatus::Running => {
            let name = view.input.as_ref().map_or("?", |input| input.name.as_str());
            let until = view
                .estimated_completion_at
                .map(format_clock)
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("Processing {name}... estimated completion at {until}"));
            lines.push("Type `stop` to cancel.".to_string());
        }
        JobStatus::Completed => {
            if let Some(result) = &view.result {
                lines.push(format!(
                    "Transcription of {} finished (processing time {}s)",
                    result.file_name, result.processing_time_seconds
                ));
                lines.push("----- transcript -----".to_string());
                lines.extend(result.text.lines().map(str::to_string));
                lines.push("----------------------".to_string());
            }
        }
    }
    lines
}

/// One-line progress report while a job is running.
pub fn render_progress(view: &JobSnapshot, now: DateTime<Utc>) -> Option<String> {
    let elapsed = view.elapsed(now)?;
    let remaining = view.remaining(now).unwrap_or_else(TimeDelta::zero);
    let percent = view.progress(now).unwrap_or(0.0) * 100.0;
    Some(format!(
        "Elapsed {} | Remaining {} | {:.0}%",
        format_duration(elapsed),
        format_duration(remaining),
        percent
    ))
}

/// Full status report for the `status` command.
pub fn render_status(view: &JobSnapshot, now: DateTime<Utc>) -> Vec<String> {
    let status_label = match view.status {
        JobStatus::Idle => "Idle",
        JobStatus::Running => "Running",
        JobStatus::Completed => "Completed",
    };
    let mut lines = vec![format!("Status: {status_label}")];
    match &view.input {
        Some(input) => lines.push(format!(
            "File: {} ({})",
            input.name,
            format_size(input.size_bytes)
        )),
        None => lines.push("File: none selected".to_string()),
    }
    if let Some(started) = view.started_at {
        lines.push(format!("Started: {}", format_clock(started)));
    }
    if let Some(end) = view.estimated_completion_at {
        lines.push(format!("Estimated completion: {}", format_clock(end)));
    }
    if let Some(progress) = render_progress(view, now) {
        lines.push(progress);
    }
    if let Some(result) = &view.result {
        lines.push(format!(
            "Result: {} ({}s)",
            result.file_name, result.processing_time_seconds
        ));
    }
    lines
}

pub fn render_json(view: &JobSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(view)
}

fn format_clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn format_duration(delta: TimeDelta) -> String {
    let total = delta.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    if bytes < BYTES_PER_MEGABYTE {
        return format!("{:.1} KB", bytes as f64 / 1024.0);
    }
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MEGABYTE as f64)
}
