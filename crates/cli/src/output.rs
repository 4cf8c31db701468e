// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt::Write as _;

use crate::color;
use clap::ValueEnum;
use serde::Serialize;
use uj_core::{ContainerLog, ContainerRole, JobStatus, UploadSummary};

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What to include when rendering a status as text.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Include container logs
    pub logs: bool,
    /// Only the last N lines of each log (0 = all)
    pub tail: usize,
}

/// Format-branch helper for single-object commands.
///
/// Renders as JSON when `format` is `Json`, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            text_fn();
        }
    }
    Ok(())
}

/// One-line summary of upload progress.
pub fn upload_progress(uploads: &UploadSummary) -> String {
    let n = uploads.events.len();
    let mut line = match (n, uploads.complete) {
        (0, false) => "none yet".to_string(),
        (n, true) => format!("{} file(s), complete", n),
        (n, false) => format!("{} file(s), uploading", n),
    };
    if uploads.malformed > 0 {
        let _ = write!(line, " ({} malformed record(s) skipped)", uploads.malformed);
    }
    line
}

/// Last `n` lines of `text`; all of it when `n` is 0.
pub fn tail_lines(text: &str, n: usize) -> &str {
    if n == 0 {
        return text;
    }
    let trimmed = text.trim_end_matches('\n');
    match trimmed.rmatch_indices('\n').nth(n - 1) {
        Some((idx, _)) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Compact line used between full renders in watch mode.
pub fn progress_line(status: &JobStatus) -> String {
    format!(
        "[{}] {}: {}",
        color::state(status.state),
        status.job_name,
        upload_progress(&status.uploads)
    )
}

/// Full text rendering of a job status.
pub fn render_status(status: &JobStatus, opts: RenderOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Job:      {} {}",
        color::header(&status.job_name),
        color::muted(&format!("({})", status.namespace))
    );
    let _ = writeln!(out, "State:    {}", color::state(status.state));
    if let Some(pod) = &status.pod_name {
        let _ = writeln!(out, "Pod:      {}", pod);
    }
    let _ = writeln!(out, "Uploads:  {}", upload_progress(&status.uploads));

    if !status.files.is_empty() {
        let _ = writeln!(out, "\n{}", color::header("Files:"));
        for file in &status.files {
            let _ = writeln!(out, "  {}  {}", file.filename, color::context(&file.url));
            if let Some(viewer) = &file.viewer_url {
                let _ = writeln!(out, "    view: {}", color::context(viewer));
            }
        }
    }

    if opts.logs {
        for role in ContainerRole::ALL {
            let _ = writeln!(out, "\n{}", color::header(&format!("Logs ({}):", role)));
            match status.logs.get(role) {
                ContainerLog::Text(text) if text.trim().is_empty() => {
                    let _ = writeln!(out, "  {}", color::muted("(empty)"));
                }
                ContainerLog::Text(text) => {
                    for line in tail_lines(text, opts.tail).lines() {
                        let _ = writeln!(out, "  {}", line);
                    }
                }
                other => {
                    let _ = writeln!(out, "  {}", color::muted(other.display_text()));
                }
            }
        }
    }
    out
}
