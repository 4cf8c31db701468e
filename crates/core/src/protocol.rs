// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upload-progress protocol embedded in the build worker's log output.
//!
//! The worker cannot report through a structured channel, so it prints
//! delimited JSON records into its combined stdout/stderr. Two generations
//! of the protocol exist:
//!
//! ```text
//! Incremental (one record per uploaded file, then a completion line):
//!   __S3_FILE_UPLOADED__{"filename":..,"s3_key":..,"bucket":..,"prefix":..}__S3_FILE_END__
//!   __S3_UPLOAD_COMPLETE__
//!
//! Legacy (a single block printed after every upload finished):
//!   __VIRAL_USHER_S3_OUTPUT_START__
//!   {"s3_bucket":..,"s3_prefix":..,"uploaded_files":[..],"total_files":N}
//!   __VIRAL_USHER_S3_OUTPUT_END__
//! ```
//!
//! [`decode`] is a pure function of the accumulated log text. Pollers re-run
//! it over the whole text on every poll, so it must be idempotent and must
//! only ever extend the event list as text is appended.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Opens one incremental per-file record.
pub const FILE_UPLOADED_MARKER: &str = "__S3_FILE_UPLOADED__";
/// Closes one incremental per-file record.
pub const FILE_END_MARKER: &str = "__S3_FILE_END__";
/// Printed before the first incremental record.
pub const UPLOAD_START_MARKER: &str = "__S3_UPLOAD_START__";
/// Printed once after the last incremental record.
pub const UPLOAD_COMPLETE_MARKER: &str = "__S3_UPLOAD_COMPLETE__";
/// Opens the legacy batch block.
pub const LEGACY_START_MARKER: &str = "__VIRAL_USHER_S3_OUTPUT_START__";
/// Closes the legacy batch block.
pub const LEGACY_END_MARKER: &str = "__VIRAL_USHER_S3_OUTPUT_END__";

/// File suffix of the compressed tree consumed by the tree viewer.
pub const TREE_SUFFIX: &str = ".jsonl.gz";

/// One record per line; `.` never crosses a newline, so a truncated record
/// cannot swallow the next one.
#[allow(clippy::expect_used)]
static FILE_RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{}(.*?){}",
        regex::escape(FILE_UPLOADED_MARKER),
        regex::escape(FILE_END_MARKER)
    ))
    .expect("constant regex pattern is valid")
});

/// Which protocol generation produced a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolGeneration {
    Incremental,
    Legacy,
}

/// One uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEvent {
    /// Path relative to the worker's output directory
    pub filename: String,
    pub storage_key: String,
    pub bucket: String,
    pub prefix: String,
    /// Whether this is the compressed tree for the tree viewer
    pub is_tree: bool,
}

impl UploadEvent {
    pub fn new(
        filename: impl Into<String>,
        storage_key: impl Into<String>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        let filename = filename.into();
        let is_tree = is_tree_file(&filename);
        Self {
            filename,
            storage_key: storage_key.into(),
            bucket: bucket.into(),
            prefix: prefix.into(),
            is_tree,
        }
    }
}

/// True iff `filename` carries the full double extension of the tree format.
pub fn is_tree_file(filename: &str) -> bool {
    filename.ends_with(TREE_SUFFIX)
}

/// Upload progress of one job, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub protocol: Option<ProtocolGeneration>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub events: Vec<UploadEvent>,
    /// All uploads have finished
    pub complete: bool,
    /// Records that were present but could not be decoded
    pub malformed: usize,
}

impl UploadSummary {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Fold a newer decode into this one without ever losing recorded events.
    ///
    /// A later poll may see less text (a log fetch failed, or the pod was
    /// replaced), so events already recorded are kept, unseen storage keys
    /// are appended in order, and completion is sticky.
    pub fn merge(&mut self, newer: UploadSummary) {
        let mut seen: HashSet<String> =
            self.events.iter().map(|e| e.storage_key.clone()).collect();
        for event in newer.events {
            if seen.insert(event.storage_key.clone()) {
                self.events.push(event);
            }
        }
        self.complete |= newer.complete;
        self.malformed = self.malformed.max(newer.malformed);
        if self.protocol.is_none() {
            self.protocol = newer.protocol;
        }
        if self.bucket.is_none() {
            self.bucket = newer.bucket;
        }
        if self.prefix.is_none() {
            self.prefix = newer.prefix;
        }
    }
}

#[derive(Deserialize)]
struct FileUploadedRecord {
    filename: String,
    s3_key: String,
    bucket: String,
    prefix: String,
}

#[derive(Deserialize)]
struct LegacyOutputRecord {
    s3_bucket: String,
    s3_prefix: String,
    uploaded_files: Vec<String>,
    #[serde(default)]
    total_files: Option<usize>,
}

/// Decode the upload progress contained in a worker's accumulated log text.
///
/// Incremental records take precedence; the legacy block is only consulted
/// when no incremental record decodes.
pub fn decode(text: &str) -> UploadSummary {
    let incremental = decode_incremental(text);
    if !incremental.events.is_empty() {
        return incremental;
    }

    let mut legacy = decode_legacy(text);
    legacy.malformed += incremental.malformed;
    if legacy.protocol.is_none() {
        // A worker with nothing to upload still prints the completion line.
        legacy.complete = incremental.complete;
    }
    legacy
}

fn decode_incremental(text: &str) -> UploadSummary {
    let mut summary = UploadSummary::default();
    let mut seen = HashSet::new();

    for captures in FILE_RECORD.captures_iter(text) {
        let raw = captures.get(1).map_or("", |m| m.as_str());
        let record = match serde_json::from_str::<FileUploadedRecord>(raw) {
            Ok(record) if !record.s3_key.is_empty() => record,
            Ok(_) => {
                tracing::warn!(record = %raw, "skipping upload record with empty s3_key");
                summary.malformed += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(record = %raw, error = %e, "skipping malformed upload record");
                summary.malformed += 1;
                continue;
            }
        };

        if !seen.insert(record.s3_key.clone()) {
            continue;
        }
        if summary.bucket.is_none() {
            summary.bucket = Some(record.bucket.clone());
            summary.prefix = Some(record.prefix.clone());
        }
        summary.events.push(UploadEvent::new(
            record.filename,
            record.s3_key,
            record.bucket,
            record.prefix,
        ));
    }

    summary.complete = text.contains(UPLOAD_COMPLETE_MARKER);
    if !summary.events.is_empty() {
        summary.protocol = Some(ProtocolGeneration::Incremental);
    }
    summary
}

fn decode_legacy(text: &str) -> UploadSummary {
    let mut summary = UploadSummary::default();

    let Some(start) = text.find(LEGACY_START_MARKER) else {
        return summary;
    };
    let body_start = start + LEGACY_START_MARKER.len();
    // Block not fully written yet; a later poll will see the end marker.
    let Some(body_len) = text[body_start..].find(LEGACY_END_MARKER) else {
        return summary;
    };
    let body = text[body_start..body_start + body_len].trim();

    let record = match serde_json::from_str::<LegacyOutputRecord>(body) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed legacy upload block");
            summary.malformed += 1;
            return summary;
        }
    };

    if let Some(total) = record.total_files {
        if total != record.uploaded_files.len() {
            tracing::warn!(
                total_files = total,
                listed = record.uploaded_files.len(),
                "legacy upload block count mismatch, using listed keys"
            );
        }
    }

    let key_prefix = format!("{}/", record.s3_prefix);
    let mut seen = HashSet::new();
    for key in record.uploaded_files {
        if !seen.insert(key.clone()) {
            continue;
        }
        let filename = key.strip_prefix(&key_prefix).unwrap_or(&key).to_string();
        summary.events.push(UploadEvent::new(
            filename,
            key,
            record.s3_bucket.clone(),
            record.s3_prefix.clone(),
        ));
    }

    summary.protocol = Some(ProtocolGeneration::Legacy);
    summary.bucket = Some(record.s3_bucket);
    summary.prefix = Some(record.s3_prefix);
    // The legacy block is only ever printed after the last upload.
    summary.complete = true;
    summary
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
