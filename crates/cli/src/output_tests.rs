// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use uj_core::{
    ArtifactLinker, ContainerLogs, JobLifecycleState, ProtocolGeneration, UploadEvent,
};

fn no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
}

fn uploads(files: &[&str], complete: bool) -> UploadSummary {
    UploadSummary {
        protocol: Some(ProtocolGeneration::Incremental),
        bucket: Some("usher".to_string()),
        prefix: Some("results/r".to_string()),
        events: files
            .iter()
            .map(|f| UploadEvent::new(*f, format!("results/r/{f}"), "usher", "results/r"))
            .collect(),
        complete,
        malformed: 0,
    }
}

fn status(state: JobLifecycleState, uploads: UploadSummary) -> JobStatus {
    let files = ArtifactLinker::new("https://files.example.org").links(&uploads);
    JobStatus {
        job_name: "usher-build-abc".to_string(),
        namespace: "default".to_string(),
        state,
        pod_name: Some("usher-build-abc-x1".to_string()),
        logs: ContainerLogs {
            init: ContainerLog::Text("downloading config\nconfig ready\n".to_string()),
            main: ContainerLog::Placeholder("container build has not started yet".to_string()),
        },
        uploads,
        files,
    }
}

#[yare::parameterized(
    nothing      = { &[],                        false, 0, "none yet" },
    uploading    = { &["a.tsv"],                 false, 0, "1 file(s), uploading" },
    complete     = { &["a.tsv", "tree.jsonl.gz"], true, 0, "2 file(s), complete" },
    empty_done   = { &[],                        true,  0, "0 file(s), complete" },
    with_skipped = { &["a.tsv"],                 false, 2, "1 file(s), uploading (2 malformed record(s) skipped)" },
)]
fn upload_progress_line(files: &[&str], complete: bool, malformed: usize, expected: &str) {
    let mut summary = uploads(files, complete);
    summary.malformed = malformed;
    assert_eq!(upload_progress(&summary), expected);
}

#[yare::parameterized(
    all_lines      = { "a\nb\nc\n", 0, "a\nb\nc\n" },
    last_two       = { "a\nb\nc\n", 2, "b\nc" },
    more_than_have = { "a\nb\n",    5, "a\nb" },
    no_newline     = { "a\nb\nc",   1, "c" },
    empty          = { "",          3, "" },
)]
fn tail_lines_cases(text: &str, n: usize, expected: &str) {
    assert_eq!(tail_lines(text, n), expected);
}

#[test]
#[serial]
fn render_lists_files_with_viewer_link() {
    no_color();
    let s = status(JobLifecycleState::Succeeded, uploads(&["tree.jsonl.gz", "metadata.tsv"], true));

    let text = render_status(&s, RenderOptions::default());

    assert!(text.contains("Job:      usher-build-abc (default)"));
    assert!(text.contains("State:    succeeded"));
    assert!(text.contains("Pod:      usher-build-abc-x1"));
    assert!(text.contains("Uploads:  2 file(s), complete"));
    assert!(text.contains("tree.jsonl.gz  https://files.example.org/usher/results/r/tree.jsonl.gz"));
    assert!(text.contains("view: https://taxonium.org/?protoUrl="));
    assert_eq!(text.matches("view:").count(), 1);
    assert!(!text.contains("Logs ("));
}

#[test]
#[serial]
fn render_with_logs_shows_placeholders_and_tail() {
    no_color();
    let s = status(JobLifecycleState::Pending, UploadSummary::default());

    let text = render_status(&s, RenderOptions { logs: true, tail: 1 });

    assert!(text.contains("Logs (fetch-config):\n  config ready\n"));
    assert!(!text.contains("downloading config"));
    assert!(text.contains("Logs (build):\n  container build has not started yet\n"));
    assert!(!text.contains("Files:"));
}

#[test]
#[serial]
fn progress_line_is_compact() {
    no_color();
    let s = status(JobLifecycleState::Running, uploads(&["a.tsv"], false));
    assert_eq!(progress_line(&s), "[running] usher-build-abc: 1 file(s), uploading");
}

#[test]
fn format_or_json_text_calls_closure() {
    let mut called = false;
    format_or_json(OutputFormat::Text, &serde_json::json!({}), || called = true).unwrap();
    assert!(called);
}

#[test]
fn format_or_json_json_skips_closure() {
    let mut called = false;
    format_or_json(OutputFormat::Json, &serde_json::json!({"a": 1}), || called = true).unwrap();
    assert!(!called);
}
