// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::cluster::FakeCluster;
use uj_core::{JobCounts, PodPhase};

const NS: &str = "default";
const JOB: &str = "usher-build-abc";

fn counts(succeeded: i32, failed: i32) -> JobCounts {
    JobCounts { succeeded, failed }
}

fn resolver(cluster: &FakeCluster) -> StatusResolver<FakeCluster> {
    StatusResolver::new(cluster.clone())
}

fn pod(name: &str, created_at: Option<&str>) -> PodSummary {
    PodSummary {
        name: name.to_string(),
        phase: PodPhase::Running,
        created_at: created_at.map(str::to_string),
    }
}

#[tokio::test]
async fn absent_job_is_not_found() {
    let cluster = FakeCluster::new();
    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();

    assert_eq!(resolved.state, JobLifecycleState::NotFound);
    assert_eq!(resolved.pod_name, None);
    assert_eq!(resolved.logs, ContainerLogs::placeholder("job not found"));
}

#[tokio::test]
async fn job_without_pods_is_pending() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();

    assert_eq!(resolved.state, JobLifecycleState::Pending);
    assert_eq!(resolved.pod_name, None);
    assert_eq!(resolved.logs, ContainerLogs::placeholder("no pod has been scheduled yet"));
}

#[tokio::test]
async fn scheduling_pod_is_pending_with_placeholders() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));
    cluster.add_pod(NS, JOB, "usher-build-abc-x1", PodPhase::Pending, Some("2024-05-01T10:00:00Z"));

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();

    assert_eq!(resolved.state, JobLifecycleState::Pending);
    assert_eq!(resolved.pod_name.as_deref(), Some("usher-build-abc-x1"));
    assert_eq!(
        resolved.logs.init,
        ContainerLog::Placeholder("container fetch-config has not started yet".to_string())
    );
    assert_eq!(
        resolved.logs.main,
        ContainerLog::Placeholder("container build has not started yet".to_string())
    );
}

#[tokio::test]
async fn running_pod_is_running_with_logs() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));
    cluster.add_pod(NS, JOB, "p1", PodPhase::Running, Some("2024-05-01T10:00:00Z"));
    cluster.set_log("p1", "fetch-config", Ok("config ready at /data/config.toml\n".to_string()));
    cluster.set_log("p1", "build", Ok("Running viral_usher_build...\n".to_string()));

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();

    assert_eq!(resolved.state, JobLifecycleState::Running);
    assert_eq!(resolved.logs.init.text(), Some("config ready at /data/config.toml\n"));
    assert_eq!(resolved.logs.main.text(), Some("Running viral_usher_build...\n"));
}

#[tokio::test]
async fn succeeded_regardless_of_pods() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(1, 0));

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();
    assert_eq!(resolved.state, JobLifecycleState::Succeeded);

    cluster.add_pod(NS, JOB, "p1", PodPhase::Failed, Some("2024-05-01T10:00:00Z"));
    cluster.add_pod(NS, JOB, "p2", PodPhase::Succeeded, Some("2024-05-01T10:05:00Z"));
    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();
    assert_eq!(resolved.state, JobLifecycleState::Succeeded);
    assert_eq!(resolved.pod_name.as_deref(), Some("p2"));
}

#[tokio::test]
async fn failure_count_without_success_is_failed() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 1));
    cluster.add_pod(NS, JOB, "p1", PodPhase::Failed, Some("2024-05-01T10:00:00Z"));

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();
    assert_eq!(resolved.state, JobLifecycleState::Failed);
}

#[tokio::test]
async fn log_failure_is_scoped_to_one_container() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));
    cluster.add_pod(NS, JOB, "p1", PodPhase::Running, None);
    cluster.set_log("p1", "fetch-config", Ok("done\n".to_string()));
    cluster.set_log(
        "p1",
        "build",
        Err(ClusterError::Api { code: 403, message: "forbidden".to_string() }),
    );

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();

    assert_eq!(resolved.logs.init, ContainerLog::Text("done\n".to_string()));
    assert_eq!(
        resolved.logs.main,
        ContainerLog::Error("could not fetch build logs: api error (403): forbidden".to_string())
    );
}

#[tokio::test]
async fn deleted_pod_logs_are_placeholders() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));
    cluster.add_pod(NS, JOB, "p1", PodPhase::Running, None);
    cluster.set_log("p1", "build", Err(ClusterError::NotFound("pods \"p1\" not found".to_string())));

    let resolved = resolver(&cluster).resolve(NS, JOB).await.unwrap();
    assert_eq!(resolved.logs.main, ContainerLog::Placeholder("pod p1 no longer exists".to_string()));
}

#[tokio::test]
async fn job_fetch_failure_names_operation() {
    let cluster = FakeCluster::new();
    cluster.fail_get_job(ClusterError::Transport("connection refused".to_string()));

    let err = resolver(&cluster).resolve(NS, JOB).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not fetch job usher-build-abc: transport error: connection refused"
    );
}

#[tokio::test]
async fn pod_list_failure_names_operation() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));
    cluster.fail_list_pods(ClusterError::Api { code: 403, message: "forbidden".to_string() });

    let err = resolver(&cluster).resolve(NS, JOB).await.unwrap_err();
    assert!(matches!(err, ResolveError::ListPods { .. }));
}

#[test]
fn newest_pod_by_creation_time() {
    let pods = vec![
        pod("retry-2", Some("2024-05-01T10:10:00Z")),
        pod("retry-1", Some("2024-05-01T10:05:00Z")),
        pod("first", Some("2024-05-01T10:00:00Z")),
    ];
    assert_eq!(newest_pod(&pods).unwrap().name, "retry-2");
}

#[yare::parameterized(
    tie_last_wins           = { &[("a", Some("2024-05-01T10:00:00Z")), ("b", Some("2024-05-01T10:00:00Z"))], "b" },
    missing_timestamps      = { &[("a", None), ("b", None), ("c", None)],                                       "c" },
    timestamp_beats_missing = { &[("a", Some("2024-05-01T10:00:00Z")), ("b", None)],                            "a" },
    single                  = { &[("only", None)],                                                              "only" },
)]
fn newest_pod_cases(pods: &[(&str, Option<&str>)], expected: &str) {
    let pods: Vec<PodSummary> = pods.iter().map(|(n, t)| pod(n, *t)).collect();
    assert_eq!(newest_pod(&pods).unwrap().name, expected);
}

#[test]
fn newest_pod_of_none() {
    assert!(newest_pod(&[]).is_none());
}

#[tokio::test]
async fn poll_decodes_uploads_and_builds_links() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(1, 0));
    cluster.add_pod(NS, JOB, "p1", PodPhase::Succeeded, Some("2024-05-01T10:00:00Z"));
    cluster.set_log("p1", "fetch-config", Ok("config ready\n".to_string()));
    cluster.set_log(
        "p1",
        "build",
        Ok([
            "__S3_UPLOAD_START__",
            r#"__S3_FILE_UPLOADED__{"filename": "tree.jsonl.gz", "s3_key": "results/r/tree.jsonl.gz", "bucket": "usher", "prefix": "results/r"}__S3_FILE_END__"#,
            r#"__S3_FILE_UPLOADED__{"filename": "my tree.pb.gz", "s3_key": "results/r/my tree.pb.gz", "bucket": "usher", "prefix": "results/r"}__S3_FILE_END__"#,
            "__S3_UPLOAD_COMPLETE__",
        ]
        .join("\n")),
    );
    let monitor = JobMonitor::new(cluster, ArtifactLinker::new("http://minio:9000/"));

    let status = monitor.poll(NS, JOB).await.unwrap();

    assert_eq!(status.state, JobLifecycleState::Succeeded);
    assert!(status.is_settled());
    assert!(status.uploads.complete);
    assert_eq!(status.files.len(), 2);
    assert_eq!(status.files[0].url, "http://minio:9000/usher/results/r/tree.jsonl.gz");
    assert!(status.files[0].viewer_url.is_some());
    assert_eq!(status.files[1].url, "http://minio:9000/usher/results/r/my%20tree.pb.gz");
    assert!(status.files[1].viewer_url.is_none());
}

#[tokio::test]
async fn poll_without_main_logs_has_empty_uploads() {
    let cluster = FakeCluster::new();
    cluster.insert_job(NS, JOB, counts(0, 0));
    cluster.add_pod(NS, JOB, "p1", PodPhase::Pending, None);
    let monitor = JobMonitor::new(cluster, ArtifactLinker::new("http://minio:9000"));

    let status = monitor.poll(NS, JOB).await.unwrap();

    assert_eq!(status.state, JobLifecycleState::Pending);
    assert!(status.uploads.is_empty());
    assert!(!status.uploads.complete);
    assert!(status.files.is_empty());
}

#[tokio::test]
async fn poll_of_missing_job_is_not_an_error() {
    let monitor = JobMonitor::new(FakeCluster::new(), ArtifactLinker::new("http://minio:9000"));
    let status = monitor.poll(NS, JOB).await.unwrap();
    assert_eq!(status.state, JobLifecycleState::NotFound);
    assert_eq!(status.job_name, JOB);
}
