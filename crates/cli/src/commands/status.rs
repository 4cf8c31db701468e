// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `uj status` - report (or follow) a build job

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use uj_adapters::{ClusterAdapter, JobMonitor, KubeCluster};
use uj_core::{ArtifactLinker, JobLifecycleState, JobStatus, UploadSummary};

use crate::env;
use crate::exit_error::{codes, ExitError};
use crate::output::{self, OutputFormat, RenderOptions};

/// Options shared by `status` and `submit --watch`.
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Delay between polls in milliseconds [env: UJ_POLL_INTERVAL_MS]
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Upper bound on a single poll in milliseconds [env: UJ_POLL_TIMEOUT_MS]
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Give up after this many consecutive failed polls (0 = never)
    #[arg(long, default_value_t = 5)]
    pub max_failures: u32,

    /// Stop after this many consecutive polls that find no job (0 = keep waiting)
    #[arg(long, default_value_t = 10)]
    pub max_missing: u32,

    /// Include container logs
    #[arg(long)]
    pub logs: bool,

    /// Only show the last N log lines per container (0 = all)
    #[arg(long, default_value_t = 20)]
    pub tail: usize,

    /// Public base URL for download links [env: UJ_PUBLIC_BASE_URL]
    #[arg(long)]
    pub public_url: Option<String>,
}

impl WatchArgs {
    fn interval(&self) -> Duration {
        self.interval_ms.map(Duration::from_millis).unwrap_or_else(env::poll_interval)
    }

    fn timeout(&self) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or_else(env::poll_timeout)
    }

    fn linker(&self) -> Result<ArtifactLinker> {
        let base = self
            .public_url
            .clone()
            .or_else(env::public_base_url)
            .context("public base URL required (--public-url, UJ_PUBLIC_BASE_URL or UJ_S3_ENDPOINT)")?;
        Ok(ArtifactLinker::new(base).viewer_base(env::viewer_url()))
    }

    fn limits(&self) -> WatchLimits {
        WatchLimits { max_failures: self.max_failures, max_missing: self.max_missing }
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions { logs: self.logs, tail: self.tail }
    }
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job name
    pub name: String,

    /// Keep polling until the job finishes
    #[arg(short, long)]
    pub watch: bool,

    #[command(flatten)]
    pub follow: WatchArgs,
}

/// Polls one job, bounding each poll by a timeout and carrying upload
/// progress forward so a later, shorter log never hides recorded files.
pub struct StatusPoller<C: ClusterAdapter> {
    monitor: JobMonitor<C>,
    linker: ArtifactLinker,
    poll_timeout: Duration,
    retained: UploadSummary,
}

impl<C: ClusterAdapter> StatusPoller<C> {
    pub fn new(cluster: C, linker: ArtifactLinker, poll_timeout: Duration) -> Self {
        Self {
            monitor: JobMonitor::new(cluster, linker.clone()),
            linker,
            poll_timeout,
            retained: UploadSummary::default(),
        }
    }

    pub async fn poll(&mut self, namespace: &str, name: &str) -> Result<JobStatus> {
        let status = tokio::time::timeout(self.poll_timeout, self.monitor.poll(namespace, name))
            .await
            .map_err(|_| {
                anyhow::anyhow!("status poll timed out after {}ms", self.poll_timeout.as_millis())
            })??;
        Ok(self.retain(status))
    }

    fn retain(&mut self, mut status: JobStatus) -> JobStatus {
        self.retained.merge(status.uploads);
        status.uploads = self.retained.clone();
        status.files = self.linker.links(&status.uploads);
        status
    }
}

/// When `watch` gives up short of a settled job. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchLimits {
    /// Consecutive failed polls
    pub max_failures: u32,
    /// Consecutive polls reporting `NotFound`
    pub max_missing: u32,
}

/// Poll until the job settles, calling `on_status` after every successful
/// poll. Failed polls are retried until `max_failures` happen in a row; a
/// job still missing after `max_missing` polls ends the watch with its
/// `NotFound` status.
pub async fn watch<C: ClusterAdapter>(
    poller: &mut StatusPoller<C>,
    namespace: &str,
    name: &str,
    interval: Duration,
    limits: WatchLimits,
    mut on_status: impl FnMut(&JobStatus) -> Result<()>,
) -> Result<JobStatus> {
    let mut failures = 0u32;
    let mut missing = 0u32;
    loop {
        match poller.poll(namespace, name).await {
            Ok(status) => {
                failures = 0;
                on_status(&status)?;
                if status.is_settled() {
                    return Ok(status);
                }
                if status.state == JobLifecycleState::NotFound {
                    missing += 1;
                    if limits.max_missing > 0 && missing >= limits.max_missing {
                        tracing::warn!(job = %name, polls = missing, "job never appeared");
                        return Ok(status);
                    }
                } else {
                    missing = 0;
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(job = %name, failures, error = %e, "status poll failed");
                if limits.max_failures > 0 && failures >= limits.max_failures {
                    return Err(e.context(format!("giving up after {} failed polls", failures)));
                }
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// Distinguishes polls worth printing in watch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Progress {
    state: JobLifecycleState,
    pod: Option<String>,
    files: usize,
    complete: bool,
}

impl Progress {
    fn of(status: &JobStatus) -> Self {
        Self {
            state: status.state,
            pod: status.pod_name.clone(),
            files: status.uploads.events.len(),
            complete: status.uploads.complete,
        }
    }
}

/// Exit code for the final observed state.
fn outcome(status: &JobStatus) -> Result<()> {
    match status.state {
        JobLifecycleState::Failed => Err(ExitError::job_failed(&status.job_name).into()),
        JobLifecycleState::NotFound => {
            Err(ExitError::not_found(&status.job_name, &status.namespace).into())
        }
        _ => Ok(()),
    }
}

/// Follow a job until it settles, printing progress as it changes.
pub async fn follow<C: ClusterAdapter>(
    cluster: C,
    namespace: &str,
    name: &str,
    args: &WatchArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut poller = StatusPoller::new(cluster, args.linker()?, args.timeout());
    let opts = args.render_options();
    let mut last: Option<Progress> = None;

    let printer = |status: &JobStatus| -> Result<()> {
        let progress = Progress::of(status);
        if last.as_ref() == Some(&progress) {
            return Ok(());
        }
        last = Some(progress);
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(status)?),
            OutputFormat::Text if status.is_settled() => {
                print!("{}", output::render_status(status, opts))
            }
            OutputFormat::Text => println!("{}", output::progress_line(status)),
        }
        Ok(())
    };

    let watched = watch(&mut poller, namespace, name, args.interval(), args.limits(), printer);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::select! {
        result = watched => outcome(&result?),
        _ = ctrl_c => Err(ExitError::new(codes::INTERRUPTED, "interrupted").into()),
    }
}

pub async fn handle(args: StatusArgs, namespace: &str, format: OutputFormat) -> Result<()> {
    let cluster = KubeCluster::try_default().await.context("could not connect to the cluster")?;
    if args.watch {
        return follow(cluster, namespace, &args.name, &args.follow, format).await;
    }

    let mut poller = StatusPoller::new(cluster, args.follow.linker()?, args.follow.timeout());
    let status = poller.poll(namespace, &args.name).await?;
    output::format_or_json(format, &status, || {
        print!("{}", output::render_status(&status, args.follow.render_options()));
    })?;
    outcome(&status)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
