// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status resolver.
//!
//! Each call re-reads the Job, its pods and both container logs from the
//! cluster; nothing is cached between polls. Expected gaps in an
//! eventually-consistent control plane (job not created yet, no pod yet,
//! container still starting) map to states and placeholder text:
//!
//! ```text
//! get Job ──► absent ───────────────────────────► NotFound
//!    │
//!    ▼
//! counters: succeeded>0 ► Succeeded   failed>0 ► Failed
//!    │
//!    ▼
//! list pods ─► none / newest Pending ──────────► Pending
//!          └─► newest in any other phase ──────► Running
//! ```

use crate::cluster::{ClusterAdapter, ClusterError, PodSummary};
use thiserror::Error;
use uj_core::{
    decode, ArtifactLinker, ContainerLog, ContainerLogs, ContainerRole, JobLifecycleState,
    JobStatus,
};

const JOB_NOT_FOUND: &str = "job not found";
const NO_POD: &str = "no pod has been scheduled yet";

/// Control-plane failures that leave the job's state unknown.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not fetch job {name}: {source}")]
    FetchJob { name: String, source: ClusterError },
    #[error("could not list pods for job {name}: {source}")]
    ListPods { name: String, source: ClusterError },
}

/// Lifecycle state, newest pod and container logs at one poll instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedJob {
    pub state: JobLifecycleState,
    pub pod_name: Option<String>,
    pub logs: ContainerLogs,
}

/// Resolves job state from the cluster.
#[derive(Clone)]
pub struct StatusResolver<C: ClusterAdapter> {
    cluster: C,
}

impl<C: ClusterAdapter> StatusResolver<C> {
    pub fn new(cluster: C) -> Self {
        Self { cluster }
    }

    pub async fn resolve(
        &self,
        namespace: &str,
        job_name: &str,
    ) -> Result<ResolvedJob, ResolveError> {
        let counts = self
            .cluster
            .get_job(namespace, job_name)
            .await
            .map_err(|source| ResolveError::FetchJob { name: job_name.to_string(), source })?;

        let Some(counts) = counts else {
            tracing::debug!(job = %job_name, %namespace, "job not found");
            return Ok(ResolvedJob {
                state: JobLifecycleState::NotFound,
                pod_name: None,
                logs: ContainerLogs::placeholder(JOB_NOT_FOUND),
            });
        };

        let pods = self
            .cluster
            .list_job_pods(namespace, job_name)
            .await
            .map_err(|source| ResolveError::ListPods { name: job_name.to_string(), source })?;

        let newest = newest_pod(&pods);
        let state = JobLifecycleState::derive(&counts, newest.map(|p| p.phase));
        tracing::debug!(
            job = %job_name,
            %state,
            pods = pods.len(),
            succeeded = counts.succeeded,
            failed = counts.failed,
            "resolved job state"
        );

        let Some(pod) = newest else {
            return Ok(ResolvedJob {
                state,
                pod_name: None,
                logs: ContainerLogs::placeholder(NO_POD),
            });
        };

        let init = self.fetch_log(namespace, &pod.name, ContainerRole::Init).await;
        let main = self.fetch_log(namespace, &pod.name, ContainerRole::Main).await;
        Ok(ResolvedJob {
            state,
            pod_name: Some(pod.name.clone()),
            logs: ContainerLogs { init, main },
        })
    }

    /// Fetch one container's log; failures stay scoped to that container.
    async fn fetch_log(&self, namespace: &str, pod: &str, role: ContainerRole) -> ContainerLog {
        let container = role.container_name();
        match self.cluster.container_logs(namespace, pod, container).await {
            Ok(text) => ContainerLog::Text(text),
            Err(ClusterError::ContainerNotStarted(_)) => {
                ContainerLog::Placeholder(format!("container {} has not started yet", container))
            }
            Err(ClusterError::NotFound(_)) => {
                ContainerLog::Placeholder(format!("pod {} no longer exists", pod))
            }
            Err(e) => {
                tracing::warn!(%pod, %container, error = %e, "log fetch failed");
                ContainerLog::Error(format!("could not fetch {} logs: {}", container, e))
            }
        }
    }
}

/// Most recently created pod. Any timestamped pod beats one without a
/// timestamp; ties (including two missing timestamps) go to the one listed
/// last.
pub fn newest_pod(pods: &[PodSummary]) -> Option<&PodSummary> {
    pods.iter().fold(None, |best: Option<&PodSummary>, pod| match best {
        Some(b) if pod.created_at < b.created_at => Some(b),
        _ => Some(pod),
    })
}

/// One poll: resolve state, decode upload progress, build download links.
#[derive(Clone)]
pub struct JobMonitor<C: ClusterAdapter> {
    resolver: StatusResolver<C>,
    linker: ArtifactLinker,
}

impl<C: ClusterAdapter> JobMonitor<C> {
    pub fn new(cluster: C, linker: ArtifactLinker) -> Self {
        Self { resolver: StatusResolver::new(cluster), linker }
    }

    pub async fn poll(&self, namespace: &str, job_name: &str) -> Result<JobStatus, ResolveError> {
        let resolved = self.resolver.resolve(namespace, job_name).await?;
        let uploads = resolved.logs.main.text().map(decode).unwrap_or_default();
        let files = self.linker.links(&uploads);

        Ok(JobStatus {
            job_name: job_name.to_string(),
            namespace: namespace.to_string(),
            state: resolved.state,
            pod_name: resolved.pod_name,
            logs: resolved.logs,
            uploads,
            files,
        })
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
