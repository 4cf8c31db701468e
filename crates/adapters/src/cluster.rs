// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster adapter: the narrow set of orchestrator calls the launcher and
//! status resolver need.
//!
//! Responses are converted to typed records ([`JobCounts`], [`PodSummary`])
//! at this boundary so nothing inward handles raw API objects, except the
//! Job spec that is submitted.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use thiserror::Error;
use uj_core::{JobCounts, PodPhase};

/// Errors from cluster operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Log request for a container that is still waiting to start
    #[error("container not started: {0}")]
    ContainerNotStarted(String),
    #[error("api error ({code}): {message}")]
    Api { code: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// What the resolver needs to know about one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSummary {
    pub name: String,
    pub phase: PodPhase,
    /// RFC 3339 creation timestamp at second precision (UTC), so string
    /// order is time order.
    pub created_at: Option<String>,
}

/// Orchestrator operations used by the launcher and resolver.
#[async_trait]
pub trait ClusterAdapter: Clone + Send + Sync + 'static {
    /// Create a Job. Returns the server-assigned UID.
    async fn create_job(&self, job: &Job) -> Result<String, ClusterError>;

    /// Fetch a Job's counters; `Ok(None)` when the Job does not exist.
    async fn get_job(&self, namespace: &str, name: &str)
        -> Result<Option<JobCounts>, ClusterError>;

    /// List the pods created for a Job, in server listing order.
    async fn list_job_pods(
        &self,
        namespace: &str,
        job_name: &str,
    ) -> Result<Vec<PodSummary>, ClusterError>;

    /// Fetch the full log text of one container.
    async fn container_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
    ) -> Result<String, ClusterError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ClusterAdapter, ClusterError, PodSummary};
    use async_trait::async_trait;
    use k8s_openapi::api::batch::v1::Job;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use uj_core::{JobCounts, PodPhase};

    /// Recorded cluster call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ClusterCall {
        CreateJob { namespace: String, name: String },
        GetJob { namespace: String, name: String },
        ListJobPods { namespace: String, job_name: String },
        ContainerLogs { pod: String, container: String },
    }

    #[derive(Default)]
    struct FakeClusterState {
        jobs: HashMap<(String, String), (Job, JobCounts)>,
        pods: HashMap<(String, String), Vec<PodSummary>>,
        logs: HashMap<(String, String), Result<String, ClusterError>>,
        get_job_error: Option<ClusterError>,
        list_pods_error: Option<ClusterError>,
        create_error: Option<ClusterError>,
        calls: Vec<ClusterCall>,
        next_uid: u32,
    }

    /// In-memory cluster for testing.
    ///
    /// Enforces Job name uniqueness per namespace like the API server.
    /// Logs default to `ContainerNotStarted` until set.
    #[derive(Clone, Default)]
    pub struct FakeCluster {
        inner: Arc<Mutex<FakeClusterState>>,
    }

    impl FakeCluster {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register an existing Job without going through the launcher.
        pub fn insert_job(&self, namespace: &str, name: &str, counts: JobCounts) {
            let key = (namespace.to_string(), name.to_string());
            self.inner.lock().jobs.insert(key, (Job::default(), counts));
        }

        pub fn set_counts(&self, namespace: &str, name: &str, counts: JobCounts) {
            let key = (namespace.to_string(), name.to_string());
            if let Some(entry) = self.inner.lock().jobs.get_mut(&key) {
                entry.1 = counts;
            }
        }

        pub fn remove_job(&self, namespace: &str, name: &str) {
            let key = (namespace.to_string(), name.to_string());
            self.inner.lock().jobs.remove(&key);
        }

        pub fn add_pod(
            &self,
            namespace: &str,
            job_name: &str,
            pod_name: &str,
            phase: PodPhase,
            created_at: Option<&str>,
        ) {
            let key = (namespace.to_string(), job_name.to_string());
            self.inner.lock().pods.entry(key).or_default().push(PodSummary {
                name: pod_name.to_string(),
                phase,
                created_at: created_at.map(str::to_string),
            });
        }

        pub fn set_log(&self, pod: &str, container: &str, log: Result<String, ClusterError>) {
            self.inner.lock().logs.insert((pod.to_string(), container.to_string()), log);
        }

        pub fn fail_get_job(&self, error: ClusterError) {
            self.inner.lock().get_job_error = Some(error);
        }

        pub fn fail_list_pods(&self, error: ClusterError) {
            self.inner.lock().list_pods_error = Some(error);
        }

        pub fn fail_create(&self, error: ClusterError) {
            self.inner.lock().create_error = Some(error);
        }

        pub fn clear_failures(&self) {
            let mut state = self.inner.lock();
            state.get_job_error = None;
            state.list_pods_error = None;
            state.create_error = None;
        }

        /// Job specs submitted through `create_job`, keyed by (namespace, name).
        pub fn created_job(&self, namespace: &str, name: &str) -> Option<Job> {
            let key = (namespace.to_string(), name.to_string());
            self.inner.lock().jobs.get(&key).map(|(job, _)| job.clone())
        }

        pub fn calls(&self) -> Vec<ClusterCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl ClusterAdapter for FakeCluster {
        async fn create_job(&self, job: &Job) -> Result<String, ClusterError> {
            let namespace = job.metadata.namespace.clone().unwrap_or_default();
            let name = job.metadata.name.clone().unwrap_or_default();
            let mut state = self.inner.lock();
            state
                .calls
                .push(ClusterCall::CreateJob { namespace: namespace.clone(), name: name.clone() });

            if let Some(err) = state.create_error.clone() {
                return Err(err);
            }
            let key = (namespace, name.clone());
            if state.jobs.contains_key(&key) {
                return Err(ClusterError::AlreadyExists(format!("jobs.batch \"{}\"", name)));
            }
            state.next_uid += 1;
            let uid = format!("uid-{}", state.next_uid);
            state.jobs.insert(key, (job.clone(), JobCounts::default()));
            Ok(uid)
        }

        async fn get_job(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<Option<JobCounts>, ClusterError> {
            let mut state = self.inner.lock();
            state.calls.push(ClusterCall::GetJob {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
            if let Some(err) = state.get_job_error.clone() {
                return Err(err);
            }
            let key = (namespace.to_string(), name.to_string());
            Ok(state.jobs.get(&key).map(|(_, counts)| *counts))
        }

        async fn list_job_pods(
            &self,
            namespace: &str,
            job_name: &str,
        ) -> Result<Vec<PodSummary>, ClusterError> {
            let mut state = self.inner.lock();
            state.calls.push(ClusterCall::ListJobPods {
                namespace: namespace.to_string(),
                job_name: job_name.to_string(),
            });
            if let Some(err) = state.list_pods_error.clone() {
                return Err(err);
            }
            let key = (namespace.to_string(), job_name.to_string());
            Ok(state.pods.get(&key).cloned().unwrap_or_default())
        }

        async fn container_logs(
            &self,
            _namespace: &str,
            pod: &str,
            container: &str,
        ) -> Result<String, ClusterError> {
            let mut state = self.inner.lock();
            state.calls.push(ClusterCall::ContainerLogs {
                pod: pod.to_string(),
                container: container.to_string(),
            });
            let key = (pod.to_string(), container.to_string());
            state.logs.get(&key).cloned().unwrap_or_else(|| {
                Err(ClusterError::ContainerNotStarted(format!(
                    "container \"{}\" in pod \"{}\" is waiting to start: PodInitializing",
                    container, pod
                )))
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ClusterCall, FakeCluster};
