// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes cluster adapter built on `kube-rs`.
//!
//! # Module layout
//!
//! - [`job`]: Job spec construction
//!
//! Pods created by a Job carry the `job-name=<job>` label set by the Job
//! controller; that label is how a Job's pods are found.

pub mod job;

pub use adapter::KubeCluster;

mod adapter {
    use crate::cluster::{ClusterAdapter, ClusterError, PodSummary};
    use async_trait::async_trait;
    use k8s_openapi::api::batch::v1::Job;
    use k8s_openapi::api::core::v1::Pod;
    use kube::api::{Api, ListParams, LogParams, PostParams};
    use kube::Client;
    use uj_core::{JobCounts, PodPhase};

    /// Cluster adapter talking to the Kubernetes API server.
    ///
    /// The client is constructed once at process start and cloned into
    /// each component; clones share the underlying connection pool.
    #[derive(Clone)]
    pub struct KubeCluster {
        client: Client,
    }

    impl KubeCluster {
        /// Connect using the ambient kubeconfig or in-cluster service account.
        pub async fn try_default() -> Result<Self, ClusterError> {
            let client = Client::try_default().await.map_err(|e| {
                ClusterError::Transport(format!("failed to create kube client: {}", e))
            })?;
            Ok(Self { client })
        }

        pub fn new(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl ClusterAdapter for KubeCluster {
        async fn create_job(&self, job: &Job) -> Result<String, ClusterError> {
            let namespace = job.metadata.namespace.as_deref().unwrap_or("default");
            let jobs: Api<Job> = Api::namespaced(self.client.clone(), namespace);
            let created = jobs.create(&PostParams::default(), job).await.map_err(map_error)?;
            Ok(created.metadata.uid.unwrap_or_default())
        }

        async fn get_job(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<Option<JobCounts>, ClusterError> {
            let jobs: Api<Job> = Api::namespaced(self.client.clone(), namespace);
            let job = jobs.get_opt(name).await.map_err(map_error)?;
            Ok(job.map(|job| {
                let status = job.status.unwrap_or_default();
                JobCounts {
                    succeeded: status.succeeded.unwrap_or(0),
                    failed: status.failed.unwrap_or(0),
                }
            }))
        }

        async fn list_job_pods(
            &self,
            namespace: &str,
            job_name: &str,
        ) -> Result<Vec<PodSummary>, ClusterError> {
            let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
            let lp = ListParams::default().labels(&format!("job-name={}", job_name));
            let list = pods.list(&lp).await.map_err(map_error)?;

            let mut summaries = Vec::with_capacity(list.items.len());
            for pod in list.items {
                let Some(name) = pod.metadata.name else {
                    tracing::warn!(%job_name, "skipping pod without a name");
                    continue;
                };
                let created_at = pod
                    .metadata
                    .creation_timestamp
                    .and_then(|t| serde_json::to_value(t).ok())
                    .and_then(|v| v.as_str().map(str::to_string));
                let phase = PodPhase::parse(pod.status.as_ref().and_then(|s| s.phase.as_deref()));
                summaries.push(PodSummary { name, phase, created_at });
            }
            Ok(summaries)
        }

        async fn container_logs(
            &self,
            namespace: &str,
            pod: &str,
            container: &str,
        ) -> Result<String, ClusterError> {
            let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
            let lp = LogParams { container: Some(container.to_string()), ..Default::default() };
            pods.logs(pod, &lp).await.map_err(map_error)
        }
    }

    /// Classify a kube error by API status code and message.
    ///
    /// A log request for a container that has not started yet is rejected
    /// with 400 and a "waiting to start" / "PodInitializing" message.
    pub(super) fn map_error(err: kube::Error) -> ClusterError {
        match err {
            kube::Error::Api(resp) => classify_api_error(resp.code, resp.message),
            other => ClusterError::Transport(other.to_string()),
        }
    }

    pub(super) fn classify_api_error(code: u16, message: String) -> ClusterError {
        match code {
            404 => ClusterError::NotFound(message),
            409 => ClusterError::AlreadyExists(message),
            400 if message.contains("waiting to start") || message.contains("PodInitializing") => {
                ClusterError::ContainerNotStarted(message)
            }
            _ => ClusterError::Api { code, message },
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
