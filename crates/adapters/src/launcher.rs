// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job launcher: submits one build Job per request.
//!
//! Submission is a single create call with no retry. A name collision is
//! reported as [`SubmitError::AlreadyExists`] so the caller can pick a new
//! name and try again if it wants to.

use crate::cluster::{ClusterAdapter, ClusterError};
use crate::k8s::job::build_job;
use thiserror::Error;
use uj_core::{JobHandle, JobRequest, JobRequestError};

/// Errors from submitting a job
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid job request: {0}")]
    Invalid(#[from] JobRequestError),
    #[error("job {0} already exists")]
    AlreadyExists(String),
    #[error("job submission rejected: {0}")]
    Rejected(ClusterError),
}

/// Submits build Jobs through a cluster adapter.
#[derive(Clone)]
pub struct JobLauncher<C: ClusterAdapter> {
    cluster: C,
}

impl<C: ClusterAdapter> JobLauncher<C> {
    pub fn new(cluster: C) -> Self {
        Self { cluster }
    }

    /// Create the Job for `request` exactly once.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmitError> {
        request.validate()?;
        if request.credentials.is_explicit() {
            tracing::warn!(
                job = %request.name,
                "passing blob-store keys as plain environment variables; use a secret outside development"
            );
        }

        let job = build_job(request);
        tracing::info!(
            job = %request.name,
            namespace = %request.namespace,
            config_key = %request.config_key,
            image = %request.worker_image,
            "creating build job"
        );

        let start = std::time::Instant::now();
        let result = self.cluster.create_job(&job).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(uid) => {
                tracing::info!(job = %request.name, %uid, elapsed_ms, "build job created");
                Ok(JobHandle {
                    name: request.name.clone(),
                    namespace: request.namespace.clone(),
                    uid,
                })
            }
            Err(ClusterError::AlreadyExists(_)) => {
                tracing::warn!(job = %request.name, elapsed_ms, "job name already taken");
                Err(SubmitError::AlreadyExists(request.name.to_string()))
            }
            Err(e) => {
                tracing::error!(job = %request.name, elapsed_ms, error = %e, "job submission failed");
                Err(SubmitError::Rejected(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
