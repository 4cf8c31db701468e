// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle state derived from cluster-reported Job and Pod fields.
//!
//! The state is never stored. Every poll recomputes it from a fresh read of
//! the Job's completion counters and the phase of its newest Pod.

use serde::{Deserialize, Serialize};

/// Lifecycle of a build job as seen by a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobLifecycleState {
    /// The cluster has no record of the job (not created yet, or collected)
    NotFound,
    /// No pod has been scheduled or started yet
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobLifecycleState {
    /// Derive the state of an existing job.
    ///
    /// Completion counters on the Job win over the Pod: a job outlives its
    /// failed pod retries, and its pods may already be garbage collected.
    pub fn derive(counts: &JobCounts, newest_pod: Option<PodPhase>) -> Self {
        if counts.succeeded > 0 {
            return Self::Succeeded;
        }
        if counts.failed > 0 {
            return Self::Failed;
        }
        match newest_pod {
            None | Some(PodPhase::Pending) => Self::Pending,
            Some(_) => Self::Running,
        }
    }

    /// Succeeded and Failed are final; polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

crate::simple_display! {
    JobLifecycleState {
        NotFound => "not found",
        Pending => "pending",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
    }
}

/// Pod counters reported in a Job's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub succeeded: i32,
    pub failed: i32,
}

/// Pod phase as reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Map the cluster's phase string; absent or unrecognized values are `Unknown`.
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
