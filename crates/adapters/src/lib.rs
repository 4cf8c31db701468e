// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Cluster-facing side of build jobs: submitting Jobs and resolving their
//! status from the Kubernetes API.

pub mod cluster;
pub mod k8s;
pub mod launcher;
pub mod resolver;

pub use cluster::{ClusterAdapter, ClusterError, PodSummary};
pub use k8s::job::build_job;
pub use k8s::KubeCluster;
pub use launcher::{JobLauncher, SubmitError};
pub use resolver::{newest_pod, JobMonitor, ResolveError, ResolvedJob, StatusResolver};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use cluster::{ClusterCall, FakeCluster};
