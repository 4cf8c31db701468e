// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! uj-core: domain types for launching and tracking build jobs.
//!
//! Everything here is pure: the log protocol decoder, lifecycle derivation
//! and download-link construction never touch the network.

pub mod macros;

pub mod artifact;
pub mod job;
pub mod lifecycle;
pub mod protocol;
pub mod status;

pub use artifact::{ArtifactLinker, DownloadLink, DEFAULT_VIEWER_BASE};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobRequestBuilder;
pub use job::{
    BlobCredentials, BlobStore, JobHandle, JobName, JobRequest, JobRequestError,
    DEFAULT_INIT_IMAGE, DEFAULT_WORKER_IMAGE,
};
pub use lifecycle::{JobCounts, JobLifecycleState, PodPhase};
pub use protocol::{decode, is_tree_file, ProtocolGeneration, UploadEvent, UploadSummary};
pub use status::{ContainerLog, ContainerLogs, ContainerRole, JobStatus};
