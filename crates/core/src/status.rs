// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing status of a build job at one poll instant.

use crate::artifact::DownloadLink;
use crate::lifecycle::JobLifecycleState;
use crate::protocol::UploadSummary;
use serde::{Deserialize, Serialize};

/// The two containers of every build pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerRole {
    /// Init stage: materializes the config from the blob store
    Init,
    /// Main stage: runs the build worker
    Main,
}

impl ContainerRole {
    pub const ALL: [ContainerRole; 2] = [ContainerRole::Init, ContainerRole::Main];

    /// Container name in the pod spec.
    pub fn container_name(&self) -> &'static str {
        match self {
            Self::Init => "fetch-config",
            Self::Main => "build",
        }
    }
}

crate::simple_display! {
    ContainerRole {
        Init => "fetch-config",
        Main => "build",
    }
}

/// Log text of one container, or why there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ContainerLog {
    Text(String),
    /// Expected absence (no pod yet, container still starting)
    Placeholder(String),
    /// Fetch failed for another reason; scoped to this container
    Error(String),
}

impl ContainerLog {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Displayable body regardless of variant.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Placeholder(s) | Self::Error(s) => s,
        }
    }
}

/// Logs of both containers at one poll instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLogs {
    pub init: ContainerLog,
    pub main: ContainerLog,
}

impl ContainerLogs {
    /// Same placeholder for both containers.
    pub fn placeholder(message: &str) -> Self {
        Self {
            init: ContainerLog::Placeholder(message.to_string()),
            main: ContainerLog::Placeholder(message.to_string()),
        }
    }

    pub fn get(&self, role: ContainerRole) -> &ContainerLog {
        match role {
            ContainerRole::Init => &self.init,
            ContainerRole::Main => &self.main,
        }
    }
}

/// Everything a poller learns about a job in one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_name: String,
    pub namespace: String,
    pub state: JobLifecycleState,
    pub pod_name: Option<String>,
    pub logs: ContainerLogs,
    pub uploads: UploadSummary,
    pub files: Vec<DownloadLink>,
}

impl JobStatus {
    /// Polling can stop: the job is terminal and uploads will not progress.
    pub fn is_settled(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
