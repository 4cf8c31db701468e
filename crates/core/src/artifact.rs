// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public download links for uploaded artifacts.

use crate::protocol::{UploadEvent, UploadSummary};
use serde::{Deserialize, Serialize};

/// Tree viewer that accepts a `protoUrl` query parameter.
pub const DEFAULT_VIEWER_BASE: &str = "https://taxonium.org/";

/// Downloadable artifact, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub filename: String,
    pub storage_key: String,
    pub url: String,
    pub is_tree: bool,
    /// "Open in viewer" link, only for the tree artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_url: Option<String>,
}

/// Builds download links from a public blob-store base URL. Pure; no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLinker {
    public_base: String,
    viewer_base: String,
}

impl ArtifactLinker {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self { public_base: public_base.into(), viewer_base: DEFAULT_VIEWER_BASE.to_string() }
    }

    crate::setters! {
        into {
            viewer_base: String,
        }
    }

    /// `{base}/{bucket}/{key}` with each key segment percent-encoded once.
    pub fn url(&self, bucket: &str, storage_key: &str) -> String {
        let key = storage_key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            urlencoding::encode(bucket),
            key
        )
    }

    /// Viewer link that loads the artifact at `url`.
    pub fn viewer_url(&self, url: &str) -> String {
        format!("{}?protoUrl={}&xType=x_dist", self.viewer_base, urlencoding::encode(url))
    }

    pub fn link(&self, event: &UploadEvent) -> DownloadLink {
        let url = self.url(&event.bucket, &event.storage_key);
        let viewer_url = event.is_tree.then(|| self.viewer_url(&url));
        DownloadLink {
            filename: event.filename.clone(),
            storage_key: event.storage_key.clone(),
            url,
            is_tree: event.is_tree,
            viewer_url,
        }
    }

    /// Links for every event, in arrival order.
    pub fn links(&self, summary: &UploadSummary) -> Vec<DownloadLink> {
        summary.events.iter().map(|e| self.link(e)).collect()
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
