// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.
//!
//! Command-line flags take precedence; these are the fallbacks.

use std::time::Duration;
use uj_core::{DEFAULT_INIT_IMAGE, DEFAULT_VIEWER_BASE, DEFAULT_WORKER_IMAGE};

/// Log filter directive variable (tracing `EnvFilter` syntax).
pub const LOG_ENV: &str = "UJ_LOG";

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn millis(name: &str, default_ms: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(default_ms))
}

/// Kubernetes namespace for build jobs
pub fn namespace() -> String {
    non_empty("UJ_NAMESPACE").unwrap_or_else(|| "default".to_string())
}

/// Image running the build worker
pub fn worker_image() -> String {
    non_empty("UJ_WORKER_IMAGE").unwrap_or_else(|| DEFAULT_WORKER_IMAGE.to_string())
}

/// Image for the config-fetching init stage
pub fn init_image() -> String {
    non_empty("UJ_INIT_IMAGE").unwrap_or_else(|| DEFAULT_INIT_IMAGE.to_string())
}

/// Blob-store endpoint as seen from inside the cluster
pub fn s3_endpoint() -> Option<String> {
    non_empty("UJ_S3_ENDPOINT")
}

pub fn s3_region() -> String {
    non_empty("UJ_S3_REGION").unwrap_or_else(|| "us-east-1".to_string())
}

pub fn s3_bucket() -> Option<String> {
    non_empty("UJ_S3_BUCKET")
}

/// Secret holding `access-key-id` / `secret-access-key`
pub fn s3_secret() -> Option<String> {
    non_empty("UJ_S3_SECRET")
}

pub fn s3_access_key_id() -> Option<String> {
    non_empty("UJ_S3_ACCESS_KEY_ID")
}

pub fn s3_secret_access_key() -> Option<String> {
    non_empty("UJ_S3_SECRET_ACCESS_KEY")
}

/// Public base URL for download links. Falls back to the endpoint, which
/// only works when the endpoint is reachable from outside the cluster.
pub fn public_base_url() -> Option<String> {
    non_empty("UJ_PUBLIC_BASE_URL").or_else(s3_endpoint)
}

/// Tree viewer base URL
pub fn viewer_url() -> String {
    non_empty("UJ_VIEWER_URL").unwrap_or_else(|| DEFAULT_VIEWER_BASE.to_string())
}

/// Delay between polls in watch mode (default 3s)
pub fn poll_interval() -> Duration {
    millis("UJ_POLL_INTERVAL_MS", 3_000)
}

/// Upper bound on a single poll (default 30s)
pub fn poll_timeout() -> Duration {
    millis("UJ_POLL_TIMEOUT_MS", 30_000)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
