// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build job request and handle types.
//!
//! A [`JobRequest`] describes one build invocation: which config blob to run,
//! where the job lives in the cluster, and how the job's containers obtain
//! blob-store credentials. The launcher turns it into a cluster Job and hands
//! back a [`JobHandle`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Worker image used when none is configured.
pub const DEFAULT_WORKER_IMAGE: &str = "viral-usher:latest";

/// Image for the init stage that materializes the config blob.
pub const DEFAULT_INIT_IMAGE: &str = "amazon/aws-cli:2.15.0";

/// Prefix for generated job names.
pub const JOB_NAME_PREFIX: &str = "usher-build-";

/// Kubernetes object names are DNS-1123 labels.
const MAX_NAME_LEN: usize = 63;

const NAME_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Errors from building or validating a job request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobRequestError {
    #[error("invalid job name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("config key must not be empty")]
    EmptyConfigKey,
    #[error("bucket must not be empty")]
    EmptyBucket,
    #[error("credentials: secret reference and explicit keys are mutually exclusive")]
    ConflictingCredentials,
    #[error("credentials: explicit mode requires both access key id and secret access key")]
    IncompleteCredentials,
    #[error("credentials: no secret reference or explicit keys provided")]
    MissingCredentials,
}

/// Validated name of a cluster Job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobName(String);

impl JobName {
    /// Parse and validate a caller-chosen job name.
    pub fn parse(name: impl Into<String>) -> Result<Self, JobRequestError> {
        let name = name.into();
        let invalid = |reason| JobRequestError::InvalidName { name: name.clone(), reason };

        if name.is_empty() {
            return Err(invalid("empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("longer than 63 characters"));
        }
        if !name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
            return Err(invalid("only lowercase letters, digits and '-' are allowed"));
        }
        if name.starts_with('-') || name.ends_with('-') {
            return Err(invalid("must start and end with a letter or digit"));
        }
        Ok(Self(name))
    }

    /// Generate a fresh, collision-unlikely job name.
    pub fn generate() -> Self {
        Self(format!("{}{}", JOB_NAME_PREFIX, nanoid::nanoid!(10, &NAME_ALPHABET)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobName {
    type Err = JobRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobName {
    type Error = JobRequestError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<JobName> for String {
    fn from(name: JobName) -> Self {
        name.0
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Blob-store location shared by the job's containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobStore {
    /// S3-compatible endpoint (e.g. "http://minio.storage:9000")
    pub endpoint_url: String,
    pub region: String,
    pub bucket: String,
}

/// How the job's containers obtain blob-store credentials.
///
/// Exactly one mode is active; the enum makes the mutual exclusion structural.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BlobCredentials {
    /// Cluster Secret holding `access-key-id` and `secret-access-key`.
    Secret { name: String },
    /// Literal keys passed as plain environment variables (development only).
    Explicit { access_key_id: String, secret_access_key: String },
}

impl BlobCredentials {
    /// Pick the credential mode from optional caller inputs.
    ///
    /// Rejects both modes set at once, a half-specified explicit pair, and
    /// no credentials at all.
    pub fn from_options(
        secret: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    ) -> Result<Self, JobRequestError> {
        let secret = secret.filter(|s| !s.is_empty());
        let access_key_id = access_key_id.filter(|s| !s.is_empty());
        let secret_access_key = secret_access_key.filter(|s| !s.is_empty());

        match (secret, access_key_id, secret_access_key) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(JobRequestError::ConflictingCredentials)
            }
            (Some(name), None, None) => Ok(Self::Secret { name }),
            (None, Some(access_key_id), Some(secret_access_key)) => {
                Ok(Self::Explicit { access_key_id, secret_access_key })
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                Err(JobRequestError::IncompleteCredentials)
            }
            (None, None, None) => Err(JobRequestError::MissingCredentials),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit { .. })
    }
}

// Keys never reach logs through Debug.
impl fmt::Debug for BlobCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret { name } => f.debug_struct("Secret").field("name", name).finish(),
            Self::Explicit { access_key_id, .. } => f
                .debug_struct("Explicit")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
        }
    }
}

/// One build invocation to submit to the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub name: JobName,
    pub namespace: String,
    /// Blob-store key of the build config (e.g. "uploads/20231006_abc123_config.toml")
    pub config_key: String,
    pub worker_image: String,
    pub init_image: String,
    pub store: BlobStore,
    pub credentials: BlobCredentials,
}

impl JobRequest {
    pub fn new(
        name: JobName,
        namespace: impl Into<String>,
        config_key: impl Into<String>,
        store: BlobStore,
        credentials: BlobCredentials,
    ) -> Self {
        Self {
            name,
            namespace: namespace.into(),
            config_key: config_key.into(),
            worker_image: DEFAULT_WORKER_IMAGE.to_string(),
            init_image: DEFAULT_INIT_IMAGE.to_string(),
            store,
            credentials,
        }
    }

    crate::setters! {
        into {
            worker_image: String,
            init_image: String,
        }
    }

    /// Check the fields the type system cannot.
    pub fn validate(&self) -> Result<(), JobRequestError> {
        if self.config_key.trim().is_empty() {
            return Err(JobRequestError::EmptyConfigKey);
        }
        if self.store.bucket.trim().is_empty() {
            return Err(JobRequestError::EmptyBucket);
        }
        Ok(())
    }
}

crate::builder! {
    pub struct JobRequestBuilder => JobRequest {
        into {
            namespace: String = "default",
            config_key: String = "uploads/20240101_abc123_config.toml",
            worker_image: String = DEFAULT_WORKER_IMAGE,
            init_image: String = DEFAULT_INIT_IMAGE,
        }
        set {
            name: JobName = JobName(String::from("usher-build-test")),
            store: BlobStore = BlobStore {
                endpoint_url: "http://minio:9000".to_string(),
                region: "us-east-1".to_string(),
                bucket: "usher".to_string(),
            },
            credentials: BlobCredentials = BlobCredentials::Secret { name: "s3-credentials".to_string() },
        }
    }
}

/// Cluster identity of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub name: JobName,
    pub namespace: String,
    /// Server-assigned UID (empty if the server omitted it)
    pub uid: String,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
