// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `uj submit` - create a build job

use anyhow::{Context, Result};
use clap::Args;
use uj_adapters::{ClusterAdapter, JobLauncher, KubeCluster, SubmitError};
use uj_core::{BlobCredentials, BlobStore, JobHandle, JobName, JobRequest};

use crate::color;
use crate::commands::status::{self, WatchArgs};
use crate::env;
use crate::exit_error::{codes, ExitError};
use crate::output::OutputFormat;

/// Everything needed to describe one build job.
///
/// Flags override the `UJ_*` environment.
#[derive(Args, Debug, Clone, Default)]
pub struct JobSpecArgs {
    /// Blob-store key of the build config (e.g. uploads/20240101_abc123_config.toml)
    #[arg(long)]
    pub config_key: String,

    /// Job name (generated when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Worker image [env: UJ_WORKER_IMAGE]
    #[arg(long)]
    pub image: Option<String>,

    /// Init-stage image [env: UJ_INIT_IMAGE]
    #[arg(long)]
    pub init_image: Option<String>,

    /// Blob-store endpoint reachable from the cluster [env: UJ_S3_ENDPOINT]
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Blob-store region [env: UJ_S3_REGION]
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket holding configs and results [env: UJ_S3_BUCKET]
    #[arg(long)]
    pub bucket: Option<String>,

    /// Secret with blob-store credentials [env: UJ_S3_SECRET]
    #[arg(long)]
    pub secret: Option<String>,

    /// Literal access key id, development only [env: UJ_S3_ACCESS_KEY_ID]
    #[arg(long)]
    pub access_key_id: Option<String>,

    /// Literal secret access key, development only [env: UJ_S3_SECRET_ACCESS_KEY]
    #[arg(long)]
    pub secret_access_key: Option<String>,
}

impl JobSpecArgs {
    /// Resolve flags and environment into a validated request.
    pub fn into_request(self, namespace: &str) -> Result<JobRequest> {
        let name = match self.name {
            Some(name) => JobName::parse(name)?,
            None => JobName::generate(),
        };
        let store = BlobStore {
            endpoint_url: self
                .endpoint
                .or_else(env::s3_endpoint)
                .context("blob-store endpoint required (--endpoint or UJ_S3_ENDPOINT)")?,
            region: self.region.unwrap_or_else(env::s3_region),
            bucket: self
                .bucket
                .or_else(env::s3_bucket)
                .context("bucket required (--bucket or UJ_S3_BUCKET)")?,
        };

        // Credential flags replace the environment as a group so a flag and
        // an env var never mix into a conflicting pair.
        let credentials = if self.secret.is_some()
            || self.access_key_id.is_some()
            || self.secret_access_key.is_some()
        {
            BlobCredentials::from_options(self.secret, self.access_key_id, self.secret_access_key)
        } else {
            BlobCredentials::from_options(
                env::s3_secret(),
                env::s3_access_key_id(),
                env::s3_secret_access_key(),
            )
        }?;

        let request = JobRequest::new(name, namespace, self.config_key, store, credentials)
            .worker_image(self.image.unwrap_or_else(env::worker_image))
            .init_image(self.init_image.unwrap_or_else(env::init_image));
        request.validate()?;
        Ok(request)
    }
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub spec: JobSpecArgs,

    /// Follow the job until it finishes
    #[arg(short, long)]
    pub watch: bool,

    #[command(flatten)]
    pub follow: WatchArgs,
}

/// Submit through `cluster`, mapping a name collision to its exit code.
pub async fn submit<C: ClusterAdapter>(cluster: C, request: &JobRequest) -> Result<JobHandle> {
    match JobLauncher::new(cluster).submit(request).await {
        Ok(handle) => Ok(handle),
        Err(SubmitError::AlreadyExists(name)) => Err(ExitError::new(
            codes::CONFLICT,
            format!("job {} already exists in namespace {}", name, request.namespace),
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn handle(args: SubmitArgs, namespace: &str, format: OutputFormat) -> Result<()> {
    let request = args.spec.into_request(namespace)?;
    let cluster = KubeCluster::try_default().await.context("could not connect to the cluster")?;

    let handle = submit(cluster.clone(), &request).await?;
    crate::output::format_or_json(format, &handle, || {
        println!(
            "Submitted job {} {}",
            color::header(handle.name.as_str()),
            color::muted(&format!("({})", handle.namespace))
        );
    })?;

    if args.watch {
        status::follow(cluster, &handle.namespace, handle.name.as_str(), &args.follow, format)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
