// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job spec construction for build jobs.
//!
//! ```text
//! Job (backoffLimit=3)
//!  └── Pod (restartPolicy=Never)
//!       ├── init  fetch-config   s3 → /data/config.toml (+ extra input), rewrite paths
//!       ├── main  build          viral_usher_build_wrapper.py --config /data/config.toml
//!       └── volume workdir (emptyDir) at /data
//! ```

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Container, EmptyDirVolumeSource, EnvVar, EnvVarSource, PodSpec, PodTemplateSpec,
    SecretKeySelector, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use uj_core::{BlobCredentials, ContainerRole, JobRequest};

/// Retries before the Job is marked failed.
pub const BACKOFF_LIMIT: i32 = 3;

/// Label set on every Job and pod template we create.
pub const APP_LABEL: (&str, &str) = ("app", "usher-build");
pub const JOB_LABEL: &str = "usher.dev/job";

const VOLUME_NAME: &str = "workdir";
const DATA_DIR: &str = "/data";
const CONFIG_PATH: &str = "/data/config.toml";
const OUTPUT_DIR: &str = "/data/workdir";
const EXTRA_INPUT_PATH: &str = "/data/extra.fasta";
/// Config field that may reference a second blob by key.
const EXTRA_INPUT_FIELD: &str = "extra_fasta";
const WORKER_ENTRYPOINT: &str = "viral_usher_build_wrapper.py";

/// Keys expected in a credentials Secret.
pub const SECRET_ACCESS_KEY_ID: &str = "access-key-id";
pub const SECRET_SECRET_ACCESS_KEY: &str = "secret-access-key";

/// Build the Job submitted for one request.
pub fn build_job(request: &JobRequest) -> Job {
    let name = request.name.to_string();
    let labels: BTreeMap<String, String> = [
        (APP_LABEL.0.to_string(), APP_LABEL.1.to_string()),
        (JOB_LABEL.to_string(), name.clone()),
    ]
    .into_iter()
    .collect();

    let env = blob_env(request);
    let mounts = vec![VolumeMount {
        name: VOLUME_NAME.to_string(),
        mount_path: DATA_DIR.to_string(),
        ..Default::default()
    }];

    let init = Container {
        name: ContainerRole::Init.container_name().to_string(),
        image: Some(request.init_image.clone()),
        command: Some(vec!["/bin/sh".to_string(), "-c".to_string(), fetch_config_script()]),
        env: Some(env.clone()),
        volume_mounts: Some(mounts.clone()),
        ..Default::default()
    };

    let main = Container {
        name: ContainerRole::Main.container_name().to_string(),
        image: Some(request.worker_image.clone()),
        command: Some(vec![WORKER_ENTRYPOINT.to_string()]),
        args: Some(vec!["--config".to_string(), CONFIG_PATH.to_string()]),
        working_dir: Some(OUTPUT_DIR.to_string()),
        env: Some(env),
        volume_mounts: Some(mounts),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(request.namespace.clone()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(BACKOFF_LIMIT),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels), ..Default::default() }),
                spec: Some(PodSpec {
                    init_containers: Some(vec![init]),
                    containers: vec![main],
                    volumes: Some(vec![Volume {
                        name: VOLUME_NAME.to_string(),
                        empty_dir: Some(EmptyDirVolumeSource::default()),
                        ..Default::default()
                    }]),
                    restart_policy: Some("Never".to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Blob-store environment shared by both containers.
///
/// The init stage uses the AWS CLI names, the worker wrapper the `S3_*` names.
fn blob_env(request: &JobRequest) -> Vec<EnvVar> {
    let store = &request.store;
    let mut env = vec![
        env_var("S3_ENDPOINT_URL", &store.endpoint_url),
        env_var("S3_REGION", &store.region),
        env_var("AWS_DEFAULT_REGION", &store.region),
        env_var("S3_BUCKET", &store.bucket),
        env_var("CONFIG_S3_KEY", &request.config_key),
    ];

    match &request.credentials {
        BlobCredentials::Secret { name } => {
            for var in ["S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"] {
                env.push(secret_env_var(var, name, SECRET_ACCESS_KEY_ID));
            }
            for var in ["S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY"] {
                env.push(secret_env_var(var, name, SECRET_SECRET_ACCESS_KEY));
            }
        }
        BlobCredentials::Explicit { access_key_id, secret_access_key } => {
            for var in ["S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"] {
                env.push(env_var(var, access_key_id));
            }
            for var in ["S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY"] {
                env.push(env_var(var, secret_access_key));
            }
        }
    }
    env
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar { name: name.to_string(), value: Some(value.to_string()), ..Default::default() }
}

fn secret_env_var(name: &str, secret: &str, key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret.to_string(),
                key: key.to_string(),
                optional: Some(false),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Shell script for the init container.
///
/// Downloads the config, then the extra input if the config names it by
/// blob key (anything not an absolute path), and rewrites the local config
/// so the worker only ever sees local paths.
pub(crate) fn fetch_config_script() -> String {
    format!(
        r#"set -eu
aws s3 cp "s3://${{S3_BUCKET}}/${{CONFIG_S3_KEY}}" {config} --endpoint-url "${{S3_ENDPOINT_URL}}"
extra=$(sed -n 's/^{field} *= *"\([^"]*\)".*/\1/p' {config} | head -n 1)
case "$extra" in
  ""|/*) ;;
  *)
    aws s3 cp "s3://${{S3_BUCKET}}/$extra" {extra_path} --endpoint-url "${{S3_ENDPOINT_URL}}"
    sed -i 's|^{field} *=.*|{field} = "{extra_path}"|' {config}
    ;;
esac
sed -i 's|^workdir *=.*|workdir = "{output}"|' {config}
mkdir -p {output}
echo "config ready at {config}"
"#,
        config = CONFIG_PATH,
        field = EXTRA_INPUT_FIELD,
        extra_path = EXTRA_INPUT_PATH,
        output = OUTPUT_DIR,
    )
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
