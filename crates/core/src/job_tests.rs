// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    simple          = { "usher-build-abc123" },
    single_char     = { "a" },
    digits_only     = { "123" },
    max_length      = { "a23456789012345678901234567890123456789012345678901234567890123" },
)]
fn job_name_accepts(name: &str) {
    assert_eq!(JobName::parse(name).unwrap().as_str(), name);
}

#[yare::parameterized(
    empty           = { "" },
    uppercase       = { "Usher-Build" },
    underscore      = { "usher_build" },
    leading_dash    = { "-usher" },
    trailing_dash   = { "usher-" },
    dot             = { "usher.build" },
    too_long        = { "a234567890123456789012345678901234567890123456789012345678901234" },
)]
fn job_name_rejects(name: &str) {
    assert!(matches!(JobName::parse(name), Err(JobRequestError::InvalidName { .. })));
}

#[test]
fn generated_job_names_are_valid_and_distinct() {
    let a = JobName::generate();
    let b = JobName::generate();
    assert!(a.as_str().starts_with(JOB_NAME_PREFIX));
    assert_eq!(a.as_str().len(), JOB_NAME_PREFIX.len() + 10);
    assert!(JobName::parse(a.as_str()).is_ok());
    assert_ne!(a, b);
}

#[test]
fn job_name_deserialize_validates() {
    let ok: JobName = serde_json::from_str("\"usher-build-x\"").unwrap();
    assert_eq!(ok.as_str(), "usher-build-x");
    assert!(serde_json::from_str::<JobName>("\"Bad_Name\"").is_err());
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn credentials_secret_mode() {
    let creds = BlobCredentials::from_options(some("s3-creds"), None, None).unwrap();
    assert_eq!(creds, BlobCredentials::Secret { name: "s3-creds".to_string() });
    assert!(!creds.is_explicit());
}

#[test]
fn credentials_explicit_mode() {
    let creds = BlobCredentials::from_options(None, some("AKIA"), some("shh")).unwrap();
    assert_eq!(
        creds,
        BlobCredentials::Explicit {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "shh".to_string()
        }
    );
    assert!(creds.is_explicit());
}

#[yare::parameterized(
    both_modes       = { Some("s"), Some("k"), Some("v"), JobRequestError::ConflictingCredentials },
    secret_and_id    = { Some("s"), Some("k"), None,      JobRequestError::ConflictingCredentials },
    secret_and_key   = { Some("s"), None,      Some("v"), JobRequestError::ConflictingCredentials },
    only_key_id      = { None,      Some("k"), None,      JobRequestError::IncompleteCredentials },
    only_secret_key  = { None,      None,      Some("v"), JobRequestError::IncompleteCredentials },
    nothing          = { None,      None,      None,      JobRequestError::MissingCredentials },
    empty_strings    = { Some(""),  Some(""),  Some(""),  JobRequestError::MissingCredentials },
)]
fn credentials_rejected(
    secret: Option<&str>,
    key_id: Option<&str>,
    key: Option<&str>,
    expected: JobRequestError,
) {
    let result = BlobCredentials::from_options(
        secret.map(str::to_string),
        key_id.map(str::to_string),
        key.map(str::to_string),
    );
    assert_eq!(result.unwrap_err(), expected);
}

#[test]
fn credentials_debug_redacts_secret_key() {
    let creds = BlobCredentials::from_options(None, some("AKIA"), some("top-secret")).unwrap();
    let debug = format!("{:?}", creds);
    assert!(debug.contains("AKIA"));
    assert!(!debug.contains("top-secret"));
}

#[test]
fn request_new_uses_default_images() {
    let req = JobRequest::builder().build();
    let req = JobRequest::new(
        req.name,
        "builds",
        "uploads/x_config.toml",
        req.store,
        req.credentials,
    );
    assert_eq!(req.worker_image, DEFAULT_WORKER_IMAGE);
    assert_eq!(req.init_image, DEFAULT_INIT_IMAGE);
    assert_eq!(req.namespace, "builds");

    let req = req.worker_image("registry/worker:2").init_image("registry/init:1");
    assert_eq!(req.worker_image, "registry/worker:2");
    assert_eq!(req.init_image, "registry/init:1");
}

#[test]
fn request_validate() {
    assert!(JobRequest::builder().build().validate().is_ok());
    assert_eq!(
        JobRequest::builder().config_key("  ").build().validate(),
        Err(JobRequestError::EmptyConfigKey)
    );

    let mut req = JobRequest::builder().build();
    req.store.bucket.clear();
    assert_eq!(req.validate(), Err(JobRequestError::EmptyBucket));
}
