// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `uj manifest` - print the Job that `submit` would create

use anyhow::Result;
use uj_adapters::build_job;

use crate::commands::submit::JobSpecArgs;

/// Render the Job object as pretty JSON without contacting the cluster.
pub fn render(spec: JobSpecArgs, namespace: &str) -> Result<String> {
    let request = spec.into_request(namespace)?;
    Ok(serde_json::to_string_pretty(&build_job(&request))?)
}

pub fn handle(spec: JobSpecArgs, namespace: &str) -> Result<()> {
    println!("{}", render(spec, namespace)?);
    Ok(())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
