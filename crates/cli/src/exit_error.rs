// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// Process exit codes beyond the generic failure (1).
pub mod codes {
    /// The build job finished in the failed state
    pub const JOB_FAILED: i32 = 2;
    /// No job with the requested name exists
    pub const NOT_FOUND: i32 = 3;
    /// A job with the requested name already exists
    pub const CONFLICT: i32 = 4;
    /// Interrupted by Ctrl-C while watching
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn job_failed(name: &str) -> Self {
        Self::new(codes::JOB_FAILED, format!("job {} failed", name))
    }

    pub fn not_found(name: &str, namespace: &str) -> Self {
        Self::new(codes::NOT_FOUND, format!("job {} not found in namespace {}", name, namespace))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
