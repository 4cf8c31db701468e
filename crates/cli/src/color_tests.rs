// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn force_color() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
}

fn disable_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn styles_plain_when_no_color() {
    disable_color();
    assert_eq!(
        format!("{:?}", styles()),
        format!("{:?}", clap::builder::styling::Styles::plain())
    );
}

#[test]
#[serial]
fn styles_styled_when_color_forced() {
    force_color();
    assert_ne!(
        format!("{:?}", styles()),
        format!("{:?}", clap::builder::styling::Styles::plain())
    );
}

#[test]
#[serial]
fn no_color_overrides_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::set_var("COLOR", "1");
    assert!(!should_colorize());
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn header_produces_ansi_when_color_forced() {
    force_color();
    let result = header("usher-build-abc");
    assert!(result.starts_with("\x1b[38;5;74m"));
    assert!(result.contains("usher-build-abc"));
    assert!(result.ends_with("\x1b[0m"));
}

#[yare::parameterized(
    succeeded = { JobLifecycleState::Succeeded, codes::GOOD },
    failed    = { JobLifecycleState::Failed,    codes::BAD },
    pending   = { JobLifecycleState::Pending,   codes::BUSY },
    running   = { JobLifecycleState::Running,   codes::BUSY },
    not_found = { JobLifecycleState::NotFound,  codes::MUTED },
)]
#[serial]
fn state_color_by_outcome(s: JobLifecycleState, code: u8) {
    force_color();
    let painted = state(s);
    assert!(painted.starts_with(&format!("\x1b[38;5;{code}m")), "{painted:?}");
    assert!(painted.contains(&s.to_string()));
}

#[test]
#[serial]
fn helpers_plain_when_no_color() {
    disable_color();
    assert_eq!(header("a"), "a");
    assert_eq!(context("b"), "b");
    assert_eq!(muted("c"), "c");
    assert_eq!(state(JobLifecycleState::Running), "running");
}
