//! Detect whether the process is running under a test harness.
//!
//! Two questions are answered, each computed once per process:
//!
//! - [`running_as_bazel_test`]: launched by `bazel test`
//! - [`running_as_test`]: launched by any test harness (`bazel test`,
//!   `cargo test`, `cargo nextest`)

use std::env;
use std::path::Path;
use std::sync::OnceLock;

/// Explicit marker set by Bazel for test actions (not set on Windows).
pub const BAZEL_TEST_ENV: &str = "BAZEL_TEST";

/// Variables Bazel always sets for test actions. All must be non-empty.
pub const BAZEL_TEST_ENVS: [&str; 3] = ["TEST_TARGET", "TEST_WORKSPACE", "TEST_TMPDIR"];

/// Marker set by cargo-nextest for every test process.
pub const NEXTEST_ENV: &str = "NEXTEST";

static BAZEL_TEST: OnceLock<bool> = OnceLock::new();
static ANY_TEST: OnceLock<bool> = OnceLock::new();

/// Check whether this process runs as a test, under any harness.
pub fn running_as_test() -> bool {
    *ANY_TEST.get_or_init(|| {
        let detected = running_as_bazel_test() || detect_rust_harness(env_lookup);
        tracing::debug!(detected, "test harness detection");
        detected
    })
}

/// Check whether this process was launched by `bazel test`.
pub fn running_as_bazel_test() -> bool {
    *BAZEL_TEST.get_or_init(|| {
        let detected = detect_bazel(env_lookup);
        tracing::debug!(detected, "bazel test detection");
        detected
    })
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Bazel detection over an arbitrary environment.
///
/// `BAZEL_TEST=1` short-circuits. Otherwise every variable in
/// [`BAZEL_TEST_ENVS`] must be present and non-empty.
pub(crate) fn detect_bazel(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if lookup(BAZEL_TEST_ENV).as_deref() == Some("1") {
        return true;
    }

    BAZEL_TEST_ENVS
        .iter()
        .all(|name| lookup(name).is_some_and(|value| !value.is_empty()))
}

/// libtest exposes no runtime flag, so look for its fingerprints instead.
pub(crate) fn detect_rust_harness(lookup: impl Fn(&str) -> Option<String>) -> bool {
    if cfg!(test) {
        return true;
    }

    if lookup(NEXTEST_ENV).as_deref() == Some("1") {
        return true;
    }

    env::current_exe()
        .ok()
        .is_some_and(|exe| is_cargo_test_binary(&exe))
}

/// Cargo places unit and integration test binaries in `target/<profile>/deps/`.
fn is_cargo_test_binary(exe: &Path) -> bool {
    exe.parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == "deps")
}
