//! Build/context suffix appended to every runtime error report.

use std::env;

/// Environment variable that makes kernel launches synchronous.
pub const LAUNCH_BLOCKING_ENV: &str = "CUDA_LAUNCH_BLOCKING";

const ASYNC_HINT: &str = "\nKernel errors might be asynchronously reported at some other API call, \
so the location below might be incorrect.\nFor debugging consider passing CUDA_LAUNCH_BLOCKING=1";

const DSA_HINT: &str =
    "\nBuild with the `device-assertions` feature to enable device-side assertions.\n";

/// Precomputed suffix text. Built once per reporter, never on the hot path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckSuffix {
    text: String,
}

impl CheckSuffix {
    /// Suffix for this build and the current process environment.
    pub fn from_env() -> Self {
        let launch_blocking = env::var(LAUNCH_BLOCKING_ENV)
            .map(|v| v.trim() == "1")
            .unwrap_or(false);
        Self::build(cfg!(feature = "device-assertions"), launch_blocking)
    }

    /// Suffix for an explicit build/environment combination.
    pub fn build(device_assertions_compiled: bool, launch_blocking: bool) -> Self {
        let mut text = String::new();
        if !launch_blocking {
            text.push_str(ASYNC_HINT);
        }
        if !device_assertions_compiled {
            text.push_str(DSA_HINT);
        }
        Self { text }
    }

    /// Use a fixed suffix.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for CheckSuffix {
    fn default() -> Self {
        Self::from_env()
    }
}
