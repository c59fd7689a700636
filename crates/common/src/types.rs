//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gpu_traits::RuntimeStatus;

/// Portable runtime status code. `0` is success, anything else is a failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const SUCCESS: Self = Self(0);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl RuntimeStatus for StatusCode {
    fn is_success(&self) -> bool {
        self.0 == 0
    }

    fn code(&self) -> i32 {
        self.0
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "success")
        } else {
            write!(f, "code {}", self.0)
        }
    }
}

/// GPU device ordinal as reported by the runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceIndex(pub i32);

impl DeviceIndex {
    /// The primary (first) device.
    pub const PRIMARY: Self = Self(0);

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }
}

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cuda:{}", self.0)
    }
}

/// Where a checked runtime call was issued from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: &'static str,
    /// Enclosing function or module path, when the call site provides one.
    pub function: Option<&'static str>,
    pub line: u32,
}

impl SourceLocation {
    pub const fn new(file: &'static str, function: Option<&'static str>, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }

    /// Location of the caller of the `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self {
            file: loc.file(),
            function: None,
            line: loc.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(function) = self.function {
            write!(f, " ({function})")?;
        }
        Ok(())
    }
}

/// Which kind of synchronization a recorded interval wraps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SyncKind {
    /// Stream synchronize.
    Stream = 1,
    /// Whole-device synchronize.
    Device = 2,
    /// Event synchronize.
    Event = 3,
}

impl SyncKind {
    /// Map the raw integer tag used by legacy call sites.
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(Self::Stream),
            2 => Some(Self::Device),
            3 => Some(Self::Event),
            _ => None,
        }
    }

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Device => "device",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind count of recorded synchronization calls in a session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub stream: u64,
    pub device: u64,
    pub event: u64,
}

impl SyncCounts {
    pub fn bump(&mut self, kind: SyncKind) {
        match kind {
            SyncKind::Stream => self.stream += 1,
            SyncKind::Device => self.device += 1,
            SyncKind::Event => self.event += 1,
        }
    }

    pub fn get(&self, kind: SyncKind) -> u64 {
        match kind {
            SyncKind::Stream => self.stream,
            SyncKind::Device => self.device,
            SyncKind::Event => self.event,
        }
    }

    pub fn total(&self) -> u64 {
        self.stream + self.device + self.event
    }
}
