//! Domain primitive types used across the unshare workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric Linux/Android user identity a specialized child runs as.
///
/// The raw value is what the host passes in; it encodes both the Android
/// user and the app id (`uid = user * AID_USER_OFFSET + app_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Uid(u32);

impl Uid {
    /// Wraps a raw uid.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Converts the signed integer the host hands out.
    ///
    /// Negative values never name a real identity; they are reinterpreted
    /// bit-for-bit, which lands them far outside every app window.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw as u32)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the app id, i.e. the uid with the per-user offset removed.
    ///
    /// A zero offset is treated as "no multi-user layout" and returns the
    /// raw uid unchanged.
    #[must_use]
    pub const fn app_id(self, per_user_offset: u32) -> u32 {
        if per_user_offset == 0 {
            self.0
        } else {
            self.0 % per_user_offset
        }
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Uid {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Inclusive numeric window of app ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UidRange {
    /// First app id in the window.
    pub start: u32,
    /// Last app id in the window (inclusive).
    pub end: u32,
}

impl UidRange {
    /// Creates an inclusive window.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns whether `app_id` lies inside the window.
    #[must_use]
    pub const fn contains(&self, app_id: u32) -> bool {
        app_id >= self.start && app_id <= self.end
    }
}

impl fmt::Display for UidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Classification of a uid against the app and isolated windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityCategory {
    /// An ordinary installed application.
    RegularApplication,
    /// A sandboxed isolated process.
    IsolatedApplication,
    /// System services, shells, and anything else outside both windows.
    SystemOrOther,
}

impl IdentityCategory {
    /// Returns whether the identity is eligible for mount namespace isolation.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        !matches!(self, Self::SystemOrOther)
    }
}

impl fmt::Display for IdentityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegularApplication => write!(f, "regular-application"),
            Self::IsolatedApplication => write!(f, "isolated-application"),
            Self::SystemOrOther => write!(f, "system-or-other"),
        }
    }
}

/// What the host's fork returned, as seen by the post-hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ForkOutcome {
    /// We are now running as the freshly specialized process.
    Child,
    /// We are still the template process; `pid` is the new child.
    Parent {
        /// Process id of the forked child.
        pid: i32,
    },
    /// The fork did not happen.
    Failed {
        /// Negative status reported by the host.
        code: i32,
    },
}

impl ForkOutcome {
    /// Interprets the raw fork result the host passes to the post-hook.
    #[must_use]
    pub const fn from_raw(res: i32) -> Self {
        match res {
            0 => Self::Child,
            pid if pid > 0 => Self::Parent { pid },
            code => Self::Failed { code },
        }
    }

    /// Returns whether this process is the newly specialized child.
    #[must_use]
    pub const fn is_child(self) -> bool {
        matches!(self, Self::Child)
    }
}

impl fmt::Display for ForkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child => write!(f, "child"),
            Self::Parent { pid } => write!(f, "parent (child pid {pid})"),
            Self::Failed { code } => write!(f, "failed ({code})"),
        }
    }
}
