//! Protocol revision negotiation.

use std::fmt;

use serde::Serialize;
use unshare_common::constants::{
    MIN_DIRECT_INFO_API_VERSION, MIN_UNLOAD_API_VERSION, MODULE_API_VERSION,
};

/// A negotiated host protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ApiVersion(i32);

impl ApiVersion {
    /// Returns the numeric revision.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether the host hands out a usable unload-safety cell.
    #[must_use]
    pub const fn supports_unload(self) -> bool {
        self.0 >= MIN_UNLOAD_API_VERSION
    }

    /// Whether the first legacy init step may return the module info itself.
    #[must_use]
    pub const fn supports_direct_info(self) -> bool {
        self.0 >= MIN_DIRECT_INFO_API_VERSION
    }

    /// Whether the host still asks the module which uids to skip.
    #[must_use]
    pub const fn wants_skip_uid_hook(self) -> bool {
        !self.supports_unload()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Picks the lower of the host's maximum and our own maximum revision.
///
/// Never fails: an older host just disables features it cannot carry.
#[must_use]
pub fn negotiate(host_max: i32) -> ApiVersion {
    let version = ApiVersion(host_max.min(MODULE_API_VERSION));
    if version.get() < MODULE_API_VERSION {
        tracing::debug!(host_max, negotiated = %version, "host speaks an older revision");
    }
    version
}
