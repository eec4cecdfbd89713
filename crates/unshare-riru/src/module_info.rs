//! Static module metadata reported to the host.

use serde::Serialize;
use unshare_common::constants::{MODULE_VERSION, MODULE_VERSION_NAME};

use crate::protocol::ApiVersion;

/// Which hook slots the module fills in.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HookSet {
    /// Called once after the module is loaded.
    pub on_module_loaded: bool,
    /// Pre/post pair around the per-application fork.
    pub fork_and_specialize: bool,
    /// Pre/post pair around the system server fork.
    pub fork_system_server: bool,
    /// Pre/post pair around in-place specialization.
    pub specialize_app_process: bool,
    /// Legacy uid filter queried before any hook.
    pub should_skip_uid: bool,
}

/// Metadata the host reads after the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// The module may be hidden from in-process introspection.
    pub support_hide: bool,
    /// Numeric module version.
    pub version: i32,
    /// Human-readable module version.
    pub version_name: &'static str,
    /// Hooks provided.
    pub hooks: HookSet,
}

impl ModuleInfo {
    /// Builds the metadata reported by the single-call handshake.
    ///
    /// Hosts that load modules this way never query the skip-uid hook.
    #[must_use]
    pub const fn for_version(_api: ApiVersion) -> Self {
        Self {
            support_hide: true,
            version: MODULE_VERSION,
            version_name: MODULE_VERSION_NAME,
            hooks: HookSet {
                on_module_loaded: false,
                fork_and_specialize: true,
                fork_system_server: false,
                specialize_app_process: true,
                should_skip_uid: false,
            },
        }
    }

    /// Builds the metadata reported by the stepwise handshake, which also
    /// offers the skip-uid hook below the unload revision.
    #[must_use]
    pub const fn for_legacy(api: ApiVersion) -> Self {
        let mut info = Self::for_version(api);
        info.hooks.should_skip_uid = api.wants_skip_uid_hook();
        info
    }
}

/// Module metadata tagged with the revision it was negotiated at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedModuleInfo {
    /// Negotiated revision.
    pub api_version: ApiVersion,
    /// Metadata for that revision.
    pub info: ModuleInfo,
}

impl VersionedModuleInfo {
    /// Builds the versioned metadata for a negotiated revision.
    #[must_use]
    pub const fn new(api_version: ApiVersion) -> Self {
        Self {
            api_version,
            info: ModuleInfo::for_version(api_version),
        }
    }

    /// Versioned metadata for the stepwise handshake.
    #[must_use]
    pub const fn legacy(api_version: ApiVersion) -> Self {
        Self {
            api_version,
            info: ModuleInfo::for_legacy(api_version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::negotiate;

    #[test]
    fn current_revision_has_no_skip_uid_hook() {
        let info = VersionedModuleInfo::new(negotiate(26));
        assert!(info.info.support_hide);
        assert!(info.info.hooks.fork_and_specialize);
        assert!(info.info.hooks.specialize_app_process);
        assert!(!info.info.hooks.fork_system_server);
        assert!(!info.info.hooks.should_skip_uid);
    }

    #[test]
    fn legacy_metadata_exposes_skip_uid_hook_below_unload_revision() {
        assert!(ModuleInfo::for_legacy(negotiate(22)).hooks.should_skip_uid);
        assert!(VersionedModuleInfo::legacy(negotiate(24)).info.hooks.should_skip_uid);
        assert!(!ModuleInfo::for_legacy(negotiate(25)).hooks.should_skip_uid);
    }

    #[test]
    fn single_call_metadata_never_offers_skip_uid_hook() {
        for host in [22, 24, 26] {
            assert!(!ModuleInfo::for_version(negotiate(host)).hooks.should_skip_uid);
        }
    }

    #[test]
    fn serializes_revision_as_number() {
        let json = serde_json::to_value(VersionedModuleInfo::new(negotiate(25))).expect("json");
        assert_eq!(json["api_version"], 25);
        assert_eq!(json["info"]["version_name"], MODULE_VERSION_NAME);
    }
}
