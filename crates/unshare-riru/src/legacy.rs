//! Stepwise handshake for old hosts.
//!
//! Old hosts call the init entry point repeatedly with the same parameters
//! and interpret each answer by call count. Step 1 negotiates; depending on
//! the revision it returns the versioned metadata or just the revision.
//! Step 2 returns the bare metadata. Every later step returns nothing.

use unshare_common::error::{Result, UnshareError};

use crate::host::HostInfo;
use crate::module_info::{ModuleInfo, VersionedModuleInfo};
use crate::protocol::ApiVersion;
use crate::runtime::ModuleRuntime;

/// Answer to one legacy init call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyStep {
    /// Step 1 on a host at or above the direct-info revision.
    VersionedInfo(VersionedModuleInfo),
    /// Step 1 on an older host: only the negotiated revision.
    ApiVersionOnly(ApiVersion),
    /// Step 2: the bare metadata.
    ModuleInfo(ModuleInfo),
    /// Step 3 and later.
    Done,
}

/// Call-count driven init state.
#[derive(Debug, Default)]
pub struct LegacyInit {
    step: u32,
    api_version: Option<ApiVersion>,
    runtime: Option<ModuleRuntime>,
}

impl LegacyInit {
    /// Creates the state before the first call.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: 0,
            api_version: None,
            runtime: None,
        }
    }

    /// Handles the next init call.
    ///
    /// The host parameters are consumed by step 1 and ignored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`UnshareError::Protocol`] if step 1 arrives without host
    /// parameters.
    pub fn step(&mut self, host: Option<HostInfo>) -> Result<LegacyStep> {
        self.step = self.step.saturating_add(1);
        match self.step {
            1 => {
                let host = host.ok_or_else(|| UnshareError::Protocol {
                    message: "first init call carried no host parameters".into(),
                })?;
                let runtime = ModuleRuntime::load(host);
                let api_version = runtime.api_version();
                self.api_version = Some(api_version);
                self.runtime = Some(runtime);
                tracing::debug!(%api_version, "legacy init step 1");
                if api_version.supports_direct_info() {
                    Ok(LegacyStep::VersionedInfo(VersionedModuleInfo::legacy(api_version)))
                } else {
                    Ok(LegacyStep::ApiVersionOnly(api_version))
                }
            }
            2 => {
                let api_version = self.api_version.ok_or_else(|| UnshareError::Protocol {
                    message: "legacy init step 2 before a successful step 1".into(),
                })?;
                Ok(LegacyStep::ModuleInfo(ModuleInfo::for_legacy(api_version)))
            }
            _ => Ok(LegacyStep::Done),
        }
    }

    /// Hands over the runtime created by step 1, if not taken yet.
    pub fn take_runtime(&mut self) -> Option<ModuleRuntime> {
        self.runtime.take()
    }
}

#[cfg(test)]
mod tests {
    use unshare_core::RenameCapability;

    use super::*;

    fn host(api: i32) -> HostInfo {
        HostInfo::new(api, "/nonexistent/unshare").with_rename(RenameCapability::Absent)
    }

    #[test]
    fn modern_legacy_host_gets_info_at_step_one() {
        let mut init = LegacyInit::new();
        let step = init.step(Some(host(24))).expect("step 1");
        assert!(matches!(
            step,
            LegacyStep::VersionedInfo(ref info)
                if info.api_version.get() == 24 && info.info.hooks.should_skip_uid
        ));
        assert!(matches!(init.step(None), Ok(LegacyStep::ModuleInfo(_))));
        assert_eq!(init.step(None).expect("step 3"), LegacyStep::Done);
        assert_eq!(init.step(None).expect("step 4"), LegacyStep::Done);
        assert!(init.take_runtime().is_some());
        assert!(init.take_runtime().is_none());
    }

    #[test]
    fn old_host_gets_only_revision_at_step_one() {
        let mut init = LegacyInit::new();
        let step = init.step(Some(host(22))).expect("step 1");
        assert!(matches!(step, LegacyStep::ApiVersionOnly(v) if v.get() == 22));
        let step = init.step(None).expect("step 2");
        assert!(matches!(step, LegacyStep::ModuleInfo(info) if info.hooks.should_skip_uid));
    }

    #[test]
    fn step_one_without_host_is_a_protocol_error() {
        let mut init = LegacyInit::new();
        assert!(matches!(init.step(None), Err(UnshareError::Protocol { .. })));
        assert!(matches!(init.step(None), Err(UnshareError::Protocol { .. })));
        assert_eq!(init.step(None).expect("step 3"), LegacyStep::Done);
    }
}
