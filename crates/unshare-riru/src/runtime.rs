//! A loaded module: negotiated revision, configuration, and the interceptor.

use std::path::{Path, PathBuf};

use unshare_common::config::ModuleConfig;
use unshare_common::types::{ForkOutcome, Uid};
use unshare_core::{Classifier, Interceptor, PostSpecializeReport, SpecializationRequest};

use crate::host::HostInfo;
use crate::module_info::VersionedModuleInfo;
use crate::protocol::{self, ApiVersion};

/// Everything the hooks need after a successful handshake.
#[derive(Debug)]
pub struct ModuleRuntime {
    api_version: ApiVersion,
    module_path: PathBuf,
    config: ModuleConfig,
    interceptor: Interceptor,
}

impl ModuleRuntime {
    /// Performs the single-call handshake against `host`.
    ///
    /// Configuration is read from the module directory; a broken config is
    /// logged and replaced by the defaults rather than failing the load.
    #[must_use]
    pub fn load(host: HostInfo) -> Self {
        let config = ModuleConfig::load(&host.module_path).unwrap_or_else(|e| {
            tracing::warn!(
                path = %host.module_path.display(),
                error = %e,
                "ignoring module config"
            );
            ModuleConfig::default()
        });
        Self::with_config(host, config)
    }

    /// Performs the handshake with an explicit configuration.
    #[must_use]
    pub fn with_config(host: HostInfo, config: ModuleConfig) -> Self {
        crate::logging::init(&config.log_filter);

        let api_version = protocol::negotiate(host.api_version);
        let mut interceptor = Interceptor::new(Classifier::from_config(&config), host.rename);
        match host.unload_cell {
            Some(cell) if api_version.supports_unload() => {
                interceptor = interceptor.with_unload_cell(cell);
            }
            Some(_) => {
                tracing::debug!(%api_version, "unload cell unusable at this revision");
            }
            None => {}
        }

        tracing::info!(
            %api_version,
            module_path = %host.module_path.display(),
            can_rename = interceptor.can_rename(),
            "module loaded"
        );
        Self {
            api_version,
            module_path: host.module_path,
            config,
            interceptor,
        }
    }

    /// Negotiated protocol revision.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Directory the module was loaded from.
    #[must_use]
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Hook state, for inspection.
    #[must_use]
    pub const fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Metadata to report to the host.
    #[must_use]
    pub const fn module_info(&self) -> VersionedModuleInfo {
        VersionedModuleInfo::new(self.api_version)
    }

    /// Pre-hook of the per-application fork.
    pub fn fork_and_specialize_pre(
        &mut self,
        uid: i32,
        mount_external: &mut i32,
        nice_name: Option<&str>,
        is_child_zygote: bool,
    ) -> bool {
        let mut request = SpecializationRequest::new(Uid::from_raw(uid), mount_external, nice_name)
            .child_spawner(is_child_zygote);
        self.interceptor.fork_and_specialize_pre(&mut request)
    }

    /// Post-hook of the per-application fork; `res` is the raw fork result.
    pub fn fork_and_specialize_post(&mut self, res: i32) -> PostSpecializeReport {
        self.interceptor.fork_and_specialize_post(ForkOutcome::from_raw(res))
    }

    /// Pre-hook of in-place specialization.
    ///
    /// `start_child_zygote` is accepted for signature parity and ignored:
    /// this path never defers a rename.
    pub fn specialize_app_process_pre(
        &mut self,
        uid: i32,
        mount_external: &mut i32,
        nice_name: Option<&str>,
        start_child_zygote: bool,
    ) -> bool {
        let mut request = SpecializationRequest::new(Uid::from_raw(uid), mount_external, nice_name)
            .child_spawner(start_child_zygote);
        self.interceptor.specialize_app_process_pre(&mut request)
    }

    /// Post-hook of in-place specialization.
    pub fn specialize_app_process_post(&mut self) -> PostSpecializeReport {
        self.interceptor.specialize_app_process_post()
    }

    /// Legacy uid filter for hosts below the unload revision.
    #[must_use]
    pub const fn should_skip_uid(&self, uid: i32) -> bool {
        self.interceptor.classifier().should_skip_uid(Uid::from_raw(uid))
    }
}
