//! Uid classification against the Android app id windows.
//!
//! Both predicates are pure and total: every integer is accepted and
//! classified, there is no error path.

use unshare_common::config::ModuleConfig;
use unshare_common::constants::{AID_APP_END, AID_APP_START, AID_USER_OFFSET};
use unshare_common::types::{IdentityCategory, Uid, UidRange};

/// Maps uids to an [`IdentityCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    per_user_offset: u32,
    app_range: UidRange,
    isolated_range: UidRange,
}

impl Classifier {
    /// Builds a classifier from the module configuration.
    #[must_use]
    pub const fn from_config(config: &ModuleConfig) -> Self {
        Self {
            per_user_offset: config.per_user_offset,
            app_range: config.app_range,
            isolated_range: config.isolated_range,
        }
    }

    /// Classifies `uid` after removing the per-user offset.
    #[must_use]
    pub const fn classify(&self, uid: Uid) -> IdentityCategory {
        let app_id = uid.app_id(self.per_user_offset);
        if self.app_range.contains(app_id) {
            IdentityCategory::RegularApplication
        } else if self.isolated_range.contains(app_id) {
            IdentityCategory::IsolatedApplication
        } else {
            IdentityCategory::SystemOrOther
        }
    }

    /// Returns whether `uid` is an ordinary application uid.
    ///
    /// Unlike [`classify`](Self::classify) this always uses the stock
    /// Android layout and ignores isolated uids. It decides whether a
    /// nested spawner runs as an app.
    #[must_use]
    pub const fn is_application_range(&self, uid: Uid) -> bool {
        let app_id = uid.app_id(AID_USER_OFFSET);
        app_id >= AID_APP_START && app_id <= AID_APP_END
    }

    /// Returns whether the host should skip hooking this uid entirely.
    ///
    /// Old host revisions ask this before calling any hook.
    #[must_use]
    pub const fn should_skip_uid(&self, uid: Uid) -> bool {
        !self.classify(uid).is_eligible()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&ModuleConfig::default())
    }
}
