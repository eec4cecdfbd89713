//! Pending-action state bridging the pre-fork hook to the post-fork hook.
//!
//! The host gives the hooks no per-request object to hang state on, so the
//! decision made before the fork lives in a single slot. At most one action
//! is in flight: the pre-hook arms the slot, the matching post-hook takes it,
//! and taking always leaves the slot at its defaults.
//!
//! The display name is copied into owned storage when armed; nothing here
//! relies on the host's buffer outliving the fork.

/// Work deferred until after the fork completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAction {
    is_app_acting_spawner: bool,
    deferred_display_name: Option<String>,
}

impl PendingAction {
    /// Creates an action for the current specialization.
    ///
    /// The display name is only kept when the specialization is a nested
    /// spawner running as an application, since nothing else gets renamed.
    #[must_use]
    pub fn new(is_app_acting_spawner: bool, display_name: Option<&str>) -> Self {
        Self {
            is_app_acting_spawner,
            deferred_display_name: display_name
                .filter(|_| is_app_acting_spawner)
                .map(str::to_owned),
        }
    }

    /// Whether the specialization is a nested spawner running as an app.
    #[must_use]
    pub const fn is_app_acting_spawner(&self) -> bool {
        self.is_app_acting_spawner
    }

    /// The name to apply once the fork completes, if any.
    #[must_use]
    pub fn deferred_display_name(&self) -> Option<&str> {
        self.deferred_display_name.as_deref()
    }

    /// Returns whether the action is at its defaults.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.is_app_acting_spawner && self.deferred_display_name.is_none()
    }

    /// Returns the name to rename to, if a rename is owed.
    #[must_use]
    pub fn rename_target(&self) -> Option<&str> {
        if self.is_app_acting_spawner {
            self.deferred_display_name()
        } else {
            None
        }
    }
}

/// The process-wide slot holding at most one [`PendingAction`].
#[derive(Debug, Default)]
pub struct PendingSlot {
    current: Option<PendingAction>,
}

impl PendingSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Stores `action`, returning any action that was still in flight.
    ///
    /// A displaced action means the host ran two pre-hooks without a post-hook
    /// in between; callers log it.
    pub fn arm(&mut self, action: PendingAction) -> Option<PendingAction> {
        self.current.replace(action)
    }

    /// Removes and returns the in-flight action, leaving the slot empty.
    ///
    /// An empty slot yields the default (empty) action.
    pub fn take(&mut self) -> PendingAction {
        self.current.take().unwrap_or_default()
    }

    /// Returns the in-flight action without consuming it.
    #[must_use]
    pub const fn peek(&self) -> Option<&PendingAction> {
        self.current.as_ref()
    }

    /// Returns whether an action is in flight.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.current.is_some()
    }
}
