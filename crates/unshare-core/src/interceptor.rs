//! The two hook pairs the host calls around a specialization.
//!
//! Per cycle the host calls one pre-hook, performs the fork or in-place
//! specialization itself, then calls the matching post-hook. Cycles never
//! overlap. The post-hook is the single point where pending state is reset,
//! whatever happened in between.

use unshare_common::types::ForkOutcome;

use crate::gate::{self, SpecializationRequest};
use crate::identity::Classifier;
use crate::pending::{PendingAction, PendingSlot};
use crate::rename::RenameCapability;
use crate::unload::UnloadCell;

/// What a post-hook did, for callers that want to report on the cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSpecializeReport {
    /// Name a rename was attempted with, if any.
    pub rename_attempted: Option<String>,
    /// Whether the attempted rename applied the full name.
    pub renamed: bool,
    /// Whether the unload-safety cell was set.
    pub unload_signalled: bool,
}

/// Hook logic plus the state it carries between the two phases.
#[derive(Debug)]
pub struct Interceptor {
    classifier: Classifier,
    pending: PendingSlot,
    rename: RenameCapability,
    unload: Option<UnloadHandle>,
}

struct UnloadHandle(Box<dyn UnloadCell>);

impl std::fmt::Debug for UnloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UnloadHandle")
    }
}

impl Interceptor {
    /// Creates an interceptor with no unload-safety cell.
    #[must_use]
    pub const fn new(classifier: Classifier, rename: RenameCapability) -> Self {
        Self {
            classifier,
            pending: PendingSlot::new(),
            rename,
            unload: None,
        }
    }

    /// Attaches the host's unload-safety cell.
    #[must_use]
    pub fn with_unload_cell(mut self, cell: Box<dyn UnloadCell>) -> Self {
        self.unload = Some(UnloadHandle(cell));
        self
    }

    /// Returns the classifier in use.
    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Returns the in-flight pending action, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingAction> {
        self.pending.peek()
    }

    /// Returns whether the host gave us a way to rename processes.
    #[must_use]
    pub const fn can_rename(&self) -> bool {
        self.rename.is_present()
    }

    /// Pre-hook of the per-application fork path.
    ///
    /// Returns whether the namespace action was scheduled by this call.
    pub fn fork_and_specialize_pre(&mut self, request: &mut SpecializationRequest<'_>) -> bool {
        self.on_pre_specialize(request)
    }

    /// Post-hook of the per-application fork path.
    pub fn fork_and_specialize_post(&mut self, outcome: ForkOutcome) -> PostSpecializeReport {
        self.on_post_specialize(outcome)
    }

    /// Pre-hook of the in-place specialization path.
    ///
    /// This path never creates a nested spawner, so nothing is renamed later.
    pub fn specialize_app_process_pre(&mut self, request: &mut SpecializationRequest<'_>) -> bool {
        request.is_child_spawner = false;
        self.on_pre_specialize(request)
    }

    /// Post-hook of the in-place specialization path.
    pub fn specialize_app_process_post(&mut self) -> PostSpecializeReport {
        let _ = self.pending.take();
        PostSpecializeReport {
            unload_signalled: self.signal_unload(),
            ..PostSpecializeReport::default()
        }
    }

    /// Runs the gate and, if it fires, records the pending action.
    pub fn on_pre_specialize(&mut self, request: &mut SpecializationRequest<'_>) -> bool {
        if !gate::should_unshare(&self.classifier, request) {
            return false;
        }

        let is_app_acting_spawner =
            request.is_child_spawner && self.classifier.is_application_range(request.uid);
        let action = PendingAction::new(is_app_acting_spawner, request.display_name);
        if let Some(stale) = self.pending.arm(action) {
            // Two pre-hooks without a post-hook: the host broke the cycle
            // contract. The newer request wins.
            tracing::warn!(
                uid = %request.uid,
                stale = ?stale,
                "pending action overwritten before its post-hook ran"
            );
        }

        tracing::info!(
            uid = %request.uid,
            display_name = request.display_name.unwrap_or_default(),
            app_acting_spawner = is_app_acting_spawner,
            "unshare scheduled"
        );
        true
    }

    /// Consumes the pending action, renames the child if owed, and resets.
    pub fn on_post_specialize(&mut self, outcome: ForkOutcome) -> PostSpecializeReport {
        let action = self.pending.take();
        if !outcome.is_child() {
            tracing::trace!(%outcome, "not the specialized child, pending state dropped");
            return PostSpecializeReport::default();
        }

        let mut report = PostSpecializeReport::default();
        if let Some(name) = action.rename_target() {
            report.rename_attempted = Some(name.to_string());
            match self.rename.apply(name) {
                Ok(()) => report.renamed = true,
                Err(e) => tracing::warn!(name, error = %e, "process rename failed"),
            }
        }
        report.unload_signalled = self.signal_unload();
        report
    }

    fn signal_unload(&self) -> bool {
        self.unload.as_ref().is_some_and(|handle| {
            handle.0.allow_unload();
            true
        })
    }
}
