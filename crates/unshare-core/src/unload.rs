//! Unload-safety signalling.
//!
//! After every post-hook the module tells the host that no in-flight state
//! refers to it any more. The cell belongs to the host; old host revisions
//! hand out none, in which case the interceptor simply holds `None`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host-owned flag declaring the module safe to unload.
pub trait UnloadCell: Send {
    /// Marks the module as safe to unload.
    fn allow_unload(&self);
}

impl UnloadCell for Arc<AtomicBool> {
    fn allow_unload(&self) {
        self.store(true, Ordering::SeqCst);
    }
}
