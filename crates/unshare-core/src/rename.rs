//! Process rename capability.
//!
//! Renaming is cosmetic: whether a host can do it is settled once when the
//! module loads, and a failed rename is logged by the caller, never escalated.

use std::sync::{Arc, Mutex, PoisonError};

use unshare_common::error::{Result, UnshareError};

/// Host primitive that sets the OS-visible name of the current process.
pub trait ProcessRenamer: Send {
    /// Applies `name` to the calling process.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unusable or the host call fails.
    fn set_process_name(&self, name: &str) -> Result<()>;

    /// Short identifier of the mechanism, for logs.
    fn describe(&self) -> &'static str;
}

/// Rename capability negotiated at load time.
pub enum RenameCapability {
    /// The host has no way to rename processes.
    Absent,
    /// The host can rename processes through the contained primitive.
    Present(Box<dyn ProcessRenamer>),
}

impl RenameCapability {
    /// Resolves the native capability for the current platform.
    #[must_use]
    pub fn native() -> Self {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            Self::Present(Box::new(ThreadNameRenamer))
        }
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        {
            Self::Absent
        }
    }

    /// Applies `name` if the capability is present.
    ///
    /// # Errors
    ///
    /// Returns [`UnshareError::RenameUnavailable`] when absent, or whatever
    /// the primitive reports.
    pub fn apply(&self, name: &str) -> Result<()> {
        match self {
            Self::Absent => Err(UnshareError::RenameUnavailable),
            Self::Present(renamer) => renamer.set_process_name(name),
        }
    }

    /// Returns whether a rename primitive is available.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl std::fmt::Debug for RenameCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Present(renamer) => write!(f, "Present({})", renamer.describe()),
        }
    }
}

/// Longest name `PR_SET_NAME` keeps, excluding the terminating NUL.
pub const MAX_THREAD_NAME_BYTES: usize = 15;

/// Renames the calling thread through `prctl(PR_SET_NAME)`.
///
/// After specialization the calling thread is the process's main thread, so
/// this is the name shown by `ps` and `/proc/<pid>/comm`. Names longer than
/// [`MAX_THREAD_NAME_BYTES`] are cut at a character boundary, applied, and
/// reported as [`UnshareError::RenameTruncated`].
#[cfg(any(target_os = "linux", target_os = "android"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadNameRenamer;

#[cfg(any(target_os = "linux", target_os = "android"))]
impl ProcessRenamer for ThreadNameRenamer {
    fn set_process_name(&self, name: &str) -> Result<()> {
        let invalid = || UnshareError::InvalidDisplayName {
            name: name.to_string(),
        };
        if name.contains('\0') {
            return Err(invalid());
        }
        let applied = truncate_at_boundary(name, MAX_THREAD_NAME_BYTES);
        let c_name = std::ffi::CString::new(applied).map_err(|_| invalid())?;
        nix::sys::prctl::set_name(&c_name).map_err(|e| UnshareError::RenameFailed {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        if applied.len() < name.len() {
            return Err(UnshareError::RenameTruncated {
                name: name.to_string(),
                applied: applied.to_string(),
            });
        }
        tracing::debug!(name, "process renamed");
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "prctl"
    }
}

/// Longest prefix of `name` that fits in `max` bytes without splitting a
/// character.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn truncate_at_boundary(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Records requested names instead of applying them.
///
/// Used by in-process hosts that drive the hooks without really forking.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenamer {
    names: Arc<Mutex<Vec<String>>>,
}

impl RecordingRenamer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every name requested so far, oldest first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProcessRenamer for RecordingRenamer {
    fn set_process_name(&self, name: &str) -> Result<()> {
        if name.contains('\0') {
            return Err(UnshareError::InvalidDisplayName {
                name: name.to_string(),
            });
        }
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "recording"
    }
}
