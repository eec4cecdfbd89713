//! What the host hands the module at load time.

use std::path::PathBuf;
use std::ptr::NonNull;

use unshare_core::{RenameCapability, UnloadCell};

/// Load-time parameters supplied by the host.
pub struct HostInfo {
    /// Highest protocol revision the host speaks.
    pub api_version: i32,
    /// Directory the module is installed in.
    pub module_path: PathBuf,
    /// Host-owned unload-safety cell, if the host has one.
    pub unload_cell: Option<Box<dyn UnloadCell>>,
    /// How the host can rename a specialized process.
    pub rename: RenameCapability,
}

impl HostInfo {
    /// Creates host parameters with the native rename capability and no
    /// unload cell.
    #[must_use]
    pub fn new(api_version: i32, module_path: impl Into<PathBuf>) -> Self {
        Self {
            api_version,
            module_path: module_path.into(),
            unload_cell: None,
            rename: RenameCapability::native(),
        }
    }

    /// Supplies the host's unload-safety cell.
    #[must_use]
    pub fn with_unload_cell(mut self, cell: Box<dyn UnloadCell>) -> Self {
        self.unload_cell = Some(cell);
        self
    }

    /// Overrides the rename capability.
    #[must_use]
    pub fn with_rename(mut self, rename: RenameCapability) -> Self {
        self.rename = rename;
        self
    }
}

impl std::fmt::Debug for HostInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostInfo")
            .field("api_version", &self.api_version)
            .field("module_path", &self.module_path)
            .field("unload_cell", &self.unload_cell.is_some())
            .field("rename", &self.rename)
            .finish()
    }
}

/// Unload-safety cell living in host memory, as handed over a C boundary.
#[derive(Debug)]
pub struct RawUnloadCell(NonNull<libc::c_int>);

impl RawUnloadCell {
    /// Wraps the host's `int *allowUnload`.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a writable `int` that stays valid for as long as
    /// the module is loaded, and the host must not access it concurrently
    /// with a hook call.
    pub unsafe fn from_raw(ptr: *mut libc::c_int) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }
}

// SAFETY: the host serializes hook calls, and the pointee outlives the module
// by the contract of `from_raw`.
unsafe impl Send for RawUnloadCell {}

impl UnloadCell for RawUnloadCell {
    fn allow_unload(&self) {
        // SAFETY: validity and exclusive access are guaranteed by `from_raw`'s
        // contract.
        unsafe { self.0.as_ptr().write(1) };
    }
}
