//! Process-wide entry points the host calls.
//!
//! The host loads one copy of the module per template process and calls
//! these functions from a single thread, one specialization cycle at a time.
//! The mutex only makes the singleton expressible as a `static`; it is never
//! contended.

use std::sync::{Mutex, MutexGuard, PoisonError};

use unshare_common::error::Result;
use unshare_common::types::Uid;
use unshare_core::{Classifier, PostSpecializeReport};

use crate::host::HostInfo;
use crate::legacy::{LegacyInit, LegacyStep};
use crate::module_info::VersionedModuleInfo;
use crate::runtime::ModuleRuntime;

static RUNTIME: Mutex<Option<ModuleRuntime>> = Mutex::new(None);
static LEGACY: Mutex<LegacyInit> = Mutex::new(LegacyInit::new());

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_runtime<R>(hook: &'static str, f: impl FnOnce(&mut ModuleRuntime) -> R) -> Option<R> {
    let mut guard = lock(&RUNTIME);
    if let Some(runtime) = guard.as_mut() {
        Some(f(runtime))
    } else {
        tracing::warn!(hook, "hook called before the module was initialised");
        None
    }
}

/// Single-call handshake: loads the module and returns its metadata.
///
/// A second call replaces the runtime, dropping any pending state.
pub fn init(host: HostInfo) -> VersionedModuleInfo {
    let runtime = ModuleRuntime::load(host);
    let info = runtime.module_info();
    *lock(&RUNTIME) = Some(runtime);
    info
}

/// One call of the stepwise handshake used by old hosts.
///
/// # Errors
///
/// Returns an error if the host breaks the step sequence.
pub fn legacy_init(host: Option<HostInfo>) -> Result<LegacyStep> {
    let mut legacy = lock(&LEGACY);
    let step = legacy.step(host)?;
    if let Some(runtime) = legacy.take_runtime() {
        *lock(&RUNTIME) = Some(runtime);
    }
    Ok(step)
}

/// Drops the loaded runtime and resets the legacy step counter.
pub fn unload() {
    *lock(&RUNTIME) = None;
    *lock(&LEGACY) = LegacyInit::new();
}

/// Returns the loaded module's metadata, if loaded.
pub fn module_info() -> Option<VersionedModuleInfo> {
    lock(&RUNTIME).as_ref().map(ModuleRuntime::module_info)
}

/// Legacy uid filter; uses the stock layout when nothing is loaded.
pub fn should_skip_uid(uid: i32) -> bool {
    lock(&RUNTIME).as_ref().map_or_else(
        || Classifier::default().should_skip_uid(Uid::from_raw(uid)),
        |runtime| runtime.should_skip_uid(uid),
    )
}

/// Pre-hook of the per-application fork.
pub fn fork_and_specialize_pre(
    uid: i32,
    mount_external: &mut i32,
    nice_name: Option<&str>,
    is_child_zygote: bool,
) -> bool {
    with_runtime("fork_and_specialize_pre", |rt| {
        rt.fork_and_specialize_pre(uid, mount_external, nice_name, is_child_zygote)
    })
    .unwrap_or(false)
}

/// Post-hook of the per-application fork.
pub fn fork_and_specialize_post(res: i32) -> PostSpecializeReport {
    with_runtime("fork_and_specialize_post", |rt| rt.fork_and_specialize_post(res))
        .unwrap_or_default()
}

/// Pre-hook of in-place specialization.
pub fn specialize_app_process_pre(
    uid: i32,
    mount_external: &mut i32,
    nice_name: Option<&str>,
    start_child_zygote: bool,
) -> bool {
    with_runtime("specialize_app_process_pre", |rt| {
        rt.specialize_app_process_pre(uid, mount_external, nice_name, start_child_zygote)
    })
    .unwrap_or(false)
}

/// Post-hook of in-place specialization.
pub fn specialize_app_process_post() -> PostSpecializeReport {
    with_runtime("specialize_app_process_post", ModuleRuntime::specialize_app_process_post)
        .unwrap_or_default()
}
