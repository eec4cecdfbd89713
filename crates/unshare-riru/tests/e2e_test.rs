//! End-to-end tests for the unshare module.
//!
//! These drive full specialization cycles the way a host does:
//! 1. Handshake (single-call and stepwise)
//! 2. Pre-hook on the fork or in-place path
//! 3. The host's fork, simulated by the raw result passed to the post-hook
//! 4. Post-hook, rename, unload signalling, state reset

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use unshare_core::RenameCapability;
use unshare_core::rename::RecordingRenamer;
use unshare_riru::entry;
use unshare_riru::host::HostInfo;
use unshare_riru::legacy::LegacyStep;
use unshare_riru::runtime::ModuleRuntime;

/// Serializes tests that touch the process-wide runtime.
static GLOBAL: Mutex<()> = Mutex::new(());

struct Harness {
    recorder: RecordingRenamer,
    unload: Arc<AtomicBool>,
    _dir: tempfile::TempDir,
}

fn host(api: i32) -> (HostInfo, Harness) {
    let dir = tempfile::tempdir().expect("tempdir");
    let recorder = RecordingRenamer::new();
    let unload = Arc::new(AtomicBool::new(false));
    let host = HostInfo::new(api, dir.path())
        .with_rename(RenameCapability::Present(Box::new(recorder.clone())))
        .with_unload_cell(Box::new(Arc::clone(&unload)));
    (
        host,
        Harness {
            recorder,
            unload,
            _dir: dir,
        },
    )
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn app_zygote_cycle_unshares_and_renames() {
    let (host, harness) = host(26);
    let mut runtime = ModuleRuntime::load(host);
    let mut mount_external = 0;

    assert!(runtime.fork_and_specialize_pre(10_234, &mut mount_external, Some("com.example_zygote"), true));
    assert_eq!(mount_external, 1);
    let pending = runtime.interceptor().pending().expect("armed");
    assert!(pending.is_app_acting_spawner());

    let report = runtime.fork_and_specialize_post(0);
    assert!(report.renamed);
    assert_eq!(harness.recorder.names(), vec!["com.example_zygote"]);
    assert!(harness.unload.load(Ordering::SeqCst));
    assert!(runtime.interceptor().pending().is_none());
}

#[test]
fn system_uid_cycle_is_a_no_op() {
    let (host, harness) = host(26);
    let mut runtime = ModuleRuntime::load(host);
    let mut mount_external = 0;

    assert!(!runtime.fork_and_specialize_pre(1000, &mut mount_external, Some("system"), false));
    assert_eq!(mount_external, 0);
    assert!(runtime.interceptor().pending().is_none());

    let report = runtime.fork_and_specialize_post(0);
    assert_eq!(report.rename_attempted, None);
    assert!(harness.recorder.names().is_empty());
}

#[test]
fn same_request_twice_schedules_once() {
    let (host, _harness) = host(26);
    let mut runtime = ModuleRuntime::load(host);
    let mut mount_external = 0;

    assert!(runtime.fork_and_specialize_pre(10_234, &mut mount_external, Some("a"), false));
    assert!(!runtime.fork_and_specialize_pre(10_234, &mut mount_external, Some("a"), false));
    assert_eq!(mount_external, 1);
}

#[test]
fn template_side_of_fork_keeps_its_name() {
    let (host, harness) = host(26);
    let mut runtime = ModuleRuntime::load(host);
    let mut mount_external = 0;

    assert!(runtime.fork_and_specialize_pre(10_234, &mut mount_external, Some("z"), true));
    let report = runtime.fork_and_specialize_post(4321);
    assert_eq!(report.rename_attempted, None);
    assert!(!report.unload_signalled);
    assert!(harness.recorder.names().is_empty());
    assert!(runtime.interceptor().pending().is_none());
}

#[test]
fn in_place_specialization_never_renames() {
    let (host, harness) = host(26);
    let mut runtime = ModuleRuntime::load(host);
    let mut mount_external = 0;

    assert!(runtime.specialize_app_process_pre(10_234, &mut mount_external, Some("z"), true));
    assert_eq!(mount_external, 1);
    let report = runtime.specialize_app_process_post();
    assert_eq!(report.rename_attempted, None);
    assert!(report.unload_signalled);
    assert!(harness.recorder.names().is_empty());
}

#[test]
fn isolated_uid_unshares_without_rename() {
    let (host, harness) = host(26);
    let mut runtime = ModuleRuntime::load(host);
    let mut mount_external = 0;

    assert!(runtime.fork_and_specialize_pre(1_099_500, &mut mount_external, Some("iso"), true));
    assert_eq!(mount_external, 1);
    let _ = runtime.fork_and_specialize_post(0);
    assert!(harness.recorder.names().is_empty());
}

#[test]
fn host_without_rename_still_completes_cycle() {
    let (host, harness) = host(26);
    let mut runtime = ModuleRuntime::load(host.with_rename(RenameCapability::Absent));
    let mut mount_external = 0;

    assert!(runtime.fork_and_specialize_pre(10_234, &mut mount_external, Some("z"), true));
    let report = runtime.fork_and_specialize_post(0);
    assert_eq!(report.rename_attempted.as_deref(), Some("z"));
    assert!(!report.renamed);
    assert!(report.unload_signalled);
    assert!(harness.unload.load(Ordering::SeqCst));
}

// ── Process-wide entry points ────────────────────────────────────────

#[test]
fn global_entry_points_run_a_cycle() {
    let _guard = GLOBAL.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    entry::unload();

    let mut mount_external = 0;
    assert!(!entry::fork_and_specialize_pre(10_234, &mut mount_external, Some("z"), true));
    assert_eq!(mount_external, 0);

    let (host, harness) = host(30);
    let info = entry::init(host);
    assert_eq!(info.api_version.get(), 26);
    assert!(!info.info.hooks.should_skip_uid);
    assert_eq!(entry::module_info(), Some(info));

    assert!(entry::fork_and_specialize_pre(10_234, &mut mount_external, Some("z"), true));
    let report = entry::fork_and_specialize_post(0);
    assert!(report.renamed);
    assert_eq!(harness.recorder.names(), vec!["z"]);

    entry::unload();
    assert!(entry::module_info().is_none());
}

#[test]
fn global_legacy_handshake_installs_runtime() {
    let _guard = GLOBAL.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    entry::unload();

    let (host, harness) = host(23);
    let step = entry::legacy_init(Some(host)).expect("step 1");
    assert!(matches!(step, LegacyStep::ApiVersionOnly(v) if v.get() == 23));
    assert!(matches!(entry::legacy_init(None), Ok(LegacyStep::ModuleInfo(_))));
    assert!(matches!(entry::legacy_init(None), Ok(LegacyStep::Done)));

    assert!(entry::should_skip_uid(1000));
    assert!(!entry::should_skip_uid(10_234));

    let mut mount_external = 0;
    assert!(entry::specialize_app_process_pre(10_234, &mut mount_external, Some("z"), false));
    let report = entry::specialize_app_process_post();
    // Revision 23 hands out no usable unload cell.
    assert!(!report.unload_signalled);
    assert!(!harness.unload.load(Ordering::SeqCst));

    entry::unload();
}

#[test]
fn single_call_handshake_on_old_host_offers_no_skip_uid_hook() {
    let _guard = GLOBAL.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    entry::unload();

    let (host, _harness) = host(22);
    let info = entry::init(host);
    assert_eq!(info.api_version.get(), 22);
    assert!(!info.info.hooks.should_skip_uid);

    entry::unload();
}
