//! Integration tests for the host load protocol.
//!
//! These tests are implemented in:
//! `crates/unshare-riru/tests/e2e_test.rs`
//!
//! Covered scenarios:
//! - `global_entry_points_run_a_cycle`: single-call init clamps the revision and installs the runtime
//! - `global_legacy_handshake_installs_runtime`: stepwise init on an old host, skip-uid hook, no unload cell
