//! Integration tests for the specialization hook cycle.
//!
//! These tests are implemented in:
//! `crates/unshare-riru/tests/e2e_test.rs`
//!
//! Covered scenarios:
//! - `app_zygote_cycle_unshares_and_renames`: app-range nested spawner is flagged and renamed in the child
//! - `system_uid_cycle_is_a_no_op`: system uid leaves the mount flag and pending state untouched
//! - `same_request_twice_schedules_once`: repeated pre-hook on one request triggers once
//! - `template_side_of_fork_keeps_its_name`: parent branch resets state without renaming
//! - `in_place_specialization_never_renames`: alternate path only resets and signals unload
//! - `isolated_uid_unshares_without_rename`: isolated uids unshare but are never app-acting
//! - `host_without_rename_still_completes_cycle`: missing rename primitive is logged, not fatal
