//! # unshare-core
//!
//! Hook logic run by the zygote around every app specialization.
//!
//! This crate provides:
//! - **Identity classification**: app, isolated, or system uid windows.
//! - **Specialization gate**: flips the host's mount-external flag at most
//!   once per request, and never for system identities.
//! - **Pending-action state**: the single slot that carries the pre-fork
//!   decision to the post-fork hook.
//! - **Host primitives**: the rename capability and the unload-safety cell.
//! - **Interceptor**: the two hook pairs the host calls.
//!
//! Nothing here blocks or spawns work; every hook runs synchronously on the
//! host's thread.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod gate;
pub mod identity;
pub mod interceptor;
pub mod pending;
pub mod rename;
pub mod unload;

pub use gate::SpecializationRequest;
pub use identity::Classifier;
pub use interceptor::{Interceptor, PostSpecializeReport};
pub use pending::{PendingAction, PendingSlot};
pub use rename::{ProcessRenamer, RenameCapability};
pub use unload::UnloadCell;
