//! Host-facing side of the unshare module.
//!
//! The hosting framework loads the module, negotiates a protocol revision,
//! reads its static metadata, and then calls the hook entry points around
//! every specialization. This crate owns that handshake and the one
//! process-wide [`runtime::ModuleRuntime`] the hooks run against.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod entry;
pub mod host;
pub mod legacy;
pub mod logging;
pub mod module_info;
pub mod protocol;
pub mod runtime;
