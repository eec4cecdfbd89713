//! System-wide constants: Android uid layout, host protocol revisions,
//! and module metadata.

/// Number of uids reserved per Android user; `uid % AID_USER_OFFSET` is the app id.
pub const AID_USER_OFFSET: u32 = 100_000;

/// First app id assigned to installed applications.
pub const AID_APP_START: u32 = 10_000;
/// Last app id assigned to installed applications.
pub const AID_APP_END: u32 = 19_999;

/// First app id of fully isolated sandboxed processes.
pub const AID_ISOLATED_START: u32 = 90_000;
/// Last app id of fully isolated sandboxed processes.
pub const AID_ISOLATED_END: u32 = 99_999;

/// Highest host protocol revision this module speaks.
pub const MODULE_API_VERSION: i32 = 26;

/// Lowest revision at which the host hands out an unload-safety cell.
pub const MIN_UNLOAD_API_VERSION: i32 = 25;

/// Lowest revision at which the first legacy init step may return the
/// versioned module info directly.
pub const MIN_DIRECT_INFO_API_VERSION: i32 = 24;

/// Numeric module version reported to the host.
pub const MODULE_VERSION: i32 = 1;

/// Human-readable module version reported to the host.
pub const MODULE_VERSION_NAME: &str = env!("CARGO_PKG_VERSION");

/// Module identifier used in log output and CLI banners.
pub const MODULE_NAME: &str = "unshare";

/// Name of the optional configuration file inside the module directory.
pub const CONFIG_FILE_NAME: &str = "unshare.json";

/// Log filter used when neither configuration nor environment provide one.
pub const DEFAULT_LOG_FILTER: &str = "info";
