//! `unshare-sim info` — Show what the module reports to a host.

use clap::Args;
use unshare_common::constants::{MODULE_API_VERSION, MODULE_NAME};
use unshare_riru::module_info::{ModuleInfo, VersionedModuleInfo};
use unshare_riru::protocol;

use crate::output::{print_json, yes_no};

/// Arguments for the `info` command.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Maximum revision the simulated host speaks.
    #[arg(long, default_value_t = MODULE_API_VERSION)]
    pub host_api: i32,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `info` command.
///
/// # Errors
///
/// Returns an error if JSON output fails.
pub fn execute(args: &InfoArgs) -> anyhow::Result<()> {
    let api_version = protocol::negotiate(args.host_api);
    let info = VersionedModuleInfo::new(api_version);
    if args.json {
        return print_json(&info);
    }

    println!("module:                 {MODULE_NAME} {}", info.info.version_name);
    println!("version code:           {}", info.info.version);
    println!("negotiated revision:    {api_version} (host max {})", args.host_api);
    println!("support hide:           {}", yes_no(info.info.support_hide));
    println!("unload signalling:      {}", yes_no(api_version.supports_unload()));
    println!("fork hooks:             {}", yes_no(info.info.hooks.fork_and_specialize));
    println!("specialize hooks:       {}", yes_no(info.info.hooks.specialize_app_process));
    println!("system server hooks:    {}", yes_no(info.info.hooks.fork_system_server));
    println!(
        "legacy skip-uid hook:   {}",
        yes_no(ModuleInfo::for_legacy(api_version).hooks.should_skip_uid)
    );
    Ok(())
}
