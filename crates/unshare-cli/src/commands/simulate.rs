//! `unshare-sim simulate` — Replay one specialization cycle.
//!
//! Acts as a stand-in host: loads the module runtime with an in-process
//! unload cell and a rename recorder, calls the pre-hook, pretends the fork
//! returned `--fork-result`, and calls the post-hook.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, ValueEnum};
use serde::Serialize;
use unshare_common::config::ModuleConfig;
use unshare_common::constants::MODULE_API_VERSION;
use unshare_common::types::ForkOutcome;
use unshare_core::RenameCapability;
use unshare_core::rename::RecordingRenamer;
use unshare_riru::host::HostInfo;
use unshare_riru::runtime::ModuleRuntime;

use crate::output::{print_json, yes_no};

/// Which host path to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializePath {
    /// Per-application fork.
    Fork,
    /// In-place specialization.
    Specialize,
}

/// Arguments for the `simulate` command.
#[allow(clippy::struct_excessive_bools)]
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Uid the child runs as.
    #[arg(long)]
    pub uid: i32,

    /// Display name the host passes.
    #[arg(long)]
    pub nice_name: Option<String>,

    /// The request creates a nested spawner.
    #[arg(long)]
    pub child_zygote: bool,

    /// Initial mount-external flag.
    #[arg(long, default_value_t = 0)]
    pub mount_external: i32,

    /// Raw fork result handed to the post-hook (0 = child).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub fork_result: i32,

    /// Host path to drive.
    #[arg(long, value_enum, default_value_t = SpecializePath::Fork)]
    pub path: SpecializePath,

    /// Maximum revision the simulated host speaks.
    #[arg(long, default_value_t = MODULE_API_VERSION)]
    pub host_api: i32,

    /// Call the pre-hook a second time on the same request.
    #[arg(long)]
    pub repeat_pre: bool,

    /// Simulate a host without a rename primitive.
    #[arg(long)]
    pub no_rename: bool,

    /// Module directory reported by the simulated host.
    #[arg(long, default_value = ".")]
    pub module_path: PathBuf,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Everything observable about one simulated cycle.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CycleReport {
    /// Path driven.
    pub path: SpecializePath,
    /// Negotiated revision.
    pub api_version: i32,
    /// Whether each pre-hook call scheduled the unshare.
    pub scheduled: Vec<bool>,
    /// Mount-external flag after the pre-hook(s).
    pub mount_external: i32,
    /// Whether the pending action marked an app-acting spawner.
    pub app_acting_spawner: bool,
    /// Fork outcome seen by the post-hook.
    pub fork_outcome: Option<ForkOutcome>,
    /// Names the rename primitive was asked to apply.
    pub renamed_to: Vec<String>,
    /// Whether the pending slot was empty after the post-hook.
    pub pending_cleared: bool,
    /// Whether the unload cell was set.
    pub unload_allowed: bool,
}

/// Runs one cycle described by `args`.
#[must_use]
pub fn run_cycle(args: &SimulateArgs, config: ModuleConfig) -> CycleReport {
    let recorder = RecordingRenamer::new();
    let unload = Arc::new(AtomicBool::new(false));
    let rename = if args.no_rename {
        RenameCapability::Absent
    } else {
        RenameCapability::Present(Box::new(recorder.clone()))
    };
    let host = HostInfo::new(args.host_api, args.module_path.clone())
        .with_rename(rename)
        .with_unload_cell(Box::new(Arc::clone(&unload)));
    let mut runtime = ModuleRuntime::with_config(host, config);

    let nice_name = args.nice_name.as_deref();
    let mut mount_external = args.mount_external;
    let calls = if args.repeat_pre { 2 } else { 1 };
    let mut scheduled = Vec::with_capacity(calls);
    for _ in 0..calls {
        scheduled.push(match args.path {
            SpecializePath::Fork => runtime.fork_and_specialize_pre(
                args.uid,
                &mut mount_external,
                nice_name,
                args.child_zygote,
            ),
            SpecializePath::Specialize => runtime.specialize_app_process_pre(
                args.uid,
                &mut mount_external,
                nice_name,
                args.child_zygote,
            ),
        });
    }
    let app_acting_spawner = runtime
        .interceptor()
        .pending()
        .is_some_and(unshare_core::PendingAction::is_app_acting_spawner);

    let fork_outcome = match args.path {
        SpecializePath::Fork => {
            let _ = runtime.fork_and_specialize_post(args.fork_result);
            Some(ForkOutcome::from_raw(args.fork_result))
        }
        SpecializePath::Specialize => {
            let _ = runtime.specialize_app_process_post();
            None
        }
    };

    CycleReport {
        path: args.path,
        api_version: runtime.api_version().get(),
        scheduled,
        mount_external,
        app_acting_spawner,
        fork_outcome,
        renamed_to: recorder.names(),
        pending_cleared: runtime.interceptor().pending().is_none(),
        unload_allowed: unload.load(Ordering::SeqCst),
    }
}

/// Executes the `simulate` command.
///
/// # Errors
///
/// Returns an error if JSON output fails.
pub fn execute(args: &SimulateArgs, config: ModuleConfig) -> anyhow::Result<()> {
    let report = run_cycle(args, config);
    tracing::debug!(?report, "cycle finished");
    if args.json {
        return print_json(&report);
    }

    let scheduled: Vec<&str> = report.scheduled.iter().map(|&s| yes_no(s)).collect();
    println!("path:                {:?}", report.path);
    println!("revision:            v{}", report.api_version);
    println!("unshare scheduled:   {}", scheduled.join(", "));
    println!("mount external:      {} -> {}", args.mount_external, report.mount_external);
    println!("app-acting spawner:  {}", yes_no(report.app_acting_spawner));
    if let Some(outcome) = report.fork_outcome {
        println!("fork outcome:        {outcome}");
    }
    if report.renamed_to.is_empty() {
        println!("renamed to:          -");
    } else {
        println!("renamed to:          {}", report.renamed_to.join(", "));
    }
    println!("pending cleared:     {}", yes_no(report.pending_cleared));
    println!("unload allowed:      {}", yes_no(report.unload_allowed));
    Ok(())
}
