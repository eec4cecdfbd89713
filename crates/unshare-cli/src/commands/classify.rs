//! `unshare-sim classify` — Show how uids are classified.

use clap::Args;
use serde::Serialize;
use unshare_common::config::ModuleConfig;
use unshare_common::types::{IdentityCategory, Uid};
use unshare_core::Classifier;

use crate::output::{print_json, yes_no};

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Uids to classify.
    #[arg(required = true)]
    pub uids: Vec<u32>,

    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Classification of a single uid.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Classification {
    /// The uid as given.
    pub uid: Uid,
    /// Uid with the per-user offset removed.
    pub app_id: u32,
    /// Category from the configured windows.
    pub category: IdentityCategory,
    /// Whether a nested spawner with this uid counts as an app.
    pub application_range: bool,
    /// Whether a legacy host would skip this uid.
    pub skip: bool,
}

/// Classifies every uid against `config`.
#[must_use]
pub fn classify_all(uids: &[u32], config: &ModuleConfig) -> Vec<Classification> {
    let classifier = Classifier::from_config(config);
    uids.iter()
        .map(|&raw| {
            let uid = Uid::new(raw);
            Classification {
                uid,
                app_id: uid.app_id(config.per_user_offset),
                category: classifier.classify(uid),
                application_range: classifier.is_application_range(uid),
                skip: classifier.should_skip_uid(uid),
            }
        })
        .collect()
}

/// Executes the `classify` command.
///
/// # Errors
///
/// Returns an error if JSON output fails.
pub fn execute(args: &ClassifyArgs, config: &ModuleConfig) -> anyhow::Result<()> {
    let rows = classify_all(&args.uids, config);
    if args.json {
        return print_json(&rows);
    }

    println!(
        "{:<12} {:<8} {:<22} {:<10} {:<5}",
        "UID", "APP ID", "CATEGORY", "APP RANGE", "SKIP"
    );
    for row in &rows {
        println!(
            "{:<12} {:<8} {:<22} {:<10} {:<5}",
            row.uid,
            row.app_id,
            row.category,
            yes_no(row.application_range),
            yes_no(row.skip)
        );
    }
    Ok(())
}
