use crate::output::print_json;
use clap::Subcommand;
use std::path::Path;
use warmup_core::{evaluator::Permission, types::ActionKind};

#[derive(Subcommand)]
pub enum ActionSubcommand {
    /// Whether an action may be taken now; exits 0 either way
    Check {
        account: String,
        /// upvote, save, comment, or post
        kind: ActionKind,
    },
    /// Record the result of an action performed outside this tool
    Record {
        account: String,
        #[arg(long)]
        kind: Option<ActionKind>,
        /// The attempt failed; rate state is left unchanged
        #[arg(long)]
        failed: bool,
    },
}

pub fn run(root: &Path, subcmd: ActionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ActionSubcommand::Check { account, kind } => check(root, &account, kind, json),
        ActionSubcommand::Record {
            account,
            kind,
            failed,
        } => record(root, &account, kind, !failed, json),
    }
}

fn check(root: &Path, key: &str, kind: ActionKind, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let account = runner.resolve(key)?;
    let permission = runner.check(account.id, kind)?;

    if json {
        print_json(&serde_json::json!({
            "account": account.username,
            "action": kind,
            "permission": permission,
        }))?;
    } else {
        match permission {
            Permission::Permitted => println!("permitted: {} may {kind}", account.username),
            Permission::Denied(reason) => {
                println!("denied: {} may not {kind} ({reason})", account.username)
            }
        }
    }
    Ok(())
}

fn record(
    root: &Path,
    key: &str,
    kind: Option<ActionKind>,
    succeeded: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let id = runner.resolve(key)?.id;
    let account = runner.record_external(id, kind, succeeded)?;

    if json {
        print_json(&serde_json::json!({
            "account": account.username,
            "succeeded": succeeded,
            "actions_today": account.daily_actions_count,
            "last_action_at": account.last_action_at,
        }))?;
    } else if succeeded {
        println!(
            "Recorded action for {} ({} today)",
            account.username, account.daily_actions_count
        );
    } else {
        println!("Recorded failed attempt for {}", account.username);
    }
    Ok(())
}
