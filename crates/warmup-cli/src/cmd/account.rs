use crate::output::{fmt_time, print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::path::Path;
use warmup_core::{
    account::Account,
    runner::SyncUpdate,
    types::{AccountStatus, ActionKind, StatusOrigin, WarmupStage},
};

#[derive(Subcommand)]
pub enum AccountSubcommand {
    /// Register a platform account for warmup
    Register {
        username: String,
        /// When the account was created on the platform (RFC 3339)
        #[arg(long)]
        created_at: DateTime<Utc>,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        karma: i64,
        /// Owning client
        #[arg(long)]
        client: Option<String>,
        /// Owning organization
        #[arg(long)]
        org: Option<String>,
    },
    /// List accounts
    List {
        /// Only accounts owned by this client
        #[arg(long)]
        client: Option<String>,
        /// Only accounts owned by this organization
        #[arg(long)]
        org: Option<String>,
    },
    /// Pick a warmed, active account of a client that may act right now
    Available {
        #[arg(long)]
        client: String,
        /// upvote, save, comment, post
        #[arg(long)]
        kind: ActionKind,
    },
    /// Show one account
    Show { account: String },
    /// Apply stats fetched from the platform
    Sync {
        account: String,
        #[arg(long, allow_hyphen_values = true)]
        karma: Option<i64>,
        #[arg(long)]
        created_at: Option<DateTime<Utc>>,
        /// The platform reports the account suspended
        #[arg(long)]
        suspended: bool,
    },
    /// Set account status (operator override)
    SetStatus {
        account: String,
        /// warming_up, active, rate_limited, shadowbanned, suspended, inactive
        status: AccountStatus,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Force the warmup stage; may lower it
    ResetStage {
        account: String,
        /// Stage name or index 0-5
        stage: WarmupStage,
    },
    /// Stop all actions for an account
    Deactivate { account: String },
}

pub fn run(root: &Path, subcmd: AccountSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AccountSubcommand::Register {
            username,
            created_at,
            karma,
            client,
            org,
        } => register(root, &username, created_at, karma, client, org, json),
        AccountSubcommand::List { client, org } => {
            list(root, client.as_deref(), org.as_deref(), json)
        }
        AccountSubcommand::Available { client, kind } => available(root, &client, kind, json),
        AccountSubcommand::Show { account } => show(root, &account, json),
        AccountSubcommand::Sync {
            account,
            karma,
            created_at,
            suspended,
        } => sync(
            root,
            &account,
            SyncUpdate {
                karma,
                platform_created_at: created_at,
                suspended,
            },
            json,
        ),
        AccountSubcommand::SetStatus {
            account,
            status,
            reason,
        } => set_status(root, &account, status, reason, json),
        AccountSubcommand::ResetStage { account, stage } => reset_stage(root, &account, stage, json),
        AccountSubcommand::Deactivate { account } => deactivate(root, &account, json),
    }
}

fn register(
    root: &Path,
    username: &str,
    created_at: DateTime<Utc>,
    karma: i64,
    client: Option<String>,
    org: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let mut account = Account::new(username, created_at, karma, runner.now());
    account.client_id = client;
    account.organization_id = org;
    let account = runner
        .register(account)
        .with_context(|| format!("failed to register '{username}'"))?;

    if json {
        print_json(&account)?;
    } else {
        println!("Registered {} [{}]", account.username, account.id);
    }
    Ok(())
}

fn list(root: &Path, client: Option<&str>, org: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let accounts = match client {
        Some(client) => runner.repo().list_for_client(client),
        None => runner.repo().list(),
    }
    .context("failed to list accounts")?;
    let accounts: Vec<Account> = accounts
        .into_iter()
        .filter(|a| org.map_or(true, |org| a.organization_id.as_deref() == Some(org)))
        .collect();

    if json {
        print_json(&accounts)?;
        return Ok(());
    }
    if accounts.is_empty() {
        if client.is_some() || org.is_some() {
            println!("No matching accounts.");
        } else {
            println!("No accounts registered.");
        }
        return Ok(());
    }
    let now = runner.now();
    let rows = accounts
        .iter()
        .map(|a| {
            vec![
                a.username.clone(),
                a.stage().to_string(),
                a.status.to_string(),
                a.karma.to_string(),
                a.age_days(now).to_string(),
                fmt_time(a.last_action_at),
                a.id.to_string(),
            ]
        })
        .collect();
    print_table(
        &["USERNAME", "STAGE", "STATUS", "KARMA", "AGE", "LAST ACTION", "ID"],
        rows,
    );
    Ok(())
}

fn available(root: &Path, client: &str, kind: ActionKind, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let found = runner
        .available_for_client(client, kind)
        .with_context(|| format!("failed to select an account for '{client}'"))?;
    if json {
        return print_json(&found);
    }
    match found {
        Some(account) => println!("{} [{}]", account.username, account.id),
        None => println!("No account available for {client} to {kind}."),
    }
    Ok(())
}

fn print_account(account: &Account, now: DateTime<Utc>) {
    println!("{} [{}]", account.username, account.id);
    println!(
        "  stage:    {} ({})",
        account.stage(),
        account.stage().index()
    );
    match &account.status_reason {
        Some(reason) => println!("  status:   {} ({reason})", account.status),
        None => println!("  status:   {}", account.status),
    }
    println!("  karma:    {}", account.karma);
    println!("  age:      {} days", account.age_days(now));
    println!("  last act: {}", fmt_time(account.last_action_at));
    println!(
        "  today:    {} actions",
        if account.daily_actions_reset_at == Some(now.date_naive()) {
            account.daily_actions_count
        } else {
            0
        }
    );
    println!("  verified: {}", fmt_time(account.last_verified_at));
    if let Some(client) = &account.client_id {
        println!("  client:   {client}");
    }
    if let Some(org) = &account.organization_id {
        println!("  org:      {org}");
    }
}

fn show(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let account = runner.resolve(key)?;
    if json {
        print_json(&account)?;
    } else {
        print_account(&account, runner.now());
    }
    Ok(())
}

fn sync(root: &Path, key: &str, update: SyncUpdate, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let id = runner.resolve(key)?.id;
    let account = runner
        .sync(id, update)
        .with_context(|| format!("failed to sync '{key}'"))?;
    if json {
        print_json(&account)?;
    } else {
        println!(
            "Synced {}: karma {}, status {}",
            account.username, account.karma, account.status
        );
    }
    Ok(())
}

fn set_status(
    root: &Path,
    key: &str,
    status: AccountStatus,
    reason: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let id = runner.resolve(key)?.id;
    let account = runner
        .set_status(id, status, reason, StatusOrigin::Operator)
        .with_context(|| format!("failed to set status of '{key}'"))?;
    if json {
        print_json(&account)?;
    } else {
        println!("{} is now {}", account.username, account.status);
    }
    Ok(())
}

fn reset_stage(root: &Path, key: &str, stage: WarmupStage, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let id = runner.resolve(key)?.id;
    let account = runner.reset_stage(id, stage)?;
    if json {
        print_json(&account)?;
    } else {
        println!("{} reset to stage {}", account.username, account.stage());
    }
    Ok(())
}

fn deactivate(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let id = runner.resolve(key)?.id;
    let account = runner.deactivate(id)?;
    if json {
        print_json(&account)?;
    } else {
        println!("Deactivated {}", account.username);
    }
    Ok(())
}
