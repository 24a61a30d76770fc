use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use warmup_core::{
    config::{Config, WarnLevel},
    stage,
};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,
    /// Show the stage table with the configured daily caps
    Stages,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::Stages => stages(root, json),
    }
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

fn stages(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        let rows: Vec<_> = stage::table()
            .iter()
            .map(|req| {
                serde_json::json!({
                    "stage": req.stage,
                    "index": req.stage.index(),
                    "min_age_days": req.min_age_days,
                    "min_karma": req.min_karma,
                    "actions": req.actions,
                    "daily_cap": config.limits.daily_cap(req.stage),
                })
            })
            .collect();
        return print_json(&rows);
    }

    let rows = stage::table()
        .iter()
        .map(|req| {
            vec![
                req.stage.index().to_string(),
                req.stage.to_string(),
                req.min_age_days.to_string(),
                req.min_karma.to_string(),
                config.limits.daily_cap(req.stage).to_string(),
                req.actions
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            ]
        })
        .collect();
    print_table(&["#", "STAGE", "DAYS", "KARMA", "CAP", "ACTIONS"], rows);
    Ok(())
}
