use crate::output::{print_json, print_table};
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;

pub fn run(root: &Path, account: Option<&str>, limit: usize, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let filter = account.map(|key| runner.resolve(key)).transpose()?.map(|a| a.id);
    let entries = runner
        .repo()
        .list_activity(filter, limit)
        .context("failed to read activity log")?;

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No activity.");
        return Ok(());
    }

    let names: HashMap<_, _> = runner
        .repo()
        .list()?
        .into_iter()
        .map(|a| (a.id, a.username))
        .collect();
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                names
                    .get(&e.account_id)
                    .cloned()
                    .unwrap_or_else(|| e.account_id.to_string()),
                e.activity_type.to_string(),
                e.details.to_string(),
            ]
        })
        .collect();
    print_table(&["TIME", "ACCOUNT", "TYPE", "DETAILS"], rows);
    Ok(())
}
