use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let (_, runner) = super::open_runner(root)?;
    let id = runner.resolve(key)?.id;
    let (account, progress) = runner.progress(id)?;

    if json {
        return print_json(&serde_json::json!({
            "account_id": account.id,
            "username": account.username,
            "status": account.status,
            "progress": progress,
        }));
    }

    println!(
        "{}: stage {} ({}), {}",
        account.username, progress.stage_index, progress.current_stage, account.status
    );
    println!(
        "  age {} days, karma {}, {}/{} actions today",
        progress.age_days, progress.karma, progress.actions_today, progress.daily_cap
    );
    let actions: Vec<String> = progress
        .permitted_actions
        .iter()
        .map(|k| k.to_string())
        .collect();
    if actions.is_empty() {
        println!("  permitted: none");
    } else {
        println!("  permitted: {}", actions.join(", "));
    }
    match &progress.next_stage {
        Some(next) => println!(
            "  next: {} needs {} more days and {} more karma",
            next.stage, next.days_remaining, next.karma_remaining
        ),
        None => println!("  warmup complete"),
    }
    Ok(())
}
