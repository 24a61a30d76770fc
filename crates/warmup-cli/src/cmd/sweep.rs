use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use warmup_core::sweep::Sweeper;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, runner) = super::open_runner(root)?;
    let report = Sweeper::new(&runner, &config.sweep)
        .advance_all()
        .context("sweep failed")?;

    if json {
        return print_json(&report);
    }

    println!(
        "Processed {} accounts: {} advanced, {} fully warmed",
        report.processed, report.advanced, report.fully_warmed
    );
    for (stage, count) in &report.stages {
        println!("  {stage:<11} {count}");
    }
    for failure in &report.errors {
        eprintln!("  failed: {} ({})", failure.username, failure.error);
    }
    Ok(())
}
