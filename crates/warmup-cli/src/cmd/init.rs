use anyhow::Context;
use std::path::Path;
use warmup_core::{config::Config, io, paths, store::AccountDb};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing warmup in: {}", root.display());

    let dir = paths::warmup_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let yaml = Config::default().to_yaml()?;
    let created = io::create_if_missing(&paths::config_path(root), yaml.as_bytes())
        .context("failed to write config.yaml")?;
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let existed = paths::db_path(root).exists();
    AccountDb::open(&paths::db_path(root)).context("failed to create account store")?;
    if existed {
        println!("  exists:  {}", paths::DB_FILE);
    } else {
        println!("  created: {}", paths::DB_FILE);
    }

    Ok(())
}
