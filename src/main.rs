mod db;
mod forecast;
mod format;
mod import;
mod models;
mod month;
mod report;
mod run;


use anyhow::{Context, Result};

/// Runtime configuration, resolved once at startup. The timezone anchors
/// every date-boundary computation; the wrong anchor shifts which day an
/// expense or report belongs to.
pub(crate) struct Config {
    pub(crate) tz: chrono_tz::Tz,
    pub(crate) users: Vec<i64>,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cfg = resolve_config()?;
    let db_path = get_db_path()?;
    let mut db = db::Database::open(&db_path)?;

    match args.len() {
        1 => {
            eprintln!("Usage: safespend <command> (try 'safespend help')");
            Ok(())
        }
        2.. => run::as_cli(&args, &mut db, &cfg),
        _ => Ok(()),
    }
}

fn resolve_config() -> Result<Config> {
    let tz_name = std::env::var("SAFESPEND_TZ").unwrap_or_else(|_| "Europe/Warsaw".into());
    let tz: chrono_tz::Tz = tz_name
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown timezone: {tz_name}"))?;

    let users = std::env::var("SAFESPEND_USERS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect();

    Ok(Config { tz, users })
}

fn get_db_path() -> Result<std::path::PathBuf> {
    if let Ok(path) = std::env::var("SAFESPEND_DB") {
        return Ok(std::path::PathBuf::from(path));
    }
    let proj_dirs = directories::ProjectDirs::from("com", "safespend", "SafeSpend")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("safespend.db"))
}
