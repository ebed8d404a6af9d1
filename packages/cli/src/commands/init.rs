use crate::config::DEFAULT_STORE_DIR;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use vitae_editor::{SessionConfig, DEFAULT_CONFIG_NAME};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Debounce delay in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Periodic save interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Vitae workspace...".bright_blue().bold());

    let store_dir = cwd.join(DEFAULT_STORE_DIR);
    if !store_dir.exists() {
        fs::create_dir_all(&store_dir)?;
        println!("  {} Created {}/", "✓".green(), DEFAULT_STORE_DIR);
    }

    let mut config = SessionConfig::default();
    if let Some(debounce_ms) = args.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    if let Some(interval_ms) = args.interval_ms {
        // Keep the periodic threshold just under the interval.
        config.periodic_interval_ms = interval_ms;
        config.periodic_threshold_ms = interval_ms.saturating_sub(1_000).max(interval_ms / 2);
    }
    config.validate()?;

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✨ Ready!".green().bold());
    println!("Create a document with: {}", "vitae new --title \"My Resume\"".cyan());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            debounce_ms: Some(500),
            interval_ms: Some(10_000),
            force: false,
        };
        init(args, dir.path()).unwrap();

        let config = SessionConfig::load(dir.path()).unwrap();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.periodic_interval_ms, 10_000);
        assert_eq!(config.periodic_threshold_ms, 9_000);
        assert!(dir.path().join(DEFAULT_STORE_DIR).is_dir());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{}").unwrap();

        let args = InitArgs {
            debounce_ms: Some(500),
            interval_ms: None,
            force: false,
        };
        init(args, dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(DEFAULT_CONFIG_NAME)).unwrap();
        assert_eq!(content, "{}");
    }
}
