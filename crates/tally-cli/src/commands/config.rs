use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tally_config::ConfigManager;
use tokio::runtime::Runtime;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Initialize config file at ~/.tally/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show config file path
    Path,

    /// Print the effective configuration as TOML
    Show,

    /// Validate config file
    Validate,
}

pub fn handle_config_command(cmd: ConfigCommand, config: Option<&Path>) -> Result<()> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        match cmd {
            ConfigCommand::Init { force } => init_config(config, force).await,
            ConfigCommand::Path => show_config_path(config),
            ConfigCommand::Show => show_config(config).await,
            ConfigCommand::Validate => validate_config(config).await,
        }
    })
}

fn resolve_path(config: Option<&Path>) -> Result<PathBuf> {
    match config {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ConfigManager::config_path()?),
    }
}

async fn init_config(config: Option<&Path>, force: bool) -> Result<()> {
    let config_path = resolve_path(config)?;

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("To reinitialize, run 'tally config init --force'.");
        return Ok(());
    }

    ConfigManager::init_at(&config_path)
        .await
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    println!("✓ Initialized config at: {}", config_path.display());
    Ok(())
}

fn show_config_path(config: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config)?.display());
    Ok(())
}

async fn show_config(config: Option<&Path>) -> Result<()> {
    let manager = ConfigManager::load_or_default(config)
        .await
        .context("Failed to load config")?;

    let toml_str =
        toml::to_string_pretty(manager.config()).context("Failed to serialize config")?;
    println!("# {}", manager.path().display());
    print!("{}", toml_str);
    Ok(())
}

async fn validate_config(config: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(config)?;
    let manager = ConfigManager::load_from(&config_path)
        .await
        .context("Config not found or invalid. Run 'tally config init' first.")?;

    manager.config().validate().context("Config is invalid")?;

    let registry = &manager.config().registry;
    println!("✓ Config is valid");
    println!("  Version: {}", manager.config().version);
    println!("  Registry: {}", registry.registry_url);
    println!("  Downloads: {}", registry.downloads_url);
    println!(
        "  Limits: {} concurrent, {} req/s, {}s timeout",
        registry.max_concurrent_requests,
        registry.requests_per_second,
        registry.request_timeout_secs
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_validate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        init_config(Some(&path), false).await.unwrap();
        assert!(path.exists());
        validate_config(Some(&path)).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_keeps_existing_file_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[registry]\nrequests_per_second = 2\n").unwrap();

        init_config(Some(&path), false).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("requests_per_second = 2"));

        init_config(Some(&path), true).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("requests_per_second = 10"));
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[registry]\nmax_concurrent_requests = 0\n").unwrap();

        assert!(validate_config(Some(&path)).await.is_err());
    }
}
