use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

const APP_DIR: &str = ".iris-diary";

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(APP_DIR))
    }

    /// Load `config.toml` from `app_dir`, writing defaults on first run.
    pub fn load_or_init_in(app_dir: &Path) -> Result<Self> {
        let config_path = app_dir.join("config.toml");
        let workspace_dir = app_dir.join("workspace");

        if !workspace_dir.exists() {
            fs::create_dir_all(&workspace_dir).with_context(|| {
                format!("Failed to create workspace directory: {}", workspace_dir.display())
            })?;
        }

        let config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(ConfigError::from)
                .context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(e.to_string()))
                .context("Failed to parse config file")?;
            config.config_path = config_path;
            config.workspace_dir = workspace_dir;
            config
        } else {
            let config = Self {
                config_path,
                workspace_dir,
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.validate().context("Invalid config")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
