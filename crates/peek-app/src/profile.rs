use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use peek_config::Config;
use serde::{Deserialize, Serialize};

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Profiles live as `<root>/profiles/<name>.json`
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `<config dir>/peek`, e.g. `~/.config/peek` or `%APPDATA%\peek`
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().context("No per-user config directory")?;
        Ok(Self::new(config_dir.join("peek")))
    }

    fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}.json"))
    }

    /// Create the profiles folder and a main profile if missing
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.profiles_dir())
            .with_context(|| format!("Failed to create {}", self.profiles_dir().display()))?;

        let main_profile = self.profile_path("main");
        if !main_profile.exists() {
            let profile = Profile {
                name: "main".into(),
                value: Config::default(),
            };
            fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
            tracing::info!("Created main profile at {}", main_profile.display());
        }

        Ok(())
    }

    /// Load a profile by name, falling back to main, then to defaults
    pub fn load(&self, name: &str) -> Result<Config> {
        let profile_file = self.profile_path(name);
        if profile_file.exists() {
            return read_profile(&profile_file);
        }

        tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
        let main_file = self.profile_path("main");
        if main_file.exists() {
            read_profile(&main_file)
        } else {
            Ok(Config::default())
        }
    }

    /// Add a new profile cloned from main
    pub fn add_from_main(&self, new_name: &str) -> Result<PathBuf> {
        let profile = Profile {
            name: new_name.into(),
            value: self.load("main")?,
        };
        let file = self.profile_path(new_name);
        fs::write(&file, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created new profile: {new_name}");
        Ok(file)
    }
}

fn read_profile(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("Invalid profile {}", path.display()))?;
    Ok(profile.value)
}

/// Bare `Config` JSON, as passed with `--config`
pub fn load_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid config {}", path.display()))
}
