//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/shelftree/shelftree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `SHELFTREE_*` prefix, `__` for nested keys

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

const APP_NAME: &str = "shelftree";

/// Import behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportSettings {
    /// Skip the first line of an imported file
    pub has_header: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self { has_header: true }
    }
}

/// Effective application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name of the root category
    pub root_name: String,
    /// Snapshot file loaded at start and saved after changes
    pub catalog_file: PathBuf,
    pub import: ImportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_name: "Library".into(),
            catalog_file: default_catalog_file(),
            import: ImportSettings::default(),
        }
    }
}

/// `<XDG data dir>/shelftree/catalog.csv`, or `./catalog.csv` without a home.
fn default_catalog_file() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("catalog.csv"))
        .unwrap_or_else(|| PathBuf::from("catalog.csv"))
}

/// Get the XDG config directory for shelftree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Load settings from all layers.
    ///
    /// An explicit `config_file` must exist; the global file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), config_file)
    }

    /// Load with an explicit global file location.
    pub fn load_from(
        global: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("root_name", defaults.root_name.clone())
            .map_err(config_err)?
            .set_default(
                "catalog_file",
                defaults.catalog_file.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default("import.has_header", defaults.import.has_header)
            .map_err(config_err)?;

        if let Some(global_path) = global {
            builder = builder.add_source(File::from(global_path).required(false));
        }
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("SHELFTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Highest precedence: the `--catalog` flag.
    pub fn with_catalog_file(mut self, catalog_file: Option<&Path>) -> Self {
        if let Some(path) = catalog_file {
            self.catalog_file = path.to_path_buf();
            self.expand_paths();
        }
        self
    }

    fn expand_paths(&mut self) {
        let expanded = expand_path(self.catalog_file.to_string_lossy().as_ref());
        self.catalog_file = PathBuf::from(expanded);
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_root_is_library() {
        let settings = Settings::default();
        assert_eq!(settings.root_name, "Library");
        assert!(settings.import.has_header);
        assert!(settings.catalog_file.ends_with("catalog.csv"));
    }

    #[test]
    fn given_tilde_in_catalog_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            catalog_file: PathBuf::from("~/books.csv"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.catalog_file.to_string_lossy();
        assert!(path.starts_with(&home), "should start with home: {}", path);
        assert!(!path.contains('~'));
    }

    #[test]
    fn given_catalog_flag_when_applied_then_overrides_file() {
        let settings = Settings::default().with_catalog_file(Some(Path::new("/tmp/x.csv")));
        assert_eq!(settings.catalog_file, PathBuf::from("/tmp/x.csv"));
    }
}
