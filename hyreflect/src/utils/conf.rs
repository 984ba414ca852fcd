use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    magic::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENV_CONFIG_PATH},
    utils::error::{ReflectError, ReflectResult},
};

/// Tunables of class declaration and of the class registry.
///
/// Every field has a default, so a configuration file only needs to list the
/// keys it overrides:
///
/// ```toml
/// strict_writable_override = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectConfig {
    /// Reject an explicit `.writable(..)` on a property that has no setter.
    ///
    /// When `false` such an override is dropped with a warning and the property
    /// stays read-only.
    pub strict_writable_override: bool,

    /// Allow [`ClassRegistry::class_by_type`](crate::registry::ClassRegistry::class_by_type)
    /// to run a declaration submitted with [`declare_class!`](crate::declare_class)
    /// the first time the type is looked up.
    pub auto_declare: bool,

    /// Fail when a type or a class name is registered twice. When `false` the
    /// first registration is kept and later ones are ignored.
    pub reject_duplicate_classes: bool,
}

impl Default for ReflectConfig {
    fn default() -> Self {
        Self {
            strict_writable_override: false,
            auto_declare: true,
            reject_duplicate_classes: true,
        }
    }
}

impl ReflectConfig {
    /// Get the default path to the configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
        }

        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        path
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> ReflectResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;

        toml::from_str(&toml_str).map_err(|e| ReflectError::ConfigParse {
            source: e,
            file: path.display().to_string(),
        })
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save_to_toml(&self, path: &Path) -> ReflectResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| {
            ReflectError::Io(std::io::Error::other(format!(
                "failed to serialize configuration for `{}`: {}",
                path.display(),
                e
            )))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Load the configuration from [`Self::default_path`], or fall back to the
    /// defaults when the file is missing or invalid.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.is_file() {
            return Self::default();
        }

        match Self::load_from_toml(&path) {
            Ok(config) => {
                debug!("loaded reflection configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("ignoring reflection configuration: {}", e);
                Self::default()
            }
        }
    }
}
