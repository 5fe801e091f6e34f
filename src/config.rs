//! Configuration for kubetop
//!
//! Optional defaults live in `~/.kubetop/config.toml`. Command-line flags
//! always win over the file, and the file wins over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::output::OutputFormat;

/// Namespace used when neither the flag nor the config file sets one
pub const DEFAULT_NAMESPACE: &str = "default";

/// kubetop configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the kubeconfig file
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,

    /// Namespace to query
    pub namespace: Option<String>,

    /// Report format
    pub output: Option<OutputFormat>,
}

impl Config {
    /// Load the config file.
    ///
    /// An explicit path must exist. The default path is optional and a
    /// missing file yields the default config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and parse a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path (~/.kubetop/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kubetop").join("config.toml"))
    }
}

/// Default kubeconfig location: `$HOME/.kube/config`, falling back to
/// `%USERPROFILE%` when `HOME` is unset.
pub fn default_kubeconfig_path(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let home = env("HOME")
        .filter(|h| !h.is_empty())
        .or_else(|| env("USERPROFILE").filter(|h| !h.is_empty()))?;
    Some(PathBuf::from(home).join(".kube").join("config"))
}

/// Pick the kubeconfig path: flag, then config file, then the default
/// location if that file exists. `None` means infer from the environment.
pub fn resolve_kubeconfig(
    flag: Option<PathBuf>,
    config: &Config,
    default_path: Option<PathBuf>,
) -> Option<PathBuf> {
    flag.or_else(|| config.kubeconfig.clone())
        .or_else(|| default_path.filter(|p| p.exists()))
}
