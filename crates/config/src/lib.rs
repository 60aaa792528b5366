//! Layered configuration for the `comix` command.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. built-in defaults,
//! 2. `config.toml` in the platform configuration directory, if present,
//! 3. a file named on the command line,
//! 4. `COMIX_*` environment variables, with `__` separating nested keys
//!    (`COMIX_TOOLS__RAR=/opt/rar/rar`).
//!
//! ```toml
//! output = "cbz"
//!
//! [tools]
//! rar = "/opt/rar/rar"
//! unrar = "/opt/rar/unrar"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use comix_container::{Format, Tools};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "COMIX_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default target format for conversions.
    pub output: Option<String>,
    pub tools: ToolsConfig,
}

/// Explicit archiver locations; unset ones are searched for on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub rar: Option<PathBuf>,
    pub unrar: Option<PathBuf>,
}

impl Config {
    /// Load from every source, with `explicit` (if given) taking precedence
    /// over the user's configuration file.
    ///
    /// # Errors
    /// Raises [`ErrorKind::Load`] if `explicit` does not exist or a source
    /// cannot be parsed, and [`ErrorKind::Invalid`] for unacceptable values.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut files = Vec::new();
        if let Some(user) = user_config_file() {
            files.push(user);
        }
        if let Some(explicit) = explicit {
            if !explicit.is_file() {
                tracing::error!(path = %explicit.display(), "Configuration file does not exist");
                exn::bail!(ErrorKind::Load);
            }
            files.push(explicit.to_path_buf());
        }
        Self::from_files(&files)
    }

    /// Merge defaults, the given files (missing ones are skipped) and the
    /// environment.
    pub fn from_files(files: &[PathBuf]) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        for file in files {
            tracing::debug!(path = %file.display(), exists = file.is_file(), "Configuration file");
            figment = figment.merge(Toml::file(file));
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract().or_raise(|| ErrorKind::Load)?;
        config.output_format()?;
        Ok(config)
    }

    /// The configured default output format, if any.
    pub fn output_format(&self) -> Result<Option<Format>> {
        match &self.output {
            Some(output) => {
                let format = output.parse::<Format>().or_raise(|| ErrorKind::Invalid(format!("output = {output:?}")))?;
                Ok(Some(format))
            },
            None => Ok(None),
        }
    }

    pub fn tools(&self) -> Tools {
        Tools { rar: self.tools.rar.clone(), unrar: self.tools.unrar.clone() }
    }
}

/// `config.toml` in the platform configuration directory, whether it exists
/// or not.
pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "comix").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
