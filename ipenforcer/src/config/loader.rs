//! Configuration file discovery and loading.

use crate::config::environment::EnvironmentConfig;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ipenforcer.yaml";

/// Where the active configuration came from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path of the file, `None` for built-in defaults.
    pub path: Option<PathBuf>,
    /// Parsed configuration.
    pub config: Config,
}

/// Loads configuration files.
///
/// # Examples
///
/// ```no_run
/// use ipenforcer::config::ConfigLoader;
/// use std::path::Path;
///
/// let source = ConfigLoader::load(None, Path::new(".")).unwrap();
/// match source.path {
///     Some(path) => println!("using {}", path.display()),
///     None => println!("using built-in defaults"),
/// }
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Locate and parse the configuration.
    ///
    /// An explicit path must exist. Without one, `ipenforcer.yaml` in
    /// `working_dir` is used if present, otherwise built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<ConfigSource> {
        if let Some(path) = explicit {
            return Ok(ConfigSource {
                path: Some(path.to_path_buf()),
                config: Self::load_file(path)?,
            });
        }

        let discovered = working_dir.join(DEFAULT_CONFIG_FILE);
        if discovered.exists() {
            log::debug!("discovered configuration path={}", discovered.display());
            return Ok(ConfigSource {
                config: Self::load_file(&discovered)?,
                path: Some(discovered),
            });
        }

        Ok(ConfigSource {
            path: None,
            config: Config::default(),
        })
    }

    /// Load the configuration, apply environment overrides, and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails, an override is malformed, or the
    /// result does not validate.
    pub fn load_effective(explicit: Option<&Path>, working_dir: &Path) -> Result<ConfigSource> {
        let mut source = Self::load(explicit, working_dir)?;
        EnvironmentConfig::apply_overrides(&mut source.config)?;
        ConfigValidator::validate(&source.config)?;
        Ok(source)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read configuration file {}: {e}", path.display()),
            ))
        })?;

        Ok(serde_yaml::from_str(&contents)?)
    }
}
