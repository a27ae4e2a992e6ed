// EventScope - platform/config.rs
//
// Platform-specific configuration: data directory resolution and
// config.toml loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for EventScope configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/eventscope/ or
    /// %APPDATA%\EventScope\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of the configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[viewer]` section.
    pub viewer: ViewerSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[viewer]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    /// Entries appended to the display window per read request.
    pub read_batch_size: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level ("error", "warn", "info", "debug", "trace").
    pub level: Option<String>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub read_batch_size: usize,
    pub log_level: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            read_batch_size: constants::DEFAULT_READ_BATCH_SIZE,
            log_level: None,
        }
    }
}

/// Load and validate config.toml from `path`.
///
/// A missing file is not an error: defaults apply. Out-of-range values are
/// clamped into the named-constant bounds, with the clamp reported in the
/// returned warnings rather than failing startup.
pub fn load_config(path: &Path) -> Result<(ViewerConfig, Vec<String>), ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(text) => toml::from_str::<RawConfig>(&text).map_err(|e| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source: e,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            RawConfig::default()
        }
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let mut warnings = Vec::new();
    let mut config = ViewerConfig::default();

    if let Some(size) = raw.viewer.read_batch_size {
        let clamped = size.clamp(
            constants::MIN_READ_BATCH_SIZE,
            constants::MAX_READ_BATCH_SIZE,
        );
        if clamped != size {
            warnings.push(format!(
                "viewer.read_batch_size = {size} clamped to {clamped} \
                 (allowed range {}..={})",
                constants::MIN_READ_BATCH_SIZE,
                constants::MAX_READ_BATCH_SIZE
            ));
        }
        config.read_batch_size = clamped;
    }

    if let Some(level) = raw.logging.level {
        match level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => config.log_level = Some(level),
            other => warnings.push(format!(
                "logging.level = '{other}' is not a known level, ignored"
            )),
        }
    }

    Ok((config, warnings))
}

// =============================================================================
// Tests
// =============================================================================
