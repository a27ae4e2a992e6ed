// EventScope - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors preserve the causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all EventScope operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum EventScopeError {
    /// A log backend operation failed.
    Backend(BackendError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for EventScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "Backend error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for EventScopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend errors
// ---------------------------------------------------------------------------

/// Errors produced by the log backend (enumeration and record reading).
///
/// The variants mirror the containment taxonomy: `AccessDenied` is
/// swallowed per-log during discovery, `Transient` is skipped per-record
/// during population, `Unavailable` aborts a population with whatever was
/// gathered. Only construction-time failures propagate to callers.
#[derive(Debug)]
pub enum BackendError {
    /// Opening a privileged log without sufficient rights.
    AccessDenied { log_name: String },

    /// The named log does not exist on this machine.
    LogNotFound { log_name: String },

    /// The log exists but cannot currently be read as a whole.
    Unavailable { log_name: String, reason: String },

    /// A single record failed to read or convert; the caller should skip
    /// it and continue.
    Transient { log_name: String, reason: String },

    /// I/O error against the backing store.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl BackendError {
    /// True for the access-denied variant, which discovery swallows
    /// silently for the "Security" log and per-name for traced logs.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessDenied { log_name } => {
                write!(f, "Access denied opening log '{log_name}'")
            }
            Self::LogNotFound { log_name } => {
                write!(f, "Log '{log_name}' does not exist")
            }
            Self::Unavailable { log_name, reason } => {
                write!(f, "Log '{log_name}' is unavailable: {reason}")
            }
            Self::Transient { log_name, reason } => {
                write!(f, "Transient read failure in log '{log_name}': {reason}")
            }
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<BackendError> for EventScopeError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for EventScopeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for EventScope results.
pub type Result<T> = std::result::Result<T, EventScopeError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn backend_errors_preserve_the_causal_chain() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let backend = BackendError::Io {
            path: PathBuf::from("/var/log/channel.evtx"),
            operation: "open",
            source: io,
        };
        let top = EventScopeError::from(backend);

        assert!(top.to_string().starts_with("Backend error:"));
        let cause = top.source().expect("backend cause");
        assert!(cause.source().is_some(), "io cause preserved");
    }

    #[test]
    fn access_denied_is_distinguishable() {
        let denied = BackendError::AccessDenied {
            log_name: "Security".to_string(),
        };
        assert!(denied.is_access_denied());
        assert!(denied.to_string().contains("Security"));

        let transient = BackendError::Transient {
            log_name: "System".to_string(),
            reason: "hiccup".to_string(),
        };
        assert!(!transient.is_access_denied());
    }

    #[test]
    fn config_errors_wrap_into_the_top_level_type() {
        let io = io::Error::new(io::ErrorKind::NotFound, "missing");
        let config = ConfigError::Io {
            path: PathBuf::from("config.toml"),
            source: io,
        };
        let top: EventScopeError = config.into();
        assert!(top.to_string().starts_with("Configuration error:"));
        assert!(top.source().is_some());
    }
}
