//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fleetwatch_config::ConfigError;
use fleetwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERSISTENCE: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

/// Upstream code for a rejected API key.
const INVALID_API_KEY: i64 = 10;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the tracking API at {url}")]
    #[diagnostic(
        code(fleetwatch::connection_failed),
        help(
            "Check the base URL and your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out{}", timeout_suffix(*.seconds))]
    #[diagnostic(
        code(fleetwatch::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout { seconds: Option<u64> },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The tracking API rejected the API key")]
    #[diagnostic(
        code(fleetwatch::auth_failed),
        help(
            "Check the key for profile '{profile}'.\n\
             Pass one with --api-key or set FLEETWATCH_API_KEY."
        )
    )]
    AuthFailed { profile: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(fleetwatch::no_credentials),
        help(
            "Pass one with --api-key, set FLEETWATCH_API_KEY,\n\
             or add api_key / api_key_env to the profile in the config file."
        )
    )]
    NoCredentials { profile: String },

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(fleetwatch::api_error))]
    ApiError { code: i64, message: String },

    #[error("Unexpected response from the tracking API: {message}")]
    #[diagnostic(code(fleetwatch::malformed_response))]
    MalformedResponse { message: String },

    #[error("Poll failed: {message}")]
    #[diagnostic(code(fleetwatch::poll_failed), help("Run with -v for request details."))]
    PollFailed { message: String },

    // ── Persistence ──────────────────────────────────────────────────
    #[error("Persistence unavailable: {message}")]
    #[diagnostic(code(fleetwatch::persistence))]
    Persistence {
        message: String,
        #[help]
        remediation: Option<String>,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fleetwatch::not_found),
        help("Run: fleetwatch {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fleetwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Config file: {path}"
        )
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(fleetwatch::config))]
    Config { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(fleetwatch::internal))]
    Internal { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Persistence { .. } => exit_code::PERSISTENCE,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Upstream { code, .. } if code == INVALID_API_KEY => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Upstream { message, code } => CliError::ApiError { code, message },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::PersistenceUnavailable {
                message,
                remediation,
            } => CliError::Persistence {
                message,
                remediation,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Shutdown => CliError::Internal {
                message: "the poll loop has already stopped".into(),
            },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

fn timeout_suffix(seconds: Option<u64>) -> String {
    seconds.map_or_else(String::new, |secs| format!(" after {secs}s"))
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "client" => "clients list",
        "unit" => "units",
        _ => "alarms",
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
                path: fleetwatch_config::config_path().display().to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_key_is_an_auth_failure() {
        let err = CliError::from(CoreError::Upstream {
            message: "Invalid API key".into(),
            code: INVALID_API_KEY,
        });
        assert!(matches!(err, CliError::AuthFailed { .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn timeout_without_known_limit_names_no_duration() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: None });
        assert_eq!(err.to_string(), "Request timed out");
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);

        let err = CliError::from(CoreError::Timeout {
            timeout_secs: Some(15),
        });
        assert_eq!(err.to_string(), "Request timed out after 15s");
    }

    #[test]
    fn persistence_keeps_remediation_as_help() {
        let err = CliError::from(CoreError::PersistenceUnavailable {
            message: "store not configured".into(),
            remediation: Some("set FLEETWATCH_STORE_TOKEN".into()),
        });
        assert_eq!(err.exit_code(), exit_code::PERSISTENCE);
        let help = err.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("set FLEETWATCH_STORE_TOKEN"));
    }

    #[test]
    fn missing_client_points_at_clients_list() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "client".into(),
            identifier: "9".into(),
        });
        let CliError::NotFound { list_command, .. } = &err else {
            panic!("expected not found");
        };
        assert_eq!(list_command, "clients list");
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
