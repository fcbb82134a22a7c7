use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationInvalidArgument,

    ConfigMissingKey,

    EnvMissingKey,
    EnvTypeCoercion,
    EnvMalformedLine,

    CommandFailed,
    TransferFailed,
    SshConnectFailed,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::ConfigMissingKey => "config.missing_key",

            ErrorCode::EnvMissingKey => "env.missing_key",
            ErrorCode::EnvTypeCoercion => "env.type_coercion",
            ErrorCode::EnvMalformedLine => "env.malformed_line",

            ErrorCode::CommandFailed => "command.failed",
            ErrorCode::TransferFailed => "transfer.failed",
            ErrorCode::SshConnectFailed => "ssh.connect_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMissingKeyDetails {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvMissingKeyDetails {
    pub key: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvTypeCoercionDetails {
    pub key: String,
    pub value: String,
    pub expected: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvMalformedLineDetails {
    pub source: String,
    pub line_number: usize,
    pub line: String,
}

/// Where a command ran: the local machine or a named remote host.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub target: TargetDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFailedDetails {
    pub source: String,
    pub destination: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConnectFailedDetails {
    pub host: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    /// Exit status of the underlying command, when the error wraps one.
    /// Surfaced as the process exit code for fail-fast step failures.
    pub exit_status: Option<i32>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            exit_status: None,
        }
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            value,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn config_missing_key(key: impl Into<String>) -> Self {
        let key = key.into();
        let details = to_details(ConfigMissingKeyDetails { key: key.clone() });
        Self::new(
            ErrorCode::ConfigMissingKey,
            format!("Configuration key '{}' not set", key),
            details,
        )
        .with_hint(format!("Pass --{} or set a default for it", key))
    }

    pub fn env_missing_key(key: impl Into<String>, source: impl Into<String>) -> Self {
        let key = key.into();
        let details = to_details(EnvMissingKeyDetails {
            key: key.clone(),
            source: source.into(),
        });
        Self::new(
            ErrorCode::EnvMissingKey,
            format!("Key '{}' not present in environment file", key),
            details,
        )
    }

    pub fn env_type_coercion(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
        source: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let details = to_details(EnvTypeCoercionDetails {
            key: key.clone(),
            value: value.into(),
            expected: expected.to_string(),
            source: source.into(),
        });
        Self::new(
            ErrorCode::EnvTypeCoercion,
            format!("Value for '{}' is not a valid {}", key, expected),
            details,
        )
    }

    pub fn env_malformed_line(
        source: impl Into<String>,
        line_number: usize,
        line: impl Into<String>,
    ) -> Self {
        let details = to_details(EnvMalformedLineDetails {
            source: source.into(),
            line_number,
            line: line.into(),
        });
        Self::new(
            ErrorCode::EnvMalformedLine,
            format!("Malformed line {} in environment file", line_number),
            details,
        )
    }

    pub fn command_failed(details: CommandFailedDetails) -> Self {
        let exit_code = details.exit_code;
        let mut err = Self::new(ErrorCode::CommandFailed, "Command failed", to_details(details));
        err.exit_status = Some(exit_code);
        err
    }

    pub fn transfer_failed(
        source: impl Into<String>,
        destination: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let details = to_details(TransferFailedDetails {
            source: source.into(),
            destination: destination.into(),
            error: error.into(),
        });
        Self::new(ErrorCode::TransferFailed, "File transfer failed", details)
    }

    pub fn ssh_connect_failed(host: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(SshConnectFailedDetails {
            host: host.into(),
            error: error.into(),
        });
        Self::new(
            ErrorCode::SshConnectFailed,
            "Unable to establish SSH session",
            details,
        )
        .with_hint("Check that the host is reachable and your SSH agent is running")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });
        Self::new(ErrorCode::InternalIoError, "I/O error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });
        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }
}
