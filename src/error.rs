use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: ApiError,
    },
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Interactive input required for {command}, but --no-input is set")]
    InputRequired { command: String },
}

/// Failure of a single request against the Fiken API.
///
/// Every variant carries the endpoint path so that messages can name the call
/// that failed. Callers match on the variant to decide whether a retry makes
/// sense; nothing in the client retries on its own.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fiken API error {status}: {}", api_detail(.status_text, .body))]
    Api {
        endpoint: String,
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("decoding response from {endpoint}: {source} (body: {excerpt})")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },
    #[error("encoding request for {endpoint}: {source}")]
    Encode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to create HTTP client: {0}")]
    ClientInit(String),
}

fn api_detail<'a>(status_text: &'a str, body: &'a str) -> &'a str {
    if body.is_empty() { status_text } else { body }
}

impl ApiError {
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiError::Transport { endpoint, .. }
            | ApiError::Api { endpoint, .. }
            | ApiError::Decode { endpoint, .. }
            | ApiError::Encode { endpoint, .. } => Some(endpoint),
            ApiError::ClientInit(_) => None,
        }
    }

    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { source, .. } if source.is_timeout())
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no token found. Run 'fiken auth token <token>' to set up authentication")]
    NoToken,
    #[error("token cannot be empty")]
    EmptyToken,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Keyring error: {0}")]
    KeyringError(String),
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration save failed: {message}")]
    ConfigSaveFailed { message: String },
    #[error("Configuration parse error at {path}: {message}")]
    ConfigParseError { path: String, message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown configuration key '{key}'")]
    UnknownKey { key: String },
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("no companies found on this account")]
    NoCompanies,
    #[error("multiple companies found. Use --company to select one:\n{choices}")]
    AmbiguousCompany { choices: String },
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("JSON output failed: {0}")]
    Json(String),
    #[error("Terminal output error: {0}")]
    TerminalOutput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

/// Attach a command-level operation name to API failures.
pub trait OperationContext<T> {
    fn operation(self, operation: &str) -> Result<T, AppError>;
}

impl<T> OperationContext<T> for Result<T, ApiError> {
    fn operation(self, operation: &str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Operation {
            operation: operation.to_string(),
            source,
        })
    }
}

impl AppError {
    /// The underlying API failure, if this error came from a request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AppError::Api(e) | AppError::Operation { source: e, .. } => Some(e),
            _ => None,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if let Some(api_error) = self.api_error() {
            return match api_error {
                ApiError::Api { status: 401 | 403, .. } => ErrorSeverity::High,
                ApiError::Api { status, .. } if *status >= 500 => ErrorSeverity::High,
                ApiError::ClientInit(_) => ErrorSeverity::Critical,
                _ => ErrorSeverity::Medium,
            };
        }
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Auth(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Display(_) => ErrorSeverity::Low,
            AppError::Api(_) | AppError::Operation { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn display_friendly(&self) -> String {
        match self {
            AppError::Auth(AuthError::NoToken) => "No API token configured".to_string(),
            AppError::Operation {
                operation,
                source: ApiError::Api { status: 401, .. },
            } => format!("{}: token is invalid or expired", operation),
            _ => format!("{}", self),
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Auth(AuthError::NoToken) => {
                Some("'fiken auth token <token>' to store a personal API token".to_string())
            }
            AppError::Config(ConfigError::AmbiguousCompany { .. }) => {
                Some("'fiken companies default <slug>' to set a default company".to_string())
            }
            _ => match self.api_error() {
                Some(ApiError::Api { status: 401, .. }) => {
                    Some("'fiken auth token <token>' to replace the stored token".to_string())
                }
                Some(e) if e.is_timeout() => {
                    Some("Check your internet connection and try again".to_string())
                }
                _ => None,
            },
        }
    }
}
