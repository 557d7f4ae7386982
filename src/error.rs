use thiserror::Error;

/// Result type alias for catalog-sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Category of a failed catalog fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 4xx
    Client,
    /// HTTP 5xx
    Server,
    /// Transport failure (DNS, connection refused or reset)
    Network,
    /// Request exceeded the configured deadline
    Timeout,
    /// 2xx response whose body is not a valid catalog payload
    InvalidResponse,
}

/// A categorized failure from the Catalog Service.
///
/// Cloneable so the orchestrator can keep the last error in its state
/// while also handing it to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request malformed or resource not found
    #[error("Client error (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    /// Upstream failure
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Transport-level failure
    #[error("Network request failed: {0}")]
    Network(String),

    /// Deadline exceeded
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Body did not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Build the right variant for a non-2xx status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400..=499 => Self::Client { status, message },
            500.. => Self::Server { status, message },
            _ => Self::InvalidResponse(format!("Unexpected HTTP {status}: {message}")),
        }
    }

    /// Categorize a transport error from reqwest
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Client { .. } => ErrorKind::Client,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// HTTP status, when the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the HTTP client may try the request again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Server | ErrorKind::Network | ErrorKind::Timeout
        )
    }

    /// Short message suitable for a storefront banner
    pub fn user_message(&self) -> String {
        match self {
            Self::Client { status: 404, .. } => "Catalog not found".to_string(),
            Self::Client { message, .. } if message.is_empty() => {
                "Client error: Bad Request".to_string()
            }
            Self::Client { message, .. } => format!("Client error: {message}"),
            Self::Server { .. } => "Server error. Please try again later.".to_string(),
            Self::Network(_) => "Network error. Please check your connection.".to_string(),
            Self::Timeout(_) => "Request timed out. Please try again.".to_string(),
            Self::InvalidResponse(_) => "An unexpected error occurred".to_string(),
        }
    }
}

/// Persisted slot could not be read or parsed.
///
/// Only ever logged: the store reports it to callers as a miss.
#[derive(Error, Debug)]
pub enum CacheReadError {
    #[error("failed to read cache slot: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt cache slot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors that can occur during catalog-sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Catalog Service request failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to write config file: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

impl SyncError {
    /// The fetch failure behind this error, if any
    pub fn as_fetch(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Fetch(err) => match err.kind() {
                ErrorKind::Client => 3,
                ErrorKind::Server | ErrorKind::InvalidResponse => 4,
                ErrorKind::Network | ErrorKind::Timeout => 5,
            },
            Self::Config(_) | Self::Toml(_) | Self::TomlSerialize(_) => 2,
            Self::InvalidArgument(_) => 64,
            _ => 1,
        }
    }
}
