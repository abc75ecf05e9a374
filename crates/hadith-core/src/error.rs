use thiserror::Error;

/// How the verification client should react to a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Quota or rate limiting (HTTP 429 / `RESOURCE_EXHAUSTED`)
    RateLimited,
    /// Model or resource missing (HTTP 404 / `NOT_FOUND`)
    NotFound,
    /// Anything else, surfaced immediately
    Fatal,
}

impl RetryClass {
    pub fn is_retryable(self) -> bool {
        !matches!(self, RetryClass::Fatal)
    }
}

/// Errors from a single call to the generative backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Quota exceeded: {message}")]
    RateLimited { message: String },

    #[error("Model not found: {message}")]
    NotFound { message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BackendError {
    pub fn retry_class(&self) -> RetryClass {
        match self {
            BackendError::RateLimited { .. } => RetryClass::RateLimited,
            BackendError::NotFound { .. } => RetryClass::NotFound,
            _ => RetryClass::Fatal,
        }
    }
}

/// Terminal outcome of a failed verification
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Backend(#[source] BackendError),

    #[error("Exceeded retry limit after {attempts} attempts (last error: {last})")]
    RetryBudgetExhausted { attempts: u32, last: BackendError },

    #[error("Verification interrupted: {message}")]
    Interrupted { message: String },
}

/// Key-value persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Gemini API key is missing. Set GEMINI_API_KEY or add api_key to {path}")]
    MissingApiKey { path: String },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reasons a submission or reset is refused by the chat session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Nothing to verify")]
    EmptyInput,

    #[error("A verification is already in progress")]
    InFlight,
}

pub type BackendResult<T> = Result<T, BackendError>;

pub type StorageResult<T> = Result<T, StorageError>;
