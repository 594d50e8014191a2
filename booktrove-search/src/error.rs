/// Errors from talking to external search sites.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Credentials rejected: {0}")]
    Credentials(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No matching book found")]
    NotFound,

    #[error("Rate limited by the site")]
    RateLimit,

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Could not parse response: {0}")]
    Parse(String),

    #[error("Invalid search: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Whether trying the same request again later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimit => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the user has to fix a key or account before this site works.
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials(_))
    }
}
