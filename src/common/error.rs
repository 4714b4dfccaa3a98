use thiserror::Error;

/// Why a raw `date` cell could not be turned into a calendar date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("date field is empty")]
    Empty,

    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),

    #[error("date out of range: {0:?}")]
    OutOfRange(String),
}

/// Fetch-level failures. Any of these fails the whole fetch attempt.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP error! status: {status} for {url}")]
    Status { status: u16, url: String },

    #[error("response body is not valid UTF-8: {0}")]
    Body(#[from] std::string::FromUtf8Error),

    #[error("CSV decoding failed: {0}")]
    Csv(#[from] csv::Error),
}

impl FeedError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Transport(_) => "transport",
            FeedError::Status { .. } => "status",
            FeedError::Body(_) => "body",
            FeedError::Csv(_) => "csv",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, FeedError>;
