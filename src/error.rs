use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("News fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Why a single headline fetch produced no articles.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No usable response came back from the transport.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response arrived but its status or body was unusable.
    #[error("bad response: {0}")]
    Response(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
