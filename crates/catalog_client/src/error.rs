use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("page size {requested} is not one of the allowed sizes {allowed:?}")]
    InvalidPageSize { requested: u32, allowed: Vec<u32> },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("catalog returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("catalog transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one page size must be allowed")]
    NoPageSizes,
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("initial page size {initial} is not one of the allowed sizes {allowed:?}")]
    InitialPageSizeNotAllowed { initial: u32, allowed: Vec<u32> },
    #[error("invalid catalog url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}
