use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Unexpected markup: {0}")]
    UnexpectedMarkup(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

pub type Result<T> = std::result::Result<T, PageError>;
