/// Errors from the IGDB client and cache store.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by the IGDB API")]
    RateLimit,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Fatal errors disable enrichment for the whole run; everything else
    /// is a per-title miss.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidCredentials(_) | CatalogError::Config(_)
        )
    }
}
