use crate::error::CatalogError;

/// Twitch developer credentials for the IGDB API.
#[derive(Debug, Clone)]
pub struct IgdbCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl IgdbCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Resolve credentials from explicit config values with env-var fallback.
    ///
    /// Priority: config file values > `IGDB_CLIENT_ID` / `IGDB_CLIENT_SECRET`
    /// environment variables. Missing credentials are a configuration error;
    /// the caller reports it once and runs without enrichment.
    pub fn resolve(
        config_id: Option<&str>,
        config_secret: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let client_id = config_id
            .map(str::to_string)
            .or_else(|| std::env::var("IGDB_CLIENT_ID").ok())
            .ok_or_else(|| {
                CatalogError::Config(
                    "Missing IGDB client id. Set igdb_client_id in the config file or the IGDB_CLIENT_ID env var".to_string(),
                )
            })?;

        let client_secret = config_secret
            .map(str::to_string)
            .or_else(|| std::env::var("IGDB_CLIENT_SECRET").ok())
            .ok_or_else(|| {
                CatalogError::Config(
                    "Missing IGDB client secret. Set igdb_client_secret in the config file or the IGDB_CLIENT_SECRET env var".to_string(),
                )
            })?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}
