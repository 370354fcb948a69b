use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::credentials::IgdbCredentials;
use crate::error::CatalogError;
use crate::types::{ExternalGame, GameRecord, MultiplayerMode, TokenResponse};

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const BASE_URL: &str = "https://api.igdb.com/v4";

/// IGDB publishes a limit of 4 requests per second.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

/// Refresh the token this long before its advertised expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Bearer token plus its computed expiry. Owned by the client, refreshed
/// lazily, never persisted.
#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    expires_at: Instant,
}

/// HTTP client for the IGDB API with rate limiting and token lifecycle.
pub struct IgdbClient {
    http: reqwest::Client,
    creds: IgdbCredentials,
    token: Mutex<Option<TokenState>>,
    last_request: Mutex<Instant>,
}

impl IgdbClient {
    /// Create a new client. No network traffic happens until the first
    /// lookup; the token is acquired lazily.
    pub fn new(creds: IgdbCredentials) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            creds,
            token: Mutex::new(None),
            last_request: Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL),
        })
    }

    /// Resolve an IGDB game id from a platform-native id via
    /// `/external_games`.
    pub async fn external_game(
        &self,
        category: u32,
        uid: &str,
    ) -> Result<Option<u64>, CatalogError> {
        let body = format!("fields game; where uid = \"{uid}\" & category = {category};");
        let text = self.query("external_games", body).await?;
        let rows: Vec<ExternalGame> = serde_json::from_str(&text)
            .map_err(|e| CatalogError::Api(format!("Failed to parse external_games: {e}")))?;
        Ok(rows.first().map(|r| r.game))
    }

    /// Fallback resolution: look a game up by its slug on `/games`.
    pub async fn game_by_slug(&self, slug: &str) -> Result<Option<u64>, CatalogError> {
        let body = format!("fields id; where slug = \"{slug}\";");
        let text = self.query("games", body).await?;
        let rows: Vec<GameRecord> = serde_json::from_str(&text)
            .map_err(|e| CatalogError::Api(format!("Failed to parse games: {e}")))?;
        Ok(rows.first().map(|r| r.id))
    }

    /// Fetch the raw game-mode enum values for a game.
    pub async fn game_modes(&self, igdb_id: u64) -> Result<Vec<u64>, CatalogError> {
        let body = format!("fields game_modes; where id = {igdb_id};");
        let text = self.query("games", body).await?;
        let rows: Vec<GameRecord> = serde_json::from_str(&text)
            .map_err(|e| CatalogError::Api(format!("Failed to parse game modes: {e}")))?;
        Ok(rows.into_iter().next().map(|r| r.game_modes).unwrap_or_default())
    }

    /// Fetch the max-player count across all of a game's multiplayer modes.
    pub async fn max_players(&self, igdb_id: u64) -> Result<Option<u32>, CatalogError> {
        let body = format!(
            "fields offlinecoopmax,offlinemax,onlinecoopmax,onlinemax; where game = {igdb_id};"
        );
        let text = self.query("multiplayer_modes", body).await?;
        let rows: Vec<MultiplayerMode> = serde_json::from_str(&text)
            .map_err(|e| CatalogError::Api(format!("Failed to parse multiplayer modes: {e}")))?;
        Ok(rows.iter().filter_map(MultiplayerMode::max_players).max())
    }

    /// Run an APIcalypse query, refreshing the token once if the API
    /// rejects it mid-run.
    async fn query(&self, endpoint: &str, body: String) -> Result<String, CatalogError> {
        let token = self.bearer_token().await?;
        let resp = self.send(endpoint, body.clone(), &token).await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked or expired early; drop it and retry once.
            *self.token.lock().await = None;
            let token = self.bearer_token().await?;
            let resp = self.send(endpoint, body, &token).await?;
            return self.read_response(endpoint, resp).await;
        }

        self.read_response(endpoint, resp).await
    }

    async fn send(
        &self,
        endpoint: &str,
        body: String,
        token: &str,
    ) -> Result<reqwest::Response, CatalogError> {
        self.rate_limit().await;
        let resp = self
            .http
            .post(format!("{BASE_URL}/{endpoint}"))
            .header("Client-ID", &self.creds.client_id)
            .bearer_auth(token)
            .body(body)
            .send()
            .await?;
        Ok(resp)
    }

    async fn read_response(
        &self,
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<String, CatalogError> {
        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimit);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CatalogError::InvalidCredentials(
                "IGDB rejected the access token".to_string(),
            ));
        }

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Api(format!(
                "{endpoint} returned HTTP {status}: {}",
                truncate(&text)
            )));
        }
        Ok(text)
    }

    /// Get the current bearer token, requesting a fresh one from Twitch
    /// when absent or near expiry.
    async fn bearer_token(&self) -> Result<String, CatalogError> {
        let mut token = self.token.lock().await;
        if let Some(state) = token.as_ref() {
            if Instant::now() < state.expires_at {
                return Ok(state.access_token.clone());
            }
            log::debug!("IGDB token expired, refreshing");
        }

        self.rate_limit().await;
        let resp = self
            .http
            .post(TOKEN_URL)
            .query(&[
                ("client_id", self.creds.client_id.as_str()),
                ("client_secret", self.creds.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CatalogError::InvalidCredentials(
                "Twitch rejected the IGDB client credentials".to_string(),
            ));
        }

        let text = resp.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| {
            CatalogError::Api(format!(
                "Failed to parse token response: {e}. Response: {}",
                truncate(&text)
            ))
        })?;

        let lifetime = Duration::from_secs(parsed.expires_in);
        let state = TokenState {
            access_token: parsed.access_token.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        };
        *token = Some(state);
        Ok(parsed.access_token)
    }

    /// Enforce rate limiting: wait until at least MIN_REQUEST_INTERVAL has
    /// passed since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Cap an error-response body for log messages, respecting char boundaries.
fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}
