//! The OAuth session: token lifecycle state and operations
//!
//! One [`QuickBooksSession`] per authorization session. It owns the
//! application credentials and the mutable token state, and walks the flow:
//!
//! 1. `authorization_url()` — send the user to consent
//! 2. `ingest_redirect()` — capture code + realm id from the callback
//! 3. `exchange_for_tokens()` — trade the code for access/refresh tokens
//! 4. `call_api()` — authenticated GET, refreshing first if expired
//! 5. `refresh_access_token()` — mint a new access token on demand
//!
//! All token state lives behind one `tokio::sync::Mutex`, and `call_api`
//! holds the lock across its check-expiry/refresh/call sequence, so a
//! concurrent caller can neither observe a half-updated token group nor
//! trigger a second refresh for the same expiry.

use std::sync::Arc;

use rand::RngExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::Secret;

use crate::clock::{self, Clock, SystemClock};
use crate::constants::{ACCOUNTING_SCOPE, API_BASE, AUTHORIZE_ENDPOINT, TOKEN_ENDPOINT};
use crate::error::{Error, Result};
use crate::redirect;
use crate::token::{self, TokenResponse};

/// Provider endpoint URLs.
///
/// Defaults to the real Intuit endpoints; tests override `token_url` and
/// `api_base_url` to point at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize_url: AUTHORIZE_ENDPOINT.into(),
            token_url: TOKEN_ENDPOINT.into(),
            api_base_url: API_BASE.into(),
        }
    }
}

/// Mutable token lifecycle state, guarded as one unit.
#[derive(Debug, Default)]
struct TokenState {
    /// Single-use code from the redirect. Deliberately not cleared after a
    /// successful exchange (matching the original flow); the provider, not
    /// this session, rejects a second exchange of the same code.
    authorization_code: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Absolute unix seconds; the access token is invalid at and after this
    expires_at: Option<u64>,
    realm_id: Option<String>,
}

/// Read-only snapshot of the session's token state.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub authorization_code: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<u64>,
    pub realm_id: Option<String>,
}

/// OAuth 2.0 session against the QuickBooks accounting API.
pub struct QuickBooksSession {
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    /// Per-session CSRF state sent in the authorization URL. Random per
    /// session, but not verified on redirect ingestion (see `redirect`
    /// module docs for the known gap).
    state_value: String,
    endpoints: Endpoints,
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
    tokens: Mutex<TokenState>,
}

impl QuickBooksSession {
    /// Create a session with the real Intuit endpoints and system clock.
    pub fn new(client_id: String, client_secret: Secret<String>, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            state_value: generate_state(),
            endpoints: Endpoints::default(),
            http: reqwest::Client::new(),
            clock: Arc::new(SystemClock),
            tokens: Mutex::new(TokenState::default()),
        }
    }

    /// Override the provider endpoints (mock servers in tests).
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Override the time source (simulated time in tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the authorization URL to redirect the user to.
    ///
    /// Pure function of the stored credentials; no side effects, no
    /// failure modes.
    pub fn authorization_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", ACCOUNTING_SCOPE)
            .append_pair("state", &self.state_value)
            .finish();
        format!("{}?{}", self.endpoints.authorize_url, query)
    }

    /// Ingest the callback URL, storing the authorization code and, when
    /// present, the realm (company) id.
    ///
    /// Fails without touching stored state if the URL carries no `code`.
    pub async fn ingest_redirect(&self, redirect_url: &str) -> Result<()> {
        let params = redirect::parse_redirect(redirect_url).inspect_err(|e| {
            warn!(error = %e, "rejected redirect URL");
        })?;

        let mut tokens = self.tokens.lock().await;
        info!(code = %params.code, "extracted authorization code");
        if let Some(realm_id) = &params.realm_id {
            info!(realm_id = %realm_id, "extracted realm id");
        }
        tokens.authorization_code = Some(params.code);
        if params.realm_id.is_some() {
            tokens.realm_id = params.realm_id;
        }
        Ok(())
    }

    /// Exchange the stored authorization code for access and refresh tokens.
    ///
    /// Requires a prior successful `ingest_redirect`. On success the access
    /// token, refresh token, and expiry are replaced as a group; on any
    /// failure the previous token state is untouched. The code is single-use
    /// on the provider side — a second exchange of the same code is rejected
    /// by Intuit, not by this session.
    pub async fn exchange_for_tokens(&self) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        let code = tokens.authorization_code.clone().ok_or_else(|| {
            Error::Precondition("no authorization code to exchange".into())
        })?;

        debug!("exchanging authorization code for tokens");
        let response = token::exchange_code(
            &self.http,
            &self.endpoints.token_url,
            &self.client_id,
            self.client_secret.expose(),
            &code,
            &self.redirect_uri,
        )
        .await?;

        self.store_tokens(&mut tokens, response);
        info!("obtained access and refresh tokens");
        Ok(())
    }

    /// Refresh the access token using the stored refresh token.
    ///
    /// On success the token group is replaced (the provider may rotate the
    /// refresh token); on failure prior state is left as-is.
    pub async fn refresh_access_token(&self) -> Result<()> {
        let mut tokens = self.tokens.lock().await;
        self.refresh_locked(&mut tokens).await
    }

    /// Issue an authenticated GET to `{api_base}/v3/company/{realm}/{endpoint}`.
    ///
    /// Requires an access token and a realm id. If the access token has
    /// expired, exactly one refresh is attempted first; a failed refresh
    /// aborts the call with zero resource requests.
    pub async fn call_api(&self, endpoint: &str) -> Result<serde_json::Value> {
        let mut tokens = self.tokens.lock().await;

        if tokens.access_token.is_none() {
            return Err(Error::Precondition(
                "no access token; exchange or refresh first".into(),
            ));
        }
        let realm_id = tokens
            .realm_id
            .clone()
            .ok_or_else(|| Error::Precondition("no realm id for API call".into()))?;

        if clock::is_expired(self.clock.now_unix_secs(), tokens.expires_at) {
            info!("access token expired, refreshing before API call");
            self.refresh_locked(&mut tokens).await?;
        }
        let access_token = tokens
            .access_token
            .clone()
            .ok_or_else(|| Error::Precondition("no access token after refresh".into()))?;

        let api_url = format!(
            "{}/v3/company/{}/{}",
            self.endpoints.api_base_url, realm_id, endpoint
        );
        info!(url = %api_url, "making API call");

        let response = self
            .http
            .get(&api_url)
            .bearer_auth(&access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Http(format!("API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(status = status.as_u16(), "API call failed");
            return Err(Error::Provider {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("undecodable API response: {e}")))
    }

    /// Snapshot the current token state.
    pub async fn token_info(&self) -> TokenInfo {
        let tokens = self.tokens.lock().await;
        TokenInfo {
            authorization_code: tokens.authorization_code.clone(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at,
            realm_id: tokens.realm_id.clone(),
        }
    }

    /// Refresh while already holding the state lock.
    async fn refresh_locked(&self, tokens: &mut TokenState) -> Result<()> {
        let refresh = tokens
            .refresh_token
            .clone()
            .ok_or_else(|| Error::Precondition("no refresh token available".into()))?;

        debug!("refreshing access token");
        let response = token::refresh_token(
            &self.http,
            &self.endpoints.token_url,
            &self.client_id,
            self.client_secret.expose(),
            &refresh,
        )
        .await?;

        self.store_tokens(tokens, response);
        info!("refreshed access token");
        Ok(())
    }

    /// Replace the token group: access token, refresh token, expiry.
    /// Only called on a successful exchange or refresh, under the lock.
    fn store_tokens(&self, tokens: &mut TokenState, response: TokenResponse) {
        tokens.access_token = Some(response.access_token);
        tokens.refresh_token = Some(response.refresh_token);
        tokens.expires_at = Some(self.clock.now_unix_secs() + response.expires_in);
    }

    #[cfg(test)]
    async fn seed_tokens(
        &self,
        access: Option<&str>,
        refresh: Option<&str>,
        expires_at: Option<u64>,
        realm_id: Option<&str>,
    ) {
        let mut tokens = self.tokens.lock().await;
        tokens.access_token = access.map(String::from);
        tokens.refresh_token = refresh.map(String::from);
        tokens.expires_at = expires_at;
        tokens.realm_id = realm_id.map(String::from);
    }
}

/// Random per-session CSRF state: 16 random bytes, hex-encoded.
fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
