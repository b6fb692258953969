//! OAuth token exchange and refresh
//!
//! The two token endpoint interactions:
//! 1. Authorization code exchange (initial flow completion)
//! 2. Token refresh (when the access token has expired)
//!
//! Both POST a form body to the bearer token endpoint, authenticated with
//! the application's client id/secret via HTTP Basic. The endpoint URL is a
//! parameter so tests can point at a mock server; production passes
//! [`crate::constants::TOKEN_ENDPOINT`].

use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::constants::DEFAULT_EXPIRES_IN_SECS;
use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. The session
/// converts it to an absolute unix timestamp when storing the tokens.
/// Intuit occasionally omits it; the documented default is one hour.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Exchange an authorization code for tokens (initial flow completion).
///
/// The code is single-use: the provider rejects a second exchange of the
/// same code, so a failed-then-retried call needs a fresh authorization.
pub async fn exchange_code(
    client: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .header(ACCEPT, "application/json")
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    read_token_response(response).await
}

/// Refresh an access token using a refresh token.
///
/// The provider may rotate the refresh token; the returned response always
/// carries the pair to store going forward.
pub async fn refresh_token(
    client: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .header(ACCEPT, "application/json")
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    read_token_response(response).await
}

/// Map a token endpoint response to `TokenResponse` or a provider error.
async fn read_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Provider {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::InvalidResponse(format!("undecodable token response: {e}")))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn token_response_deserializes() {
        let json = r#"{"access_token":"at_abc","refresh_token":"rt_def","expires_in":3600}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert_eq!(token.refresh_token, "rt_def");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn missing_expires_in_defaults_to_one_hour() {
        let json = r#"{"access_token":"at_abc","refresh_token":"rt_def"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn missing_access_token_fails_to_deserialize() {
        let json = r#"{"refresh_token":"rt_def","expires_in":100}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }

    #[tokio::test]
    async fn exchange_posts_code_grant_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokens/bearer"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=AB123"))
            .and(body_string_contains("redirect_uri="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at_1",
                "refresh_token": "rt_1",
                "expires_in": 100
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let token_url = format!("{}/tokens/bearer", server.uri());
        let token = exchange_code(
            &client,
            &token_url,
            "client-id",
            "client-secret",
            "AB123",
            "https://example.com/cb",
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "at_1");
        assert_eq!(token.refresh_token, "rt_1");
        assert_eq!(token.expires_in, 100);
    }

    #[tokio::test]
    async fn refresh_posts_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokens/bearer"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt_old"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at_new",
                "refresh_token": "rt_new",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let token_url = format!("{}/tokens/bearer", server.uri());
        let token = refresh_token(&client, &token_url, "client-id", "client-secret", "rt_old")
            .await
            .unwrap();

        assert_eq!(token.access_token, "at_new");
        assert_eq!(token.refresh_token, "rt_new");
    }

    #[tokio::test]
    async fn non_success_status_becomes_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = exchange_code(
            &client,
            &server.uri(),
            "client-id",
            "client-secret",
            "stale-code",
            "https://example.com/cb",
        )
        .await
        .unwrap_err();

        match err {
            Error::Provider { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("expected Provider error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = refresh_token(&client, &server.uri(), "client-id", "client-secret", "rt")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)), "got: {err:?}");
    }
}
