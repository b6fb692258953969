//! QuickBooks OAuth 2.0 Playground
//!
//! Console demonstration of the authorization-code flow:
//! 1. Build the authorization URL
//! 2. Ingest a (simulated) redirect carrying code + realm id
//! 3. Exchange the code for tokens
//! 4. Make API calls with the access token
//! 5. Refresh the access token on expiry
//!
//! No authorization codes or tokens are hardcoded; everything flows through
//! `quickbooks_auth::QuickBooksSession`. With the example placeholder
//! credentials the token endpoint is never actually called — the steps past
//! the redirect are narrated, exactly as the hosted OAuth playground does.

mod config;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickbooks_auth::{Clock, QuickBooksSession, SystemClock, TokenInfo, is_expired};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    banner("QUICKBOOKS OAUTH 2.0 PLAYGROUND");
    println!("\nDemonstrates the complete QuickBooks OAuth 2.0 flow, from");
    println!("authorization to API calls, without hardcoding any tokens.");

    let config = Config::from_env().context("failed to resolve credentials")?;
    info!(
        client_id = %config.client_id,
        redirect_uri = %config.redirect_uri,
        "credentials resolved"
    );
    if config.uses_example_credentials() {
        println!("\nRunning with example placeholder credentials; set QB_CLIENT_ID,");
        println!("QB_CLIENT_SECRET, and QB_REDIRECT_URI to use a real application.");
    }

    let redirect_uri = config.redirect_uri.clone();
    let session =
        QuickBooksSession::new(config.client_id, config.client_secret, config.redirect_uri);

    // Step 1: authorization URL
    println!("\nSTEP 1: Get Authorization URL");
    println!("Authorization URL: {}", session.authorization_url());
    println!("\nIn a real implementation, you would redirect the user to this URL.");
    println!("After consent, they are redirected back to your redirect URI.");

    // Step 2: simulate the redirect back with code and realm id
    println!("\nSTEP 2: Receive Authorization Code");
    let sample_redirect = format!(
        "{redirect_uri}?code=AB123456789&realmId=1234567890&state=randomstate"
    );
    println!("Example redirect URL:\n{sample_redirect}");
    session
        .ingest_redirect(&sample_redirect)
        .await
        .context("failed to ingest redirect URL")?;

    display_token_info(&session.token_info().await);

    // Steps 3-5 require real credentials and a real consent; narrate them.
    println!("\nSTEP 3: Exchange Authorization Code for Tokens");
    println!("POST the code with your client credentials (HTTP Basic) to the");
    println!("token endpoint; the response carries access and refresh tokens.");

    println!("\nSTEP 4: Make API Calls with Access Token");
    println!("With a valid access token, call the accounting API, for example");
    println!("companyinfo, customers, invoices, or bills.");

    println!("\nSTEP 5: Refresh Access Token");
    println!("When the access token expires (typically after 1 hour), the");
    println!("session refreshes it with the refresh token before the next");
    println!("API call - no user interaction needed.");

    Ok(())
}

/// Print the current token state the way the hosted playground does.
fn display_token_info(info: &TokenInfo) {
    banner("TOKEN INFORMATION");

    match &info.authorization_code {
        Some(code) => println!("Authorization Code: {code}"),
        None => println!("Authorization Code: Not obtained"),
    }

    match &info.access_token {
        Some(token) => {
            println!("Access Token: {token}");
            if let Some(expires_at) = info.expires_at {
                let now = SystemClock.now_unix_secs();
                let remaining = if is_expired(now, Some(expires_at)) {
                    0
                } else {
                    expires_at - now
                };
                println!("Access Token Expires In: {} minutes", remaining / 60);
            }
        }
        None => println!("Access Token: Not obtained"),
    }

    match &info.refresh_token {
        Some(token) => println!("Refresh Token: {token}"),
        None => println!("Refresh Token: Not obtained"),
    }

    match &info.realm_id {
        Some(realm_id) => println!("Realm ID: {realm_id}"),
        None => println!("Realm ID: Not obtained"),
    }

    println!("{}", "=".repeat(50));
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{title}");
    println!("{}", "=".repeat(50));
}
