//! QuickBooks OAuth 2.0 authorization library
//!
//! Implements the authorization-code flow against the Intuit accounting
//! API: authorization URL construction, redirect ingestion, code exchange,
//! token refresh, and authenticated API calls with refresh-on-expiry. This
//! crate is a standalone library with no dependency on the playground
//! binary — it can be tested and used independently.
//!
//! Session flow:
//! 1. Create a [`QuickBooksSession`] with client id/secret and redirect URI
//! 2. Send the user to [`QuickBooksSession::authorization_url`]
//! 3. Feed the callback to [`QuickBooksSession::ingest_redirect`]
//! 4. Call [`QuickBooksSession::exchange_for_tokens`]
//! 5. Call [`QuickBooksSession::call_api`]; an expired token is refreshed
//!    once before the resource request

pub mod clock;
pub mod constants;
pub mod error;
pub mod redirect;
pub mod session;
pub mod token;

pub use clock::{Clock, SystemClock, is_expired};
pub use constants::*;
pub use error::{Error, Result};
pub use redirect::{RedirectParams, parse_redirect};
pub use session::{Endpoints, QuickBooksSession, TokenInfo};
pub use token::{TokenResponse, exchange_code, refresh_token};
