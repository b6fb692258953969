//! Redirect URL parsing
//!
//! After the user consents, Intuit redirects the browser back to the
//! registered redirect URI with `code`, `realmId`, and `state` query
//! parameters. Parsing is keyed by parameter name, so ordering and any
//! trailing parameters are irrelevant.
//!
//! Known gap, kept for fidelity with the original flow: the returned
//! `state` is surfaced but never compared against the value sent in the
//! authorization URL, so this parser provides no CSRF protection on its own.

use url::Url;

use crate::error::{Error, Result};

/// Parameters extracted from a callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectParams {
    /// Single-use authorization code
    pub code: String,
    /// Company (tenant) identifier, present when the user picked a company
    pub realm_id: Option<String>,
    /// CSRF state echoed back by the provider
    pub state: Option<String>,
}

/// Parse a full redirect URL into its OAuth parameters.
///
/// Fails if the URL is unparseable or carries no `code` parameter. The
/// `realmId` and `state` parameters are optional.
pub fn parse_redirect(redirect_url: &str) -> Result<RedirectParams> {
    let url = Url::parse(redirect_url)
        .map_err(|e| Error::Redirect(format!("unparseable redirect URL: {e}")))?;

    let mut code = None;
    let mut realm_id = None;
    let mut state = None;

    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "code" => code = Some(value.into_owned()),
            "realmId" => realm_id = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    let code = code.ok_or_else(|| {
        Error::Redirect("authorization code not found in redirect URL".into())
    })?;

    Ok(RedirectParams {
        code,
        realm_id,
        state,
    })
}
