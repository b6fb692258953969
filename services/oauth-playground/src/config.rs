//! Playground credential configuration
//!
//! Credentials resolve from environment variables, falling back to the
//! documented example placeholders so the demonstration runs out of the
//! box. There is no configuration file: the playground keeps no state
//! between runs. The client secret never appears in logs (`Secret`).

use common::{Error, Result, Secret};

/// Example placeholders, usable only for the offline demonstration.
pub const EXAMPLE_CLIENT_ID: &str = "EXAMPLE_CLIENT_ID";
pub const EXAMPLE_CLIENT_SECRET: &str = "EXAMPLE_CLIENT_SECRET";
pub const EXAMPLE_REDIRECT_URI: &str =
    "https://developer.intuit.com/v2/OAuth2Playground/RedirectUrl";

/// QuickBooks application credentials
#[derive(Debug)]
pub struct Config {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
}

impl Config {
    /// Resolve credentials from `QB_CLIENT_ID`, `QB_CLIENT_SECRET`, and
    /// `QB_REDIRECT_URI`, defaulting each to the example placeholder.
    pub fn from_env() -> Result<Self> {
        let client_id = env_or("QB_CLIENT_ID", EXAMPLE_CLIENT_ID)?;
        let client_secret = env_or("QB_CLIENT_SECRET", EXAMPLE_CLIENT_SECRET)?;
        let redirect_uri = env_or("QB_REDIRECT_URI", EXAMPLE_REDIRECT_URI)?;

        if !redirect_uri.starts_with("http://") && !redirect_uri.starts_with("https://") {
            return Err(Error::Config(format!(
                "QB_REDIRECT_URI must start with http:// or https://, got: {redirect_uri}"
            )));
        }

        Ok(Self {
            client_id,
            client_secret: Secret::new(client_secret),
            redirect_uri,
        })
    }

    /// Whether the demonstration is running on the example placeholders
    /// (in which case the token endpoint would reject every request).
    pub fn uses_example_credentials(&self) -> bool {
        self.client_id == EXAMPLE_CLIENT_ID
    }
}

/// Read an env var, rejecting empty values, defaulting when unset.
fn env_or(name: &str, default: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) => {
            let value = value.trim().to_owned();
            if value.is_empty() {
                return Err(Error::Config(format!("{name} is set but empty")));
            }
            Ok(value)
        }
        Err(_) => Ok(default.to_owned()),
    }
}
