//! QuickBooks OAuth constants
//!
//! Fixed Intuit endpoint URLs and the accounting scope. These values are
//! not secrets — they identify the provider, not the application. The
//! application credentials (client id/secret) are supplied per session.

/// Authorization endpoint (browser redirect, never called programmatically)
pub const AUTHORIZE_ENDPOINT: &str = "https://appcenter.intuit.com/connect/oauth2";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";

/// Base URL for the QuickBooks accounting API
pub const API_BASE: &str = "https://quickbooks.api.intuit.com";

/// The one scope this demonstration requests
pub const ACCOUNTING_SCOPE: &str = "com.intuit.quickbooks.accounting";

/// Fallback access-token lifetime when the token response omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;
