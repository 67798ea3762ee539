pub mod identity;
pub mod keychain;

use std::env;
use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Result;

const STRATUS_NON_INTERACTIVE_ENV: &str = "STRATUS_NON_INTERACTIVE";

/// Check if we are in non-interactive mode.
/// Returns true if stdin is not a TTY or STRATUS_NON_INTERACTIVE=1 is set.
pub fn is_non_interactive() -> bool {
    if env::var(STRATUS_NON_INTERACTIVE_ENV)
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        return true;
    }
    !std::io::stdin().is_terminal()
}

/// An authenticated handle, bound to a specific tenant once one is known
/// (and, for service-principal logins, to a specific client).
///
/// The pipeline owns its credential for the duration of a run and replaces it
/// wholesale when the tenant changes; it is never mutated in place.
#[derive(Debug, Clone)]
pub struct Credential {
    token: SecretString,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(
        token: SecretString,
        tenant_id: Option<String>,
        client_id: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token,
            tenant_id,
            client_id,
            expires_at,
        }
    }

    /// The raw access token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Authorization header value for management calls.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| Utc::now() >= t)
    }
}

/// Produces authenticated credentials.
///
/// With both a client id and a client secret present this performs
/// non-interactive service-principal authentication — a tenant id is required
/// in that mode, and its absence is a caller contract violation surfaced as
/// [`StratusError::AuthFailed`](crate::error::StratusError::AuthFailed).
/// Otherwise the flow is interactive, scoped to a tenant when one is known.
///
/// `persist` only controls whether the resulting credential material is
/// cached for reuse across invocations; it never changes authentication
/// semantics. Failures are not retried here — retry policy, if any, belongs
/// to the caller.
pub trait CredentialProvider {
    fn authenticate(
        &self,
        tenant_id: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&SecretString>,
        persist: bool,
    ) -> Result<Credential>;
}
