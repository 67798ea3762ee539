use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use console::style;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::keychain::{CachedCredential, Keychain};
use crate::auth::{Credential, CredentialProvider};
use crate::error::{Result, StratusError};

/// Public client id of the stratus CLI application.
pub const CLI_CLIENT_ID: &str = "d2f4a7e0-55b1-4c1b-9d71-3c8f6f3f29c4";

const MANAGEMENT_SCOPE: &str = "https://api.stratus.cloud/.default";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default = "default_poll_interval")]
    interval: u64,
    #[serde(default = "default_device_expiry")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_device_expiry() -> u64 {
    900
}

impl OAuthError {
    fn describe(&self) -> String {
        match &self.error_description {
            Some(d) => format!("{} ({})", d, self.error),
            None => self.error.clone(),
        }
    }
}

/// Credential provider backed by the platform identity service.
///
/// Service-principal logins use the client-credentials grant; interactive
/// logins use the device-code flow (print a code, poll the token endpoint).
/// Successful tokens are cached in the keychain when the caller asked for
/// persistence, and the cache is cleared when it didn't.
pub struct IdentityClient {
    identity_url: String,
    keychain: Keychain,
    agent: ureq::Agent,
}

impl IdentityClient {
    pub fn new(identity_url: &str, keychain: Keychain) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
        Self {
            identity_url: identity_url.trim_end_matches('/').to_string(),
            keychain,
            agent,
        }
    }

    fn token_url(&self, tenant_id: Option<&str>) -> String {
        format!(
            "{}/{}/oauth/token",
            self.identity_url,
            tenant_id.unwrap_or("common")
        )
    }

    fn devicecode_url(&self, tenant_id: Option<&str>) -> String {
        format!(
            "{}/{}/oauth/devicecode",
            self.identity_url,
            tenant_id.unwrap_or("common")
        )
    }

    /// Reuse an unexpired cached token when it is compatible with the
    /// requested tenant scope.
    fn cached_credential(&self, tenant_id: Option<&str>) -> Option<Credential> {
        let entry = self.keychain.load()?;
        if let (Some(wanted), Some(cached)) = (tenant_id, entry.tenant_id.as_deref()) {
            if wanted != cached {
                return None;
            }
        }
        let credential = Credential::new(
            SecretString::new(entry.token),
            entry.tenant_id,
            None,
            entry.expires_at,
        );
        if credential.is_expired() {
            return None;
        }
        Some(credential)
    }

    fn service_principal_token(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<TokenResponse> {
        let url = self.token_url(Some(tenant_id));
        let response = self.agent.post(&url).send_form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
            ("scope", MANAGEMENT_SCOPE),
        ]);
        match response {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| StratusError::AuthFailed(e.to_string())),
            Err(ureq::Error::Status(_, resp)) => {
                let err: OAuthError = resp
                    .into_json()
                    .map_err(|e| StratusError::AuthFailed(e.to_string()))?;
                Err(StratusError::AuthFailed(err.describe()))
            }
            Err(e) => Err(StratusError::Http(e.to_string())),
        }
    }

    /// Device-code sign-in: request a user code, show it, poll until the
    /// user completes sign-in in the browser or the code expires.
    fn device_code_token(&self, tenant_id: Option<&str>) -> Result<TokenResponse> {
        let response = self
            .agent
            .post(&self.devicecode_url(tenant_id))
            .send_form(&[("client_id", CLI_CLIENT_ID), ("scope", MANAGEMENT_SCOPE)]);
        let device: DeviceCodeResponse = match response {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| StratusError::AuthFailed(e.to_string()))?,
            Err(ureq::Error::Status(_, resp)) => {
                let err: OAuthError = resp
                    .into_json()
                    .map_err(|e| StratusError::AuthFailed(e.to_string()))?;
                return Err(StratusError::AuthFailed(err.describe()));
            }
            Err(e) => return Err(StratusError::Http(e.to_string())),
        };

        eprintln!(
            "To sign in, open {} and enter the code {}",
            style(&device.verification_uri).cyan().underlined(),
            style(&device.user_code).bold()
        );

        let token_url = self.token_url(tenant_id);
        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval = device.interval;

        loop {
            if Instant::now() >= deadline {
                return Err(StratusError::AuthFailed(
                    "Device code expired before sign-in completed".into(),
                ));
            }
            thread::sleep(Duration::from_secs(interval));

            let response = self.agent.post(&token_url).send_form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                ("client_id", CLI_CLIENT_ID),
                ("device_code", &device.device_code),
            ]);
            match response {
                Ok(resp) => {
                    return resp
                        .into_json()
                        .map_err(|e| StratusError::AuthFailed(e.to_string()))
                }
                Err(ureq::Error::Status(_, resp)) => {
                    let err: OAuthError = resp
                        .into_json()
                        .map_err(|e| StratusError::AuthFailed(e.to_string()))?;
                    match err.error.as_str() {
                        "authorization_pending" => continue,
                        "slow_down" => {
                            interval += 5;
                            continue;
                        }
                        _ => return Err(StratusError::AuthFailed(err.describe())),
                    }
                }
                Err(e) => return Err(StratusError::Http(e.to_string())),
            }
        }
    }

    /// Apply the persistence preference after a successful authentication.
    /// Cache maintenance never fails the login itself.
    fn finish(&self, credential: Credential, persist: bool) -> Credential {
        if persist {
            let entry = CachedCredential {
                token: credential.token().expose_secret().clone(),
                tenant_id: credential.tenant_id.clone(),
                expires_at: credential.expires_at,
            };
            if let Err(e) = self.keychain.store(&entry) {
                warn!(error = %e, "failed to cache credential");
            }
        } else if let Err(e) = self.keychain.clear() {
            warn!(error = %e, "failed to clear cached credential");
        }
        credential
    }
}

impl CredentialProvider for IdentityClient {
    fn authenticate(
        &self,
        tenant_id: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&SecretString>,
        persist: bool,
    ) -> Result<Credential> {
        if let (Some(client_id), Some(client_secret)) = (client_id, client_secret) {
            let tenant_id = tenant_id.ok_or_else(|| {
                StratusError::AuthFailed(
                    "Service principal login requires a tenant id (--tenant)".into(),
                )
            })?;
            debug!(source = "service_principal", tenant = tenant_id, "authenticating");
            let token = self.service_principal_token(tenant_id, client_id, client_secret)?;
            let credential = Credential::new(
                SecretString::new(token.access_token),
                Some(tenant_id.to_string()),
                Some(client_id.to_string()),
                token
                    .expires_in
                    .map(|s| Utc::now() + chrono::Duration::seconds(s as i64)),
            );
            return Ok(self.finish(credential, persist));
        }

        if let Some(credential) = self.cached_credential(tenant_id) {
            debug!(source = "keychain", "using cached credential");
            return Ok(credential);
        }

        debug!(source = "device_code", tenant = ?tenant_id, "authenticating");
        let token = self.device_code_token(tenant_id)?;
        let credential = Credential::new(
            SecretString::new(token.access_token),
            tenant_id.map(|t| t.to_string()),
            None,
            token
                .expires_in
                .map(|s| Utc::now() + chrono::Duration::seconds(s as i64)),
        );
        Ok(self.finish(credential, persist))
    }
}
