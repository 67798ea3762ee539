use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::account::{ResourceGroup, ScopeDirectory, Site, Subscription, Tenant};
use crate::auth::Credential;
use crate::error::{Result, StratusError};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Envelope for list responses from the management API.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ListEnvelope<T> {
    #[serde(default)]
    value: Vec<T>,
}

/// Directory backed by the platform management API.
pub struct RestDirectory {
    management_url: String,
    agent: ureq::Agent,
}

impl RestDirectory {
    pub fn new(management_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
        Self {
            management_url: management_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn get_list<T: DeserializeOwned>(&self, credential: &Credential, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.management_url, path);
        debug!(url = %url, "listing");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &credential.bearer())
            .call();
        match response {
            Ok(resp) => {
                let envelope: ListEnvelope<T> = resp
                    .into_json()
                    .map_err(|e| StratusError::Http(e.to_string()))?;
                Ok(envelope.value)
            }
            Err(ureq::Error::Status(code @ (401 | 403), _)) => Err(StratusError::Authorization(
                format!("GET {} returned {}", path, code),
            )),
            Err(ureq::Error::Status(code, _)) => {
                Err(StratusError::Http(format!("GET {} returned {}", path, code)))
            }
            Err(e) => Err(StratusError::Http(e.to_string())),
        }
    }
}

impl ScopeDirectory for RestDirectory {
    fn list_tenants(&self, credential: &Credential) -> Result<Vec<Tenant>> {
        self.get_list(credential, "/v1/tenants")
    }

    fn list_subscriptions(&self, credential: &Credential) -> Result<Vec<Subscription>> {
        self.get_list(credential, "/v1/subscriptions")
    }

    fn list_resource_groups(
        &self,
        credential: &Credential,
        subscription_id: &str,
    ) -> Result<Vec<ResourceGroup>> {
        self.get_list(
            credential,
            &format!("/v1/subscriptions/{}/resourcegroups", subscription_id),
        )
    }

    fn list_sites(
        &self,
        credential: &Credential,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<Site>> {
        self.get_list(
            credential,
            &format!(
                "/v1/subscriptions/{}/resourcegroups/{}/staticsites",
                subscription_id, resource_group
            ),
        )
    }
}
