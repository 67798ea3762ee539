pub mod rest;

use serde::Deserialize;

use crate::auth::Credential;
use crate::error::Result;

/// A selectable entity at some scope level: an opaque identifier plus a
/// human-readable label. List ordering comes from the directory and matters
/// only for display.
pub trait Candidate {
    fn id(&self) -> &str;
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub tenant_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub default_hostname: Option<String>,
}

impl Candidate for Tenant {
    fn id(&self) -> &str {
        &self.tenant_id
    }

    fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.tenant_id
        } else {
            &self.display_name
        }
    }
}

impl Candidate for Subscription {
    fn id(&self) -> &str {
        &self.subscription_id
    }

    fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.subscription_id
        } else {
            &self.display_name
        }
    }
}

impl Candidate for ResourceGroup {
    fn id(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Candidate for Site {
    fn id(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Read-only listing calls against the authenticated account.
///
/// No caching happens here; the pipeline issues each call at most once per
/// run. A call made with a stale or wrong-scope credential fails with
/// [`StratusError::Authorization`](crate::error::StratusError::Authorization).
pub trait ScopeDirectory {
    fn list_tenants(&self, credential: &Credential) -> Result<Vec<Tenant>>;

    fn list_subscriptions(&self, credential: &Credential) -> Result<Vec<Subscription>>;

    fn list_resource_groups(
        &self,
        credential: &Credential,
        subscription_id: &str,
    ) -> Result<Vec<ResourceGroup>>;

    fn list_sites(
        &self,
        credential: &Credential,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<Site>>;
}
