//! The cascading scope-resolution pipeline.
//!
//! Login resolves four nested scopes in strict order: tenant → subscription →
//! resource group → site. At each scope the same decision applies: a
//! caller-supplied override wins without touching the directory, a single
//! listed candidate is taken silently, several candidates go to the chooser,
//! and an empty list is fatal. A tenant picked interactively among several
//! invalidates the credential held so far, so authentication is
//! re-established before any later scope is queried.

use secrecy::SecretString;
use tracing::debug;

use crate::account::{Candidate, ScopeDirectory};
use crate::auth::{Credential, CredentialProvider};
use crate::error::{Result, StratusError};
use crate::prompts::Chooser;

/// The four nested scope levels, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Tenant,
    Subscription,
    ResourceGroup,
    Site,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Tenant => "tenant",
            Scope::Subscription => "subscription",
            Scope::ResourceGroup => "resource_group",
            Scope::Site => "site",
        }
    }

    /// Singular noun for prompts and messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Scope::Tenant => "tenant",
            Scope::Subscription => "subscription",
            Scope::ResourceGroup => "resource group",
            Scope::Site => "static site",
        }
    }

    /// Plural noun for error messages.
    pub fn plural(&self) -> &'static str {
        match self {
            Scope::Tenant => "tenants",
            Scope::Subscription => "subscriptions",
            Scope::ResourceGroup => "resource groups",
            Scope::Site => "static sites",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a scope's value was determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Caller-supplied value; no directory query was made.
    Override(String),
    /// The only candidate, taken without prompting.
    Auto(String),
    /// Picked interactively among several candidates.
    Selected(String),
}

impl Resolved {
    pub fn value(&self) -> &str {
        match self {
            Resolved::Override(v) | Resolved::Auto(v) | Resolved::Selected(v) => v,
        }
    }

    pub fn via(&self) -> &'static str {
        match self {
            Resolved::Override(_) => "override",
            Resolved::Auto(_) => "auto",
            Resolved::Selected(_) => "selected",
        }
    }
}

/// Caller-supplied overrides and preferences for one login run.
/// Immutable once the pipeline starts.
#[derive(Debug, Clone)]
pub struct ResolutionInput {
    pub tenant_id: Option<String>,
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub site_name: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    /// Whether credential material may be cached for reuse across runs.
    pub use_keychain: bool,
}

impl Default for ResolutionInput {
    fn default() -> Self {
        Self {
            tenant_id: None,
            subscription_id: None,
            resource_group: None,
            site_name: None,
            client_id: None,
            client_secret: None,
            use_keychain: true,
        }
    }
}

/// Working state of one resolution run, mutated in place as scopes resolve
/// and returned to the caller whole — even on failure, so whatever resolved
/// before the error is still reportable.
#[derive(Debug)]
pub struct ResolutionContext {
    /// Last credential known valid, if any authentication succeeded.
    pub credential: Option<Credential>,
    pub tenant: Option<Resolved>,
    pub subscription: Option<Resolved>,
    pub resource_group: Option<Resolved>,
    pub site: Option<Resolved>,
}

impl ResolutionContext {
    fn new() -> Self {
        Self {
            credential: None,
            tenant: None,
            subscription: None,
            resource_group: None,
            site: None,
        }
    }

    pub fn get(&self, scope: Scope) -> Option<&Resolved> {
        match scope {
            Scope::Tenant => self.tenant.as_ref(),
            Scope::Subscription => self.subscription.as_ref(),
            Scope::ResourceGroup => self.resource_group.as_ref(),
            Scope::Site => self.site.as_ref(),
        }
    }

    /// Record a scope's resolution. Each scope resolves at most once per run.
    fn set(&mut self, scope: Scope, resolved: Resolved) {
        let slot = match scope {
            Scope::Tenant => &mut self.tenant,
            Scope::Subscription => &mut self.subscription,
            Scope::ResourceGroup => &mut self.resource_group,
            Scope::Site => &mut self.site,
        };
        debug_assert!(slot.is_none(), "scope {} resolved twice", scope);
        *slot = Some(resolved);
    }
}

/// Result of a pipeline run: the context as far as it got, plus the error
/// that stopped it, if any.
#[derive(Debug)]
pub struct LoginOutcome {
    pub context: ResolutionContext,
    pub error: Option<StratusError>,
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The resolution pipeline, generic over its three collaborators so the
/// cascade can be driven deterministically by scripted fakes in tests.
pub struct Pipeline<'a, P, D, C> {
    provider: &'a P,
    directory: &'a D,
    chooser: &'a C,
}

impl<'a, P, D, C> Pipeline<'a, P, D, C>
where
    P: CredentialProvider,
    D: ScopeDirectory,
    C: Chooser,
{
    pub fn new(provider: &'a P, directory: &'a D, chooser: &'a C) -> Self {
        Self {
            provider,
            directory,
            chooser,
        }
    }

    /// Run the full cascade. Never panics out of a failure: the partially
    /// populated context is always returned alongside the terminal error.
    pub fn run(&self, input: &ResolutionInput) -> LoginOutcome {
        let mut context = ResolutionContext::new();
        let error = self.run_stages(input, &mut context).err();
        LoginOutcome { context, error }
    }

    fn run_stages(&self, input: &ResolutionInput, context: &mut ResolutionContext) -> Result<()> {
        let mut credential = self.provider.authenticate(
            input.tenant_id.as_deref(),
            input.client_id.as_deref(),
            input.client_secret.as_ref(),
            input.use_keychain,
        )?;
        context.credential = Some(credential.clone());

        let tenant = self.resolve_scope(
            Scope::Tenant,
            input.tenant_id.as_deref(),
            &credential,
            |cred| self.directory.list_tenants(cred),
        )?;
        let tenant_chosen_interactively = matches!(tenant, Resolved::Selected(_));
        let tenant_id = tenant.value().to_string();
        context.set(Scope::Tenant, tenant);

        if tenant_chosen_interactively {
            // The initial credential may not be valid for a tenant picked
            // from several; authenticate again before querying anything else.
            // TODO: silently re-scope the existing credential to the chosen
            // tenant instead of a full second sign-in round-trip
            debug!(tenant = %tenant_id, "re-authenticating for selected tenant");
            credential = self.provider.authenticate(
                Some(&tenant_id),
                input.client_id.as_deref(),
                input.client_secret.as_ref(),
                input.use_keychain,
            )?;
            context.credential = Some(credential.clone());
        }

        let subscription = self.resolve_scope(
            Scope::Subscription,
            input.subscription_id.as_deref(),
            &credential,
            |cred| self.directory.list_subscriptions(cred),
        )?;
        let subscription_id = subscription.value().to_string();
        context.set(Scope::Subscription, subscription);

        let resource_group = self.resolve_scope(
            Scope::ResourceGroup,
            input.resource_group.as_deref(),
            &credential,
            |cred| self.directory.list_resource_groups(cred, &subscription_id),
        )?;
        let resource_group_name = resource_group.value().to_string();
        context.set(Scope::ResourceGroup, resource_group);

        let site = self.resolve_scope(Scope::Site, input.site_name.as_deref(), &credential, |cred| {
            self.directory
                .list_sites(cred, &subscription_id, &resource_group_name)
        })?;
        context.set(Scope::Site, site);

        Ok(())
    }

    /// Resolve one scope: override wins outright; otherwise list candidates,
    /// take a singleton silently, send several to the chooser, fail on none.
    fn resolve_scope<T, F>(
        &self,
        scope: Scope,
        override_value: Option<&str>,
        credential: &Credential,
        list: F,
    ) -> Result<Resolved>
    where
        T: Candidate,
        F: FnOnce(&Credential) -> Result<Vec<T>>,
    {
        if let Some(value) = override_value {
            debug!(scope = scope.as_str(), value, via = "override", "scope resolved");
            return Ok(Resolved::Override(value.to_string()));
        }

        let candidates = list(credential)?;
        match candidates.len() {
            0 => Err(StratusError::NoCandidates(scope)),
            1 => {
                let value = candidates[0].id().to_string();
                debug!(scope = scope.as_str(), value = %value, via = "auto", "scope resolved");
                Ok(Resolved::Auto(value))
            }
            _ => {
                let chosen = self.chooser.choose(scope, &candidates, override_value)?;
                let value = chosen.id().to_string();
                debug!(scope = scope.as_str(), value = %value, via = "selected", "scope resolved");
                Ok(Resolved::Selected(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_nouns() {
        assert_eq!(Scope::Tenant.plural(), "tenants");
        assert_eq!(Scope::ResourceGroup.noun(), "resource group");
        assert_eq!(Scope::Site.plural(), "static sites");
        assert_eq!(Scope::Subscription.as_str(), "subscription");
    }

    #[test]
    fn test_resolved_accessors() {
        let r = Resolved::Auto("s1".to_string());
        assert_eq!(r.value(), "s1");
        assert_eq!(r.via(), "auto");
        assert_eq!(Resolved::Override("x".into()).via(), "override");
        assert_eq!(Resolved::Selected("x".into()).via(), "selected");
    }

    #[test]
    fn test_context_records_each_scope() {
        let mut context = ResolutionContext::new();
        context.set(Scope::Tenant, Resolved::Override("t1".into()));
        context.set(Scope::Site, Resolved::Auto("web".into()));
        assert_eq!(context.get(Scope::Tenant).unwrap().value(), "t1");
        assert!(context.get(Scope::Subscription).is_none());
        assert_eq!(context.get(Scope::Site).unwrap().value(), "web");
    }
}
