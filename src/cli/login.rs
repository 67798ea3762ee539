use console::style;
use secrecy::SecretString;

use crate::account::rest::RestDirectory;
use crate::auth::identity::IdentityClient;
use crate::auth::keychain::Keychain;
use crate::cli::LoginOpts;
use crate::config::{self, Config};
use crate::error::Result;
use crate::prompts::TerminalChooser;
use crate::resolve::{Pipeline, ResolutionContext, ResolutionInput, Scope};
use crate::telemetry;

pub fn run(opts: &LoginOpts) -> Result<()> {
    let config = Config::load(&config::config_path())?;

    // Flags (with their env fallbacks, handled by clap) win over config file.
    let input = ResolutionInput {
        tenant_id: opts
            .tenant_id
            .clone()
            .or_else(|| config.login.tenant_id.clone()),
        subscription_id: opts
            .subscription_id
            .clone()
            .or_else(|| config.login.subscription_id.clone()),
        resource_group: opts
            .resource_group
            .clone()
            .or_else(|| config.login.resource_group.clone()),
        site_name: opts
            .app_name
            .clone()
            .or_else(|| config.login.app_name.clone()),
        client_id: opts
            .client_id
            .clone()
            .or_else(|| config.login.client_id.clone()),
        client_secret: opts.client_secret.clone().map(SecretString::new),
        use_keychain: opts
            .use_keychain
            .or(config.login.use_keychain)
            .unwrap_or(true),
    };

    let keychain = Keychain::open(config::stratus_dir());
    let provider = IdentityClient::new(&config.endpoints.identity_url, keychain);
    let directory = RestDirectory::new(&config.endpoints.management_url);
    let chooser = TerminalChooser::new();

    let outcome = Pipeline::new(&provider, &directory, &chooser).run(&input);

    match outcome.error {
        None => {
            eprintln!("{}", style("✔ Logged in successfully to Stratus!").green());
            print_resolved(&outcome.context);
            telemetry::collect_event(&config.telemetry, "login", &[("outcome", "success")]);
            Ok(())
        }
        Some(error) => {
            // Report whatever resolved before the failure
            print_resolved(&outcome.context);
            telemetry::collect_event(&config.telemetry, "login", &[("outcome", error.error_code())]);
            Err(error)
        }
    }
}

fn print_resolved(context: &ResolutionContext) {
    for scope in [
        Scope::Tenant,
        Scope::Subscription,
        Scope::ResourceGroup,
        Scope::Site,
    ] {
        if let Some(resolved) = context.get(scope) {
            eprintln!(
                "  {} {}",
                style(format!("{}:", scope.noun())).dim(),
                resolved.value()
            );
        }
    }
}
