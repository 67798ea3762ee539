pub mod config;
pub mod login;
pub mod logout;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stratus",
    version,
    about = "CLI for the Stratus static-site platform"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the Stratus platform
    #[command(after_help = "\
Examples:

  Interactive login
  stratus login

  Interactive login without storing credentials
  stratus login --use-keychain false

  Login into specific tenant
  stratus login --tenant 12345678-abcd-0123-4567-abcdef012345

  Login using service principal
  stratus login --tenant 12345678-abcd-0123-4567-abcdef012345 \\
                --client-id 00000000-0000-0000-0000-000000000000 \\
                --client-secret <secret>
")]
    Login(LoginOpts),

    /// Remove cached credentials from the keychain
    Logout,

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct LoginOpts {
    /// Tenant ID
    #[arg(long = "tenant", env = "STRATUS_TENANT_ID", value_name = "tenantId")]
    pub tenant_id: Option<String>,

    /// Subscription ID used by this project
    #[arg(
        long = "subscription",
        env = "STRATUS_SUBSCRIPTION_ID",
        value_name = "subscriptionId"
    )]
    pub subscription_id: Option<String>,

    /// Resource group used by this project
    #[arg(
        long = "resource-group",
        env = "STRATUS_RESOURCE_GROUP",
        value_name = "resourceGroup"
    )]
    pub resource_group: Option<String>,

    /// Static site application name
    #[arg(long = "app-name", env = "STRATUS_APP_NAME", value_name = "appName")]
    pub app_name: Option<String>,

    /// Client ID for service principal login
    #[arg(long = "client-id", env = "STRATUS_CLIENT_ID", value_name = "clientId")]
    pub client_id: Option<String>,

    /// Client secret for service principal login
    #[arg(
        long = "client-secret",
        env = "STRATUS_CLIENT_SECRET",
        value_name = "clientSecret",
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Enable credentials cache persistence
    #[arg(
        long = "use-keychain",
        env = "STRATUS_USE_KEYCHAIN",
        value_name = "BOOL"
    )]
    pub use_keychain: Option<bool>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
}
