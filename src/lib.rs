//! Stratus CLI — interactive login and account resolution for the Stratus
//! static-site platform.
//!
//! The heart of the crate is [`resolve::Pipeline`], which cascades through
//! tenant → subscription → resource group → site, deciding at each scope
//! between a caller-supplied override, silent auto-selection of a lone
//! candidate, and an interactive prompt — re-authenticating when the tenant
//! is picked interactively. The pipeline is generic over its collaborators
//! ([`auth::CredentialProvider`], [`account::ScopeDirectory`],
//! [`prompts::Chooser`]), with concrete bindings for the platform identity
//! service, the management API, and the terminal.
//!
//! # Quick start
//!
//! ```no_run
//! use stratus::account::rest::RestDirectory;
//! use stratus::auth::identity::IdentityClient;
//! use stratus::auth::keychain::Keychain;
//! use stratus::prompts::TerminalChooser;
//! use stratus::resolve::{Pipeline, ResolutionInput};
//!
//! let config = stratus::config::Config::default();
//! let keychain = Keychain::open(stratus::config::stratus_dir());
//! let provider = IdentityClient::new(&config.endpoints.identity_url, keychain);
//! let directory = RestDirectory::new(&config.endpoints.management_url);
//! let chooser = TerminalChooser::new();
//!
//! let outcome = Pipeline::new(&provider, &directory, &chooser).run(&ResolutionInput::default());
//! if let Some(tenant) = &outcome.context.tenant {
//!     println!("tenant: {}", tenant.value());
//! }
//! ```

pub mod account;
pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod prompts;
pub mod resolve;
pub mod telemetry;
