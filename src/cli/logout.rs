use console::style;

use crate::auth::keychain::Keychain;
use crate::config;
use crate::error::Result;

pub fn run() -> Result<()> {
    let keychain = Keychain::open(config::stratus_dir());
    if keychain.clear()? {
        eprintln!("{}", style("✔ Cached credentials removed").green());
    } else {
        eprintln!("No cached credentials to remove");
    }
    Ok(())
}
