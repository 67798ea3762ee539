use crate::cli::ConfigCommands;
use crate::config::{self, Config};
use crate::error::{Result, StratusError};

pub fn run(cmd: &ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(),
    }
}

fn show() -> Result<()> {
    let config = Config::load(&config::config_path())?;
    let toml_str =
        toml::to_string_pretty(&config).map_err(|e| StratusError::Config(e.to_string()))?;
    println!("{}", toml_str);
    Ok(())
}
