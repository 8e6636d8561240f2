//! Config subcommand handlers.

use beanscope_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = load(global);
            println!("{cfg:#?}");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", path(global).display());
            Ok(())
        }

        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init => {
            let target = path(global);
            if target.exists() {
                return Err(CliError::Config(config::ConfigError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", target.display()),
                }));
            }
            config::save_config_to(&Config::default(), &target)?;
            eprintln!("Configuration written to {}", target.display());
            Ok(())
        }
    }
}

fn path(global: &GlobalOpts) -> std::path::PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(config::config_path)
}

fn load(global: &GlobalOpts) -> Config {
    match &global.config {
        Some(path) => config::load_config_from(path).unwrap_or_default(),
        None => config::load_config_or_default(),
    }
}
