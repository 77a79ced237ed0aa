//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, CredentialProfile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Blank out every secret that would otherwise be printed.
fn redact(mut cfg: Config) -> Config {
    if cfg.gateway.api_key.is_some() {
        cfg.gateway.api_key = Some(REDACTED.into());
    }
    for profile in cfg.credentials.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redact(config::load(global)?);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n# {e}")),
                |_| config::config_file(global).display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_file(global).display());
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    // Re-running init extends the existing file.
    let mut cfg = config::load(global)?;

    eprintln!("switchsync configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    cfg.gateway.url = Input::new()
        .with_prompt("Gateway URL")
        .default(cfg.gateway.url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let name: String = Input::new()
        .with_prompt("Credential name")
        .default(cfg.defaults.credential.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Device username")
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Device password: ").map_err(prompt_err)?;
    if username.trim().is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password = if store_selection == 0 {
        switchsync_config::store_secret(&format!("{name}/password"), &password)?;
        eprintln!("   Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    cfg.credentials.insert(
        name.clone(),
        CredentialProfile {
            username: username.trim().to_owned(),
            password,
            password_env: None,
        },
    );
    cfg.defaults.credential = Some(name.clone());

    switchsync_config::save_config_to(&cfg, &path)?;

    eprintln!("\nConfiguration written to {}", path.display());
    eprintln!("  Default credential: {name}");
    eprintln!("\n  Next: switchsync devices add <hostname> --address <ip> --platform nxos");
    Ok(())
}
