use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;
use skyresolve_core::{ConfigStore, ResolverConfig};

pub fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    let store = ConfigStore::new_default();
    match action {
        ConfigAction::Show => show_config(cli, &store),
        ConfigAction::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(cli, &store, force),
    }
}

fn show_config(cli: &Cli, store: &ConfigStore) -> Result<()> {
    let data = OutputData::Config {
        path: store.path().display().to_string(),
        exists: store.exists(),
        config: store.load(),
    };
    format_output(&data, &cli.output)
}

fn init_config(cli: &Cli, store: &ConfigStore, force: bool) -> Result<()> {
    if store.exists() && !force {
        return Err(CommandError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        )));
    }
    store.save(&ResolverConfig::default())?;
    tracing::info!(path = %store.path().display(), "Wrote default configuration");

    if cli.output == OutputFormat::Pretty {
        println!(
            "{} {}",
            "Wrote defaults to".green(),
            store.path().display().to_string().cyan()
        );
    } else {
        show_config(cli, store)?;
    }
    Ok(())
}
