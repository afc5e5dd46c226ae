use anyhow::Result;
use clap::{CommandFactory, Parser};
use mensetsu::app;
use mensetsu::cli::{Cli, Commands, ConfigAction};
use mensetsu::config::Config;
use owo_colors::OwoColorize;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&config_path)?.with_env_overrides();
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    if let Some(device) = cli.device.clone() {
        config.audio.device = Some(device);
    }

    match cli.command {
        None | Some(Commands::Interview) => {
            app::run_interview(&config, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Onboard {
            cv,
            company,
            language,
            duration,
        }) => {
            app::run_onboard(
                &config,
                cv.as_deref(),
                &company,
                language.as_deref(),
                duration,
                cli.quiet,
            )
            .await?;
        }
        Some(Commands::Debrief) => {
            app::run_debrief(&config, cli.quiet).await?;
        }
        Some(Commands::Devices) => {
            app::run_devices()?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config_path)?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "mensetsu", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Handle `mensetsu config <action>` against the on-disk file (environment
/// overrides are deliberately not persisted).
fn handle_config_command(action: ConfigAction, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default(path)?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default(path)?;
            config.set(&key, &value)?;
            config.save(path)?;
            println!("{} = {}", key.bold(), value);
        }
        ConfigAction::List => {
            let config = Config::load_or_default(path)?;
            for key in Config::keys() {
                let value = config.get(key).unwrap_or_default();
                println!("{} = {}", key.bold(), value);
            }
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}
