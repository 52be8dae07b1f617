mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::Config;

fn load_config(cli: &Cli) -> Config {
    if !cli.config.exists() {
        debug!("No config at {:?}, using defaults", cli.config);
        return Config::default();
    }

    match Config::load(&cli.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", cli.config);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.silent { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("hexmap={}", level).parse()?)
                .add_directive(format!("hexmap_core={}", level).parse()?),
        )
        .init();

    let config = load_config(&cli);

    match cli.command {
        Command::Generate {
            path,
            path2,
            game_version,
            commit,
            output,
        } => commands::generate::run(&config, &path, &path2, &game_version, &commit, output),
        Command::Diff { old, new, output } => commands::diff::run(&old, &new, &output),
        Command::Update {
            path,
            dictfile,
            no_backup,
            checksums,
        } => commands::update::run(&config, cli.silent, &path, &dictfile, no_backup, checksums),
        Command::Patch {
            path,
            rules,
            no_backup,
        } => commands::patch::run(&config, cli.silent, path.as_deref(), rules, no_backup),
        Command::Verify { path, checksums } => {
            commands::verify::run(&config, &path, checksums).map(|_| ())
        }
        Command::Checksum { path, output } => commands::checksum::run(&config, &path, output),
    }
}
