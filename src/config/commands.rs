//! Config command handlers

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::Config;
use crate::cli::{ConfigAction, ConfigArgs};

pub fn run(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(explicit),
        ConfigAction::Init { force } => init_config(explicit, force),
        ConfigAction::Set { key, value } => set_config(explicit, &key, &value),
        ConfigAction::Get { key } => get_config(explicit, &key),
        ConfigAction::Path => show_path(explicit),
    }
}

fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = Config::load(explicit)?;
    let content = toml::to_string_pretty(&config)?;

    println!("{}", "[Config]".green());
    println!("{}", content);

    Ok(())
}

fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = Config::resolve_path(explicit)?;

    if path.exists() && !force {
        println!(
            "{}",
            format!("Config file already exists: {}", path.display()).yellow()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let saved_path = Config::default().save(explicit)?;

    println!("{}", "[Config] Initialized".green());
    println!("  Created: {}", saved_path.display());

    Ok(())
}

fn set_config(explicit: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let mut config = Config::load(explicit)?;

    apply(&mut config, key, value)?;

    config.save(explicit)?;
    println!("{}", format!("[Config] Set {} = {}", key, value).green());

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["paths", "source"] => config.paths.source = value.to_string(),
        ["paths", "target"] => config.paths.target = value.to_string(),
        ["paths", "premade"] => config.paths.premade = value.to_string(),
        // Empty disables the copy; None would fall back to the default on reload
        ["paths", "collection"] => config.paths.collection = Some(value.to_string()),
        ["search", "target_names"] => {
            config.search.target_names = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        ["search", "package_prefix"] => config.search.package_prefix = value.to_string(),
        ["logging", "file"] => config.logging.file = value.to_string(),
        ["logging", "level"] => config.logging.level = value.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

fn lookup(config: Config, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["paths", "source"] => Some(config.paths.source),
        ["paths", "target"] => Some(config.paths.target),
        ["paths", "premade"] => Some(config.paths.premade),
        ["paths", "collection"] => config.paths.collection.filter(|c| !c.is_empty()),
        ["search", "target_names"] => Some(config.search.target_names.join(",")),
        ["search", "package_prefix"] => Some(config.search.package_prefix),
        ["logging", "file"] => Some(config.logging.file),
        ["logging", "level"] => Some(config.logging.level),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    Ok(value)
}

fn get_config(explicit: Option<&Path>, key: &str) -> Result<()> {
    let config = Config::load(explicit)?;

    match lookup(config, key)? {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = (not set)", key),
    }

    Ok(())
}

fn show_path(explicit: Option<&Path>) -> Result<()> {
    match Config::resolve_path(explicit) {
        Ok(path) => {
            println!("{}", path.display());
            if path.exists() {
                println!("{}", "(exists)".green());
            } else {
                println!("{}", "(not created)".yellow());
            }
        }
        Err(_) => {
            println!("{}", "Could not determine config path".red());
        }
    }
    Ok(())
}
