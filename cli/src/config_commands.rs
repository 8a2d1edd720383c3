//! `config`, `config get` and `config set`

use crate::colors::Colors;
use crate::config_utils::{config_path, load_config};
use anyhow::{Context, Result};
use std::path::PathBuf;
use x402_router_lib::Config;

/// Print the config file location and its contents
pub fn show_command(config_override: Option<&PathBuf>) -> Result<()> {
    let config = load_config(config_override)?;
    let path = config_path(config_override)?;

    println!(
        "{} {}",
        Colors::key("Config file:"),
        Colors::path(&path.display().to_string())
    );
    println!();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Print one value by dotted key
pub fn get_command(config_override: Option<&PathBuf>, key: &str) -> Result<()> {
    let config = load_config(config_override)?;
    let value = config.get(key)?;
    println!("{}", render_value(&value)?);
    Ok(())
}

/// Set one value by dotted key and save the file
pub fn set_command(config_override: Option<&PathBuf>, key: &str, raw: &str) -> Result<()> {
    let path = config_path(config_override)?;
    let mut config = Config::load_or_default(Some(&path))
        .with_context(|| format!("Failed to read {}", path.display()))?;

    config.set(key, raw)?;
    config.save_to(Some(&path))?;

    let value = config.get(key)?;
    println!("{} = {}", Colors::key(key), render_value(&value)?);
    Ok(())
}

/// Strings print bare, sections print as TOML, everything else as a TOML literal.
fn render_value(value: &toml::Value) -> Result<String> {
    Ok(match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(table) => toml::to_string_pretty(table)?.trim_end().to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_value() {
        assert_eq!(
            render_value(&toml::Value::String("https://r.test".into())).unwrap(),
            "https://r.test"
        );
        assert_eq!(render_value(&toml::Value::Float(0.5)).unwrap(), "0.5");
        assert_eq!(render_value(&toml::Value::Boolean(true)).unwrap(), "true");

        let mut table = toml::map::Map::new();
        table.insert("timeout_ms".into(), toml::Value::Integer(30000));
        assert_eq!(
            render_value(&toml::Value::Table(table)).unwrap(),
            "timeout_ms = 30000"
        );
    }
}
