//! Configuration CLI commands

use clap::Subcommand;

use crate::config::{ImportPaths, Settings};
use crate::error::ImportResult;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and paths
    Show,
    /// Change a setting (api-url, api-token, timeout, variant, auto-suggest,
    /// currency-symbol, date-format)
    Set { key: String, value: String },
}

/// `settings` is the stored file, without command-line overrides
pub fn handle_config_command(
    paths: &ImportPaths,
    mut settings: Settings,
    cmd: ConfigCommands,
) -> ImportResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("ledger-import Configuration");
            println!("===========================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  API URL:          {}", settings.api_base_url);
            println!(
                "  API token:        {}",
                if settings.api_token.is_some() { "(set)" } else { "(none)" }
            );
            println!("  Request timeout:  {}s", settings.request_timeout_secs);
            println!("  Wizard variant:   {}", settings.wizard_variant);
            println!("  Auto suggest:     {}", settings.auto_suggest);
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Date format:      {}", settings.date_format);
        }
        ConfigCommands::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save(paths)?;
            println!("Updated {}.", key);
        }
    }
    Ok(())
}
