use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledger_import::api::HttpImportApi;
use ledger_import::cli::{
    handle_catalog_command, handle_config_command, handle_import_command, CatalogCommands,
    ConfigCommands, ImportCommands,
};
use ledger_import::config::{ImportPaths, Settings};
use ledger_import::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger-import",
    version,
    about = "Import bank statements into your finance backend",
    long_about = "ledger-import uploads bank and card statements for parsing, \
                  lets you audit the parsed rows (edit, split, delete, link \
                  reimbursements) and commits the result in one request."
)]
struct Cli {
    /// Backend base URL (overrides the stored setting)
    #[arg(long, global = true, env = "LEDGER_IMPORT_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "LEDGER_IMPORT_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Import(ImportCommands),

    /// Cached accounts, categories and subscriptions
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Fetch and list the backend's accounts
    Accounts,

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Create the data directory and default settings
    Init,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ledger_import={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn connect(paths: ImportPaths, settings: &Settings) -> Result<(Storage, HttpImportApi)> {
    let storage = Storage::new(paths)?;
    if !storage.is_initialized() {
        tracing::info!("no settings file; using defaults (run 'ledger-import init')");
    }
    let api = HttpImportApi::new(settings)?;
    Ok((storage, api))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Initialize paths and settings
    let paths = ImportPaths::new()?;
    let stored = Settings::load_or_create(&paths)?;

    let Some(command) = cli.command else {
        println!("ledger-import - statement import wizard");
        println!();
        println!("Run 'ledger-import --help' for usage information.");
        println!("Run 'ledger-import start <files>' to begin an import.");
        return Ok(());
    };

    let settings = stored.clone().with_overrides(cli.api_url, cli.api_token);

    match command {
        Commands::Init => {
            println!("Initializing ledger-import at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            stored.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Backend: {}", stored.api_base_url);
            println!("Run 'ledger-import config set api-url <url>' to point at your backend.");
        }
        Commands::Config(cmd) => handle_config_command(&paths, stored, cmd)?,
        Commands::Import(cmd) => {
            let (storage, api) = connect(paths, &settings)?;
            handle_import_command(&storage, &api, &settings, cmd)?;
        }
        Commands::Catalog(cmd) => {
            let (storage, api) = connect(paths, &settings)?;
            handle_catalog_command(&storage, &api, &settings, cmd)?;
        }
        Commands::Accounts => {
            let (storage, api) = connect(paths, &settings)?;
            let cmd = CatalogCommands::Accounts { refresh: true };
            handle_catalog_command(&storage, &api, &settings, cmd)?;
        }
    }

    Ok(())
}
