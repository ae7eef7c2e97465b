//! Catalog CLI commands
//!
//! Fetches the backend's accounts, categories and subscriptions and lists the
//! cached copy that name lookups resolve against.

use clap::Subcommand;

use crate::api::ImportApi;
use crate::config::Settings;
use crate::display::{format_account_list, format_category_tree, format_subscription_list};
use crate::error::ImportResult;
use crate::services::ImportSession;
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Fetch the catalog from the backend
    Refresh,
    /// List cached accounts
    Accounts {
        /// Fetch from the backend first
        #[arg(short, long)]
        refresh: bool,
    },
    /// List cached categories
    Categories {
        #[arg(short, long)]
        refresh: bool,
    },
    /// List cached subscriptions
    Subscriptions {
        #[arg(short, long)]
        refresh: bool,
    },
}

impl CatalogCommands {
    fn wants_refresh(&self) -> bool {
        match self {
            Self::Refresh => true,
            Self::Accounts { refresh }
            | Self::Categories { refresh }
            | Self::Subscriptions { refresh } => *refresh,
        }
    }
}

pub fn handle_catalog_command<A: ImportApi + ?Sized>(
    storage: &Storage,
    api: &A,
    settings: &Settings,
    cmd: CatalogCommands,
) -> ImportResult<()> {
    let catalog = if cmd.wants_refresh() {
        let mut session = ImportSession::open(storage, api, settings)?;
        session.refresh_catalog()?
    } else {
        storage.catalog.load()?
    };

    match cmd {
        CatalogCommands::Refresh => {
            println!(
                "Fetched {} account(s), {} categories and {} subscription(s).",
                catalog.accounts.len(),
                catalog.categories.len(),
                catalog.subscriptions.len()
            );
        }
        CatalogCommands::Accounts { .. } => println!("{}", format_account_list(&catalog.accounts)),
        CatalogCommands::Categories { .. } => print!("{}", format_category_tree(&catalog.categories)),
        CatalogCommands::Subscriptions { .. } => {
            println!("{}", format_subscription_list(&catalog.subscriptions))
        }
    }

    if let Some(fetched_at) = catalog.fetched_at {
        println!("(fetched {})", fetched_at.format("%Y-%m-%d %H:%M UTC"));
    }

    Ok(())
}
