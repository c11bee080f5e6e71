//! Delicious Dry Fruits CLI - Data file management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin user (password from -p or DDF_ADMIN_PASSWORD)
//! ddf-cli admin create -e admin@example.com -n "Store Admin"
//!
//! # Replace the catalog from a YAML or JSON file
//! ddf-cli catalog import catalog.yaml
//!
//! # Show record counts
//! ddf-cli store stats
//! ```
//!
//! Every command works on the data file named by `--data-file`, falling back
//! to `DDF_DATA_FILE` and then `data/db.json`. The storefront can keep
//! running, but writes from both processes are not coordinated.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ddf_storefront::config::DEFAULT_DATA_FILE;
use ddf_storefront::db::Store;

mod commands;

#[derive(Parser)]
#[command(name = "ddf-cli")]
#[command(author, version, about = "Delicious Dry Fruits CLI tools")]
struct Cli {
    /// Path of the JSON data file
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect the data file
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (defaults to `DDF_ADMIN_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Replace products (and categories, if listed) from a YAML or JSON file
    Import {
        /// Catalog file (`.yaml`, `.yml` or `.json`)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Print record counts
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn data_file(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("DDF_DATA_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(data_file(cli.data_file));

    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&store, &email, &name, password).await?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Import { file } => {
                commands::catalog::import(&store, &file).await?;
            }
        },
        Commands::Store { action } => match action {
            StoreAction::Stats => commands::store::stats(&store).await,
        },
    }
    Ok(())
}
