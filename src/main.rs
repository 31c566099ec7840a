use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use lost_and_found::config::AppConfig;
use lost_and_found::logging::{init_logging, OperationTimer};
use lost_and_found::models::{Category, ItemType, LocalItem, NewLocalItem};
use lost_and_found::validation::InputValidator;
use lost_and_found::{EnvironmentConfig, LocalFilter, LocalStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file overriding the layered defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a lost or found item in the local store
    Add {
        /// Short title
        #[arg(short, long)]
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: String,

        /// Category name (see `categories`)
        #[arg(short, long, default_value = "Other")]
        category: String,

        /// LOST or FOUND
        #[arg(long = "type", default_value = "LOST")]
        item_type: String,

        /// Where it was lost or found
        #[arg(short, long)]
        location: String,

        /// Phone number or other contact details
        #[arg(long)]
        contact: String,

        /// Reporter's name
        #[arg(long)]
        name: String,

        /// Reporter's email
        #[arg(long)]
        email: String,

        /// Local image path
        #[arg(long)]
        image: Option<String>,
    },
    /// List items, newest first
    List {
        /// Only LOST or FOUND items
        #[arg(long = "type")]
        item_type: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only items not yet resolved
        #[arg(long)]
        unresolved: bool,
    },
    /// Search titles and descriptions
    Search {
        /// Text to look for
        query: String,
    },
    /// Mark an item as handed back
    Resolve {
        /// Item id
        id: i64,
    },
    /// Delete an item
    Delete {
        /// Item id
        id: i64,
    },
    /// Show the item categories
    Categories,
    /// Show the resolved backend identifiers, secrets masked
    Env,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Keep the guard alive so the file appender flushes
    let _guard = init_logging(&config.logging)?;

    info!("Starting lost-and-found");

    match cli.command {
        Commands::Add {
            title,
            description,
            category,
            item_type,
            location,
            contact,
            name,
            email,
            image,
        } => {
            let item = NewLocalItem {
                title: InputValidator::sanitize_text(&title),
                description: InputValidator::sanitize_text(&description),
                category,
                item_type: item_type.parse()?,
                location: InputValidator::sanitize_text(&location),
                date_reported: None,
                contact_info: InputValidator::sanitize_text(&contact),
                image_uri: image,
                reporter_name: InputValidator::sanitize_text(&name),
                reporter_email: email.trim().to_string(),
            };
            add_item(&open_store(&config)?, item)?;
        },
        Commands::List {
            item_type,
            category,
            unresolved,
        } => {
            let filter = list_filter(item_type.as_deref(), category, unresolved)?;
            list_items(&open_store(&config)?, &filter)?;
        },
        Commands::Search { query } => {
            InputValidator::validate_search_query(&query)?;
            list_items(&open_store(&config)?, &LocalFilter::Search(query.trim().to_string()))?;
        },
        Commands::Resolve { id } => {
            open_store(&config)?.mark_as_resolved(id)?;
            println!("Item {id} marked as resolved");
        },
        Commands::Delete { id } => {
            open_store(&config)?.delete_item(id)?;
            println!("Item {id} deleted");
        },
        Commands::Categories => {
            for category in Category::all() {
                println!("{:<24} {:<14} {}", category.name, category.icon, category.color);
            }
        },
        Commands::Env => show_environment(Path::new(&config.environment.env_file)),
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<LocalStore> {
    let path = config.local_store_path();
    debug!("Opening local store at {}", path.display());
    LocalStore::open(&path).with_context(|| format!("Failed to open local store at {}", path.display()))
}

fn list_filter(item_type: Option<&str>, category: Option<String>, unresolved: bool) -> Result<LocalFilter> {
    let filter = match (item_type, category, unresolved) {
        (_, _, true) => LocalFilter::Unresolved,
        (Some(item_type), _, false) => LocalFilter::ByType(item_type.parse::<ItemType>()?),
        (None, Some(category), false) => LocalFilter::ByCategory(category),
        (None, None, false) => LocalFilter::All,
    };
    Ok(filter)
}

/// Validate and insert one local item
fn add_item(store: &LocalStore, item: NewLocalItem) -> Result<()> {
    let timer = OperationTimer::new("cli_add_item");

    InputValidator::validate_required("title", "Title", &item.title)?;
    InputValidator::validate_required("description", "Description", &item.description)?;
    InputValidator::validate_required("location", "Location", &item.location)?;
    InputValidator::validate_required("contact", "Contact info", &item.contact_info)?;
    InputValidator::validate_required("reporter_name", "Name", &item.reporter_name)?;
    InputValidator::validate_email(&item.reporter_email)?;
    if Category::find(&item.category).is_none() {
        anyhow::bail!("Unknown category: {}. Run `categories` to list them.", item.category);
    }

    let id = store.insert_item(item)?;
    timer.finish();
    println!("Recorded item {id}");
    Ok(())
}

fn list_items(store: &LocalStore, filter: &LocalFilter) -> Result<()> {
    let items = store.query(filter)?;
    info!("Found {} items", items.len());

    if items.is_empty() {
        println!("No items found");
        return Ok(());
    }
    for item in &items {
        println!("{}", format_row(item));
    }
    Ok(())
}

fn format_row(item: &LocalItem) -> String {
    let resolved = if item.is_resolved { " [resolved]" } else { "" };
    format!(
        "#{:<4} {:<5} {:<24} {:<22} {} ({}){}",
        item.id,
        item.item_type.as_str(),
        item.title,
        item.category,
        item.location,
        item.date_reported.format("%b %d, %Y"),
        resolved
    )
}

fn show_environment(env_file: &Path) {
    let environment = EnvironmentConfig::load(env_file);
    for (key, value) in environment.masked_entries() {
        println!("{key}={value}");
    }
}
