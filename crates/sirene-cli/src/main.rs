mod filters;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use sirene_client::{EntityType, RegistryClient};
use sirene_core::Settings;
use sirene_store::{Artifact, Category, DataStore};

use filters::{BulkFilters, ByIdFilters};

#[derive(Parser)]
#[command(name = "sirene", version, about = "Query the Sirene company registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Entity {
    Siren,
    Siret,
}

impl From<Entity> for EntityType {
    fn from(entity: Entity) -> Self {
        match entity {
            Entity::Siren => EntityType::Siren,
            Entity::Siret => EntityType::Siret,
        }
    }
}

impl Entity {
    fn as_str(&self) -> &'static str {
        match self {
            Entity::Siren => "siren",
            Entity::Siret => "siret",
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one page of search results
    Bulk {
        #[arg(value_enum)]
        entity: Entity,

        #[command(flatten)]
        filters: BulkFilters,

        /// Save the payload to the raw bucket; filename defaults to
        /// <entity>_<date>.json
        #[arg(long, value_name = "FILE", num_args = 0..=1)]
        save: Option<Option<String>>,
    },
    /// Fetch a single record by identifier
    Get {
        #[arg(value_enum)]
        entity: Entity,

        /// SIREN or SIRET identifier
        id_code: String,

        #[command(flatten)]
        filters: ByIdFilters,

        /// Save the payload to the raw bucket; filename defaults to
        /// <entity>_<id>_<date>.json
        #[arg(long, value_name = "FILE", num_args = 0..=1)]
        save: Option<Option<String>>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("sirene v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let client = RegistryClient::new(&settings);

    match cli.command {
        Command::Bulk {
            entity,
            filters,
            save,
        } => {
            let payload = client.fetch_bulk(entity.into(), &filters.to_params()).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            if let Some(filename) = save_target(save, entity, None) {
                let store = DataStore::new(&settings);
                store.save(&Artifact::Json(payload), &filename, Category::Raw)?;
            }
        }
        Command::Get {
            entity,
            id_code,
            filters,
            save,
        } => {
            let payload = client
                .fetch_by_id(entity.into(), &id_code, &filters.to_params())
                .await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            if let Some(filename) = save_target(save, entity, Some(&id_code)) {
                let store = DataStore::new(&settings);
                store.save(&Artifact::Json(payload), &filename, Category::Raw)?;
            }
        }
    }

    Ok(())
}

/// Resolve `--save [FILE]` into a filename: `None` when the flag was not
/// given, the explicit name when one was, otherwise a date-stamped default.
fn save_target(save: Option<Option<String>>, entity: Entity, id_code: Option<&str>) -> Option<String> {
    let explicit = save?;
    Some(explicit.unwrap_or_else(|| default_filename(entity, id_code)))
}

fn default_filename(entity: Entity, id_code: Option<&str>) -> String {
    let date = Utc::now().format("%Y-%m-%d");
    match id_code {
        Some(id) => format!("{}_{id}_{date}.json", entity.as_str()),
        None => format!("{}_{date}.json", entity.as_str()),
    }
}
