mod favorites;
mod render;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::favorites::FavoritesCommands;
use crate::search::{OriginArgs, SearchForm};

#[derive(Debug, Parser)]
#[command(name = "spotfinder")]
#[command(about = "Find places to eat and visit within a distance or travel-time budget")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for places and print one page of results
    Search {
        #[command(flatten)]
        form: SearchForm,
        #[command(flatten)]
        origin: OriginArgs,
        /// Restore a search from a share link or its query string
        #[arg(long)]
        from_url: Option<String>,
        /// Look up thumbnails for the displayed page
        #[arg(long)]
        thumbnails: bool,
        /// Toggle a place from the results in or out of the favorites
        #[arg(long = "toggle-favorite", value_name = "ID")]
        toggle_favorite: Vec<String>,
        /// Print the result page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the geodata query a search would send, without sending it
    Query {
        #[command(flatten)]
        form: SearchForm,
        #[command(flatten)]
        origin: OriginArgs,
    },
    /// Manage favorite places
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = spotfinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            form,
            origin,
            from_url,
            thumbnails,
            toggle_favorite,
            json,
        } => {
            search::run_search(
                &config,
                &search::SearchRequest {
                    form,
                    origin,
                    from_url,
                    thumbnails,
                    toggle_favorite,
                    json,
                },
            )
            .await?;
        }
        Commands::Query { form, origin } => search::run_query(&form, &origin)?,
        Commands::Favorites { command } => favorites::run_favorites(&config, command)?,
    }

    Ok(())
}
