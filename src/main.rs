// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use kinetic_canvas::canvas::catalog::{BuiltinCatalog, FileCatalog, ToolCatalog};
use kinetic_canvas::canvas::config::ServerConfig;
use kinetic_canvas::canvas::server;
use kinetic_canvas::canvas::workflow::loader::DocumentLoader;
use kinetic_canvas::canvas::workflow::SubmissionHandler;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Catalog file (YAML or JSON list of descriptors)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Validate a saved workflow document and print the verdict
    Validate {
        /// Path to the workflow file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List the capability catalog
    Tools {
        /// Catalog file (YAML or JSON list of descriptors)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Serve {
            host,
            port,
            catalog,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if catalog.is_some() {
                config.catalog = catalog;
            }

            server::serve(config).await?;
        }
        Commands::Validate { file } => {
            log::info!("Validating workflow file: {}", file.display());

            let raw = DocumentLoader::new().load_value(&file)?;
            let verdict = SubmissionHandler::new().submit(&raw);
            println!("{}", serde_json::to_string_pretty(&verdict)?);

            if verdict.is_error() {
                return Err(verdict.message.into());
            }
        }
        Commands::Tools { catalog } => {
            let registry = ToolCatalog::new();
            let catalog = catalog.or(ServerConfig::from_env()?.catalog);
            let count = match catalog {
                Some(path) => registry.load_from(&FileCatalog::new(path)).await?,
                None => registry.load_from(&BuiltinCatalog).await?,
            };
            log::info!("Loaded {} catalog entries", count);

            for descriptor in registry.list().await {
                println!(
                    "{:<20} {:<6} {:<16} {}",
                    descriptor.id,
                    descriptor.kind,
                    descriptor.category.as_deref().unwrap_or("-"),
                    descriptor.name
                );
            }
        }
    }

    Ok(())
}
