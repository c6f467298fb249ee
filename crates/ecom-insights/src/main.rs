// ecom-insights/crates/ecom-insights/src/main.rs

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use ecom_insights::{config::Config, run_import, run_server, telemetry};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "ecom-insights", version, about = "Import e-commerce CSVs and serve them over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Command {
    /// Recreate the catalog tables and load every CSV file into them
    Import {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Serve the dump endpoints and the chat proxy
    Serve {
        #[arg(long)]
        database: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cli = Cli::parse();
    let mut cfg = Config::from_env()?;

    match cli.command {
        Command::Import { data_dir, database } => {
            if let Some(dir) = data_dir {
                cfg.data_dir = dir;
            }
            if let Some(path) = database {
                cfg.database_path = path;
            }
            let report = tokio::task::spawn_blocking(move || {
                run_import(&cfg.database_path, &cfg.data_dir)
            })
            .await??;
            println!("{}", report);
            Ok(())
        }
        Command::Serve { database, host, port } => {
            if let Some(path) = database {
                cfg.database_path = path;
            }
            if let Some(host) = host {
                cfg.api_host = host;
            }
            if let Some(port) = port {
                cfg.api_port = port;
            }
            run_server(cfg).await
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
