use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use homework_scoreboard::{report, server, Config, SnapshotStore};

#[derive(Parser)]
#[command(name = "homework-scoreboard")]
#[command(about = "Ranked pass/fail roster built from per-assignment spreadsheets", long_about = None)]
struct Cli {
    /// Directory holding the HW* assignment files
    #[arg(long, global = true, env = "HW_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard and its JSON API
    Serve {
        #[arg(long, env = "HW_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
        #[arg(long, env = "HW_WEB_DIR", default_value = "web")]
        web_dir: PathBuf,
    },
    /// Build one snapshot and print it as JSON
    Snapshot {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::default().with_data_dir(cli.data_dir);

    match cli.command {
        Commands::Serve { bind, web_dir } => {
            server::serve(Config {
                bind,
                web_dir,
                ..config
            })
            .await?;
        }
        Commands::Snapshot { out, pretty } => {
            let snapshot = SnapshotStore::new(config.data_dir).load(false);
            let json = if pretty {
                serde_json::to_string_pretty(snapshot.as_ref())?
            } else {
                serde_json::to_string(snapshot.as_ref())?
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Snapshot written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { out, top } => {
            let snapshot = SnapshotStore::new(config.data_dir).load(false);
            let report = report::build_report(&snapshot, top);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
