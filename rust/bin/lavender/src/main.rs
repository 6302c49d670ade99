//! `lavender`: command-line access to the interaction core.
//!
//! Works against a local redb-backed tree and a media directory, acting
//! as the uid from the config file or `--as`.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lavender_core::ServiceConfig;

use commands::App;
use config::AppConfig;

/// Lavender CLI tool.
#[derive(Parser, Debug)]
#[command(name = "lavender", about = "Lavender likes, notifications and posts")]
struct Cli {
    /// Path to config file (default: ./lavender.toml).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Act as this uid instead of the configured one.
    #[arg(long = "as", global = true, value_name = "UID")]
    act_as: Option<String>,

    /// Root directory for local state.
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// redb database file (default: <data-dir>/lavender.redb).
    #[arg(long = "db", global = true)]
    db_path: Option<PathBuf>,

    /// Media directory (default: <data-dir>/media).
    #[arg(long = "blob-dir", global = true)]
    blob_dir: Option<PathBuf>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the tree at a path.
    Get {
        path: String,
    },

    /// Write JSON at a path.
    Put {
        path: String,
        /// JSON body.
        json: String,
        /// Merge object fields instead of replacing the node.
        #[arg(long)]
        merge: bool,
    },

    /// Like a post.
    Like {
        post_id: String,
    },

    /// Remove your like from a post.
    Unlike {
        post_id: String,
    },

    /// Show a post with its likers.
    Show {
        post_id: String,
    },

    /// Delete one of your posts and everything pointing at it.
    Delete {
        post_id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// List notifications.
    Inbox {
        /// Whose inbox (default: the acting uid).
        owner: Option<String>,
        /// Mark every listed notification as seen.
        #[arg(long)]
        mark_checked: bool,
    },

    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("lavender cli v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    config.storage.merge(ServiceConfig {
        data_dir: cli.data_dir,
        db_path: cli.db_path,
        blob_dir: cli.blob_dir,
    });
    if let Some(uid) = cli.act_as {
        config.uid = uid;
    }

    let app = App::open(&config)?;
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Get { path } => {
            commands::tree::get(&app, &path).await?;
        }

        Commands::Put { path, json, merge } => {
            commands::tree::put(&app, &path, &json, merge).await?;
        }

        Commands::Like { post_id } => {
            commands::post::set_like(&app, &post_id, true).await?;
        }

        Commands::Unlike { post_id } => {
            commands::post::set_like(&app, &post_id, false).await?;
        }

        Commands::Show { post_id } => {
            commands::post::show(&app, &post_id, json_output).await?;
        }

        Commands::Delete { post_id, yes } => {
            if !yes {
                eprint!("Delete {} and all its likes, comments and feed entries? [y/N]: ", post_id);
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::post::delete(&app, &post_id).await?;
        }

        Commands::Inbox { owner, mark_checked } => {
            commands::inbox::list(&app, owner.as_deref(), mark_checked, json_output).await?;
        }

        Commands::Version => {}
    }

    Ok(())
}
