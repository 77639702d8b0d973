use anyhow::{Context, Result};
use bunnycdn_client::{Config, StorageClient, StorageService};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "bunnycdn")]
#[command(about = "Manage files in a BunnyCDN storage zone")]
struct CliArgs {
    /// Skip the connectivity check against the API on start-up.
    #[arg(long, global = true)]
    no_ping: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the administrative API answers.
    Ping,
    /// List files and folders under a path.
    List {
        #[arg(default_value = "")]
        path: String,
    },
    /// Check whether a file exists.
    Exists { path: String },
    /// Print the size of a file in bytes.
    Size { path: String },
    /// Download a file.
    Get {
        path: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a local file.
    Put {
        local: PathBuf,
        remote: String,
        /// Store under a randomized file name.
        #[arg(long)]
        randomize: bool,
    },
    /// Delete a file or folder.
    Delete { path: String },
    /// Purge a path from the edge cache.
    Purge { path: String },
}

async fn run(args: CliArgs) -> Result<()> {
    let config = Config::from_env()?;
    let client = if args.no_ping || matches!(args.command, Command::Ping) {
        StorageClient::new(config)?
    } else {
        StorageClient::connect(config).await?
    };

    match args.command {
        Command::Ping => {
            let up = client.ping().await?;
            println!("{}", if up { "ok" } else { "unavailable" });
        }
        Command::List { path } => {
            for entry in client.list(&path).await? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
        Command::Exists { path } => {
            println!("{}", client.exists(&path).await?);
        }
        Command::Size { path } => match client.size(&path).await? {
            Some(size) => println!("{}", size),
            None => anyhow::bail!("Could not determine size of {}", path),
        },
        Command::Get { path, output } => {
            let data = client.get(&path).await?;
            match output {
                Some(output) => {
                    tokio::fs::write(&output, &data)
                        .await
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    info!("Saved {} bytes to {}", data.len(), output.display());
                }
                None => {
                    use tokio::io::AsyncWriteExt;
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&data).await?;
                    stdout.flush().await?;
                }
            }
        }
        Command::Put {
            local,
            remote,
            randomize,
        } => {
            let upload = client.upload(&local, &remote, randomize).await?;
            if !upload.stored {
                anyhow::bail!("Upload of {} was not confirmed", upload.remote_path);
            }
            println!("{}", upload.remote_path);
        }
        Command::Delete { path } => {
            if !client.delete(&path).await? {
                anyhow::bail!("Failed to delete {}", path);
            }
        }
        Command::Purge { path } => {
            let response = client.purge(&path).await?;
            println!("{}", response);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bunnycdn_client=info,bunnycdn=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
