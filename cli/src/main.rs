//! Connect CLI - inspect and edit state files through the mutable state facade

use clap::{Parser, Subcommand};
use connect_cli::{keys, list_paths, load_config, open_store, read, save_state, write};
use connect_core::{Mode, Owner};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "connect")]
#[command(about = "Connect - path-aware mutable state inspector")]
#[command(version)]
struct Cli {
    /// JSON state file
    #[arg(short, long)]
    state: PathBuf,
    
    /// Store configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    
    /// Store mode (development or production), overrides the config file
    #[arg(short, long)]
    mode: Option<Mode>,
    
    /// Debug owner name stamped on nodes in development mode
    #[arg(long)]
    owner: Option<String>,
    
    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
    
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every node path
    Paths,
    
    /// Print the value at a path
    Get {
        /// Dotted path, e.g. users.0.profile.name
        path: String,
    },
    
    /// List the keys of the node at a path
    Keys {
        /// Dotted path, defaults to the state root
        #[arg(default_value = "state")]
        path: String,
    },
    
    /// Write a JSON value at a path
    Set {
        /// Dotted path, e.g. users.0.profile.name
        path: String,
        
        /// JSON value to write
        value: String,
        
        /// Save the result back to the state file instead of printing it
        #[arg(long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    
    let config = load_config(cli.config.as_deref(), cli.mode)?;
    let store = open_store(&cli.state, config)?;
    let root = store.create_mutable_state(cli.owner.map(Owner::debug));
    debug!(mode = %store.mode(), owner = ?root.owner(), "Store ready");
    
    match cli.command {
        Commands::Paths => {
            for path in list_paths(&root)? {
                println!("{}", path);
            }
        }
        
        Commands::Get { path } => {
            let value = read(&root, &path)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        
        Commands::Keys { path } => {
            for key in keys(&root, &path)? {
                println!("{}", key);
            }
        }
        
        Commands::Set { path, value, write: persist } => {
            let value: serde_json::Value = serde_json::from_str(&value)?;
            write(&root, &path, value)?;
            
            if persist {
                save_state(&cli.state, &store)?;
                println!("State saved to: {}", cli.state.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
            }
        }
    }
    
    Ok(())
}
