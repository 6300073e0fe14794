//! pasteboxd: the pastebox daemon.
//!
//! Assembles the paste store (redb or in-memory backend, Argon2id guard,
//! random slugs) and serves the REST API.
//!
//! # Usage
//!
//! ```text
//! pasteboxd serve --config /etc/pastebox.toml --port 8080
//! pasteboxd serve --in-memory
//! pasteboxd check-config /etc/pastebox.toml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pastebox_core::{PasteboxConfig, StorageBackendKind, StorageConfig};
use pastebox_state::{MemoryBackend, PasteBackend, PasteStore, RedbBackend};
use tracing::{error, info};

const DEFAULT_LOG_FILTER: &str = "info,pasteboxd=debug,pastebox=debug";

#[derive(Parser)]
#[command(name = "pasteboxd", about = "pastebox daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the paste API.
    Serve {
        /// Path to pastebox.toml. Built-in defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides server.port).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the paste database (overrides storage.data_dir).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Keep pastes in memory only (overrides storage.backend).
        #[arg(long)]
        in_memory: bool,
    },
    /// Parse and validate a config file, then print the effective settings.
    CheckConfig {
        path: PathBuf,
    },
}

#[derive(Debug, Default)]
struct Overrides {
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            data_dir,
            in_memory,
        } => {
            let overrides = Overrides {
                port,
                data_dir,
                in_memory,
            };
            let config = load_config(config.as_deref(), overrides)?;
            run_server(config).await
        }
        Command::CheckConfig { path } => {
            let config = PasteboxConfig::from_file(&path)?;
            println!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<PasteboxConfig> {
    let mut config = match path {
        Some(path) => PasteboxConfig::from_file(path)?,
        None => PasteboxConfig::default(),
    };

    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(data_dir) = overrides.data_dir {
        config.storage.data_dir = data_dir;
    }
    if overrides.in_memory {
        config.storage.backend = StorageBackendKind::Memory;
    }

    config.validate()?;
    Ok(config)
}

fn open_backend(storage: &StorageConfig) -> anyhow::Result<Arc<dyn PasteBackend>> {
    match storage.backend {
        StorageBackendKind::Redb => {
            std::fs::create_dir_all(&storage.data_dir)?;
            let db_path = storage.db_path();
            let backend = RedbBackend::open(&db_path)?;
            info!(path = ?db_path, "paste database opened");
            Ok(Arc::new(backend))
        }
        StorageBackendKind::Memory => {
            info!("using in-memory paste backend, pastes will not survive restart");
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}

async fn run_server(config: PasteboxConfig) -> anyhow::Result<()> {
    info!("pastebox daemon starting");

    let backend = open_backend(&config.storage)?;
    let store = PasteStore::from_config(backend, &config)?;
    info!(
        max_slug_attempts = store.max_slug_attempts(),
        argon2_memory_kib = config.credential.memory_kib,
        argon2_iterations = config.credential.iterations,
        "paste store initialized"
    );

    let router = pastebox_api::build_router(store);
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening");

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("pastebox daemon stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let config = load_config(None, Overrides::default()).unwrap();
        assert_eq!(config, PasteboxConfig::default());
    }

    #[test]
    fn cli_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pastebox.toml");
        std::fs::write(&path, "[server]\nport = 9000\n\n[store]\nmax_slug_attempts = 3\n").unwrap();

        let overrides = Overrides {
            port: Some(9100),
            data_dir: Some(dir.path().to_path_buf()),
            in_memory: true,
        };
        let config = load_config(Some(&path), overrides).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.data_dir, dir.path());
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);
        assert_eq!(config.store.max_slug_attempts, 3);
    }

    #[test]
    fn zero_port_override_is_rejected() {
        let overrides = Overrides {
            port: Some(0),
            ..Default::default()
        };
        assert!(load_config(None, overrides).is_err());
    }

    #[test]
    fn redb_backend_created_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            backend: StorageBackendKind::Redb,
            data_dir: dir.path().join("nested"),
        };

        let backend = open_backend(&storage).unwrap();
        assert_eq!(backend.count().unwrap(), 0);
        assert!(storage.db_path().exists());
    }

    #[test]
    fn memory_backend_needs_no_directory() {
        let storage = StorageConfig {
            backend: StorageBackendKind::Memory,
            data_dir: PathBuf::from("/nonexistent/pastebox"),
        };
        let backend = open_backend(&storage).unwrap();
        assert_eq!(backend.count().unwrap(), 0);
    }
}
