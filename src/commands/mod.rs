//! CLI command definitions and dispatch.

pub mod file;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use teamhub_core::config::AppConfig;
use teamhub_core::error::AppError;
use teamhub_core::traits::storage::StorageProvider;
use teamhub_core::types::FileId;
use teamhub_entity::file::FileRecord;
use teamhub_service::FileStorageEngine;
use teamhub_storage::{LocalStorageProvider, MemoryStorageProvider};

use crate::output::OutputFormat;

/// TeamHub: versioned file storage
#[derive(Debug, Parser)]
#[command(name = "teamhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store a local file as a new file record
    Store(file::StoreArgs),
    /// Replace a file's content, archiving the current content
    Replace(file::ReplaceArgs),
    /// Show a file record and its versions
    Show(file::IdArgs),
    /// List all files
    List,
    /// List a file's archived versions
    Versions(file::IdArgs),
    /// Restore an archived version as the active content
    Restore(file::VersionArgs),
    /// Download a file's active content
    Download(file::DownloadArgs),
    /// Download an archived version
    DownloadVersion(file::DownloadVersionArgs),
    /// Delete a file
    Delete(file::IdArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let engine = build_engine(config).await?;
        let format = self.format;

        match &self.command {
            Commands::Store(args) => file::store(&engine, config, args, format).await,
            Commands::Replace(args) => file::replace(&engine, config, args, format).await,
            Commands::Show(args) => file::show(&engine, args, format).await,
            Commands::List => file::list(&engine, format).await,
            Commands::Versions(args) => file::versions(&engine, args, format).await,
            Commands::Restore(args) => file::restore(&engine, args, format).await,
            Commands::Download(args) => file::download(&engine, args).await,
            Commands::DownloadVersion(args) => file::download_version(&engine, args).await,
            Commands::Delete(args) => file::delete(&engine, args).await,
        }
    }
}

/// Helper: wire the configured provider and metadata store into an engine
pub async fn build_engine(config: &AppConfig) -> Result<FileStorageEngine, AppError> {
    let provider: Arc<dyn StorageProvider> = match config.storage.provider.as_str() {
        "local" => Arc::new(LocalStorageProvider::new(&config.storage.data_root).await?),
        "memory" => Arc::new(MemoryStorageProvider::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider: {other}"
            )));
        }
    };
    let store = teamhub_database::open_store::<FileRecord>(&config.database).await?;

    tracing::debug!(
        provider = provider.provider_type(),
        store = store.store_type(),
        "Engine initialized"
    );
    FileStorageEngine::new(provider, store, &config.storage)
}

/// Helper: parse a file id argument
pub fn parse_file_id(raw: &str) -> Result<FileId, AppError> {
    raw.parse::<FileId>()
        .map_err(|_| AppError::validation(format!("Invalid file id: {raw}")))
}
