//! File commands: store, replace, inspect, restore, download, delete.

use std::path::{Path, PathBuf};

use clap::Args;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use teamhub_core::config::AppConfig;
use teamhub_core::error::{AppError, ErrorKind};
use teamhub_service::{FileDownload, FileStorageEngine};

use super::parse_file_id;
use crate::output::{self, FileRow, OutputFormat, VersionRow};
use crate::upload::UploadPolicy;

/// Arguments naming a single file
#[derive(Debug, Args)]
pub struct IdArgs {
    /// File ID
    pub id: String,
}

/// Arguments for the store command
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Path to the local file
    pub file: PathBuf,

    /// Override file name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Override the MIME type inferred from the file name
    #[arg(short, long)]
    pub mime: Option<String>,
}

/// Arguments for the replace command
#[derive(Debug, Args)]
pub struct ReplaceArgs {
    /// File ID
    pub id: String,

    #[command(flatten)]
    pub upload: StoreArgs,
}

/// Arguments naming a version of a file
#[derive(Debug, Args)]
pub struct VersionArgs {
    /// File ID
    pub id: String,

    /// Version number
    pub version: u32,
}

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID
    pub id: String,

    /// Destination path (defaults to the stored filename)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the download-version command
#[derive(Debug, Args)]
pub struct DownloadVersionArgs {
    #[command(flatten)]
    pub version: VersionArgs,

    /// Destination path (defaults to the version's filename)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the store command
pub async fn store(
    engine: &FileStorageEngine,
    config: &AppConfig,
    args: &StoreArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let upload = UploadPolicy::from_config(&config.storage)
        .read(&args.file, args.name.as_deref(), args.mime.as_deref())
        .await?;

    let record = engine.store(upload).await?;
    output::print_success(&format!(
        "Stored '{}' (id: {}, {} bytes)",
        record.filename, record.id, record.size_bytes
    ));
    output::print_record(&record, format);
    Ok(())
}

/// Execute the replace command
pub async fn replace(
    engine: &FileStorageEngine,
    config: &AppConfig,
    args: &ReplaceArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let id = parse_file_id(&args.id)?;
    let upload = UploadPolicy::from_config(&config.storage)
        .read(
            &args.upload.file,
            args.upload.name.as_deref(),
            args.upload.mime.as_deref(),
        )
        .await?;

    let record = engine.replace(id, upload).await?;
    output::print_success(&format!(
        "Replaced {} (now {} versions archived)",
        record.id,
        record.versions().len()
    ));
    output::print_record(&record, format);
    Ok(())
}

/// Execute the show command
pub async fn show(
    engine: &FileStorageEngine,
    args: &IdArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let record = engine.get(parse_file_id(&args.id)?).await?;
    output::print_record(&record, format);
    Ok(())
}

/// Execute the list command
pub async fn list(engine: &FileStorageEngine, format: OutputFormat) -> Result<(), AppError> {
    let rows: Vec<FileRow> = engine.list().await?.iter().map(FileRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Execute the versions command
pub async fn versions(
    engine: &FileStorageEngine,
    args: &IdArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let versions = engine.list_versions(parse_file_id(&args.id)?).await?;
    let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Execute the restore command
pub async fn restore(
    engine: &FileStorageEngine,
    args: &VersionArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let record = engine
        .restore_version(parse_file_id(&args.id)?, args.version)
        .await?;
    output::print_success(&format!(
        "Restored version {} of {}",
        args.version, record.id
    ));
    output::print_record(&record, format);
    Ok(())
}

/// Execute the download command
pub async fn download(engine: &FileStorageEngine, args: &DownloadArgs) -> Result<(), AppError> {
    let download = engine.download(parse_file_id(&args.id)?).await?;
    save(download, args.output.as_deref()).await
}

/// Execute the download-version command
pub async fn download_version(
    engine: &FileStorageEngine,
    args: &DownloadVersionArgs,
) -> Result<(), AppError> {
    let download = engine
        .download_version(parse_file_id(&args.version.id)?, args.version.version)
        .await?;
    save(download, args.output.as_deref()).await
}

/// Execute the delete command
pub async fn delete(engine: &FileStorageEngine, args: &IdArgs) -> Result<(), AppError> {
    let record = engine.delete(parse_file_id(&args.id)?).await?;
    output::print_success(&format!("Deleted '{}' ({})", record.filename, record.id));
    Ok(())
}

/// Stream a download to `destination`, or to its filename in the working directory.
async fn save(download: FileDownload, destination: Option<&Path>) -> Result<(), AppError> {
    let target = destination
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&download.filename));

    let mut file = tokio::fs::File::create(&target).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to create {}", target.display()),
            e,
        )
    })?;

    let mut stream = download.stream;
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read stored content", e)
        })?;
        file.write_all(&chunk).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write {}", target.display()),
                e,
            )
        })?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    output::print_success(&format!("Saved {written} bytes to {}", target.display()));
    Ok(())
}
