//! Table and JSON output formatting for CLI commands.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use teamhub_entity::file::{FileRecord, VersionEntry};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One row of the file listing.
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Filename")]
    pub filename: String,
    #[tabled(rename = "MIME")]
    pub mime_type: String,
    #[tabled(rename = "Size")]
    pub size_bytes: u64,
    #[tabled(rename = "Versions")]
    pub versions: usize,
    #[tabled(rename = "Uploaded")]
    pub upload_date: String,
}

impl From<&FileRecord> for FileRow {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id.to_string(),
            filename: record.filename.clone(),
            mime_type: record.mime_type.clone(),
            size_bytes: record.size_bytes,
            versions: record.versions().len(),
            upload_date: timestamp(record.upload_date),
        }
    }
}

/// One row of a version listing.
#[derive(Debug, Serialize, Tabled)]
pub struct VersionRow {
    #[tabled(rename = "Version")]
    pub version: u32,
    #[tabled(rename = "Filename")]
    pub filename: String,
    #[tabled(rename = "MIME")]
    pub mime_type: String,
    #[tabled(rename = "Size")]
    pub size_bytes: u64,
    #[tabled(rename = "Uploaded")]
    pub upload_date: String,
    #[tabled(rename = "Archived")]
    pub archived_at: String,
}

impl From<&VersionEntry> for VersionRow {
    fn from(entry: &VersionEntry) -> Self {
        Self {
            version: entry.version_number,
            filename: entry.filename.clone(),
            mime_type: entry.mime_type.clone(),
            size_bytes: entry.size_bytes,
            upload_date: timestamp(entry.upload_date),
            archived_at: timestamp(entry.archived_at),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a file record with its version chain.
pub fn print_record(record: &FileRecord, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("ID", &record.id.to_string());
            print_kv("Filename", &record.filename);
            print_kv("MIME type", &record.mime_type);
            print_kv("Size", &format!("{} bytes", record.size_bytes));
            print_kv("Storage path", &record.storage_path);
            print_kv("Uploaded", &timestamp(record.upload_date));
            print_kv("Created", &timestamp(record.created_at));
            print_kv("Updated", &timestamp(record.updated_at));
            print_kv("Versions", &record.versions().len().to_string());
            if !record.versions().is_empty() {
                let rows: Vec<VersionRow> = record.versions().iter().map(VersionRow::from).collect();
                println!("{}", Table::new(&rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{key}:"), value);
}
