//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use syno_drive_core::{ConflictAction, DEFAULT_LIMIT, ServiceType, SortBy, SortDirection};

/// Synology Drive from the command line.
///
/// Logs in to a DSM host, runs one Drive file operation, prints the JSON
/// result (or saves the downloaded file), and logs out again.
#[derive(Parser, Debug)]
#[command(name = "syno-drive")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (defaults to $XDG_CONFIG_HOME/syno-drive/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// NAS base URL, e.g. https://nas.local:5001
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// DSM account name
    #[arg(short = 'u', long, global = true)]
    pub username: Option<String>,

    /// DSM password (falls back to SYNO_DRIVE_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Login session scope
    #[arg(long, global = true, value_parser = parse_service_type)]
    pub service_type: Option<ServiceType>,

    /// Validate TLS certificates (self-signed certificates are accepted by default)
    #[arg(long, global = true)]
    pub strict_tls: bool,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP read timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and out again to check the credentials
    Login,
    /// List recently modified files
    Recent,
    /// List a folder
    List(ListArgs),
    /// Search by keyword
    Search(SearchArgs),
    /// Create a file or folder
    Create(CreateArgs),
    /// Upload a local file
    Upload(UploadArgs),
    /// Delete a file or folder
    Delete(DeleteArgs),
    /// Download one file
    Download(DownloadArgs),
    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the config path and effective values
    Show,
}

/// Sorting and paging flags shared by `list` and `search`.
#[derive(ClapArgs, Debug, Clone)]
pub struct PagingArgs {
    /// Sort direction: asc or desc
    #[arg(long, default_value = "asc", value_parser = parse_sort_direction)]
    pub sort_direction: SortDirection,

    /// Sort key: modified_time, size, owner, type, name
    #[arg(long, default_value = "modified_time", value_parser = parse_sort_by)]
    pub sort_by: SortBy,

    /// Index of the first result
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Maximum number of results
    #[arg(long, default_value_t = DEFAULT_LIMIT, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Folder path, e.g. /mydrive/reports
    pub path: String,

    #[command(flatten)]
    pub paging: PagingArgs,

    /// JSON object filter, e.g. '{"extensions":["pdf"]}'
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SearchArgs {
    /// Search keyword
    pub keyword: String,

    #[command(flatten)]
    pub paging: PagingArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKindArg {
    File,
    Folder,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CreateArgs {
    /// Path of the new entry
    pub path: String,

    /// Entry type
    #[arg(long, value_enum, default_value_t = CreateKindArg::Folder)]
    pub kind: CreateKindArg,

    /// Text content for a new file (only with --kind file)
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UploadArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination path; a trailing '/' keeps the local filename
    pub destination: String,

    /// overwrite, autorename, stop, or version
    #[arg(long, default_value = "version", value_parser = parse_conflict_action)]
    pub conflict_action: ConflictAction,

    /// MIME type of the uploaded part (defaults to application/octet-stream)
    #[arg(long)]
    pub mime_type: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DeleteArgs {
    /// Path to delete
    pub path: String,

    /// Skip the recycle bin
    #[arg(long)]
    pub permanent: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DownloadArgs {
    /// Remote file path
    pub path: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

fn parse_service_type(value: &str) -> Result<ServiceType, String> {
    value.parse()
}

fn parse_sort_direction(value: &str) -> Result<SortDirection, String> {
    value.parse()
}

fn parse_sort_by(value: &str) -> Result<SortBy, String> {
    value.parse()
}

fn parse_conflict_action(value: &str) -> Result<ConflictAction, String> {
    value.parse()
}
