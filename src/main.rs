//! CLI entry point for the Synology Drive tool.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use syno_drive_core::{
    ClientConfig, CreateParams, Credential, DeleteParams, DownloadParams, DriveClient,
    ListParams, Operation, OperationOutput, Paging, SearchParams, UploadFile, UploadParams,
    save_to_dir,
};
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::{FileConfig, PASSWORD_ENV_VAR, VerbositySetting, load_file_config_from};
use cli::{Args, Command, ConfigCommand, CreateKindArg, PagingArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let loaded = load_file_config_from(args.config.as_deref())?;
    let file_config = loaded.config.clone().unwrap_or_default();

    init_tracing(&args, file_config.verbosity);
    debug!(config_path = ?loaded.path, "configuration loaded");

    if let Command::Config {
        command: ConfigCommand::Show,
    } = &args.command
    {
        print_config(&args, loaded.path.as_deref(), &file_config);
        return Ok(());
    }

    // Validate the operation before touching the network.
    let operation = build_operation(&args.command).await?;
    if let Some(operation) = &operation {
        operation.validate()?;
    }

    let credential = resolve_credential(&args, &file_config)?;
    let client_config = ClientConfig {
        connect_timeout_secs: args
            .connect_timeout
            .or(file_config.connect_timeout_secs)
            .unwrap_or(ClientConfig::default().connect_timeout_secs),
        read_timeout_secs: args
            .read_timeout
            .or(file_config.read_timeout_secs)
            .unwrap_or(ClientConfig::default().read_timeout_secs),
        ..ClientConfig::default()
    };

    let mut client = DriveClient::with_config(credential, &client_config)?;
    client.login().await?;

    let result = match &operation {
        None => {
            info!("credentials accepted");
            Ok(())
        }
        Some(operation) => run_operation(&client, operation, download_dir(&args.command)).await,
    };

    if let Err(error) = client.logout().await {
        warn!(%error, "logout failed");
    }
    result
}

fn init_tracing(args: &Args, configured: Option<VerbositySetting>) {
    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match (args.verbose, configured) {
            (0, Some(VerbositySetting::Quiet)) => "error",
            (0, Some(VerbositySetting::Verbose)) | (1, _) => "debug",
            (0, Some(VerbositySetting::Debug)) => "trace",
            (0, _) => "info",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_credential(args: &Args, file_config: &FileConfig) -> Result<Credential> {
    let Some(base_url) = args.base_url.clone().or_else(|| file_config.base_url.clone()) else {
        bail!("No NAS address configured. Pass --base-url or set `base_url` in the config file");
    };
    let Some(username) = args.username.clone().or_else(|| file_config.username.clone()) else {
        bail!("No account configured. Pass --username or set `username` in the config file");
    };
    let password = match &args.password {
        Some(password) => password.clone(),
        None => env::var(PASSWORD_ENV_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .with_context(|| format!("No password given. Pass --password or set {PASSWORD_ENV_VAR}"))?,
    };

    let service_type = args
        .service_type
        .or(file_config.service_type)
        .unwrap_or_default();
    let allow_self_signed = !args.strict_tls && file_config.allow_self_signed.unwrap_or(true);

    Ok(Credential::new(base_url, username, password)
        .with_service_type(service_type)
        .with_allow_self_signed(allow_self_signed))
}

fn paging(args: &PagingArgs) -> Paging {
    Paging {
        sort_direction: args.sort_direction,
        sort_by: args.sort_by,
        offset: args.offset,
        limit: args.limit,
    }
}

/// Maps a subcommand onto a Drive operation. `None` for `login`.
async fn build_operation(command: &Command) -> Result<Option<Operation>> {
    let operation = match command {
        Command::Login | Command::Config { .. } => return Ok(None),
        Command::Recent => Operation::Recent,
        Command::List(list) => {
            let mut params = ListParams::new(list.path.clone());
            params.paging = paging(&list.paging);
            if let Some(raw) = &list.filter {
                params.filter =
                    serde_json::from_str(raw).context("`--filter` must be valid JSON")?;
            }
            Operation::List(params)
        }
        Command::Search(search) => {
            let mut params = SearchParams::new(search.keyword.clone());
            params.paging = paging(&search.paging);
            Operation::Search(params)
        }
        Command::Create(create) => match (create.kind, &create.content) {
            (CreateKindArg::Folder, Some(_)) => {
                bail!("`--content` is only valid with `--kind file`")
            }
            (CreateKindArg::Folder, None) => {
                Operation::Create(CreateParams::folder(create.path.clone()))
            }
            (CreateKindArg::File, content) => Operation::Create(CreateParams::file(
                create.path.clone(),
                content.clone().unwrap_or_default(),
            )),
        },
        Command::Upload(upload) => {
            let bytes = tokio::fs::read(&upload.file)
                .await
                .with_context(|| format!("Failed to read '{}'", upload.file.display()))?;
            let filename = upload
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut params = UploadParams::new(
                upload.destination.clone(),
                UploadFile {
                    bytes,
                    filename,
                    mime_type: upload.mime_type.clone(),
                },
            );
            params.conflict_action = upload.conflict_action;
            Operation::Upload(params)
        }
        Command::Delete(delete) => {
            let mut params = DeleteParams::new(delete.path.clone());
            params.permanent = delete.permanent;
            Operation::Delete(params)
        }
        Command::Download(download) => {
            Operation::Download(DownloadParams::new(download.path.clone()))
        }
    };
    Ok(Some(operation))
}

fn download_dir(command: &Command) -> &Path {
    match command {
        Command::Download(download) => &download.output,
        _ => Path::new("."),
    }
}

async fn run_operation(client: &DriveClient, operation: &Operation, output_dir: &Path) -> Result<()> {
    match client.execute(operation).await? {
        OperationOutput::Json(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OperationOutput::Download(payload) => {
            let file = payload.into_result()?;
            let path: PathBuf = save_to_dir(&file, output_dir).await?;
            info!(
                path = %path.display(),
                bytes = file.bytes.len(),
                mime_type = %file.mime_type,
                "Download complete"
            );
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn print_config(args: &Args, path: Option<&Path>, file_config: &FileConfig) {
    let path_label = path.map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
    let base_url = args.base_url.as_ref().or(file_config.base_url.as_ref());
    let username = args.username.as_ref().or(file_config.username.as_ref());
    let service_type = args
        .service_type
        .or(file_config.service_type)
        .unwrap_or_default();
    let allow_self_signed = !args.strict_tls && file_config.allow_self_signed.unwrap_or(true);
    let password_set =
        args.password.is_some() || env::var(PASSWORD_ENV_VAR).is_ok_and(|v| !v.is_empty());
    let defaults = ClientConfig::default();

    println!("config_path = {path_label}");
    println!("base_url = {}", base_url.map_or("<unset>", String::as_str));
    println!("username = {}", username.map_or("<unset>", String::as_str));
    println!("password = {}", if password_set { "<set>" } else { "<unset>" });
    println!("service_type = {service_type}");
    println!("allow_self_signed = {allow_self_signed}");
    println!(
        "connect_timeout_secs = {}",
        args.connect_timeout
            .or(file_config.connect_timeout_secs)
            .unwrap_or(defaults.connect_timeout_secs)
    );
    println!(
        "read_timeout_secs = {}",
        args.read_timeout
            .or(file_config.read_timeout_secs)
            .unwrap_or(defaults.read_timeout_secs)
    );
    println!(
        "verbosity = {}",
        file_config
            .verbosity
            .unwrap_or(VerbositySetting::Default)
            .as_str()
    );
}
