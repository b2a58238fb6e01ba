//! recon-upload - Document uploader
//!
//! Uploads staged documents under their mapped identifiers and files each
//! one into the uploaded or failed folder.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recon_common::config::{load_toml_config, parse_path};
use recon_common::context::cancel_on_ctrl_c;
use recon_common::logging::init_tracing;
use recon_common::{progress, LogFormat, RunContext};
use recon_upload::config::UploadConfig;
use recon_upload::template::{default_template_path, write_template};
use recon_upload::{run_upload, DocumentType, SimulatedPortal, TargetField};
use std::path::PathBuf;
use tracing::info;

const TOOL: &str = "recon-upload";

/// Command-line arguments for recon-upload
#[derive(Parser, Debug)]
#[command(name = "recon-upload")]
#[command(about = "Upload staged documents matched against a Title/FinalName mapping")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ", ", env!("BUILD_PROFILE"), ")"))]
struct Cli {
    /// TOML config file (default: <config_dir>/recon/recon-upload.toml)
    #[arg(long, global = true, env = "RECON_UPLOAD_CONFIG", value_parser = parse_path)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a Title,FinalName mapping template
    Template {
        /// Template path (default: <documents>/document_mapping_template.csv)
        #[arg(long, value_parser = parse_path)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        overwrite: bool,
    },

    /// List target fields and document types
    Choices,

    /// Upload every supported file in the staging folder
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Title/FinalName mapping (.csv, .xlsx, .xls)
    #[arg(short, long, env = "RECON_MAPPING_FILE", value_parser = parse_path)]
    mapping_file: Option<PathBuf>,

    /// Staging folder with documents to upload
    #[arg(long, env = "RECON_UPLOAD_FOLDER", value_parser = parse_path)]
    upload_folder: Option<PathBuf>,

    /// Destination for uploaded documents (also holds the run log)
    #[arg(long, env = "RECON_UPLOADED_FOLDER", value_parser = parse_path)]
    uploaded_folder: Option<PathBuf>,

    /// Destination for documents that failed
    #[arg(long, env = "RECON_FAILED_FOLDER", value_parser = parse_path)]
    failed_folder: Option<PathBuf>,

    /// Portal field receiving FinalName (display name, see `choices`)
    #[arg(long)]
    target_field: Option<String>,

    /// Document type (display name, see `choices`)
    #[arg(long)]
    document_type: Option<String>,

    #[arg(long, env = "RECON_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "RECON_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Run log format: text or csv
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Match and log without uploading or moving anything
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn overrides(&self) -> UploadConfig {
        UploadConfig {
            mapping_file: self.mapping_file.clone(),
            upload_folder: self.upload_folder.clone(),
            uploaded_folder: self.uploaded_folder.clone(),
            failed_folder: self.failed_folder.clone(),
            target_field: self.target_field.clone(),
            document_type: self.document_type.clone(),
            username: self.username.clone(),
            log_format: self.log_format,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source): (UploadConfig, _) =
        load_toml_config(cli.config.as_deref(), TOOL).context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("Starting {} (Document Upload)", TOOL);
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log(TOOL);

    match cli.command {
        Command::Template { output, overwrite } => {
            let path = output.unwrap_or_else(default_template_path);
            write_template(&path, overwrite)?;
            println!("CSV template exported to: {}", path.display());
        }
        Command::Choices => {
            println!("Target fields:");
            for field in TargetField::ALL {
                println!("  {}", field);
            }
            println!("Document types:");
            for doc_type in DocumentType::ALL {
                println!("  {}", doc_type);
            }
        }
        Command::Run(args) => run(args, config).await?,
    }

    Ok(())
}

async fn run(args: RunArgs, config: UploadConfig) -> Result<()> {
    let settings = config.overlay(args.overrides());
    let username = settings.username.clone().unwrap_or_default();
    let password = args.password.clone().unwrap_or_default();
    let job = settings.into_job()?;

    info!(
        "Field: {} ({}), document type: {} ({})",
        job.target_field,
        job.target_field.api_name(),
        job.document_type,
        job.document_type.api_name()
    );

    let ctx = RunContext::new(args.dry_run);
    cancel_on_ctrl_c(ctx.cancel.clone());
    let printer = progress::spawn_console(ctx.events.subscribe());

    let result = run_upload(&ctx, &job, &username, &password, SimulatedPortal).await;

    drop(ctx);
    progress::finish_console(printer).await;

    let report = result?;
    if let Some(path) = &report.log_path {
        println!("Log exported to {}", path.display());
    }
    if report.summary.cancelled {
        println!("Upload aborted by user");
    }

    info!("Process completed");
    Ok(())
}
