//! recon-update - Bulk record update CLI
//!
//! Lists the updatable fields, writes sheet templates and replays a sheet of
//! `equipment_id` + field values against the record API.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recon_common::config::{load_toml_config, parse_path, resolve};
use recon_common::context::cancel_on_ctrl_c;
use recon_common::logging::init_tracing;
use recon_common::{progress, Error, RunContext};
use recon_update::config::{UpdateConfig, DEFAULT_TIMEOUT_SECS};
use recon_update::template::{default_template_path, write_template};
use recon_update::{fields, load_updates, login, run_updates, Credentials, RecordField, RecordUpdater};
use recon_update::{HttpRecordApi, SimulatedRecordApi};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const TOOL: &str = "recon-update";

/// Command-line arguments for recon-update
#[derive(Parser, Debug)]
#[command(name = "recon-update")]
#[command(about = "Bulk record updates from a spreadsheet")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ", ", env!("BUILD_PROFILE"), ")"))]
struct Cli {
    /// TOML config file (default: <config_dir>/recon/recon-update.toml)
    #[arg(long, global = true, env = "RECON_UPDATE_CONFIG", value_parser = parse_path)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the updatable fields with their numbers
    Fields,

    /// Write a CSV template with equipment_id and the selected field columns
    Template {
        #[command(flatten)]
        selection: FieldSelection,

        /// Template path (default: <downloads>/RECON_UPDATE_TEMPLATE.csv)
        #[arg(long, value_parser = parse_path)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        overwrite: bool,
    },

    /// Send the updates in a sheet
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct FieldSelection {
    /// Field display name, case-insensitive (repeatable)
    #[arg(long = "field", value_name = "NAME")]
    fields: Vec<String>,

    /// Field numbers from `fields`, comma separated (e.g. 1,3,5)
    #[arg(long, value_name = "LIST", conflicts_with = "fields")]
    select: Option<String>,
}

impl FieldSelection {
    fn resolve(&self) -> recon_common::Result<Vec<RecordField>> {
        match &self.select {
            Some(list) => fields::select_by_numbers(list),
            None if !self.fields.is_empty() => fields::select_by_names(&self.fields),
            None => Err(Error::Input("select fields with --field or --select".to_string())),
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    selection: FieldSelection,

    /// Sheet with updates (.csv, .xlsx, .xls)
    #[arg(short, long, value_parser = parse_path)]
    input: PathBuf,

    /// Folder for update_log.csv (default: current directory)
    #[arg(short, long, env = "RECON_OUTPUT_DIR", value_parser = parse_path)]
    output_dir: Option<PathBuf>,

    #[arg(long, env = "RECON_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "RECON_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, env = "RECON_CUSTOMER_ID")]
    customer_id: Option<String>,

    /// Record API base URL; without it updates go to the simulated API
    #[arg(long, env = "RECON_UPDATE_ENDPOINT")]
    endpoint: Option<String>,

    /// Simulated API answers 500 for this record id (repeatable)
    #[arg(long = "reject", value_name = "ID")]
    reject: Vec<String>,

    /// Log every row without sending anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source): (UpdateConfig, _) =
        load_toml_config(cli.config.as_deref(), TOOL).context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("Starting {} (Bulk Record Update)", TOOL);
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log(TOOL);

    match cli.command {
        Command::Fields => {
            println!("Available fields:");
            for line in fields::menu() {
                println!("{}", line);
            }
        }
        Command::Template {
            selection,
            output,
            overwrite,
        } => {
            let selected = selection.resolve()?;
            let path = output.unwrap_or_else(default_template_path);
            write_template(&path, &selected, overwrite)?;
            println!("Template saved to: {}", path.display());
        }
        Command::Run(args) => run(args, config).await?,
    }

    Ok(())
}

async fn run(args: RunArgs, config: UpdateConfig) -> Result<()> {
    let selected = args.selection.resolve()?;
    info!(
        "Selected fields: {}",
        selected.iter().map(|f| f.display_name()).collect::<Vec<_>>().join(", ")
    );

    let credentials = Credentials {
        username: resolve(args.username, config.username, String::new),
        password: args.password.unwrap_or_default(),
        customer_id: resolve(args.customer_id, config.customer_id, String::new),
    };
    let session = login(&credentials).await?;

    let updates = load_updates(&args.input, &selected)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let output_dir = resolve(args.output_dir, config.output_dir, || PathBuf::from("."));
    let endpoint = args.endpoint.or(config.endpoint);
    let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    let ctx = RunContext::new(args.dry_run);
    cancel_on_ctrl_c(ctx.cancel.clone());
    let printer = progress::spawn_console(ctx.events.subscribe());

    let report = match endpoint {
        Some(endpoint) => {
            let api = HttpRecordApi::new(&endpoint, timeout)?;
            info!("Record API: {}", api.update_url());
            run_updates(&ctx, &updates, &RecordUpdater::new(api, session), &output_dir).await
        }
        None => {
            info!("Record API: simulated");
            let mut rejects = config.reject_ids;
            rejects.extend(args.reject);
            let api = SimulatedRecordApi::new().with_rejects(&rejects);
            run_updates(&ctx, &updates, &RecordUpdater::new(api, session), &output_dir).await
        }
    };

    drop(ctx);
    progress::finish_console(printer).await;

    match report {
        Some(report) => {
            if let Some(path) = &report.log_path {
                println!("Update log saved to: {}", path.display());
            }
            if report.summary.cancelled {
                println!("Run cancelled by user");
            }
        }
        None => println!("No updates to process"),
    }

    info!("Operation complete");
    Ok(())
}
