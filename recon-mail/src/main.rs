//! recon-mail - Attachment harvester
//!
//! Polls a mailbox folder, saves PDF attachments and moves handled messages
//! to the processed folder until `exit` or Ctrl-C.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recon_common::config::{load_toml_config, parse_path};
use recon_common::context::cancel_on_ctrl_c;
use recon_common::logging::init_tracing;
use recon_common::time::now;
use recon_common::{progress, LogFormat, RunContext, RunLog};
use recon_mail::config::MailConfig;
use recon_mail::monitor::spawn_stdin_watch;
use recon_mail::{log_name, DirectoryMailbox, Harvester, PollScheduler, SaveFolders};
use std::path::PathBuf;
use tracing::{error, info};

const TOOL: &str = "recon-mail";

/// Command-line arguments for recon-mail
#[derive(Parser, Debug)]
#[command(name = "recon-mail")]
#[command(about = "Save PDF attachments from a mailbox folder")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ", ", env!("BUILD_PROFILE"), ")"))]
struct Cli {
    /// TOML config file (default: <config_dir>/recon/recon-mail.toml)
    #[arg(long, global = true, env = "RECON_MAIL_CONFIG", value_parser = parse_path)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the mailbox folder
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Mailbox folder; each sub-folder is one message
    #[arg(short, long, env = "RECON_MAIL_SOURCE", value_parser = parse_path)]
    source: Option<PathBuf>,

    /// Where handled messages go (default: "Processed - Scraper Output" next to the source)
    #[arg(long, env = "RECON_MAIL_PROCESSED", value_parser = parse_path)]
    processed: Option<PathBuf>,

    /// Attachment save folder (default: <documents>/Automated_Attachments)
    #[arg(long, env = "RECON_MAIL_SAVE_FOLDER", value_parser = parse_path)]
    save_folder: Option<PathBuf>,

    /// Seconds between mailbox checks
    #[arg(long)]
    interval: Option<u64>,

    /// Check once and stop
    #[arg(long)]
    once: bool,

    /// Log what would be saved without copying or moving anything
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn overrides(&self) -> MailConfig {
        MailConfig {
            source_folder: self.source.clone(),
            processed_folder: self.processed.clone(),
            save_folder: self.save_folder.clone(),
            poll_interval_secs: self.interval,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source): (MailConfig, _) =
        load_toml_config(cli.config.as_deref(), TOOL).context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("Starting {} (Attachment Harvester)", TOOL);
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    source.log(TOOL);

    match cli.command {
        Command::Run(args) => run(args, config).await?,
    }

    Ok(())
}

async fn run(args: RunArgs, config: MailConfig) -> Result<()> {
    let settings = config.overlay(args.overrides()).into_settings()?;
    let folders = SaveFolders::under(&settings.save_folder);
    folders
        .ensure_exist()
        .with_context(|| format!("Failed to create save folders under {}", folders.save.display()))?;

    let mailbox = DirectoryMailbox::open(&settings.source_folder, &settings.processed_folder)?;
    info!("Monitoring folder: {}", settings.source_folder.display());
    info!("Saving attachments to: {}", folders.save.display());
    info!("Processed messages go to: {}", settings.processed_folder.display());

    let ctx = RunContext::new(args.dry_run);
    cancel_on_ctrl_c(ctx.cancel.clone());
    let printer = progress::spawn_console(ctx.events.subscribe());
    if !args.once {
        println!("Type 'exit' and press Enter to stop monitoring");
        spawn_stdin_watch(ctx.cancel.clone());
    }

    let mut log = RunLog::new(&folders.logs, log_name(&now()));
    let mut harvester = Harvester::new(mailbox, folders);
    let mut scheduler = PollScheduler::new(settings.poll_interval_secs);
    if args.once {
        scheduler = scheduler.once();
    }

    let totals = scheduler.run(&mut harvester, &ctx, &mut log).await;

    drop(ctx);
    progress::finish_console(printer).await;

    match log.flush(LogFormat::Csv) {
        Ok(path) => println!("Log exported to {}", path.display()),
        Err(e) => error!("Failed to write attachment log: {}", e),
    }
    info!(
        saved = totals.succeeded,
        duplicates = totals.skipped,
        failed = totals.failed,
        "Process completed"
    );
    Ok(())
}
