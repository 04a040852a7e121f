//! Headless command-line frontend for Hostdeck
//!
//! Drives the same shell core as the desktop app against the same data
//! directory, one command per invocation.

mod adapters;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use adapters::{HeadlessSurfaceFactory, LoggingScreenShare, LoggingWindowMenu, TerminalDialogs};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hostdeck_app::adapters::{DirectoryStartupHooks, JsonFileStore};
use hostdeck_app::{load_settings, AppState, AppStateBuilder};
use hostdeck_core::services::{parse_deep_link, DeepLinkOutcome, FormSubmission, FormValidation};
use hostdeck_core::types::{ContentMessage, ShellCommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const STORE_FILE: &str = "store.json";

#[derive(Parser)]
#[command(name = "hostdeck")]
#[command(about = "Manage Hostdeck servers from the terminal", long_about = None)]
struct Cli {
    /// Data directory shared with the desktop app
    #[arg(long, env = "HOSTDECK_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List servers in sidebar order
    List,
    /// Validate and add a server (empty input uses the default instance)
    Add {
        #[arg(default_value = "")]
        input: String,
    },
    /// Remove a server
    Remove { url: String },
    /// Make a server the active one
    Activate { url: String },
    /// Probe a server without adding it
    Validate { url: String },
    /// Handle a `hostdeck://` deep link
    Open { link: String },
    /// Move a server to a new sidebar slot (0-based) and activate it
    Move { url: String, index: usize },
    /// Set a server's title
    Title { url: String, title: String },
    /// Apply an unread badge and print the aggregated badge
    Badge { url: String, value: Option<String> },
    /// Forget every trusted certificate
    ClearCerts,
    /// Sidebar visibility
    Sidebar {
        #[command(subcommand)]
        action: SidebarCommands,
    },
    /// Whether a release should be announced
    UpdateCheck {
        version: String,
        /// Never announce this version again
        #[arg(long)]
        skip: bool,
    },
}

#[derive(Subcommand)]
enum SidebarCommands {
    Toggle,
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("hostdeck"))
        .context("Could not determine data directory; pass --data-dir")
}

async fn build_state(data_dir: &Path, assume_yes: bool) -> Result<AppState> {
    let config = load_settings(data_dir);
    let store = JsonFileStore::open(data_dir.join(STORE_FILE))
        .await
        .context("Failed to open store")?;

    let state = AppStateBuilder::new()
        .store(Arc::new(store))
        .surfaces(Arc::new(HeadlessSurfaceFactory))
        .dialogs(Arc::new(TerminalDialogs::new(assume_yes)))
        .window_menu(Arc::new(LoggingWindowMenu))
        .screen_share(Arc::new(LoggingScreenShare))
        .config(config)
        .build()?;

    let mut manifest_dirs = vec![data_dir.to_path_buf()];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
    {
        manifest_dirs.push(exe_dir);
    }
    state
        .run_startup(&DirectoryStartupHooks::new(manifest_dirs), &[])
        .await?;
    Ok(state)
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tracing::debug!("Using data directory {}", data_dir.display());

    let state = build_state(&data_dir, cli.yes).await?;
    let shell = &state.shell;

    match cli.command {
        Commands::List => {
            let entries = shell.sidebar_entries().await;
            if entries.is_empty() {
                println!("No servers configured");
            }
            for entry in entries {
                let marker = if entry.active { "*" } else { " " };
                println!(
                    "{marker} {:<3} {:<3} {:<32} {}",
                    entry.hotkey, entry.initials, entry.label, entry.url
                );
            }
        }
        Commands::Add { input } => match shell.submit_add_host_form(&input).await? {
            FormSubmission::Added(url) => println!("Added {url}"),
            FormSubmission::Existing(url) => println!("{url} already configured, activated"),
            FormSubmission::Rejected(FormValidation::Invalid { url, failure }) => {
                bail!("{url} rejected: {failure}")
            }
            FormSubmission::Rejected(other) => bail!("Server rejected: {other:?}"),
        },
        Commands::Remove { url } => {
            shell.execute(ShellCommand::RemoveHost(url.clone())).await?;
            println!("Removed {url}");
        }
        Commands::Activate { url } => {
            shell.execute(ShellCommand::ActivateHost(url)).await?;
            if let Some(active) = shell.active_host().await {
                println!("Active: {active}");
            }
        }
        Commands::Validate { url } => match shell.registry().validate_host(&url, None).await {
            Ok(()) => println!("{url} is valid"),
            Err(failure) => bail!("{url}: {failure}"),
        },
        Commands::Open { link } => {
            let scheme = &state.ctx.config.url_scheme;
            let Some(url) = parse_deep_link(scheme, &link) else {
                bail!("Not a {scheme}:// link: {link}");
            };
            match shell.add_host_request(&url).await? {
                DeepLinkOutcome::Activated(url) => println!("Activated {url}"),
                DeepLinkOutcome::Added(url) => println!("Added {url}"),
                DeepLinkOutcome::Declined => println!("Declined"),
                DeepLinkOutcome::Invalid { url, failure } => bail!("{url}: {failure}"),
            }
        }
        Commands::Move { url, index } => {
            shell.move_sidebar_entry(&url, index).await?;
            println!("Moved {url} to slot {}", index + 1);
        }
        Commands::Title { url, title } => {
            if !shell.registry().host_exists(&url).await {
                bail!("Unknown server {url}");
            }
            shell
                .on_content_message(&url, ContentMessage::TitleChanged(title))
                .await;
            if let Some(record) = shell.registry().get(&url).await {
                println!("{url}: {}", record.title);
            }
        }
        Commands::Badge { url, value } => {
            if !shell.registry().host_exists(&url).await {
                bail!("Unknown server {url}");
            }
            shell
                .on_content_message(&url, ContentMessage::UnreadChanged(value))
                .await;
            let global = shell.global_badge().await;
            println!("Global badge: \"{global}\" (tray alert: {})", global.tray_alert());
        }
        Commands::ClearCerts => {
            shell.execute(ShellCommand::ClearCertificateTrust).await?;
            println!("Certificate trust cleared");
        }
        Commands::Sidebar { action } => {
            let visible = match action {
                SidebarCommands::Toggle => shell.toggle_sidebar().await,
                SidebarCommands::Status => shell.sidebar_visible().await,
            };
            println!("Sidebar {}", if visible { "shown" } else { "hidden" });
        }
        Commands::UpdateCheck { version, skip } => {
            let notifier = shell.update_notifier();
            if skip {
                notifier.skip_version(&version).await;
                println!("Version {version} will not be announced");
            } else if notifier.should_notify(&version).await {
                println!("Announce {version}");
            } else {
                println!("Do not announce {version}");
            }
        }
    }

    Ok(())
}
