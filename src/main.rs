use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use provisioner::adapters::LogWizardEvents;
use provisioner::bootstrap::tracing::init_tracing_subscriber;
use provisioner::bootstrap::{build_install_wizard, load_settings, run_until_interrupted};
use pv_app::InstallWizardOrchestrator;
use pv_core::device::Platform;
use pv_core::security::SecretString;
use pv_core::wizard::{WizardSession, WizardState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "provisioner")]
#[command(about = "Create device configurations on the dashboard")]
struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a configuration for a new device. Install the firmware
    /// manually once it has been compiled.
    Install(InstallArgs),
    /// List supported platforms and their recommended boards.
    Platforms,
}

#[derive(Debug, Args)]
struct InstallArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    platform: Platform,
    /// Board id; the platform's recommended board when omitted.
    #[arg(long)]
    board: Option<String>,
    /// Wi-Fi network; may be omitted when credentials are already stored.
    #[arg(long, default_value = "")]
    ssid: String,
    #[arg(
        long,
        env = "PROVISIONER_WIFI_PASSWORD",
        hide_env_values = true,
        default_value = ""
    )]
    wifi_password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Platforms => {
            for platform in Platform::ALL {
                println!(
                    "{:<10} {:<20} {}",
                    platform.as_str(),
                    platform.display_name(),
                    platform.default_board().unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::Install(args) => {
            let settings = load_settings(cli.settings.as_deref())?;
            init_tracing_subscriber(&settings.log_dir)?;

            let wizard =
                build_install_wizard(&settings, Arc::new(LogWizardEvents::new()), None)?;
            let session =
                run_until_interrupted(&wizard, install(&wizard, args), tokio::signal::ctrl_c())
                    .await?;
            report(&wizard, session).await
        }
    }
}

async fn install(wizard: &InstallWizardOrchestrator, args: InstallArgs) -> Result<WizardSession> {
    wizard.acknowledge_capability().await?;

    let session = wizard
        .submit_basic_config(args.name, args.ssid, SecretString::new(args.wifi_password))
        .await?;
    if session.state == WizardState::BasicConfig {
        return Ok(session);
    }

    let session = match args.board {
        None => wizard.select_platform(args.platform).await?,
        Some(board) => {
            let session = wizard.select_platform_with(args.platform, false).await?;
            if session.state != WizardState::PickBoard {
                return Ok(session);
            }
            wizard.select_board(board).await?
        }
    };
    Ok(session)
}

async fn report(wizard: &InstallWizardOrchestrator, session: WizardSession) -> Result<()> {
    if session.cancelled {
        bail!("installation cancelled");
    }
    if let Some(error) = session.error.as_ref().filter(|e| !e.is_warning()) {
        match &error.details {
            Some(details) => bail!("{} ({details})", error.message),
            None => bail!("{}", error.message),
        }
    }
    if !session.succeeded() {
        bail!("wizard stopped at {:?}", session.state);
    }

    let handle = session
        .configuration_handle
        .as_ref()
        .context("configuration handle missing")?;
    info!(handle = %handle, "configuration created");
    println!("configuration: {handle}");
    if let Some(api_key) = wizard.take_api_key().await {
        println!("api encryption key: {api_key}");
    }
    Ok(())
}
