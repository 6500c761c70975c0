//! CLI command definitions and execution
//!
//! Every remote command resolves a profile, connects a client and runs a
//! single operation under a cancellation token tied to Ctrl-C.

use bunstore_core::{CancellationToken, ConfigManager, Profile, ProfileManager, StorageClient};
use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
mod completions;
mod get;
mod ls;
mod profile;
mod put;
mod rm;

/// bunstore - storage zone client
///
/// Upload, download, list and delete objects in a BunnyCDN-style storage zone.
#[derive(Parser, Debug)]
#[command(name = "bunstore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Profile to use instead of the configured default
    #[arg(short, long, global = true, env = "BUNSTORE_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage storage zone profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List the root of the storage zone
    Ls(ls::LsArgs),

    /// Write an object to stdout
    Cat(cat::CatArgs),

    /// Download an object to a local file
    Get(get::GetArgs),

    /// Upload a file, stdin or literal text as an object
    Put(put::PutArgs),

    /// Delete an object
    Rm(rm::RmArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = output_config(&cli);
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, profile, output_config).await,
        Commands::Cat(args) => cat::execute(args, profile, output_config).await,
        Commands::Get(args) => get::execute(args, profile, output_config).await,
        Commands::Put(args) => put::execute(args, profile, output_config).await,
        Commands::Rm(args) => rm::execute(args, profile, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Merge command line flags with the defaults stored in the config file
fn output_config(cli: &Cli) -> OutputConfig {
    let defaults = ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.defaults)
        .unwrap_or_default();

    OutputConfig {
        json: cli.json || defaults.output == "json",
        no_color: cli.no_color,
        no_progress: cli.no_progress || !defaults.progress,
        quiet: cli.quiet,
    }
}

/// Resolve a profile and connect a client for it
fn connect(profile: Option<&str>, formatter: &Formatter) -> Result<StorageClient, ExitCode> {
    connect_profile(profile, formatter).map(|(_, client)| client)
}

/// Like [`connect`], also returning the resolved profile
fn connect_profile(
    profile: Option<&str>,
    formatter: &Formatter,
) -> Result<(Profile, StorageClient), ExitCode> {
    let connected = ProfileManager::new()
        .and_then(|manager| manager.resolve(profile))
        .and_then(|profile| {
            let client = bunstore_http::connect(profile.client_config()?)?;
            Ok((profile, client))
        });

    connected.map_err(|e| {
        formatter.error(&e.to_string());
        ExitCode::from(&e)
    })
}

/// Token cancelled when the user presses Ctrl-C
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupt received, cancelling");
            trigger.cancel();
        }
    });
    token
}
