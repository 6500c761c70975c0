//! Profile management commands
//!
//! Profiles are named storage zones with their access key and optional
//! endpoint, encoding and timeout overrides.

use bunstore_core::{ConfigManager, DEFAULT_ENDPOINT, Profile, ProfileManager};
use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List,

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "media", "backups")
    pub name: String,

    /// Storage zone name
    pub zone: String,

    /// Storage zone access key
    pub access_key: String,

    /// Regional endpoint (default: https://storage.bunnycdn.com)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Send object names verbatim, allowing virtual folders such as "a/b.txt"
    #[arg(long, default_value = "false")]
    pub no_auto_encode: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Use this profile when --profile is not given
    #[arg(long, default_value = "false")]
    pub default: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for output (without the access key)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    zone: String,
    endpoint: String,
    auto_encode: bool,
    default: bool,
}

impl ProfileInfo {
    fn new(profile: &Profile, default: Option<&str>) -> Self {
        Self {
            name: profile.name.clone(),
            zone: profile.zone.clone(),
            endpoint: profile
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            auto_encode: profile.auto_encode.unwrap_or(true),
            default: default == Some(profile.name.as_str()),
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let config_manager = match ConfigManager::new() {
        Ok(cm) => cm,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, config_manager, &formatter),
        ProfileCommands::List => execute_list(config_manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, config_manager, &formatter),
    }
}

fn execute_set(args: SetArgs, config_manager: ConfigManager, formatter: &Formatter) -> ExitCode {
    if args.name.is_empty() || args.zone.is_empty() || args.access_key.is_empty() {
        formatter.error("Profile name, zone and access key cannot be empty");
        return ExitCode::UsageError;
    }

    let mut profile = Profile::new(&args.name, &args.zone, &args.access_key);
    profile.endpoint = args.endpoint;
    profile.auto_encode = args.no_auto_encode.then_some(false);
    profile.timeout_secs = args.timeout;

    // Reject overrides the client would refuse later.
    if let Err(e) = profile.client_config() {
        formatter.error(&e.to_string());
        return ExitCode::from(&e);
    }

    let manager = ProfileManager::with_config_manager(config_manager);
    let result = manager.set(profile).and_then(|()| {
        if args.default {
            manager.set_default(&args.name)
        } else {
            Ok(())
        }
    });

    match result {
        Ok(()) => {
            let message = format!("Profile '{}' configured successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

fn execute_list(config_manager: ConfigManager, formatter: &Formatter) -> ExitCode {
    let config = match config_manager.load() {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let default = config.defaults.profile.as_deref();
    let profiles: Vec<ProfileInfo> = config
        .profiles
        .iter()
        .map(|p| ProfileInfo::new(p, default))
        .collect();

    if formatter.is_json() {
        formatter.json(&ProfileListOutput { profiles });
    } else if profiles.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        let rows = profiles
            .into_iter()
            .map(|p| {
                vec![
                    if p.default { format!("{} *", p.name) } else { p.name },
                    p.zone,
                    p.endpoint,
                    if p.auto_encode { "on" } else { "off" }.to_string(),
                ]
            })
            .collect();
        formatter.table(&["Name", "Zone", "Endpoint", "Encode names"], rows);
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, config_manager: ConfigManager, formatter: &Formatter) -> ExitCode {
    let manager = ProfileManager::with_config_manager(config_manager);

    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Profile '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}
