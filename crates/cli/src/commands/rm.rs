//! rm command - Remove objects
//!
//! Deletes one or more objects. A missing object is reported as not found,
//! never as a successful removal.

use clap::Args;
use serde::Serialize;

use super::{connect, interrupt_token};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object name(s) to remove
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Treat missing objects as already removed
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
    total: usize,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, profile: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match connect(profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let cancel = interrupt_token();

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut exit = ExitCode::Success;

    for name in &args.names {
        let status = match client.delete(name, &cancel).await {
            Ok(status) => status,
            Err(e) => {
                formatter.error(&format!("Failed to remove '{name}': {e}"));
                failed.push(name.clone());
                exit = ExitCode::from(&e);
                // Interrupts and broken connections end the batch.
                if matches!(exit, ExitCode::Interrupted | ExitCode::NetworkError) {
                    break;
                }
                continue;
            }
        };

        match ExitCode::from_status(status) {
            ExitCode::Success => deleted.push(name.clone()),
            ExitCode::NotFound if args.force => {
                tracing::debug!(name, "Object already absent");
            }
            code => {
                formatter.status_error("remove", name, status, None);
                failed.push(name.clone());
                exit = code;
                if code == ExitCode::AuthError {
                    break;
                }
            }
        }
    }

    if formatter.is_json() {
        formatter.json(&RmOutput {
            status: if failed.is_empty() { "success" } else { "partial" },
            total: deleted.len(),
            deleted,
            failed,
        });
    } else if !deleted.is_empty() {
        formatter.success(&format!("Removed {} object(s).", deleted.len()));
    }

    exit
}
