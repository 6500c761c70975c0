//! cat command - Display object contents
//!
//! Streams an object to stdout without buffering it in memory.

use clap::Args;
use tokio::io::AsyncWriteExt;

use super::{connect, interrupt_token};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Display object contents
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object name
    pub name: String,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, profile: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match connect(profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let cancel = interrupt_token();

    let outcome = match client.get(&args.name, &cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            formatter.error(&format!("Failed to get '{}': {e}", args.name));
            return ExitCode::from(&e);
        }
    };

    let code = ExitCode::from_status(outcome.status);
    if code != ExitCode::Success {
        let detail = outcome.body.text().await.ok();
        formatter.status_error("get", &args.name, outcome.status, detail.as_deref());
        return code;
    }

    // Write directly to stdout (not through formatter to preserve binary data)
    let mut reader = outcome.body.into_reader();
    let mut stdout = tokio::io::stdout();
    let copied = tokio::select! {
        _ = cancel.cancelled() => return ExitCode::Interrupted,
        copied = tokio::io::copy(&mut reader, &mut stdout) => copied,
    };

    match copied {
        Ok(_) => match stdout.flush().await {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                formatter.error(&format!("Failed to write to stdout: {e}"));
                ExitCode::GeneralError
            }
        },
        Err(e) => {
            formatter.error(&format!("Failed to read '{}': {e}", args.name));
            ExitCode::GeneralError
        }
    }
}
