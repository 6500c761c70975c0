//! put command - Upload an object
//!
//! Sources are a local file (seekable, so `--offset` applies), stdin when the
//! source is `-`, or the source argument itself with `--text`.

use std::path::Path;

use anyhow::Context;
use bunstore_core::{PutOptions, UploadSource};
use clap::Args;
use serde::Serialize;

use super::{connect, interrupt_token};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload an object
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file, `-` for stdin, or the content itself with --text
    pub source: String,

    /// Object name
    pub name: String,

    /// Skip this many bytes of a file source before uploading
    #[arg(long, default_value = "0")]
    pub offset: u64,

    /// Upload the source argument as UTF-8 text
    #[arg(long, conflicts_with = "offset")]
    pub text: bool,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    name: String,
    http_status: u16,
}

/// Execute the put command
pub async fn execute(args: PutArgs, profile: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let mut source = if args.text {
        UploadSource::from_text(&args.source)
    } else {
        match open_source(&args.source).await {
            Ok(source) => source,
            Err(e) => {
                formatter.error(&format!("{e:#}"));
                return ExitCode::UsageError;
            }
        }
    };

    let client = match connect(profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let progress = ProgressBar::new(&output_config, &args.name, None);
    let reporter = progress.clone();
    let report = move |sent: u64, total: Option<u64>| reporter.update(sent, total);
    let options = PutOptions::default()
        .offset(args.offset)
        .auto_dispose(true)
        .progress(&report);

    let result = client
        .put(&args.name, &mut source, options, &interrupt_token())
        .await;
    progress.finish_and_clear();

    let status = match result {
        Ok(status) => status,
        Err(e) => {
            formatter.error(&format!("Failed to upload '{}': {e}", args.name));
            return ExitCode::from(&e);
        }
    };

    let code = ExitCode::from_status(status);
    if code != ExitCode::Success {
        formatter.status_error("upload", &args.name, status, None);
        return code;
    }

    if formatter.is_json() {
        formatter.json(&PutOutput {
            status: "success",
            name: args.name,
            http_status: status.as_u16(),
        });
    } else {
        formatter.success(&format!("Uploaded '{}'", args.name));
    }
    ExitCode::Success
}

async fn open_source(source: &str) -> anyhow::Result<UploadSource> {
    if source == "-" {
        return Ok(UploadSource::sequential(tokio::io::stdin()));
    }

    let path = Path::new(source);
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    let metadata = file
        .metadata()
        .await
        .with_context(|| format!("Failed to stat '{}'", path.display()))?;
    anyhow::ensure!(metadata.is_file(), "'{}' is not a regular file", path.display());

    Ok(UploadSource::seekable(file))
}
