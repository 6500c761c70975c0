//! get command - Download an object to a local file
//!
//! The body is written to `<file>.part` and renamed into place only when the
//! service reported success, so a failed or interrupted download never
//! replaces an existing file.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use super::{connect, interrupt_token};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download an object
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object name
    pub name: String,

    /// Destination file (default: the object name in the current directory)
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    name: String,
    target: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the get command
pub async fn execute(args: GetArgs, profile: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let target = match args.file.clone().or_else(|| default_target(&args.name)) {
        Some(target) => target,
        None => {
            formatter.error(&format!(
                "Cannot derive a file name from '{}', pass a destination",
                args.name
            ));
            return ExitCode::UsageError;
        }
    };

    let client = match connect(profile, &formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let partial = partial_path(&target);
    let mut file = match tokio::fs::File::create(&partial).await {
        Ok(f) => f,
        Err(e) => {
            formatter.error(&format!("Failed to create '{}': {e}", partial.display()));
            return ExitCode::GeneralError;
        }
    };

    let progress = ProgressBar::new(&output_config, &args.name, None);
    let reporter = progress.clone();
    let report = move |transferred: u64, total: Option<u64>| reporter.update(transferred, total);

    let result = client
        .get_to(&args.name, &mut file, Some(&report), &interrupt_token())
        .await;
    progress.finish_and_clear();
    drop(file);

    let status = match result {
        Ok(status) => status,
        Err(e) => {
            discard(&partial).await;
            formatter.error(&format!("Failed to download '{}': {e}", args.name));
            return ExitCode::from(&e);
        }
    };

    let code = ExitCode::from_status(status);
    if code != ExitCode::Success {
        // The partial file holds the service's error document.
        let detail = tokio::fs::read_to_string(&partial).await.ok();
        discard(&partial).await;
        formatter.status_error("download", &args.name, status, detail.as_deref());
        return code;
    }

    if let Err(e) = tokio::fs::rename(&partial, &target).await {
        discard(&partial).await;
        formatter.error(&format!("Failed to move download into '{}': {e}", target.display()));
        return ExitCode::GeneralError;
    }

    let size = tokio::fs::metadata(&target).await.map(|m| m.len()).unwrap_or(0);
    if formatter.is_json() {
        formatter.json(&GetOutput {
            status: "success",
            name: args.name,
            target: target.display().to_string(),
            size_bytes: size,
            size_human: humansize::format_size(size, humansize::BINARY),
        });
    } else {
        formatter.success(&format!(
            "{} -> {} ({})",
            args.name,
            target.display(),
            humansize::format_size(size, humansize::BINARY)
        ));
    }
    ExitCode::Success
}

/// Last path segment of an object name
fn default_target(name: &str) -> Option<PathBuf> {
    name.rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(PathBuf::from)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::debug!(path = %path.display(), error = %e, "Failed to remove partial download");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target() {
        assert_eq!(default_target("a.txt"), Some(PathBuf::from("a.txt")));
        assert_eq!(default_target("a/b/c.bin"), Some(PathBuf::from("c.bin")));
        assert_eq!(default_target("a/"), None);
        assert_eq!(default_target(".."), None);
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/out.bin")),
            PathBuf::from("/tmp/out.bin.part")
        );
    }
}
