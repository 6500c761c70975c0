//! ls command - List the zone root
//!
//! Shows the direct entries of the storage zone. Virtual folders are listed
//! as directories and are not descended into.

use bunstore_core::StorageObject;
use clap::Args;
use serde::Serialize;

use super::{connect_profile, interrupt_token};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List the storage zone
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Summarize output (show totals only)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput<'a> {
    zone: &'a str,
    status: u16,
    items: &'a [StorageObject],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_directories: usize,
    total_size_bytes: u64,
    total_size_human: String,
}

impl Summary {
    fn of(items: &[StorageObject]) -> Self {
        let files = items.iter().filter(|i| !i.is_directory);
        let total_size_bytes = files.clone().map(|i| i.length).sum();
        Self {
            total_objects: files.count(),
            total_directories: items.iter().filter(|i| i.is_directory).count(),
            total_size_bytes,
            total_size_human: humansize::format_size(total_size_bytes, humansize::BINARY),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, profile: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (profile, client) = match connect_profile(profile, &formatter) {
        Ok(connected) => connected,
        Err(code) => return code,
    };
    let zone = profile.zone;

    let outcome = match client.list(&interrupt_token()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            formatter.error(&format!("Failed to list zone '{zone}': {e}"));
            return ExitCode::from(&e);
        }
    };

    let code = ExitCode::from_status(outcome.status);
    if code != ExitCode::Success {
        formatter.status_error("list zone", &zone, outcome.status, None);
        return code;
    }

    let mut items = outcome.objects;
    items.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.object_name.cmp(&b.object_name))
    });

    if formatter.is_json() {
        formatter.json(&LsOutput {
            zone: &zone,
            status: outcome.status.as_u16(),
            items: &items,
            summary: args.summarize.then(|| Summary::of(&items)),
        });
        return ExitCode::Success;
    }

    if !args.summarize {
        for item in &items {
            formatter.println(&format_entry(item));
        }
    }

    if args.summarize || items.is_empty() {
        let summary = Summary::of(&items);
        formatter.println(&format!(
            "Total: {} objects, {} directories, {}",
            summary.total_objects, summary.total_directories, summary.total_size_human
        ));
    }

    ExitCode::Success
}

fn format_entry(item: &StorageObject) -> String {
    let date = item
        .last_changed
        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| " ".repeat(19));

    if item.is_directory {
        format!("[{date}] {:>10} {}/", "DIR", item.object_name)
    } else {
        format!("[{date}] {:>10} {}", item.size_human(), item.object_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_files_and_dirs() {
        let items = vec![
            StorageObject::file("a.txt", 1024),
            StorageObject::file("b.txt", 1024),
            StorageObject::dir("media"),
        ];
        let summary = Summary::of(&items);
        assert_eq!(summary.total_objects, 2);
        assert_eq!(summary.total_directories, 1);
        assert_eq!(summary.total_size_bytes, 2048);
        assert_eq!(summary.total_size_human, "2 KiB");
    }

    #[test]
    fn test_format_entry() {
        let mut file = StorageObject::file("a.txt", 5);
        file.last_changed = Some(jiff::civil::date(2024, 3, 1).at(12, 30, 0, 0));
        let line = format_entry(&file);
        assert!(line.starts_with("[2024-03-01 12:30:00]"));
        assert!(line.ends_with(" a.txt"));

        let dir = format_entry(&StorageObject::dir("media"));
        assert!(dir.contains("DIR"));
        assert!(dir.ends_with(" media/"));
    }
}
