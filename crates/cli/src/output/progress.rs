//! Progress display for transfers
//!
//! The storage client reports `(transferred, total)` after every chunk. A
//! [`ProgressBar`] turns those reports into an indicatif bar when the total is
//! known, or a byte-counting spinner when it is not.

use std::time::Duration;

use indicatif::ProgressStyle;

use super::OutputConfig;

const BAR_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

/// Transfer progress bar
///
/// Cheap to clone; clones drive the same bar. Suppressed in quiet or JSON mode
/// and with `--no-progress`.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a progress bar for a transfer of `total` bytes, when known
    pub fn new(config: &OutputConfig, message: &str, total: Option<u64>) -> Self {
        if config.quiet || config.json || config.no_progress {
            return Self { bar: None };
        }

        let bar = match total {
            Some(total) => indicatif::ProgressBar::new(total),
            None => indicatif::ProgressBar::new_spinner(),
        };
        bar.set_style(style(total.is_some()));
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    /// Record a progress report from the storage client
    pub fn update(&self, transferred: u64, total: Option<u64>) {
        let Some(bar) = &self.bar else { return };

        if let Some(total) = total
            && bar.length() != Some(total)
        {
            bar.set_length(total);
            bar.set_style(style(true));
        }
        bar.set_position(transferred);
    }

    /// Finish and clear the progress bar
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if progress bar is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

fn style(bounded: bool) -> ProgressStyle {
    let (template, fallback) = if bounded {
        (BAR_TEMPLATE, ProgressStyle::default_bar())
    } else {
        (SPINNER_TEMPLATE, ProgressStyle::default_spinner())
    };
    match fallback.clone().template(template) {
        Ok(style) => style.progress_chars("#>-"),
        Err(_) => fallback,
    }
}
