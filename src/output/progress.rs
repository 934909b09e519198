//! Progress indicators for resolving and saving downloads.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(100);

/// Spinner shown while metadata is resolved.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(TICK);
    spinner
}

/// Progress for a streamed asset named `filename`.
///
/// A bar when upstream declared the size, a running byte count otherwise.
pub fn create_download_bar(filename: &str, total: Option<u64>) -> ProgressBar {
    let (bar, style) = match total {
        Some(total) => (
            ProgressBar::new(total),
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        ),
        None => (
            ProgressBar::new_spinner(),
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {bytes} ({bytes_per_sec})")
                .unwrap(),
        ),
    };

    bar.set_style(style);
    bar.set_message(filename.to_string());
    if total.is_none() {
        bar.enable_steady_tick(TICK);
    }
    bar
}
