//! Progress spinners for long-running phases.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A ticking spinner with `msg`, or a hidden one when `quiet`.
pub(crate) fn spinner(quiet: bool, msg: impl Into<String>) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("/-\\|");
    pb.set_style(style);
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
