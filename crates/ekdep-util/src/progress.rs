use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

fn status_line(style: Style, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{:>12} {message}", style.apply_to(label));
}

/// Print a Cargo-style status line: `   Resolving ekopen.tools-1.0.8-5`
///
/// The `label` is right-padded to 12 characters and printed in bold green.
pub fn status(label: &str, message: &str) {
    status_line(Style::new().green().bold(), label, message);
}

/// Like [`status`] but with a bold yellow label, for informational rejections.
pub fn status_warn(label: &str, message: &str) {
    status_line(Style::new().yellow().bold(), label, message);
}

/// Like [`status`] but with a bold red label, for build-blocking findings.
pub fn status_error(label: &str, message: &str) {
    status_line(Style::new().red().bold(), label, message);
}

/// Create an animated spinner with the given message for indeterminate progress.
///
/// Finish with [`ProgressBar::finish_and_clear`].
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
