//! Progress bar for tree operations.
//!
//! Wraps `indicatif` with application styling and adapts it to the tree
//! engine's observer callback, which reports entry counts rather than
//! bytes.

use anyhow::Result;
use indicatif::{ProgressBar as Bar, ProgressStyle as Style};

/// Template for the progress bar appearance: spinner, current entry,
/// 40-character bar, counts, and estimated time remaining.
const PROGRESS_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Entry-count progress bar fed by the tree engine's observer.
pub struct ProgressBar {
    bar: Bar,
}

impl ProgressBar {
    /// Creates a styled bar with an initial message. The length is learned
    /// from the first observer call.
    pub fn new(description: &str) -> Result<Self> {
        let bar = Bar::new(0);
        bar.set_style(Style::with_template(PROGRESS_TEMPLATE)?.progress_chars("●○ "));
        bar.set_message(description.to_owned());
        Ok(Self { bar })
    }

    /// Observer entry point, invoked before each tree entry is processed.
    pub fn observe(&self, relative_path: &str, position: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(position as u64);
        self.bar.set_message(relative_path.to_owned());
    }

    /// Completes the bar after a successful operation.
    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}
