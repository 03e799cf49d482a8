//! Display functions for terminal output.

use std::path::Path;

use bytesize::ByteSize;

use crate::tree::TreeSummary;

/// Displays the completion line after a successful operation.
pub fn show_summary(action: &str, output: &Path, summary: &TreeSummary) {
    println!();
    println!(
        "{} {}",
        console::style("✔").green().bright(),
        console::style(format!(
            "{action} {} file(s) and {} director{} ({}): {}",
            summary.files,
            summary.directories,
            if summary.directories == 1 { "y" } else { "ies" },
            ByteSize(summary.plaintext_bytes),
            output.display()
        ))
        .white()
        .bright()
    );
}
