//! Progress reporting for profile conversion
//!
//! Provides real-time progress display using indicatif progress bars.

use crate::pipeline::RunSummary;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Spinner showing the profile currently being converted
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A reporter that draws nothing (quiet mode)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update the progress display after a profile
    pub fn update(&self, profile: &str, done: usize) {
        self.bar.set_message(format!(
            "Profiles: {} | Last: {}",
            format_number(done as u64),
            profile
        ));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the conversion results
pub fn print_summary(summary: &RunSummary, dry_run: bool) {
    let duration_secs = summary.duration.as_secs_f64();
    let profiles = summary.profile_count() as u64;
    let rate = if duration_secs > 0.0 {
        profiles as f64 / duration_secs
    } else {
        0.0
    };

    let title = match (summary.is_success(), dry_run) {
        (true, true) => style("Validation Complete").green().bold(),
        (true, false) => style("Conversion Complete").green().bold(),
        (false, _) => style("Conversion Finished With Errors").yellow().bold(),
    };

    println!();
    println!("{}", title);
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(summary.files.len() as u64)
    );
    println!("  {} {}", style("Profiles:").bold(), format_number(profiles));
    println!(
        "  {} {}",
        style("Rows:").bold(),
        format_number(summary.total_rows() as u64)
    );
    if !dry_run {
        println!(
            "  {} {}",
            style("Written:").bold(),
            format_size(summary.total_bytes(), BINARY)
        );
    }
    println!(
        "  {} {:.1}s ({:.0} profiles/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if let Some(manifest) = &summary.manifest {
        println!("  {} {}", style("Manifest:").bold(), manifest.display());
    }

    let failed = summary.failed_count();
    if failed > 0 {
        println!(
            "  {} {}",
            style("Failed files:").yellow().bold(),
            format_number(failed as u64)
        );
        for report in summary.files.iter().filter(|f| !f.is_success()) {
            if let Some(e) = &report.error {
                println!("    {} {}", style("✗").red(), e);
            }
        }
    }
    println!();
}

/// Print a header at the start of the run
pub fn print_header(inputs: &[PathBuf], output_dir: &Path, streaming: bool) {
    println!();
    println!(
        "{} {}",
        style("hmm2parquet").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    for input in inputs {
        println!("  {} {}", style("Input:").bold(), input.display());
    }
    println!("  {} {}", style("Output:").bold(), output_dir.display());
    println!(
        "  {} {}",
        style("Mode:").bold(),
        if streaming { "streaming" } else { "batch" }
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
