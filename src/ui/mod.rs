//! UI/Progress presentation layer
//!
//! This module handles:
//! - Progress reporting while the build output is written
//! - Styled terminal output for command results (`display`)
//!
//! All progress reporting goes through the ProgressReporter trait, so
//! `build --quiet` and tests use the silent implementation.

pub mod display;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter trait for long-running operations
pub trait ProgressReporter {
    /// Start with the total number of files
    fn start(&mut self, total_files: u64);

    /// Report one written file
    fn update_file(&mut self, file_path: &str);

    fn finish(&mut self);

    /// Abandon on error
    fn abandon(&mut self);
}

/// Interactive progress reporter with a visual progress bar
#[derive(Default)]
pub struct InteractiveProgressReporter {
    file_pb: Option<ProgressBar>,
}

impl ProgressReporter for InteractiveProgressReporter {
    fn start(&mut self, total_files: u64) {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let file_pb = ProgressBar::new(total_files);
        file_pb.set_style(style);
        self.file_pb = Some(file_pb);
    }

    fn update_file(&mut self, file_path: &str) {
        if let Some(ref file_pb) = self.file_pb {
            file_pb.set_message(truncate_path(file_path));
            file_pb.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(ref file_pb) = self.file_pb {
            file_pb.finish_and_clear();
        }
    }

    fn abandon(&mut self) {
        if let Some(ref file_pb) = self.file_pb {
            file_pb.abandon();
        }
    }
}

/// Silent progress reporter for quiet mode
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start(&mut self, _total_files: u64) {}

    fn update_file(&mut self, _file_path: &str) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}

/// Keep the last 47 characters of long paths
fn truncate_path(path: &str) -> String {
    let chars = path.chars().count();
    if chars > 50 {
        let tail: String = path.chars().skip(chars - 47).collect();
        format!("...{tail}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_progress_reporter_no_ops() {
        let mut reporter = SilentProgressReporter;

        // All methods should do nothing and not panic
        reporter.start(10);
        reporter.update_file("services/main.cf");
        reporter.finish();
        reporter.abandon();
    }

    #[test]
    fn test_interactive_progress_reporter_counts_files() {
        let mut reporter = InteractiveProgressReporter::default();
        assert!(reporter.file_pb.is_none());

        reporter.start(5);
        reporter.update_file("a.cf");
        reporter.update_file("b.cf");
        assert_eq!(reporter.file_pb.as_ref().unwrap().position(), 2);
    }

    #[test]
    fn test_truncate_path() {
        assert_eq!(truncate_path("short.cf"), "short.cf");
        let long = format!("{}/end.cf", "d".repeat(60));
        let shown = truncate_path(&long);
        assert_eq!(shown.chars().count(), 50);
        assert!(shown.starts_with("...") && shown.ends_with("end.cf"));
    }
}
