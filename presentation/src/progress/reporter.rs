//! Progress reporting for batch execution

use colored::Colorize;
use geotools_application::BatchProgressNotifier;
use geotools_domain::{BatchReport, ExecutionResult, ExecutionStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports batch progress with a progress bar
pub struct BatchProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl BatchProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn item_label(result: &ExecutionResult) -> String {
        let name = result.input_name.as_deref().unwrap_or("item");
        match result.status {
            ExecutionStatus::Succeeded => format!("{} {}", "v".green(), name),
            ExecutionStatus::Failed => format!("{} {}", "x".red(), name),
            ExecutionStatus::Skipped => format!("{} {}", "-".dimmed(), name),
        }
    }
}

impl Default for BatchProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchProgressNotifier for BatchProgressReporter {
    fn on_batch_start(&self, tool_id: &str, total_items: usize) {
        let pb = ProgressBar::new(total_items as u64);
        pb.set_style(Self::batch_style());
        pb.set_prefix(tool_id.to_string());
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_item_start(&self, _index: usize, input_name: &str) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(input_name.to_string());
        }
    }

    fn on_item_complete(&self, result: &ExecutionResult) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            if result.status == ExecutionStatus::Failed {
                let error = result
                    .error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("failed");
                pb.println(format!("{} {}", Self::item_label(result), error.dimmed()));
            }
            pb.set_message(Self::item_label(result));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            let message = if report.all_succeeded() {
                "complete!".green().to_string()
            } else {
                report.summary.to_string().yellow().to_string()
            };
            pb.finish_with_message(message);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl BatchProgressNotifier for SimpleProgress {
    fn on_batch_start(&self, tool_id: &str, total_items: usize) {
        eprintln!("{} {} ({} items)", "->".cyan(), tool_id.bold(), total_items);
    }

    fn on_item_complete(&self, result: &ExecutionResult) {
        eprintln!("  {}", BatchProgressReporter::item_label(result));
    }

    fn on_batch_complete(&self, _report: &BatchReport) {
        eprintln!();
    }
}
