//! Terminal progress display for generation runs

use crate::algorithm::executor::GenerationReport;
use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Cells: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar tracking how many cells of the wave have collapsed
///
/// The bar length is the number of wave cells and its position the number of
/// collapsed cells, so a run ending in contradictions stops short of full.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a visible progress bar for a wave of `cells` cells
    pub fn new(cells: usize) -> Self {
        let bar = ProgressBar::new(cells as u64);
        bar.set_style(PROGRESS_STYLE.clone());
        Self { bar }
    }

    /// Create a reporter that draws nothing
    pub fn hidden(cells: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(cells as u64);
        Self { bar }
    }

    /// Record the collapsed-cell count after an iteration
    pub fn update(&self, iteration: usize, collapsed: usize) {
        self.bar.set_position(collapsed as u64);
        self.bar.set_message(format!("iteration {iteration}"));
    }

    /// Current collapsed-cell count shown by the bar
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Total cell count of the bar
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// Stop the bar with a summary of the run
    ///
    /// A complete run fills the bar; a run with contradictions leaves it at the
    /// collapsed count.
    pub fn finish(&self, report: &GenerationReport) {
        self.bar.set_position(report.collapsed as u64);
        if report.contradictions == 0 {
            self.bar
                .finish_with_message(format!("done in {} iterations", report.iterations));
        } else {
            // Abandoning keeps the bar at the collapsed count instead of filling it
            self.bar.abandon_with_message(format!(
                "{} contradictions after {} iterations",
                report.contradictions, report.iterations
            ));
        }
    }
}
