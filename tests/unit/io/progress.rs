//! Tests for the collapsed-cell progress bar

#[cfg(test)]
mod tests {
    use overlapwfc::algorithm::executor::GenerationReport;
    use overlapwfc::io::progress::ProgressReporter;

    fn report(collapsed: usize, contradictions: usize) -> GenerationReport {
        GenerationReport {
            iterations: 12,
            collapsed,
            contradictions,
            hit_iteration_limit: false,
            seed: 0,
        }
    }

    // Tests the bar length is the wave size
    // Verified by sizing the bar by iterations
    #[test]
    fn test_length_is_cell_count() {
        let progress = ProgressReporter::hidden(48);

        assert_eq!(progress.length(), Some(48));
        assert_eq!(progress.position(), 0);
    }

    // Tests updates move the bar to the collapsed count
    // Verified by advancing the bar by the iteration number
    #[test]
    fn test_update_tracks_collapsed_cells() {
        let progress = ProgressReporter::hidden(48);

        progress.update(1, 10);
        assert_eq!(progress.position(), 10);
        progress.update(2, 31);
        assert_eq!(progress.position(), 31);
    }

    // Tests a run ending in contradictions leaves the bar short of full
    // Verified by finishing the bar with the full-length finish
    #[test]
    fn test_finish_with_contradictions() {
        let progress = ProgressReporter::hidden(48);
        progress.finish(&report(40, 8));

        assert_eq!(progress.position(), 40);
        assert_eq!(progress.length(), Some(48));
    }

    // Tests a complete run ends on a full bar
    // Verified by leaving the position behind the cell count
    #[test]
    fn test_finish_complete_run() {
        let visible = ProgressReporter::new(16);
        visible.update(1, 9);
        visible.finish(&report(16, 0));

        assert_eq!(visible.position(), 16);
        assert_eq!(visible.length(), Some(16));
    }
}
