//! Pattern extraction and frequency counting from template images

use crate::io::configuration::MAX_PATTERN_SIZE;
use crate::io::error::{ModelError, Result, invalid_parameter};
use crate::spatial::tiles::{Pattern, PixelFormat, Template};
use log::info;

/// Deduplicated patterns in first-seen order with their occurrence counts
///
/// Pattern ids are positions in [`PatternCatalog::patterns`], so two catalogs built
/// from the same templates always assign the same ids.
#[derive(Clone, Debug)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
    counts: Vec<usize>,
    pattern_size: usize,
}

impl PatternCatalog {
    /// Slide a `pattern_size` window over every template and count distinct windows
    ///
    /// Windows are visited column by column, top to bottom within a column. With
    /// `include_rotations` each window is followed by its counter-clockwise, half
    /// turn and clockwise rotations. Each candidate is compared byte for byte against
    /// the patterns seen so far.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `pattern_size` is 0 or larger than [`MAX_PATTERN_SIZE`]
    /// - no templates are given, or none is large enough for a single window
    /// - a template's channel count or sample depth differs from the first template
    pub fn extract(
        templates: &[Template],
        pattern_size: usize,
        include_rotations: bool,
    ) -> Result<Self> {
        if pattern_size == 0 || pattern_size > MAX_PATTERN_SIZE {
            return Err(invalid_parameter(
                "pattern_size",
                &pattern_size,
                &format!("must be between 1 and {MAX_PATTERN_SIZE}"),
            ));
        }

        let reference = templates
            .first()
            .map(Template::format)
            .ok_or_else(|| invalid_parameter("templates", &0, &"at least one template is required"))?;

        let mut catalog = Self {
            patterns: Vec::new(),
            counts: Vec::new(),
            pattern_size,
        };

        for (index, template) in templates.iter().enumerate() {
            check_format(index, reference, template.format())?;

            for col in 0..=template.width().saturating_sub(pattern_size) {
                for row in 0..=template.height().saturating_sub(pattern_size) {
                    let Some(window) = template.window(col, row, pattern_size) else {
                        continue;
                    };

                    if include_rotations {
                        let ccw = window.rotate_ccw();
                        let half = window.rotate_180();
                        let cw = window.rotate_cw();
                        catalog.record(window);
                        catalog.record(ccw);
                        catalog.record(half);
                        catalog.record(cw);
                    } else {
                        catalog.record(window);
                    }
                }
            }
        }

        if catalog.patterns.is_empty() {
            return Err(invalid_parameter(
                "pattern_size",
                &pattern_size,
                &"no template is large enough to hold a single pattern",
            ));
        }

        info!(
            "Extracted {} patterns of size {pattern_size} from {} templates ({} windows)",
            catalog.patterns.len(),
            templates.len(),
            catalog.total_count()
        );

        Ok(catalog)
    }

    // Linear scan keeps ids in first-seen order; catalogs are small
    fn record(&mut self, window: Pattern) {
        if let Some(existing) = self.patterns.iter().position(|pattern| *pattern == window) {
            if let Some(count) = self.counts.get_mut(existing) {
                *count += 1;
            }
        } else {
            self.patterns.push(window);
            self.counts.push(1);
        }
    }

    /// Distinct patterns, indexed by pattern id
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Occurrence count of each pattern, indexed by pattern id
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Pattern with the given id
    pub fn pattern(&self, id: usize) -> Option<&Pattern> {
        self.patterns.get(id)
    }

    /// Side length of every pattern
    pub const fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Number of distinct patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the catalog holds no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Total number of windows that were catalogued
    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Pixel format shared by every pattern
    pub fn format(&self) -> Option<PixelFormat> {
        self.patterns.first().map(Pattern::format)
    }
}

fn check_format(index: usize, reference: PixelFormat, found: PixelFormat) -> Result<()> {
    if found.channels != reference.channels {
        return Err(ModelError::InvalidTemplate {
            index,
            reason: format!(
                "has {} channels but the first template has {}",
                found.channels, reference.channels
            ),
        });
    }
    if found.depth != reference.depth {
        return Err(ModelError::InvalidTemplate {
            index,
            reason: format!(
                "has {}-byte samples but the first template has {}-byte samples",
                found.depth, reference.depth
            ),
        });
    }
    Ok(())
}
