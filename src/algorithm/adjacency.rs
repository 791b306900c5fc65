//! Pairwise overlap compatibility between patterns
//!
//! The fit table answers "which patterns may sit at offset `o` from pattern `p`"
//! for every pattern and offset, and is the only constraint data propagation reads.

use crate::spatial::geometry::{Offset, OffsetSet};
use crate::spatial::tiles::Pattern;
use log::debug;
use ndarray::s;

/// Whether `q` can be laid at `offset` from `p` without any pixel conflict
///
/// Compares the region where both `size` x `size` patterns overlap. In `p`'s
/// coordinates it spans rows `[max(dy, 0), size + min(dy, 0))` and the matching
/// columns; in `q`'s coordinates the same region is shifted by `-dy, -dx`. Shifts of
/// a full pattern width or more do not overlap and always fit.
pub fn overlay_fit(p: &Pattern, q: &Pattern, offset: Offset, size: usize) -> bool {
    let Ok(size) = isize::try_from(size) else {
        return true;
    };
    let dx = offset.dx as isize;
    let dy = offset.dy as isize;
    if dx.abs() >= size || dy.abs() >= size {
        return true;
    }
    if p.format() != q.format() {
        return false;
    }

    let row_start = dy.max(0);
    let row_end = size + dy.min(0);
    let col_start = dx.max(0);
    let col_end = size + dx.min(0);

    let p_pixels = p.pixels();
    let q_pixels = q.pixels();
    let lhs = p_pixels.slice(s![row_start..row_end, col_start..col_end, ..]);
    let rhs = q_pixels.slice(s![
        row_start - dy..row_end - dy,
        col_start - dx..col_end - dx,
        ..
    ]);
    lhs == rhs
}

/// Fit table: for every `(pattern, offset)` the ascending ids of compatible patterns
#[derive(Clone, Debug)]
pub struct AdjacencyIndex {
    fits: Vec<Vec<usize>>,
    opposites: Vec<usize>,
    num_patterns: usize,
}

impl AdjacencyIndex {
    /// Evaluate [`overlay_fit`] for every ordered pattern pair at every offset
    pub fn build(patterns: &[Pattern], offsets: &OffsetSet, size: usize) -> Self {
        let num_patterns = patterns.len();
        let mut fits = Vec::with_capacity(num_patterns * offsets.len());

        for center in patterns {
            for (_, offset) in offsets.iter() {
                let compatible: Vec<usize> = patterns
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| overlay_fit(center, other, offset, size))
                    .map(|(id, _)| id)
                    .collect();
                fits.push(compatible);
            }
        }

        let index = Self {
            fits,
            opposites: offsets.opposites().to_vec(),
            num_patterns,
        };
        debug!(
            "Built fit table for {num_patterns} patterns over {} offsets ({} compatible pairs)",
            index.overlay_count(),
            index.total_fits()
        );
        index
    }

    /// Patterns that fit at offset index `offset` from `pattern`
    ///
    /// Unknown pattern or offset indices yield an empty slice.
    pub fn fits(&self, pattern: usize, offset: usize) -> &[usize] {
        if offset >= self.overlay_count() {
            return &[];
        }
        self.fits
            .get(pattern * self.overlay_count() + offset)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Number of patterns that can support `pattern` from the direction opposite `offset`
    ///
    /// This is the starting value of a cell's compatible neighbor count.
    pub fn support(&self, pattern: usize, offset: usize) -> usize {
        self.opposites
            .get(offset)
            .map_or(0, |&opposite| self.fits(pattern, opposite).len())
    }

    /// Index of the offset facing the other way from `offset`
    pub fn opposite(&self, offset: usize) -> Option<usize> {
        self.opposites.get(offset).copied()
    }

    /// Number of patterns the table was built for
    pub const fn num_patterns(&self) -> usize {
        self.num_patterns
    }

    /// Number of offsets the table was built for
    pub fn overlay_count(&self) -> usize {
        self.opposites.len()
    }

    /// Number of compatible `(pattern, offset, pattern)` triples
    pub fn total_fits(&self) -> usize {
        self.fits.iter().map(Vec::len).sum()
    }
}
