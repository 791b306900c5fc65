//! Per-cell superposition state for the overlapping model
//!
//! Everything is stored in flat arrays sized by the cell count: one bit per
//! `(cell, pattern)`, an entropy counter and collapsed id per cell, and a support
//! counter per `(cell, pattern, offset)`. Neighbor links are never materialized.

use crate::algorithm::adjacency::AdjacencyIndex;
use crate::spatial::geometry::GridShape;
use bitvec::prelude::*;
use ndarray::{Array3, s};

/// Observable state of a single cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// More than one pattern is possible, or one is left but the cell was never fixed
    Unobserved,
    /// The cell has been fixed to a single pattern
    Collapsed(usize),
    /// No pattern is possible at this cell
    Contradiction,
}

/// Superpositions, entropies and compatible neighbor counts for every cell
///
/// The compatible count at `(cell, p, o)` is the number of patterns still possible
/// at the cell `o` steps behind `cell` (that is, in the direction opposite `o`)
/// which allow `p` to sit at `cell`. When it reaches zero, `p` has lost all support
/// from that side and is banned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveGrid {
    shape: GridShape,
    num_patterns: usize,
    overlay_count: usize,
    possible: BitVec,
    entropy: Vec<usize>,
    collapsed: Vec<Option<usize>>,
    compatible: Array3<u32>,
}

impl WaveGrid {
    /// Allocate state for `shape` cells, `num_patterns` patterns and `overlay_count` offsets
    ///
    /// Support counters start at zero; call [`WaveGrid::clear`] before generating.
    pub fn new(shape: GridShape, num_patterns: usize, overlay_count: usize) -> Self {
        let cells = shape.size();
        Self {
            shape,
            num_patterns,
            overlay_count,
            possible: bitvec![1; cells * num_patterns],
            entropy: vec![num_patterns; cells],
            collapsed: vec![None; cells],
            compatible: Array3::zeros((cells, num_patterns, overlay_count)),
        }
    }

    /// Reset every cell to full superposition with maximally permissive support counts
    pub fn clear(&mut self, index: &AdjacencyIndex) {
        self.possible.fill(true);
        self.entropy.fill(self.num_patterns);
        self.collapsed.fill(None);

        for pattern in 0..self.num_patterns {
            for offset in 0..self.overlay_count {
                let support = u32::try_from(index.support(pattern, offset)).unwrap_or(u32::MAX);
                self.compatible
                    .slice_mut(s![.., pattern, offset])
                    .fill(support);
            }
        }
    }

    /// Grid dimensions
    pub const fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of cells
    pub const fn len(&self) -> usize {
        self.shape.size()
    }

    /// Whether the grid has no cells
    pub const fn is_empty(&self) -> bool {
        self.shape.size() == 0
    }

    /// Number of patterns tracked per cell
    pub const fn num_patterns(&self) -> usize {
        self.num_patterns
    }

    /// Number of offsets tracked per pattern
    pub const fn overlay_count(&self) -> usize {
        self.overlay_count
    }

    /// Ascending ids of the patterns still possible at `cell`
    pub fn superposition(&self, cell: usize) -> Vec<usize> {
        self.cell_bits(cell)
            .map(|bits| bits.iter_ones().collect())
            .unwrap_or_default()
    }

    /// Whether `pattern` is still possible at `cell`
    pub fn is_possible(&self, cell: usize, pattern: usize) -> bool {
        pattern < self.num_patterns
            && self.possible.get(cell * self.num_patterns + pattern).as_deref() == Some(&true)
    }

    /// Number of patterns still possible at `cell`
    pub fn entropy(&self, cell: usize) -> usize {
        self.entropy.get(cell).copied().unwrap_or(0)
    }

    /// Pattern the cell was fixed to, if any
    pub fn collapsed(&self, cell: usize) -> Option<usize> {
        self.collapsed.get(cell).copied().flatten()
    }

    /// Remaining support for `pattern` at `cell` along offset index `offset`
    pub fn compatible_count(&self, cell: usize, pattern: usize, offset: usize) -> u32 {
        self.compatible
            .get((cell, pattern, offset))
            .copied()
            .unwrap_or(0)
    }

    /// Classify a cell as unobserved, collapsed or contradicted
    pub fn cell_state(&self, cell: usize) -> CellState {
        if self.entropy(cell) == 0 {
            CellState::Contradiction
        } else if let Some(id) = self.collapsed(cell) {
            CellState::Collapsed(id)
        } else {
            CellState::Unobserved
        }
    }

    /// Whether the cell is collapsed or contradicted and so no longer changes
    pub fn is_decided(&self, cell: usize) -> bool {
        self.cell_state(cell) != CellState::Unobserved
    }

    /// Cells whose superposition is empty
    pub fn contradictions(&self) -> Vec<usize> {
        self.entropy
            .iter()
            .enumerate()
            .filter(|&(_, &entropy)| entropy == 0)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Number of cells fixed to a pattern
    pub fn collapsed_count(&self) -> usize {
        (0..self.len())
            .filter(|&cell| matches!(self.cell_state(cell), CellState::Collapsed(_)))
            .count()
    }

    /// Remove `pattern` from `cell`, returning the remaining entropy
    ///
    /// Returns `None` when the pattern was already impossible. Zeroes the pattern's
    /// support counters, and fixes the cell to its survivor when one pattern is left.
    pub(crate) fn remove_pattern(&mut self, cell: usize, pattern: usize) -> Option<usize> {
        if !self.is_possible(cell, pattern) {
            return None;
        }
        let bit = cell * self.num_patterns + pattern;
        self.possible.set(bit, false);

        let entropy = self.entropy.get_mut(cell)?;
        *entropy = entropy.saturating_sub(1);
        let remaining = *entropy;

        self.compatible.slice_mut(s![cell, pattern, ..]).fill(0);

        if remaining == 1 && self.collapsed(cell).is_none() {
            let survivor = self.cell_bits(cell).and_then(|bits| bits.first_one());
            if let Some(slot) = self.collapsed.get_mut(cell) {
                *slot = survivor;
            }
        }

        Some(remaining)
    }

    /// Record `pattern` as the cell's final choice unless one was already recorded
    pub(crate) fn collapse_to(&mut self, cell: usize, pattern: usize) {
        if let Some(slot @ None) = self.collapsed.get_mut(cell) {
            *slot = Some(pattern);
        }
    }

    /// Decrement the support counter at `(cell, pattern, offset)`, returning the new value
    pub(crate) fn decrement_support(&mut self, cell: usize, pattern: usize, offset: usize) -> u32 {
        self.compatible
            .get_mut((cell, pattern, offset))
            .map_or(0, |count| {
                *count = count.saturating_sub(1);
                *count
            })
    }

    fn cell_bits(&self, cell: usize) -> Option<&BitSlice> {
        let start = cell * self.num_patterns;
        self.possible.get(start..start + self.num_patterns)
    }
}
