//! Offset arithmetic, periodic wraparound and linear cell indexing
//!
//! Cells are addressed by a flat index `y * width + x`. Neighbors are never stored;
//! they are recomputed from an offset and the grid shape whenever propagation needs them.

use crate::io::error::{ModelError, Result};
use std::fmt;

/// Relative direction between two cells or two overlapping patterns
///
/// `dx` shifts columns and `dy` shifts rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Column shift
    pub dx: i32,
    /// Row shift
    pub dy: i32,
}

impl Offset {
    /// Create an offset from a column and row shift
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// The offset pointing the other way
    #[must_use]
    pub const fn negated(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }

    /// Whether this is the zero offset
    pub const fn is_origin(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dx, self.dy)
    }
}

/// Ordered offsets with a precomputed opposite for every entry
///
/// Construction fails unless each offset's negation is also present, which makes the
/// opposite-direction pairing explicit instead of relying on an index convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetSet {
    offsets: Vec<Offset>,
    opposites: Vec<usize>,
}

impl OffsetSet {
    /// Validate offsets and pair every direction with its opposite
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidOffsets`] if the set is empty, contains the origin,
    /// contains a duplicate, or has a direction whose negation is missing.
    pub fn new(offsets: Vec<Offset>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(ModelError::InvalidOffsets {
                reason: "at least one offset is required".to_string(),
            });
        }

        let mut opposites = Vec::with_capacity(offsets.len());
        for (index, offset) in offsets.iter().enumerate() {
            if offset.is_origin() {
                return Err(ModelError::InvalidOffsets {
                    reason: format!("offset {index} is the origin"),
                });
            }
            if offsets.iter().take(index).any(|other| other == offset) {
                return Err(ModelError::InvalidOffsets {
                    reason: format!("offset {offset} appears more than once"),
                });
            }

            let negated = offset.negated();
            let opposite = offsets
                .iter()
                .position(|other| *other == negated)
                .ok_or_else(|| ModelError::InvalidOffsets {
                    reason: format!("offset {offset} has no opposite {negated}"),
                })?;
            opposites.push(opposite);
        }

        Ok(Self { offsets, opposites })
    }

    /// Up, right, down and left neighbors, ordered so that `i` faces `(i + 2) % 4`
    pub fn four_neighborhood() -> Self {
        let offsets = vec![
            Offset::new(-1, 0),
            Offset::new(0, 1),
            Offset::new(1, 0),
            Offset::new(0, -1),
        ];
        Self {
            offsets,
            opposites: vec![2, 3, 0, 1],
        }
    }

    /// Every shift at which two patterns of size `pattern_size` still overlap
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidOffsets`] for a pattern size below 2, which has no
    /// overlapping shift besides the origin.
    pub fn sliding_window(pattern_size: usize) -> Result<Self> {
        let reach = i32::try_from(pattern_size).unwrap_or(i32::MAX);
        let mut offsets = Vec::new();
        for dx in (1 - reach)..reach {
            for dy in (1 - reach)..reach {
                if dx != 0 || dy != 0 {
                    offsets.push(Offset::new(dx, dy));
                }
            }
        }
        Self::new(offsets)
    }

    /// Number of offsets
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the set has no offsets (never true for a constructed set)
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset at `index`
    pub fn get(&self, index: usize) -> Option<Offset> {
        self.offsets.get(index).copied()
    }

    /// Index of the offset facing the other way from `index`
    pub fn opposite(&self, index: usize) -> Option<usize> {
        self.opposites.get(index).copied()
    }

    /// All opposite indices, aligned with [`OffsetSet::offsets`]
    pub fn opposites(&self) -> &[usize] {
        &self.opposites
    }

    /// All offsets in caller order
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Iterate `(index, offset)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, Offset)> + '_ {
        self.offsets.iter().copied().enumerate()
    }
}

/// Width and height of a cell grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl GridShape {
    /// Create a shape from column and row counts
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Cells needed so every `pattern_size` window fits inside `image_width` x `image_height`
    ///
    /// Returns `None` when the image is smaller than a single pattern.
    pub fn for_output(image_width: usize, image_height: usize, pattern_size: usize) -> Option<Self> {
        if pattern_size == 0 || image_width < pattern_size || image_height < pattern_size {
            return None;
        }
        Some(Self::new(
            image_width + 1 - pattern_size,
            image_height + 1 - pattern_size,
        ))
    }

    /// Total number of cells
    pub const fn size(&self) -> usize {
        self.width * self.height
    }

    /// Flat index of column `x`, row `y`
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Column and row of a flat index
    pub const fn position(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    /// Flat index of the cell at `offset` from `index`
    ///
    /// Periodic grids wrap around on both axes; otherwise `None` is returned for
    /// positions that fall outside the grid.
    pub fn neighbor(&self, index: usize, offset: Offset, periodic: bool) -> Option<usize> {
        if index >= self.size() {
            return None;
        }
        let (x, y) = self.position(index);
        let nx = shift_axis(x, offset.dx, self.width, periodic)?;
        let ny = shift_axis(y, offset.dy, self.height, periodic)?;
        Some(self.index(nx, ny))
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn shift_axis(coordinate: usize, delta: i32, extent: usize, periodic: bool) -> Option<usize> {
    let extent_i = i64::try_from(extent).ok()?;
    let shifted = i64::try_from(coordinate).ok()? + i64::from(delta);
    let resolved = if periodic {
        shifted.rem_euclid(extent_i)
    } else if (0..extent_i).contains(&shifted) {
        shifted
    } else {
        return None;
    };
    usize::try_from(resolved).ok()
}
