use crate::{
    algorithm::adjacency::AdjacencyIndex,
    algorithm::wave::WaveGrid,
    io::configuration::LOG_REPORT_INTERVAL,
    spatial::geometry::OffsetSet,
};
use log::{debug, trace};

/// A pattern removed from a cell whose consequences have not been propagated yet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ban {
    /// Flat index of the cell
    pub cell: usize,
    /// Id of the removed pattern
    pub pattern: usize,
}

/// Bounded worklist of pending bans
///
/// Each `(cell, pattern)` pair can be banned at most once per generation, so a
/// capacity of `cells * patterns` is never exceeded and the buffer never grows
/// during propagation.
#[derive(Debug)]
pub struct BanStack {
    events: Vec<Ban>,
    capacity: usize,
}

impl BanStack {
    /// Create an empty stack able to hold every possible ban
    pub fn new(cells: usize, patterns: usize) -> Self {
        let capacity = cells * patterns;
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue a ban for propagation
    pub fn push(&mut self, ban: Ban) {
        debug_assert!(
            self.events.len() < self.capacity,
            "ban stack overflow: more than {} bans",
            self.capacity
        );
        self.events.push(ban);
    }

    /// Take the most recently queued ban
    pub fn pop(&mut self) -> Option<Ban> {
        self.events.pop()
    }

    /// Number of pending bans
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no bans are pending
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of bans the stack was sized for
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all pending bans
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Remove `pattern` from `cell` and queue the removal for propagation
///
/// Returns `false`, leaving everything untouched, when the pattern was already
/// impossible at the cell.
pub fn ban(wave: &mut WaveGrid, stack: &mut BanStack, cell: usize, pattern: usize) -> bool {
    let Some(remaining) = wave.remove_pattern(cell, pattern) else {
        return false;
    };
    trace!("Banned pattern {pattern} at cell {cell}, {remaining} left");
    if remaining == 0 {
        let (x, y) = wave.shape().position(cell);
        debug!("Contradiction at cell {cell} ({x}, {y})");
    }
    stack.push(Ban { cell, pattern });
    true
}

/// Drain the stack, withdrawing each banned pattern's support from its neighbors
///
/// For a ban of `p` at `cell` and every offset `o`, each pattern `q` that fits at `o`
/// from `p` and is still possible at `cell + o` loses one unit of support along `o`.
/// A pattern left with no support is banned in turn. Collapsed and contradicted
/// neighbors are skipped, as are positions off the edge of a non-periodic grid.
///
/// Returns the number of bans processed.
pub fn propagate(
    wave: &mut WaveGrid,
    stack: &mut BanStack,
    index: &AdjacencyIndex,
    offsets: &OffsetSet,
    periodic: bool,
) -> usize {
    let shape = wave.shape();
    let mut processed = 0;

    while let Some(Ban { cell, pattern }) = stack.pop() {
        for (o, offset) in offsets.iter() {
            let Some(neighbor) = shape.neighbor(cell, offset, periodic) else {
                continue;
            };
            if wave.is_decided(neighbor) {
                continue;
            }

            for &candidate in index.fits(pattern, o) {
                if !wave.is_possible(neighbor, candidate) {
                    continue;
                }
                if wave.decrement_support(neighbor, candidate, o) == 0 {
                    ban(wave, stack, neighbor, candidate);
                }
            }
        }

        processed += 1;
        if processed % LOG_REPORT_INTERVAL == 0 {
            debug!(
                "Propagation processed {processed} bans, {} pending",
                stack.len()
            );
        }
    }

    processed
}
