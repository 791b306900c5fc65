use crate::algorithm::wave::{CellState, WaveGrid};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded random selector for reproducible stochastic choices
///
/// All randomness of a generation comes from this single stream, so recording the
/// seed is enough to replay a run.
#[derive(Clone, Debug)]
pub struct RandomSelector {
    rng: StdRng,
    seed: u64,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this selector was created from
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniformly random index in `0..len`, or `None` when `len` is zero
    pub fn uniform_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    /// Frequency-weighted choice among `candidates`
    ///
    /// Draws an integer `r` in `[1, total]` where `total` is the summed count of the
    /// candidates, then walks the candidates in order subtracting their counts until
    /// `r` is used up. Returns `None` for an empty candidate list.
    pub fn weighted_pattern(&mut self, candidates: &[usize], counts: &[usize]) -> Option<usize> {
        let weight_of = |pattern: usize| counts.get(pattern).copied().unwrap_or(0);
        let total: usize = candidates.iter().map(|&pattern| weight_of(pattern)).sum();
        if total == 0 {
            return candidates.first().copied();
        }

        let draw = self.rng.random_range(1..=total);
        Some(pick_by_weight(candidates, counts, draw))
    }
}

/// Walk `candidates` subtracting counts from `draw` and return the one that exhausts it
///
/// `draw` is expected to lie in `[1, total]`; larger values select the last candidate.
pub fn pick_by_weight(candidates: &[usize], counts: &[usize], draw: usize) -> usize {
    let mut remainder = draw;
    for &pattern in candidates {
        let weight = counts.get(pattern).copied().unwrap_or(0);
        if remainder <= weight {
            return pattern;
        }
        remainder -= weight;
    }
    candidates.last().copied().unwrap_or(0)
}

/// First unobserved cell with the smallest entropy
///
/// Scans cells in increasing index order and only replaces the best candidate on a
/// strictly smaller entropy, so ties go to the smaller index. Returns `None` once
/// every cell is collapsed or contradicted.
pub fn lowest_entropy(wave: &WaveGrid) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    // Cell 0 is scanned too, see "Lowest-entropy scan starts at cell 0" in DESIGN.md
    for cell in 0..wave.len() {
        if wave.cell_state(cell) != CellState::Unobserved {
            continue;
        }
        let entropy = wave.entropy(cell);
        if best.is_none_or(|(_, lowest)| entropy < lowest) {
            best = Some((cell, entropy));
            if entropy == 1 {
                break;
            }
        }
    }
    best.map(|(cell, _)| cell)
}
