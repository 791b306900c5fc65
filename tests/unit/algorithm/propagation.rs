//! Tests for the ban stack and incremental support propagation

#[cfg(test)]
mod tests {
    use overlapwfc::algorithm::adjacency::AdjacencyIndex;
    use overlapwfc::algorithm::propagation::{Ban, BanStack, ban, propagate};
    use overlapwfc::algorithm::wave::{CellState, WaveGrid};
    use overlapwfc::analysis::patterns::PatternCatalog;
    use overlapwfc::spatial::geometry::{GridShape, OffsetSet};
    use overlapwfc::spatial::tiles::{Pattern, Template};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    const LEFT_EDGE: usize = 0;
    const FILLED: usize = 1;
    const RIGHT_EDGE: usize = 2;

    // Vertical stripes: [0 1], [1 1] and [1 0]
    fn stripes() -> Vec<Pattern> {
        let template = Template::from_rows(&[vec![[0u8], [1], [1]], vec![[0u8], [1], [1]]]).unwrap();
        vec![
            template.window(0, 0, 2).unwrap(),
            template.window(1, 0, 2).unwrap(),
            Template::from_rows(&[vec![[1u8], [0]], vec![[1u8], [0]]])
                .unwrap()
                .window(0, 0, 2)
                .unwrap(),
        ]
    }

    fn stripe_wave(offsets: &OffsetSet) -> (WaveGrid, AdjacencyIndex) {
        let index = AdjacencyIndex::build(&stripes(), offsets, 2);
        let mut wave = WaveGrid::new(GridShape::new(3, 3), 3, offsets.len());
        wave.clear(&index);
        (wave, index)
    }

    fn assert_support_matches_neighbors(wave: &WaveGrid, index: &AdjacencyIndex, offsets: &OffsetSet) {
        let shape = wave.shape();
        for cell in 0..wave.len() {
            if wave.is_decided(cell) {
                continue;
            }
            for q in wave.superposition(cell) {
                for (o, _) in offsets.iter() {
                    let opposite = offsets.opposite(o).unwrap();
                    let behind = shape
                        .neighbor(cell, offsets.get(opposite).unwrap(), true)
                        .unwrap();
                    let expected = index
                        .fits(q, opposite)
                        .iter()
                        .filter(|&&p| wave.is_possible(behind, p))
                        .count();
                    assert_eq!(
                        wave.compatible_count(cell, q, o) as usize,
                        expected,
                        "support of pattern {q} at cell {cell} along offset {o}"
                    );
                }
            }
        }
    }

    // Tests the stack is last-in first-out and sized for every ban
    // Verified by popping from the front
    #[test]
    fn test_ban_stack_lifo() {
        let mut stack = BanStack::new(4, 3);
        assert_eq!(stack.capacity(), 12);
        assert!(stack.is_empty());

        stack.push(Ban { cell: 1, pattern: 0 });
        stack.push(Ban { cell: 2, pattern: 1 });
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(Ban { cell: 2, pattern: 1 }));

        stack.clear();
        assert_eq!(stack.pop(), None);
    }

    // Tests banning two stripes at one cell fixes the whole periodic grid
    // Verified by decrementing the counter of the source cell instead of the neighbor
    #[test]
    fn test_propagate_forces_stripes_periodic() {
        let offsets = OffsetSet::four_neighborhood();
        let (mut wave, index) = stripe_wave(&offsets);
        let mut stack = BanStack::new(wave.len(), 3);

        ban(&mut wave, &mut stack, 0, LEFT_EDGE);
        ban(&mut wave, &mut stack, 0, FILLED);
        let processed = propagate(&mut wave, &mut stack, &index, &offsets, true);

        assert_eq!(processed, 18);
        assert!(stack.is_empty());
        for row in 0..3 {
            let shape = wave.shape();
            assert_eq!(
                wave.cell_state(shape.index(0, row)),
                CellState::Collapsed(RIGHT_EDGE)
            );
            assert_eq!(
                wave.cell_state(shape.index(1, row)),
                CellState::Collapsed(LEFT_EDGE)
            );
            assert_eq!(
                wave.cell_state(shape.index(2, row)),
                CellState::Collapsed(FILLED)
            );
        }
        assert!(wave.contradictions().is_empty());
    }

    // Tests constraints stop at the edge of a non-periodic grid
    // Verified by wrapping neighbors regardless of the flag
    #[test]
    fn test_propagate_stops_at_edges() {
        let offsets = OffsetSet::four_neighborhood();
        let (mut wave, index) = stripe_wave(&offsets);
        let mut stack = BanStack::new(wave.len(), 3);

        ban(&mut wave, &mut stack, 0, LEFT_EDGE);
        ban(&mut wave, &mut stack, 0, FILLED);
        propagate(&mut wave, &mut stack, &index, &offsets, false);

        for row in 0..3 {
            let shape = wave.shape();
            assert_eq!(
                wave.cell_state(shape.index(0, row)),
                CellState::Collapsed(RIGHT_EDGE)
            );
            assert_eq!(
                wave.cell_state(shape.index(1, row)),
                CellState::Collapsed(LEFT_EDGE)
            );
            assert_eq!(
                wave.superposition(shape.index(2, row)),
                vec![FILLED, RIGHT_EDGE]
            );
        }
    }

    // Tests propagating an empty stack changes nothing
    // Verified by clearing the wave at the start of propagation
    #[test]
    fn test_propagate_empty_stack() {
        let offsets = OffsetSet::four_neighborhood();
        let (mut wave, index) = stripe_wave(&offsets);
        let before = wave.clone();
        let mut stack = BanStack::new(wave.len(), 3);

        assert_eq!(propagate(&mut wave, &mut stack, &index, &offsets, true), 0);
        assert_eq!(wave, before);
    }

    // Tests support counters equal the live supporters behind each cell after random bans
    // Verified by decrementing along the opposite offset
    #[test]
    fn test_support_counts_match_brute_force() {
        let template = Template::from_rows(&[
            vec![[0u8], [0], [1], [2], [1]],
            vec![[0u8], [1], [1], [2], [2]],
            vec![[1u8], [1], [0], [0], [2]],
            vec![[2u8], [0], [0], [1], [1]],
            vec![[2u8], [2], [0], [1], [0]],
        ])
        .unwrap();
        let catalog = PatternCatalog::extract(&[template], 2, false).unwrap();
        let offsets = OffsetSet::sliding_window(2).unwrap();
        let index = AdjacencyIndex::build(catalog.patterns(), &offsets, 2);
        let mut wave = WaveGrid::new(GridShape::new(6, 5), catalog.len(), offsets.len());
        wave.clear(&index);
        let mut stack = BanStack::new(wave.len(), catalog.len());
        let mut rng = StdRng::seed_from_u64(7);

        assert_support_matches_neighbors(&wave, &index, &offsets);
        for _ in 0..40 {
            let cell = rng.random_range(0..wave.len());
            let pattern = rng.random_range(0..catalog.len());
            if wave.is_decided(cell) {
                continue;
            }
            let before: Vec<Vec<usize>> = (0..wave.len()).map(|c| wave.superposition(c)).collect();
            let counts_before = support_snapshot(&wave, catalog.len(), offsets.len());

            ban(&mut wave, &mut stack, cell, pattern);
            propagate(&mut wave, &mut stack, &index, &offsets, true);

            assert_support_matches_neighbors(&wave, &index, &offsets);
            for (c, previous) in before.iter().enumerate() {
                let current = wave.superposition(c);
                assert!(current.iter().all(|p| previous.contains(p)));
                assert_eq!(wave.entropy(c), current.len());
            }
            let counts_after = support_snapshot(&wave, catalog.len(), offsets.len());
            for (slot, (after, previous)) in counts_after.iter().zip(&counts_before).enumerate() {
                assert!(after <= previous, "support count {slot} grew from {previous} to {after}");
            }
        }
    }

    fn support_snapshot(wave: &WaveGrid, patterns: usize, overlays: usize) -> Vec<u32> {
        (0..wave.len())
            .flat_map(|cell| {
                (0..patterns).flat_map(move |pattern| {
                    (0..overlays).map(move |offset| wave.compatible_count(cell, pattern, offset))
                })
            })
            .collect()
    }
}
