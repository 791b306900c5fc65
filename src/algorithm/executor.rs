use crate::{
    algorithm::adjacency::AdjacencyIndex,
    algorithm::propagation::{self, BanStack},
    algorithm::selection::{RandomSelector, lowest_entropy},
    algorithm::wave::{CellState, WaveGrid},
    analysis::patterns::PatternCatalog,
    io::configuration::{DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, LOG_REPORT_INTERVAL},
    io::error::{Result, invalid_parameter},
    spatial::geometry::{GridShape, OffsetSet},
    spatial::tiles::Template,
};
use log::{debug, info};

/// Model parameters controlling pattern extraction and the generation loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    /// Side length of extracted patterns
    pub pattern_size: usize,
    /// Whether to add the three rotations of every window to the catalog
    pub include_rotations: bool,
    /// Whether neighbors wrap around the output edges
    pub periodic: bool,
    /// Output width in pixels
    pub output_width: usize,
    /// Output height in pixels
    pub output_height: usize,
    /// Maximum observe/propagate iterations, `None` for no limit
    pub iteration_limit: Option<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pattern_size: DEFAULT_PATTERN_SIZE,
            include_rotations: false,
            periodic: true,
            output_width: DEFAULT_OUTPUT_SIZE,
            output_height: DEFAULT_OUTPUT_SIZE,
            iteration_limit: None,
        }
    }
}

/// Outcome of one call to [`Model::generate`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    /// Observe/propagate iterations performed
    pub iterations: usize,
    /// Cells fixed to a single pattern
    pub collapsed: usize,
    /// Cells left without any possible pattern
    pub contradictions: usize,
    /// Whether the run stopped at the iteration limit rather than running out of cells
    pub hit_iteration_limit: bool,
    /// Seed of the random stream used for the run
    pub seed: u64,
}

impl GenerationReport {
    /// Whether every cell ended up collapsed
    pub const fn is_complete(&self, cells: usize) -> bool {
        self.contradictions == 0 && self.collapsed == cells
    }
}

/// Overlapping wave function collapse model
///
/// Owns the immutable pattern catalog and fit table, plus the reusable wave state,
/// ban stack and random stream. Generations are greedy: contradictions are recorded
/// per cell and never backtracked.
#[derive(Debug)]
pub struct Model {
    config: ModelConfig,
    catalog: PatternCatalog,
    offsets: OffsetSet,
    adjacency: AdjacencyIndex,
    wave: WaveGrid,
    stack: BanStack,
    selector: RandomSelector,
}

impl Model {
    /// Extract patterns from `templates` and build a model ready to generate
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The templates disagree on channel count or sample depth
    /// - The pattern size is out of range or no template holds a single pattern
    /// - The output is smaller than one pattern
    pub fn new(
        templates: &[Template],
        offsets: OffsetSet,
        config: ModelConfig,
        seed: u64,
    ) -> Result<Self> {
        let catalog =
            PatternCatalog::extract(templates, config.pattern_size, config.include_rotations)?;
        Self::from_catalog(catalog, offsets, config, seed)
    }

    /// Build a model around an existing pattern catalog
    ///
    /// The catalog's pattern size takes precedence over `config.pattern_size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output is smaller than one pattern or the catalog is empty
    pub fn from_catalog(
        catalog: PatternCatalog,
        offsets: OffsetSet,
        mut config: ModelConfig,
        seed: u64,
    ) -> Result<Self> {
        config.pattern_size = catalog.pattern_size();
        if catalog.is_empty() {
            return Err(invalid_parameter(
                "templates",
                &0,
                &"the pattern catalog is empty",
            ));
        }

        let shape = GridShape::for_output(
            config.output_width,
            config.output_height,
            config.pattern_size,
        )
        .ok_or_else(|| {
            invalid_parameter(
                "output_size",
                &format!("{}x{}", config.output_width, config.output_height),
                &format!(
                    "must be at least the pattern size {}",
                    config.pattern_size
                ),
            )
        })?;

        let adjacency = AdjacencyIndex::build(catalog.patterns(), &offsets, config.pattern_size);
        let mut wave = WaveGrid::new(shape, catalog.len(), offsets.len());
        wave.clear(&adjacency);
        let stack = BanStack::new(shape.size(), catalog.len());

        info!(
            "Model ready: {} patterns, {} offsets, wave {shape}, periodic {}, seed {seed}",
            catalog.len(),
            offsets.len(),
            config.periodic
        );

        Ok(Self {
            config,
            catalog,
            offsets,
            adjacency,
            wave,
            stack,
            selector: RandomSelector::new(seed),
        })
    }

    /// Run a full generation from a cleared wave
    pub fn generate(&mut self) -> GenerationReport {
        self.generate_with(|_, _| {})
    }

    /// Run a full generation, calling `on_iteration` after every observe/propagate step
    ///
    /// The callback receives the iteration number (starting at 1) and the wave.
    pub fn generate_with<F>(&mut self, mut on_iteration: F) -> GenerationReport
    where
        F: FnMut(usize, &WaveGrid),
    {
        self.clear();

        let mut next = self.selector.uniform_index(self.wave.len());
        let mut iterations = 0;
        let mut hit_iteration_limit = false;

        while let Some(cell) = next {
            if self
                .config
                .iteration_limit
                .is_some_and(|limit| iterations >= limit)
            {
                hit_iteration_limit = true;
                break;
            }

            self.observe(cell);
            self.propagate();
            next = self.lowest_entropy();

            iterations += 1;
            on_iteration(iterations, &self.wave);
            if iterations % LOG_REPORT_INTERVAL == 0 {
                debug!("Iteration {iterations}: {} cells collapsed", self.wave.collapsed_count());
            }
        }

        let report = GenerationReport {
            iterations,
            collapsed: self.wave.collapsed_count(),
            contradictions: self.wave.contradictions().len(),
            hit_iteration_limit,
            seed: self.selector.seed(),
        };
        info!(
            "Generation finished after {} iterations: {} collapsed, {} contradictions{}",
            report.iterations,
            report.collapsed,
            report.contradictions,
            if report.hit_iteration_limit {
                " (iteration limit reached)"
            } else {
                ""
            }
        );
        report
    }

    /// Reset the wave to full superposition and drop any pending bans
    pub fn clear(&mut self) {
        self.wave.clear(&self.adjacency);
        self.stack.clear();
    }

    /// Collapse `cell` to one pattern drawn by frequency and ban all the others
    ///
    /// The cell must still have at least one possible pattern; observing a
    /// contradicted cell is a caller error and leaves the wave unchanged.
    /// Returns the chosen pattern.
    pub fn observe(&mut self, cell: usize) -> Option<usize> {
        let candidates = self.wave.superposition(cell);
        debug_assert!(!candidates.is_empty(), "observed cell {cell} has no patterns");

        let chosen = self
            .selector
            .weighted_pattern(&candidates, self.catalog.counts())?;
        self.wave.collapse_to(cell, chosen);
        for pattern in candidates.into_iter().filter(|&pattern| pattern != chosen) {
            propagation::ban(&mut self.wave, &mut self.stack, cell, pattern);
        }
        Some(chosen)
    }

    /// Remove `pattern` from `cell` and queue it for propagation
    ///
    /// Returns `false` if the pattern was already impossible there.
    pub fn ban(&mut self, cell: usize, pattern: usize) -> bool {
        propagation::ban(&mut self.wave, &mut self.stack, cell, pattern)
    }

    /// Propagate every pending ban, returning how many were processed
    pub fn propagate(&mut self) -> usize {
        propagation::propagate(
            &mut self.wave,
            &mut self.stack,
            &self.adjacency,
            &self.offsets,
            self.config.periodic,
        )
    }

    /// Unobserved cell with the lowest entropy, ties broken by smallest index
    pub fn lowest_entropy(&self) -> Option<usize> {
        lowest_entropy(&self.wave)
    }

    /// Ascending ids of the patterns still possible at `cell`
    pub fn superposition(&self, cell: usize) -> Vec<usize> {
        self.wave.superposition(cell)
    }

    /// State of `cell`
    pub fn cell_state(&self, cell: usize) -> CellState {
        self.wave.cell_state(cell)
    }

    /// Current wave state
    pub const fn wave(&self) -> &WaveGrid {
        &self.wave
    }

    /// Pattern catalog the model was built from
    pub const fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Fit table between catalog patterns
    pub const fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    /// Offsets used for adjacency and propagation
    pub const fn offsets(&self) -> &OffsetSet {
        &self.offsets
    }

    /// Configuration the model was built with
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Seed of the model's random stream
    pub const fn seed(&self) -> u64 {
        self.selector.seed()
    }

    /// Number of bans waiting to be propagated
    pub fn pending_bans(&self) -> usize {
        self.stack.len()
    }
}
