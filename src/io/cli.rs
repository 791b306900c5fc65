//! Command-line interface for generating images from template PNGs

use crate::algorithm::executor::{Model, ModelConfig};
use crate::io::configuration::{
    DEFAULT_LOG_SPEC, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, RESULT_DIR, RESULT_FILE,
    UNBOUNDED_ITERATIONS,
};
use crate::io::error::Result;
use crate::io::image::{load_templates, render, save_png};
use crate::io::progress::ProgressReporter;
use crate::spatial::geometry::OffsetSet;
use clap::{ArgAction, Parser};
use log::{info, warn};
use rand::Rng;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "overlapwfc")]
#[command(
    author,
    version,
    about = "Generate images from template PNGs with overlapping wave function collapse"
)]
/// Command-line arguments for the generator
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Template PNG file or directory of template PNGs
    #[arg(value_name = "TEMPLATES")]
    pub target: PathBuf,

    /// Side length of extracted patterns
    #[arg(short = 'd', long = "dim", default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_size: usize,

    /// Add the three rotations of every pattern to the catalog
    #[arg(short = 'r', long)]
    pub rotate: bool,

    /// Wrap neighbors around the output edges
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub periodic: bool,

    /// Output width in pixels
    #[arg(short = 'W', long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    pub width: usize,

    /// Output height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    pub height: usize,

    /// Maximum observe/propagate iterations, negative for no limit
    #[arg(
        short,
        long,
        default_value_t = UNBOUNDED_ITERATIONS,
        allow_negative_numbers = true
    )]
    pub iterations: i64,

    /// Random seed for reproducible generation, drawn at random when omitted
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Use every offset within one pattern width instead of the four axis neighbors
    #[arg(long)]
    pub sliding: bool,

    /// Output PNG path, defaults to `results/result.png` beside the templates
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log specification, e.g. `info` or `overlapwfc=debug`
    #[arg(short, long, default_value = DEFAULT_LOG_SPEC)]
    pub log: String,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Iteration cap, `None` when the given limit is negative
    pub fn iteration_limit(&self) -> Option<usize> {
        usize::try_from(self.iterations).ok()
    }

    /// Model configuration described by the arguments
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            pattern_size: self.pattern_size,
            include_rotations: self.rotate,
            periodic: self.periodic,
            output_width: self.width,
            output_height: self.height,
            iteration_limit: self.iteration_limit(),
        }
    }

    /// Offset set selected by `--sliding`
    ///
    /// # Errors
    ///
    /// Returns an error if the sliding window is requested with a zero pattern size
    pub fn offsets(&self) -> Result<OffsetSet> {
        if self.sliding {
            OffsetSet::sliding_window(self.pattern_size)
        } else {
            Ok(OffsetSet::four_neighborhood())
        }
    }

    /// Where the generated image is written
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            template_dir(&self.target)
                .join(RESULT_DIR)
                .join(RESULT_FILE)
        })
    }
}

fn template_dir(target: &Path) -> PathBuf {
    if target.is_file() {
        target
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf)
    } else {
        target.to_path_buf()
    }
}

/// Runs one generation from parsed arguments: load, generate, render and save
#[derive(Debug)]
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Arguments this runner was created with
    pub const fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Load templates, generate one image and write it to the output path
    ///
    /// Contradictions are not an error: the image is still written, with
    /// contradicted cells painted in the sentinel colour.
    ///
    /// # Errors
    ///
    /// Returns an error if template loading, model construction or image export fails
    pub fn run(&self) -> Result<PathBuf> {
        let seed = self.cli.seed.unwrap_or_else(|| {
            let drawn: u64 = rand::rng().random();
            info!("No seed given, using {drawn}");
            drawn
        });

        let templates = load_templates(&self.cli.target)?;
        info!(
            "Loaded {} templates from {}",
            templates.len(),
            self.cli.target.display()
        );

        let mut model = Model::new(
            &templates,
            self.cli.offsets()?,
            self.cli.model_config(),
            seed,
        )?;

        let cells = model.wave().len();
        let progress = if self.cli.should_show_progress() {
            ProgressReporter::new(cells)
        } else {
            ProgressReporter::hidden(cells)
        };
        let report = model.generate_with(|iteration, wave| {
            progress.update(iteration, wave.collapsed_count());
        });
        progress.finish(&report);

        if report.contradictions > 0 {
            warn!(
                "{} of {cells} cells ended in contradiction (seed {seed})",
                report.contradictions
            );
        }

        let output = self.cli.output_path();
        save_png(&render(&model)?, &output)?;
        info!("Wrote {}", output.display());
        Ok(output)
    }
}
