//! Model constants and runtime configuration defaults

/// Default side length of extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 3;

// Pattern sizes travel as a single byte
/// Largest supported pattern side length
pub const MAX_PATTERN_SIZE: usize = 255;

/// Default output width and height in pixels
pub const DEFAULT_OUTPUT_SIZE: usize = 64;

/// Iteration limit value meaning "run until every cell is decided"
pub const UNBOUNDED_ITERATIONS: i64 = -1;

/// Iterations between progress log records
pub const LOG_REPORT_INTERVAL: usize = 1000;

/// RGBA colour painted where a cell has no possible pattern left
pub const CONTRADICTION_COLOR: [u8; 4] = [255, 51, 204, 255];

// Output settings
/// Directory created next to the templates for generated images
pub const RESULT_DIR: &str = "results";
/// File name of the generated image
pub const RESULT_FILE: &str = "result.png";

/// Default log specification handed to the logger
pub const DEFAULT_LOG_SPEC: &str = "warn";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
