//! Overlapping wave function collapse driven by incremental constraint propagation
//!
//! The system extracts fixed-size pixel patterns from template images, records which
//! patterns may overlap at each relative offset, and collapses a grid of per-cell
//! superpositions using frequency-weighted observation and support-count propagation.

#![deny(unsafe_code)]

/// Wave state, adjacency index, propagation, selection and the generation loop
pub mod algorithm;
/// Pattern catalog construction from template images
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Offsets, grid shapes and pixel window utilities
pub mod spatial;

pub use algorithm::executor::{GenerationReport, Model, ModelConfig};
pub use io::error::{ModelError, Result};
