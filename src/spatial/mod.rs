//! Spatial data structures and pixel window manipulation
//!
//! This module contains spatial-related functionality including:
//! - Offsets, opposite-direction pairing and grid index arithmetic
//! - Template pixel buffers and the patterns cut from them

/// Offset sets, grid shapes and neighbor arithmetic
pub mod geometry;
/// Template images, pattern windows and rotations
pub mod tiles;

pub use geometry::{GridShape, Offset, OffsetSet};
pub use tiles::{Pattern, PixelFormat, Template};
