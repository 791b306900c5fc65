//! Analysis modules for pattern extraction from template images

/// Pattern extraction, deduplication and frequency counting
pub mod patterns;
