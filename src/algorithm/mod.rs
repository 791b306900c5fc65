/// Overlap compatibility and the per-offset fit table
pub mod adjacency;
/// Model construction and the observe/propagate generation loop
pub mod executor;
/// Ban worklist and support-count propagation
pub mod propagation;
/// Weighted pattern choice and lowest-entropy cell selection
pub mod selection;
/// Per-cell superpositions, entropies and support counters
pub mod wave;
