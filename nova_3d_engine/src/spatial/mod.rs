/// Spatial partitioning module - quadtree index and streaming layer

// Module declarations
pub mod quad_tree;
pub mod streamer;

// Re-exports
pub use quad_tree::*;
pub use streamer::*;
