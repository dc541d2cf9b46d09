/// Render module - the deferred rendering pipeline
///
/// Culling, the multi-pass deferred pipeline (geometry → light accumulation
/// → composition) and the per-frame orchestration.

// Module declarations
pub mod counters;
pub mod culling;
pub mod targets;
pub mod geometry_pass;
pub mod shadow_pass;
pub mod light_pass;
pub mod composition_pass;
pub mod frame;

// Re-exports
pub use counters::*;
pub use culling::*;
pub use targets::*;
pub use geometry_pass::*;
pub use shadow_pass::*;
pub use light_pass::*;
pub use composition_pass::*;
pub use frame::*;
