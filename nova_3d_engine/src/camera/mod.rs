/// Camera module - view state, frustum extraction and culling volumes

// Module declarations
pub mod camera;
pub mod frustum;
pub mod volume;

// Re-exports
pub use camera::*;
pub use frustum::*;
pub use volume::*;
