/// Device module - the GPU abstraction consumed by the render passes
///
/// Backend implementations (Vulkan, Direct3D 12, ...) provide concrete types
/// for these traits and register themselves through the plugin registry.

// Module declarations
pub mod device;
pub mod state;
pub mod command;

// Re-export everything from device.rs
pub use device::*;

// Re-export from other modules
pub use state::*;
pub use command::*;

// Mock device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
