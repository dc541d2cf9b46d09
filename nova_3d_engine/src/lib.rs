/*!
# Nova 3D Engine

Core of the Nova 3D deferred rendering engine: scene management, culling,
and the multi-pass deferred pipeline, expressed against a trait-based GPU
device abstraction. Concrete backends (Vulkan, Direct3D 12, ...) implement
the device traits and register through the plugin system; this crate never
touches a GPU API directly.

## Architecture

- **Device**: Factory trait for creating GPU resources and executing command lists
- **CommandRecorder / CommandList**: Deferred recording, single-use execution
- **DrawerRegistry**: Logical drawer types resolved to bound GPU pipelines
- **ComponentRegistry**: Ordered, thread-synchronized scene object collection
- **CullingEngine**: Per-cull-index visibility testing and draw ordering
- **QuadTree / PatchStreamer**: Spatial partitioning and background streaming
- **FrameRenderer**: Deferred geometry / light accumulation / composition passes
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod drawer;
pub mod camera;
pub mod scene;
pub mod spatial;
pub mod render;
pub mod resource;
pub mod utils;

// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module; the engine_* macros stay crate-internal
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device sub-module with the GPU abstraction types
    pub mod device {
        pub use crate::device::*;
    }

    // Drawer sub-module
    pub mod drawer {
        pub use crate::drawer::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Spatial partitioning sub-module
    pub mod spatial {
        pub use crate::spatial::*;
    }

    // Render pipeline sub-module
    pub mod render {
        pub use crate::render::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Math library, re-exported so applications match the engine's version
pub use glam;
