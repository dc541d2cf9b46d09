/// Device trait - main GPU resource factory and immediate context
///
/// This is the central abstraction between the engine core and the concrete
/// graphics backend. The core creates buffers, textures and render targets
/// through it, records work on deferred contexts (`CommandRecorder`) and
/// executes the finished command lists on the immediate context in strict
/// recording order.

use std::sync::Arc;
use std::sync::Mutex;
use std::collections::HashMap;
use winit::window::Window;

use crate::error::{Error, Result};
use super::command::{CommandList, CommandRecorder};
use super::state::TextureFormat;

// ============================================================================
// Configuration and statistics
// ============================================================================

/// Device configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version as (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Nova3D Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

/// Device statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceStats {
    /// Number of command lists executed this frame
    pub command_lists_executed: u32,
    /// GPU memory used (bytes)
    pub gpu_memory_used: u64,
}

// ============================================================================
// Resource descriptors
// ============================================================================

/// Buffer usage category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    Constant,
}

/// Buffer descriptor
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Usage category
    pub usage: BufferUsage,
}

/// Texture descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub array_layers: u32,
    pub mip_levels: u32,
}

/// Render target descriptor.
///
/// `PartialEq` so callers can verify that a resize with unchanged viewport
/// dimensions yields identical descriptors (no hidden reallocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

// ============================================================================
// Resource traits
// ============================================================================

/// GPU buffer resource.
///
/// The two write modes mirror the discard/no-overwrite upload semantics of
/// dynamic GPU buffers: `write_discard` orphans the previous contents,
/// `write_no_overwrite` appends into a region the GPU is not reading.
pub trait Buffer: Send + Sync {
    /// Size of the buffer in bytes
    fn size(&self) -> u64;

    /// Replace the entire buffer contents, discarding what was there
    fn write_discard(&self, data: &[u8]) -> Result<()>;

    /// Write a sub-range without invalidating in-flight GPU reads
    fn write_no_overwrite(&self, offset: u64, data: &[u8]) -> Result<()>;
}

/// GPU texture resource
pub trait Texture: Send + Sync {
    /// Descriptor the texture was created from
    fn desc(&self) -> &TextureDesc;
}

/// GPU render target surface (color or depth/stencil)
pub trait RenderTarget: Send + Sync {
    /// Descriptor the target was created from
    fn desc(&self) -> &RenderTargetDesc;
}

// ============================================================================
// Device trait
// ============================================================================

/// Main device trait
///
/// This is the central factory interface for creating GPU resources and the
/// immediate context that executes recorded command lists.
/// Implemented by backend-specific devices (e.g., VulkanDevice).
pub trait Device: Send + Sync {
    /// Create a vertex buffer
    fn create_vertex_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create an index buffer
    fn create_index_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a constant buffer of `size` bytes
    fn create_constant_buffer(&mut self, size: u64) -> Result<Arc<dyn Buffer>>;

    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a render target surface
    fn create_render_target(&mut self, desc: RenderTargetDesc) -> Result<Arc<dyn RenderTarget>>;

    /// Create a deferred recording context
    fn create_recorder(&self) -> Result<Box<dyn CommandRecorder>>;

    /// Execute finished command lists on the immediate context.
    ///
    /// Lists are executed in the exact order given; each list is consumed
    /// and cannot be executed again.
    fn execute(&mut self, lists: Vec<CommandList>) -> Result<()>;

    /// Block until the GPU has drained all submitted work
    fn wait_idle(&self) -> Result<()>;

    /// Get statistics about the device
    fn stats(&self) -> DeviceStats;

    /// Notify the device that the output window has been resized
    fn resize(&mut self, width: u32, height: u32);
}

// ============================================================================
// Helpers
// ============================================================================

/// Create a constant buffer sized for a `T` value.
///
/// Convenience wrapper over `Device::create_constant_buffer` for typed
/// per-frame / per-object constant data.
pub fn create_constant_buffer_for<T: bytemuck::Pod>(
    device: &mut dyn Device,
) -> Result<Arc<dyn Buffer>> {
    device.create_constant_buffer(std::mem::size_of::<T>() as u64)
}

// ============================================================================
// Plugin system for registering device backends
// ============================================================================

/// Device plugin factory function type
type DevicePluginFactory =
    Box<dyn Fn(&Window, DeviceConfig) -> Result<Arc<Mutex<dyn Device>>> + Send + Sync>;

/// Plugin registry for device backends
pub struct DevicePluginRegistry {
    plugins: HashMap<&'static str, DevicePluginFactory>,
}

impl DevicePluginRegistry {
    /// Create a new plugin registry
    fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Register a backend under a plugin name (e.g. "vulkan")
    pub fn register_plugin<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(&Window, DeviceConfig) -> Result<Arc<Mutex<dyn Device>>> + Send + Sync + 'static,
    {
        self.plugins.insert(name, Box::new(factory));
    }

    /// Instantiate a shared device through the named plugin's factory
    pub fn create_device(
        &self,
        plugin_name: &str,
        window: &Window,
        config: DeviceConfig,
    ) -> Result<Arc<Mutex<dyn Device>>> {
        self.plugins
            .get(plugin_name)
            .ok_or_else(|| {
                Error::InitializationFailed(format!("Plugin '{}' not found", plugin_name))
            })?(window, config)
    }
}

static DEVICE_REGISTRY: Mutex<Option<DevicePluginRegistry>> = Mutex::new(None);

/// Get the global device plugin registry
pub fn device_plugin_registry() -> &'static Mutex<Option<DevicePluginRegistry>> {
    // Initialize on first access
    let mut registry = DEVICE_REGISTRY.lock().unwrap();
    if registry.is_none() {
        *registry = Some(DevicePluginRegistry::new());
    }
    drop(registry);
    &DEVICE_REGISTRY
}

/// Register a device backend in the global plugin registry
pub fn register_device_plugin<F>(name: &'static str, factory: F)
where
    F: Fn(&Window, DeviceConfig) -> Result<Arc<Mutex<dyn Device>>> + Send + Sync + 'static,
{
    device_plugin_registry()
        .lock()
        .unwrap()
        .as_mut()
        .unwrap()
        .register_plugin(name, factory);
}
