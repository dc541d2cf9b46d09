/// CommandRecorder trait - deferred recording of rendering commands
///
/// A recorder is a deferred context: passes record their draws into it, then
/// call `finish()` which transfers ownership of the recording to the caller
/// as a `CommandList`. The immediate context (`Device::execute`) consumes
/// command lists exactly once; single use is enforced by move semantics.

use std::any::Any;
use std::sync::Arc;
use crate::error::Result;
use super::device::{Buffer, RenderTarget};
use super::state::{
    BlendState, CullMode, DepthStencilState, IndexType, PrimitiveTopology,
};

/// Output region in pixels plus the depth range draws map into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with the default [0, 1] depth range.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
    /// Stencil-only clear, preserving depth (light volume marking reads
    /// the scene depth written by the geometry pass)
    Stencil(u32),
}

/// An opaque, single-use recording of GPU commands.
///
/// Produced by `CommandRecorder::finish()`; ownership transfers to the
/// caller, who must hand it to `Device::execute()` exactly once. The payload
/// is backend-specific and only inspectable by the backend that recorded it.
pub struct CommandList {
    label: &'static str,
    payload: Box<dyn Any + Send>,
}

impl CommandList {
    /// Wrap a backend recording into a command list (backend use only)
    pub fn new(label: &'static str, payload: Box<dyn Any + Send>) -> Self {
        Self { label, payload }
    }

    /// Pass label this list was recorded under (diagnostics / ordering checks)
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Consume the list and recover the backend payload (backend use only)
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }
}

/// Deferred context for recording rendering commands.
///
/// Created via `Device::create_recorder()`. All state-setting and draw verbs
/// append to the recording; nothing reaches the GPU until the finished
/// command list is executed on the immediate context.
pub trait CommandRecorder: Send {
    /// Bind color render targets and an optional depth/stencil target
    fn set_render_targets(
        &mut self,
        colors: &[&Arc<dyn RenderTarget>],
        depth: Option<&Arc<dyn RenderTarget>>,
    ) -> Result<()>;

    /// Clear the currently bound targets
    ///
    /// # Arguments
    ///
    /// * `values` - One clear value per color target, plus an optional
    ///   trailing `DepthStencil` value when a depth target is bound
    fn clear(&mut self, values: &[ClearValue]) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Set the output-merger blend state
    fn set_blend_state(&mut self, blend: BlendState) -> Result<()>;

    /// Set the depth/stencil state
    fn set_depth_stencil_state(&mut self, state: DepthStencilState) -> Result<()>;

    /// Set the rasterizer face culling mode
    fn set_cull_mode(&mut self, cull: CullMode) -> Result<()>;

    /// Bind a vertex buffer at a byte offset
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer at a byte offset
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()>;

    /// Draw vertices
    fn draw(
        &mut self,
        topology: PrimitiveTopology,
        vertex_count: u32,
        first_vertex: u32,
    ) -> Result<()>;

    /// Draw indexed vertices
    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<()>;

    /// End recording and transfer ownership of the recording to the caller.
    ///
    /// The recorder is consumed; the returned list must be executed exactly
    /// once via `Device::execute()` and then discarded.
    fn finish(self: Box<Self>, label: &'static str) -> Result<CommandList>;
}
