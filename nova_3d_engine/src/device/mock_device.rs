/// Mock Device for unit tests (no GPU required)
///
/// The mock records every command as a readable string. Tests inspect the
/// recorded streams to verify pass behavior: state selection (cull winding,
/// stencil configuration), draw submission order and command-list ordering.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::engine_bail;
use super::command::{
    ClearValue, CommandList, CommandRecorder, Rect2D, Viewport,
};
use super::device::{
    Buffer, BufferDesc, Device, DeviceStats, RenderTarget, RenderTargetDesc,
    Texture, TextureDesc,
};
use super::state::{
    BlendState, CullMode, DepthStencilState, IndexType, PrimitiveTopology,
};

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub name: String,
    pub writes: Mutex<Vec<String>>,
}

impl MockBuffer {
    pub fn new(size: u64, name: String) -> Self {
        Self {
            size,
            name,
            writes: Mutex::new(Vec::new()),
        }
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn write_discard(&self, data: &[u8]) -> Result<()> {
        if data.len() as u64 > self.size {
            engine_bail!("nova3d::mock",
                "write_discard: {} bytes into a {} byte buffer", data.len(), self.size);
        }
        self.writes.lock().unwrap().push(format!("discard {}", data.len()));
        Ok(())
    }

    fn write_no_overwrite(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            engine_bail!("nova3d::mock",
                "write_no_overwrite: range {}..{} out of bounds (size {})",
                offset, offset + data.len() as u64, self.size);
        }
        self.writes.lock().unwrap().push(format!("no_overwrite {}+{}", offset, data.len()));
        Ok(())
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub desc: TextureDesc,
}

impl Texture for MockTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }
}

// ============================================================================
// Mock RenderTarget
// ============================================================================

#[derive(Debug)]
pub struct MockRenderTarget {
    pub desc: RenderTargetDesc,
}

impl RenderTarget for MockRenderTarget {
    fn desc(&self) -> &RenderTargetDesc {
        &self.desc
    }
}

// ============================================================================
// Mock recording
// ============================================================================

/// Backend payload of a mock command list: the recorded command strings.
#[derive(Debug)]
pub struct MockRecording {
    pub commands: Vec<String>,
}

/// Extract the recorded command strings from a finished command list.
pub fn recording(list: CommandList) -> Vec<String> {
    list.into_payload()
        .downcast::<MockRecording>()
        .expect("command list was not recorded by the mock device")
        .commands
}

// ============================================================================
// Mock CommandRecorder
// ============================================================================

pub struct MockCommandRecorder {
    commands: Vec<String>,
}

impl MockCommandRecorder {
    pub fn new() -> Self {
        Self { commands: Vec::new() }
    }
}

impl CommandRecorder for MockCommandRecorder {
    fn set_render_targets(
        &mut self,
        colors: &[&Arc<dyn RenderTarget>],
        depth: Option<&Arc<dyn RenderTarget>>,
    ) -> Result<()> {
        self.commands.push(format!(
            "set_render_targets colors={} depth={}",
            colors.len(),
            depth.is_some()
        ));
        Ok(())
    }

    fn clear(&mut self, values: &[ClearValue]) -> Result<()> {
        self.commands.push(format!("clear {}", values.len()));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(format!(
            "set_viewport {}x{}",
            viewport.width as u32, viewport.height as u32
        ));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.commands.push(format!(
            "set_scissor {}x{}",
            scissor.width, scissor.height
        ));
        Ok(())
    }

    fn set_blend_state(&mut self, blend: BlendState) -> Result<()> {
        self.commands.push(format!("set_blend_state {:?}", blend));
        Ok(())
    }

    fn set_depth_stencil_state(&mut self, state: DepthStencilState) -> Result<()> {
        let stencil = match state.stencil {
            None => "none".to_string(),
            Some(s) => format!("{:?}/{:?}", s.compare, s.depth_fail_op),
        };
        self.commands.push(format!(
            "set_depth_stencil_state depth_test={} depth_write={} stencil={}",
            state.depth_test, state.depth_write, stencil
        ));
        Ok(())
    }

    fn set_cull_mode(&mut self, cull: CullMode) -> Result<()> {
        self.commands.push(format!("set_cull_mode {:?}", cull));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, _buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        self.commands.push(format!("bind_vertex_buffer +{}", offset));
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        _buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()> {
        self.commands.push(format!("bind_index_buffer +{} {:?}", offset, index_type));
        Ok(())
    }

    fn draw(
        &mut self,
        topology: PrimitiveTopology,
        vertex_count: u32,
        first_vertex: u32,
    ) -> Result<()> {
        self.commands.push(format!(
            "draw {:?} {} {}", topology, vertex_count, first_vertex
        ));
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<()> {
        self.commands.push(format!(
            "draw_indexed {:?} {} {} {}", topology, index_count, first_index, vertex_offset
        ));
        Ok(())
    }

    fn finish(self: Box<Self>, label: &'static str) -> Result<CommandList> {
        Ok(CommandList::new(
            label,
            Box::new(MockRecording { commands: self.commands }),
        ))
    }
}

// ============================================================================
// Mock Device
// ============================================================================

/// Mock Device that tracks created resources and executed lists without a GPU
pub struct MockDevice {
    /// Names of created buffers
    pub created_buffers: Arc<Mutex<Vec<String>>>,
    /// Names of created textures
    pub created_textures: Arc<Mutex<Vec<String>>>,
    /// Descriptors of created render targets
    pub created_render_targets: Arc<Mutex<Vec<RenderTargetDesc>>>,
    /// (label, commands) of every executed command list, in execution order
    pub executed: Arc<Mutex<Vec<(&'static str, Vec<String>)>>>,
}

impl MockDevice {
    /// Create a new mock device
    pub fn new() -> Self {
        Self {
            created_buffers: Arc::new(Mutex::new(Vec::new())),
            created_textures: Arc::new(Mutex::new(Vec::new())),
            created_render_targets: Arc::new(Mutex::new(Vec::new())),
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Labels of executed command lists, in execution order
    pub fn executed_labels(&self) -> Vec<&'static str> {
        self.executed.lock().unwrap().iter().map(|(l, _)| *l).collect()
    }

    /// Number of render targets created so far
    pub fn render_target_count(&self) -> usize {
        self.created_render_targets.lock().unwrap().len()
    }
}

impl Device for MockDevice {
    fn create_vertex_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        let name = format!("vertex_{}", desc.size);
        self.created_buffers.lock().unwrap().push(name.clone());
        Ok(Arc::new(MockBuffer::new(desc.size, name)))
    }

    fn create_index_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        let name = format!("index_{}", desc.size);
        self.created_buffers.lock().unwrap().push(name.clone());
        Ok(Arc::new(MockBuffer::new(desc.size, name)))
    }

    fn create_constant_buffer(&mut self, size: u64) -> Result<Arc<dyn Buffer>> {
        let name = format!("constant_{}", size);
        self.created_buffers.lock().unwrap().push(name.clone());
        Ok(Arc::new(MockBuffer::new(size, name)))
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        self.created_textures
            .lock()
            .unwrap()
            .push(format!("texture_{}x{}", desc.width, desc.height));
        Ok(Arc::new(MockTexture { desc }))
    }

    fn create_render_target(&mut self, desc: RenderTargetDesc) -> Result<Arc<dyn RenderTarget>> {
        self.created_render_targets.lock().unwrap().push(desc);
        Ok(Arc::new(MockRenderTarget { desc }))
    }

    fn create_recorder(&self) -> Result<Box<dyn CommandRecorder>> {
        Ok(Box::new(MockCommandRecorder::new()))
    }

    fn execute(&mut self, lists: Vec<CommandList>) -> Result<()> {
        let mut executed = self.executed.lock().unwrap();
        for list in lists {
            let label = list.label();
            executed.push((label, recording(list)));
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            command_lists_executed: self.executed.lock().unwrap().len() as u32,
            gpu_memory_used: 0,
        }
    }

    fn resize(&mut self, _width: u32, _height: u32) {
        // No-op for mock
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
