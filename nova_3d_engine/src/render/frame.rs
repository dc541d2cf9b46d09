/// FrameRenderer — per-frame pass orchestration.
///
/// One thread records all command lists in strict pass order, then the
/// immediate context executes them in exactly that order. The ordering is
/// the sole correctness guarantee of the deferred pipeline: later passes
/// read resources written by earlier ones (G-buffer → light buffer →
/// composite), so passes are never reordered or recorded in parallel.
///
/// Per-frame list order:
/// shadow → geometry → light accumulation → forward → composition →
/// combine targets → post-processing → draw-to-screen.

use std::sync::Arc;
use crate::camera::Camera;
use crate::device::{BufferDesc, BufferUsage, CommandList, Device};
use crate::drawer::DrawerRegistry;
use crate::error::Result;
use crate::scene::{cull_lights, ComponentRegistry, GeometryBinding, Light};
use super::composition_pass::{CompositionPass, ForwardPass};
use super::counters::FrameCounters;
use super::culling::{CullingEngine, CULL_INDEX_CAMERA};
use super::geometry_pass::GeometryPass;
use super::light_pass::LightPass;
use super::shadow_pass::ShadowPass;
use super::targets::{FrameTargets, GeometryBuffer, LightBuffer};

/// Summary of one rendered frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Labels of the executed command lists, in execution order
    pub labels: Vec<&'static str>,
    /// Draw calls submitted this frame
    pub draw_calls: u32,
    /// Cull tests performed this frame
    pub cull_tests: u32,
}

/// Drives the per-frame pass sequence.
pub struct FrameRenderer {
    registry: Arc<ComponentRegistry>,
    drawers: Arc<DrawerRegistry>,
    counters: Arc<FrameCounters>,
    culling: CullingEngine,
    gbuffer: GeometryBuffer,
    light_buffer: LightBuffer,
    targets: FrameTargets,
    shadow_pass: ShadowPass,
    geometry_pass: GeometryPass,
    forward_pass: ForwardPass,
    light_pass: LightPass,
    composition_pass: CompositionPass,
    width: u32,
    height: u32,
}

impl FrameRenderer {
    /// Create the renderer and all frame-sized resources.
    ///
    /// # Errors
    ///
    /// Configuration error if a required drawer is missing; backend errors
    /// if target or proxy-mesh creation fails.
    pub fn new(
        device: &mut dyn Device,
        registry: Arc<ComponentRegistry>,
        drawers: Arc<DrawerRegistry>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let counters = Arc::new(FrameCounters::new());

        let gbuffer = GeometryBuffer::new(device, width, height)?;
        let light_buffer = LightBuffer::new(device, width, height)?;
        let targets = FrameTargets::new(device, width, height)?;

        let shadow_pass = ShadowPass::new(device, &drawers, Arc::clone(&counters))?;
        let geometry_pass = GeometryPass::new(Arc::clone(&counters));
        let forward_pass = ForwardPass::new(Arc::clone(&counters));
        let light_pass = LightPass::new(device, &drawers, Arc::clone(&counters))?;
        let composition_pass =
            CompositionPass::new(Self::make_fullscreen_quad(device)?, &drawers)?;

        Ok(Self {
            registry,
            drawers,
            culling: CullingEngine::new(Arc::clone(&counters)),
            counters,
            gbuffer,
            light_buffer,
            targets,
            shadow_pass,
            geometry_pass,
            forward_pass,
            light_pass,
            composition_pass,
            width,
            height,
        })
    }

    /// Re-derive all render-target dimensions from a new viewport size.
    ///
    /// Every stateful component resizes in sequence, keeping the invariant
    /// that buffer dimensions always equal viewport dimensions. Calling
    /// this twice with the same dimensions is a no-op.
    pub fn resize(&mut self, device: &mut dyn Device, width: u32, height: u32) -> Result<()> {
        device.resize(width, height);
        self.gbuffer.resize(device, width, height)?;
        self.light_buffer.resize(device, width, height)?;
        self.targets.resize(device, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Record and execute one frame.
    pub fn render_frame(
        &mut self,
        device: &mut dyn Device,
        camera: &Camera,
        lights: &[Light],
    ) -> Result<FrameReport> {
        self.counters.begin_frame();
        self.culling.begin_frame();

        // Registry supplies visible, layer-sorted objects
        self.registry.sort_for_draw();
        let snapshot = self.registry.snapshot();

        // Camera culling shared by the geometry and forward passes
        let camera_volume = camera.cull_volume();
        self.culling.cull_test(CULL_INDEX_CAMERA, &camera_volume, &snapshot);

        // Lights culled into per-kind visible subsets
        let visible_lights = cull_lights(lights, &camera_volume);

        // Record in strict pass order
        let mut lists: Vec<CommandList> = Vec::new();

        lists.extend(self.shadow_pass.record(
            device,
            &snapshot,
            &visible_lights.spot,
            &mut self.culling,
        )?);

        if let Some(list) = self.geometry_pass.record(
            device,
            &snapshot,
            &self.culling,
            &self.drawers,
            camera,
            &self.gbuffer,
        )? {
            lists.push(list);
        }

        if let Some(list) = self.light_pass.record(
            device,
            camera,
            &visible_lights,
            &self.gbuffer,
            &self.light_buffer,
        )? {
            lists.push(list);
        }

        if let Some(list) = self.forward_pass.record(
            device,
            &snapshot,
            &self.culling,
            camera,
            &self.targets,
            &self.drawers,
        )? {
            lists.push(list);
        }

        lists.push(self.composition_pass.record_composition(
            device,
            camera,
            &self.gbuffer,
            &self.light_buffer,
            &self.targets,
        )?);
        lists.push(self.composition_pass.record_combine(device, camera, &self.targets)?);
        lists.push(self.composition_pass.record_post_process(device, camera, &self.targets)?);
        lists.push(self.composition_pass.record_screen(device, camera, &self.targets)?);

        let labels: Vec<&'static str> = lists.iter().map(|list| list.label()).collect();

        // Immediate context: execute in exact recording order
        device.execute(lists)?;

        Ok(FrameReport {
            labels,
            draw_calls: self.counters.draw_calls(),
            cull_tests: self.counters.culls(),
        })
    }

    /// Current viewport width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current viewport height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Per-frame profiling counters
    pub fn counters(&self) -> &Arc<FrameCounters> {
        &self.counters
    }

    /// The geometry buffer shared by the deferred passes
    pub fn geometry_buffer(&self) -> &GeometryBuffer {
        &self.gbuffer
    }

    /// The light accumulation buffer
    pub fn light_buffer(&self) -> &LightBuffer {
        &self.light_buffer
    }

    /// The composition-side targets
    pub fn frame_targets(&self) -> &FrameTargets {
        &self.targets
    }

    /// Fullscreen XY quad used by the composition draws.
    fn make_fullscreen_quad(device: &mut dyn Device) -> Result<GeometryBinding> {
        let positions: [[f32; 3]; 6] = [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&positions);
        let buffer = device.create_vertex_buffer(BufferDesc {
            size: bytes.len() as u64,
            usage: BufferUsage::Vertex,
        })?;
        buffer.write_discard(bytes)?;
        Ok(GeometryBinding::triangles(buffer, positions.len() as u32))
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
