/// LightPass — light-volume-based radiance accumulation.
///
/// For each visible light the pass samples the G-buffer (albedo, normal,
/// depth) and adds the light's contribution into the light buffer.
/// Accumulation is purely additive with no clamping — overexposure is the
/// composition/post-processing stage's problem.
///
/// - Directional lights affect the whole screen: one fullscreen quad per
///   light, no stencil work.
/// - Point and spot lights use the two-pass stencil technique: a marking
///   pass rasterizes the bounding sphere proxy two-sided with the stencil
///   incrementing where the proxy fails the scene depth test, then the
///   lighting pass re-rasterizes the proxy and shades only marked pixels.
///   When the camera sits inside the light volume the lighting pass culls
///   clockwise-wound faces instead of counter-clockwise ones, so the proxy
///   is not near-clipped away.

use std::sync::Arc;
use glam::Vec3;
use crate::camera::Camera;
use crate::device::{
    BlendState, BufferDesc, BufferUsage, ClearValue, CommandList,
    CommandRecorder, CullMode, DepthStencilState, Device, IndexType,
    PrimitiveTopology, Viewport,
};
use crate::drawer::{Drawer, DrawerKind, DrawerRegistry, FrameParams, LightParams};
use crate::error::Result;
use crate::scene::{GeometryBinding, VisibleLights};
use super::counters::FrameCounters;
use super::targets::{GeometryBuffer, LightBuffer};

/// Latitudinal/longitudinal segments of the sphere proxy.
///
/// The proxy only marks stencil pixels, so a coarse tessellation is
/// sufficient; the drawer inflates it slightly past the light range to
/// cover the sphere's chordal error.
const SPHERE_SEGMENTS: u32 = 6;

/// The light accumulation pass.
pub struct LightPass {
    directional_drawer: Arc<dyn Drawer>,
    point_drawer: Arc<dyn Drawer>,
    spot_drawer: Arc<dyn Drawer>,
    stencil_drawer: Arc<dyn Drawer>,
    /// Fullscreen quad proxy for directional lights
    quad: GeometryBinding,
    /// Unit sphere proxy for point/spot light volumes
    sphere: GeometryBinding,
    counters: Arc<FrameCounters>,
}

impl LightPass {
    /// Create the pass, resolving its drawers and building the proxy meshes.
    ///
    /// # Errors
    ///
    /// Configuration error if any required drawer is not installed.
    pub fn new(
        device: &mut dyn Device,
        drawers: &DrawerRegistry,
        counters: Arc<FrameCounters>,
    ) -> Result<Self> {
        Ok(Self {
            directional_drawer: drawers.require(DrawerKind::DirectionalLight)?,
            point_drawer: drawers.require(DrawerKind::PointLight)?,
            spot_drawer: drawers.require(DrawerKind::SpotLight)?,
            stencil_drawer: drawers.require(DrawerKind::StencilVolume)?,
            quad: Self::make_unit_quad(device)?,
            sphere: Self::make_unit_sphere(device, SPHERE_SEGMENTS, SPHERE_SEGMENTS)?,
            counters,
        })
    }

    /// Record the light accumulation command list.
    ///
    /// Returns `Ok(None)` when no light survived culling.
    pub fn record(
        &self,
        device: &dyn Device,
        camera: &Camera,
        lights: &VisibleLights,
        gbuffer: &GeometryBuffer,
        light_buffer: &LightBuffer,
    ) -> Result<Option<CommandList>> {
        if lights.is_empty() {
            return Ok(None);
        }

        let frame = FrameParams::from_camera(camera);
        self.directional_drawer.update_per_frame(&frame)?;
        self.point_drawer.update_per_frame(&frame)?;
        self.spot_drawer.update_per_frame(&frame)?;
        self.stencil_drawer.update_per_frame(&frame)?;

        let mut recorder = device.create_recorder()?;

        // The G-buffer depth stays bound read-only for the stencil marking;
        // only the accumulation color and the stencil plane are cleared.
        recorder.set_render_targets(&[light_buffer.accumulation()], Some(gbuffer.depth()))?;
        recorder.clear(&[ClearValue::Color([0.0; 4]), ClearValue::Stencil(0)])?;
        recorder.set_viewport(Viewport::full(light_buffer.width(), light_buffer.height()))?;

        // Directional lights: fullscreen accumulation, no stencil
        if !lights.directional.is_empty() {
            recorder.set_cull_mode(CullMode::None)?;
            recorder.set_depth_stencil_state(DepthStencilState::disabled())?;
            recorder.set_blend_state(BlendState::Additive)?;

            for light in &lights.directional {
                self.directional_drawer.update_per_light(&LightParams {
                    position: Vec3::ZERO,
                    direction: light.direction,
                    color: light.color,
                    range: 0.0,
                    cone_angle_cos: 0.0,
                })?;
                self.directional_drawer.draw(recorder.as_mut(), &self.quad)?;
                self.counters.add_draw_call(self.quad.primitive_count());
            }
        }

        // Point lights: stencil-marked volume proxies
        for light in &lights.point {
            let params = LightParams {
                position: light.position,
                direction: Vec3::ZERO,
                color: light.color,
                range: light.range,
                cone_angle_cos: 0.0,
            };
            self.record_volume_light(
                recorder.as_mut(),
                camera,
                &self.point_drawer,
                &params,
            )?;
        }

        // Spot lights: same technique, cone parameters in the shader
        for light in &lights.spot {
            let params = LightParams {
                position: light.position,
                direction: light.direction,
                color: light.color,
                range: light.range,
                cone_angle_cos: light.cone_angle.cos(),
            };
            self.record_volume_light(
                recorder.as_mut(),
                camera,
                &self.spot_drawer,
                &params,
            )?;
        }

        // Restore the default winding for whatever pass records next
        recorder.set_cull_mode(CullMode::CounterClockwise)?;

        Ok(Some(recorder.finish("light_accumulation")?))
    }

    /// Two-pass stencil technique for one point/spot light.
    fn record_volume_light(
        &self,
        recorder: &mut dyn CommandRecorder,
        camera: &Camera,
        drawer: &Arc<dyn Drawer>,
        params: &LightParams,
    ) -> Result<()> {
        // Camera inside the volume: cull the opposite winding so the proxy
        // is not near-clipped away.
        let camera_inside = camera.position().distance(params.position) < params.range;
        let lit_cull = if camera_inside {
            CullMode::Clockwise
        } else {
            CullMode::CounterClockwise
        };

        // Marking pass: two-sided proxy, stencil increments where the
        // proxy fails against scene depth
        recorder.set_blend_state(BlendState::Disabled)?;
        recorder.set_cull_mode(CullMode::None)?;
        recorder.set_depth_stencil_state(DepthStencilState::volume_mark())?;
        self.stencil_drawer.update_per_light(params)?;
        self.stencil_drawer.draw(recorder, &self.sphere)?;
        self.counters.add_draw_call(self.sphere.primitive_count());

        // Lighting pass: shade only marked pixels, accumulate additively
        recorder.set_cull_mode(lit_cull)?;
        recorder.set_depth_stencil_state(DepthStencilState::volume_lit())?;
        recorder.set_blend_state(BlendState::Additive)?;
        drawer.update_per_light(params)?;
        drawer.draw(recorder, &self.sphere)?;
        self.counters.add_draw_call(self.sphere.primitive_count());

        Ok(())
    }

    // ===== PROXY MESHES =====

    /// Fullscreen XY quad, two counter-clockwise triangles.
    fn make_unit_quad(device: &mut dyn Device) -> Result<GeometryBinding> {
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

    /// Unit UV sphere, indexed triangle list.
    fn make_unit_sphere(device: &mut dyn Device, stacks: u32, slices: u32) -> Result<GeometryBinding> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        for stack in 0..=stacks {
            let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
            for slice in 0..=slices {
                let theta = std::f32::consts::TAU * slice as f32 / slices as f32;
                positions.push([
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                ]);
            }
        }

        let ring = slices + 1;
        let mut indices: Vec<u16> = Vec::new();
        for stack in 0..stacks {
            for slice in 0..slices {
                let a = (stack * ring + slice) as u16;
                let b = a + 1;
                let c = a + ring as u16;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&positions);
        let vertex_buffer = device.create_vertex_buffer(BufferDesc {
            size: vertex_bytes.len() as u64,
            usage: BufferUsage::Vertex,
        })?;
        vertex_buffer.write_discard(vertex_bytes)?;

        let index_bytes: &[u8] = bytemuck::cast_slice(&indices);
        let index_buffer = device.create_index_buffer(BufferDesc {
            size: index_bytes.len() as u64,
            usage: BufferUsage::Index,
        })?;
        index_buffer.write_discard(index_bytes)?;

        Ok(GeometryBinding {
            vertex_buffer: Some(vertex_buffer),
            index_buffer: Some(index_buffer),
            index_type: IndexType::U16,
            vertex_count: positions.len() as u32,
            index_count: indices.len() as u32,
            topology: PrimitiveTopology::TriangleList,
        })
    }
}

#[cfg(test)]
#[path = "light_pass_tests.rs"]
mod tests;
