/// GeometryPass — deferred geometry into the multi-target G-buffer.
///
/// State machine: Idle → Culling → (nothing visible → Idle) or
/// Culling → Rendering → Idle. An empty cull produces zero GPU work; a
/// visible drawable whose vertex binding has not been uploaded yet aborts
/// the whole pass for this frame (silent not-ready skip, retried next
/// frame) — this is a valid state, not an error.

use std::sync::Arc;
use crate::camera::Camera;
use crate::device::{ClearValue, CommandList, CullMode, DepthStencilState, Device, Viewport};
use crate::drawer::{DrawerKind, DrawerRegistry, FrameParams, ObjectParams};
use crate::error::Result;
use crate::scene::{SceneObject, SceneObjectKey};
use super::composition_pass::{select_blend, DrawMode};
use super::counters::FrameCounters;
use super::culling::{CullingEngine, CULL_INDEX_CAMERA};
use super::targets::GeometryBuffer;

/// Observable pass state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Culling,
    Rendering,
}

/// The deferred geometry pass.
pub struct GeometryPass {
    state: PassState,
    counters: Arc<FrameCounters>,
}

impl GeometryPass {
    /// Create the pass
    pub fn new(counters: Arc<FrameCounters>) -> Self {
        Self {
            state: PassState::Idle,
            counters,
        }
    }

    /// Current state (Idle between frames)
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Record the G-buffer command list for this frame.
    ///
    /// `culling` must already hold the camera results for `snapshot`
    /// (the frame renderer runs the camera cull test before any pass).
    ///
    /// Returns `Ok(None)` when nothing is visible or a vertex binding is
    /// not ready — zero command lists, no error.
    pub fn record(
        &mut self,
        device: &dyn Device,
        snapshot: &[(SceneObjectKey, SceneObject)],
        culling: &CullingEngine,
        drawers: &DrawerRegistry,
        camera: &Camera,
        gbuffer: &GeometryBuffer,
    ) -> Result<Option<CommandList>> {
        self.state = PassState::Culling;

        // Visible deferred drawables, split by blend category
        let mut opaque: Vec<(&SceneObject, f32)> = Vec::new();
        let mut transparent: Vec<(&SceneObject, f32)> = Vec::new();

        for (_, object, distance) in culling.visible(CULL_INDEX_CAMERA, snapshot) {
            let Some(drawable) = object.drawable() else { continue };
            if !drawable.deferred {
                continue;
            }

            // Not ready yet: buffers still uploading. Abort the whole pass
            // for this frame and retry next frame.
            if !drawable.geometry.is_ready() {
                crate::engine_trace!("nova3d::GeometryPass",
                    "Vertex binding not ready for '{}', skipping frame", object.id());
                self.state = PassState::Idle;
                return Ok(None);
            }

            if drawable.blend_mode.is_blended() {
                transparent.push((object, distance));
            } else {
                opaque.push((object, distance));
            }
        }

        if opaque.is_empty() && transparent.is_empty() {
            self.state = PassState::Idle;
            return Ok(None);
        }

        // Nearest-first opaques, farthest-first transparents
        CullingEngine::sort_opaque(&mut opaque);
        CullingEngine::sort_transparent(&mut transparent);

        self.state = PassState::Rendering;

        let frame = FrameParams::from_camera(camera);
        let mut recorder = device.create_recorder()?;

        recorder.set_render_targets(
            &[gbuffer.albedo(), gbuffer.normal()],
            Some(gbuffer.depth()),
        )?;
        recorder.clear(&[
            ClearValue::Color([0.0; 4]),
            ClearValue::Color([0.0; 4]),
            ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
        ])?;
        recorder.set_viewport(Viewport::full(gbuffer.width(), gbuffer.height()))?;
        recorder.set_cull_mode(CullMode::CounterClockwise)?;

        // Per-frame constants, uploaded once per drawer kind encountered
        let mut updated_kinds: Vec<DrawerKind> = Vec::new();

        for (object, _) in opaque.iter().chain(transparent.iter()) {
            let Some(drawable) = object.drawable() else { continue };

            let Some(drawer) = drawers.get(drawable.drawer) else {
                crate::engine_warn!("nova3d::GeometryPass",
                    "No drawer {:?} installed for '{}'", drawable.drawer, object.id());
                continue;
            };

            if !updated_kinds.contains(&drawable.drawer) {
                drawer.update_per_frame(&frame)?;
                updated_kinds.push(drawable.drawer);
            }

            recorder.set_blend_state(select_blend(DrawMode::Deferred, drawable.blend_mode))?;
            recorder.set_depth_stencil_state(DepthStencilState::geometry(drawable.depth_write))?;

            drawer.update_per_object(&ObjectParams {
                world: drawable.world,
                material_slot: drawable.material_slot,
            })?;
            drawer.draw(recorder.as_mut(), &drawable.geometry)?;

            self.counters.add_draw_call(drawable.geometry.primitive_count());
        }

        let list = recorder.finish("geometry")?;
        self.state = PassState::Idle;
        Ok(Some(list))
    }
}

#[cfg(test)]
#[path = "geometry_pass_tests.rs"]
mod tests;
