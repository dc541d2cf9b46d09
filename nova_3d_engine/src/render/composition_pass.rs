/// CompositionPass and ForwardPass — frame assembly.
///
/// The forward pass renders non-deferred drawables (UI, alpha overlays)
/// into the overlay target. The composition pass then combines the
/// G-buffer and the accumulated light buffer into the objects target,
/// merges the overlay on top, runs the post-processing hook and blits the
/// result to the backbuffer. Composition lists always record after the
/// deferred and forward lists of the frame.

use std::sync::Arc;
use crate::camera::Camera;
use crate::device::{
    BlendState, ClearValue, CommandList, CullMode, DepthStencilState,
    Device, Viewport,
};
use crate::drawer::{
    Drawer, DrawerKind, DrawerRegistry, FrameParams, ObjectParams,
};
use crate::error::Result;
use crate::scene::{BlendMode, GeometryBinding, SceneObject, SceneObjectKey};
use super::counters::FrameCounters;
use super::culling::{CullingEngine, CULL_INDEX_CAMERA};
use super::targets::{FrameTargets, GeometryBuffer, LightBuffer};

// ===== BLEND DISPATCH =====

/// How an object is being drawn, for blend-state selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Deferred,
    Forward,
}

/// Blend-state dispatch table over (draw mode, blend mode).
///
/// Deferred & Additive → additive composer blend; Deferred &
/// (Alpha|Transparent) → premultiplied transparent composer blend;
/// Deferred & else → opaque composer (blending disabled); any non-deferred
/// draw → standard forward alpha blend.
pub fn select_blend(mode: DrawMode, blend: BlendMode) -> BlendState {
    match (mode, blend) {
        (DrawMode::Deferred, BlendMode::Additive) => BlendState::Additive,
        (DrawMode::Deferred, BlendMode::Alpha)
        | (DrawMode::Deferred, BlendMode::Transparent) => BlendState::Premultiplied,
        (DrawMode::Deferred, _) => BlendState::Disabled,
        (DrawMode::Forward, _) => BlendState::Alpha,
    }
}

// ===== FORWARD PASS =====

/// Forward rendering of non-deferred drawables into the overlay target.
///
/// Objects draw in registry order (layer-sorted); UI and alpha layers rely
/// on that ordering rather than depth.
pub struct ForwardPass {
    counters: Arc<FrameCounters>,
}

impl ForwardPass {
    pub fn new(counters: Arc<FrameCounters>) -> Self {
        Self { counters }
    }

    /// Record the forward command list.
    ///
    /// Returns `Ok(None)` when no forward drawable is visible. Objects with
    /// pending geometry uploads are skipped individually.
    pub fn record(
        &self,
        device: &dyn Device,
        snapshot: &[(SceneObjectKey, SceneObject)],
        culling: &CullingEngine,
        camera: &Camera,
        targets: &FrameTargets,
        drawers: &DrawerRegistry,
    ) -> Result<Option<CommandList>> {
        let forward: Vec<&SceneObject> = culling
            .visible(CULL_INDEX_CAMERA, snapshot)
            .into_iter()
            .filter(|(_, object, _)| {
                object.drawable().map(|d| !d.deferred).unwrap_or(false)
            })
            .map(|(_, object, _)| object)
            .collect();

        if forward.is_empty() {
            return Ok(None);
        }

        let frame = FrameParams::from_camera(camera);
        let mut recorder = device.create_recorder()?;

        recorder.set_render_targets(&[targets.ui()], None)?;
        recorder.clear(&[ClearValue::Color([0.0; 4])])?;
        recorder.set_viewport(Viewport::full(targets.width(), targets.height()))?;
        recorder.set_depth_stencil_state(DepthStencilState::disabled())?;
        recorder.set_cull_mode(CullMode::CounterClockwise)?;

        let mut updated_kinds: Vec<DrawerKind> = Vec::new();

        for object in forward {
            let Some(drawable) = object.drawable() else { continue };
            if !drawable.geometry.is_ready() {
                continue;
            }

            let Some(drawer) = drawers.get(drawable.drawer) else {
                crate::engine_warn!("nova3d::ForwardPass",
                    "No drawer {:?} installed for '{}'", drawable.drawer, object.id());
                continue;
            };

            if !updated_kinds.contains(&drawable.drawer) {
                drawer.update_per_frame(&frame)?;
                updated_kinds.push(drawable.drawer);
            }

            recorder.set_blend_state(select_blend(DrawMode::Forward, drawable.blend_mode))?;
            drawer.update_per_object(&ObjectParams {
                world: drawable.world,
                material_slot: drawable.material_slot,
            })?;
            drawer.draw(recorder.as_mut(), &drawable.geometry)?;
            self.counters.add_draw_call(drawable.geometry.primitive_count());
        }

        Ok(Some(recorder.finish("forward")?))
    }
}

// ===== COMPOSITION PASS =====

/// Combines the G-buffer, light buffer and forward layers into the final
/// frame.
pub struct CompositionPass {
    composer: Arc<dyn Drawer>,
    combine: Arc<dyn Drawer>,
    post_process: Arc<dyn Drawer>,
    screen: Arc<dyn Drawer>,
    /// Fullscreen quad shared by all composition draws
    quad: GeometryBinding,
}

impl CompositionPass {
    /// Create the pass, resolving its drawers.
    ///
    /// # Errors
    ///
    /// Configuration error if any required drawer is not installed.
    pub fn new(quad: GeometryBinding, drawers: &DrawerRegistry) -> Result<Self> {
        Ok(Self {
            composer: drawers.require(DrawerKind::Composer)?,
            combine: drawers.require(DrawerKind::CombineTargets)?,
            post_process: drawers.require(DrawerKind::PostProcess)?,
            screen: drawers.require(DrawerKind::Screen)?,
            quad,
        })
    }

    /// Fullscreen draw boilerplate shared by the composition steps.
    fn record_fullscreen(
        &self,
        device: &dyn Device,
        camera: &Camera,
        drawer: &Arc<dyn Drawer>,
        target_setup: impl FnOnce(&mut dyn crate::device::CommandRecorder) -> Result<()>,
        blend: BlendState,
        label: &'static str,
    ) -> Result<CommandList> {
        let mut recorder = device.create_recorder()?;
        target_setup(recorder.as_mut())?;
        recorder.set_viewport(Viewport::full(camera.width(), camera.height()))?;
        recorder.set_depth_stencil_state(DepthStencilState::disabled())?;
        recorder.set_cull_mode(CullMode::None)?;
        recorder.set_blend_state(blend)?;

        drawer.update_per_frame(&FrameParams::from_camera(camera))?;
        drawer.draw(recorder.as_mut(), &self.quad)?;

        recorder.finish(label)
    }

    /// Compose G-buffer channels + light buffer into the objects target.
    ///
    /// The composer drawer samples the albedo/normal/depth surfaces and the
    /// accumulated light buffer; all of them must have been resized in
    /// lockstep with the viewport.
    pub fn record_composition(
        &self,
        device: &dyn Device,
        camera: &Camera,
        gbuffer: &GeometryBuffer,
        light_buffer: &LightBuffer,
        targets: &FrameTargets,
    ) -> Result<CommandList> {
        debug_assert_eq!(gbuffer.width(), targets.width());
        debug_assert_eq!(gbuffer.height(), targets.height());
        debug_assert_eq!(light_buffer.width(), targets.width());
        debug_assert_eq!(light_buffer.height(), targets.height());

        let objects = targets.objects();
        self.record_fullscreen(
            device,
            camera,
            &self.composer,
            |recorder| {
                recorder.set_render_targets(&[objects], None)?;
                recorder.clear(&[ClearValue::Color([0.0, 0.0, 0.0, 1.0])])
            },
            select_blend(DrawMode::Deferred, BlendMode::Opaque),
            "composition",
        )
    }

    /// Merge the overlay (UI/forward) target over the objects target.
    pub fn record_combine(
        &self,
        device: &dyn Device,
        camera: &Camera,
        targets: &FrameTargets,
    ) -> Result<CommandList> {
        let objects = targets.objects();
        self.record_fullscreen(
            device,
            camera,
            &self.combine,
            |recorder| recorder.set_render_targets(&[objects], None),
            BlendState::Alpha,
            "combine_targets",
        )
    }

    /// Final post-processing over the combined objects target.
    pub fn record_post_process(
        &self,
        device: &dyn Device,
        camera: &Camera,
        targets: &FrameTargets,
    ) -> Result<CommandList> {
        let objects = targets.objects();
        self.record_fullscreen(
            device,
            camera,
            &self.post_process,
            |recorder| recorder.set_render_targets(&[objects], None),
            BlendState::Disabled,
            "post_process",
        )
    }

    /// Blit the finished frame to the backbuffer.
    pub fn record_screen(
        &self,
        device: &dyn Device,
        camera: &Camera,
        targets: &FrameTargets,
    ) -> Result<CommandList> {
        let backbuffer = targets.backbuffer();
        self.record_fullscreen(
            device,
            camera,
            &self.screen,
            |recorder| recorder.set_render_targets(&[backbuffer], None),
            BlendState::Disabled,
            "draw_to_screen",
        )
    }
}

#[cfg(test)]
#[path = "composition_pass_tests.rs"]
mod tests;
