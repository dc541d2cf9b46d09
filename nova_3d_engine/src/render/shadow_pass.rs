/// ShadowPass — depth-only shadow maps for spot lights.
///
/// Each visible spot light gets its own cull index, so an object outside a
/// light's shadow volume is tracked independently from its camera
/// visibility. One command list is recorded per light; all shadow lists
/// precede every other list of the frame.

use std::sync::Arc;
use glam::Vec4;
use crate::camera::CullVolume;
use crate::device::{
    ClearValue, CommandList, CullMode, DepthStencilState, Device,
    RenderTarget, RenderTargetDesc, TextureFormat, Viewport, BlendState,
};
use crate::drawer::{Drawer, DrawerKind, DrawerRegistry, LightParams, ObjectParams};
use crate::error::Result;
use crate::scene::{SceneObject, SceneObjectKey, SpotLight};
use super::counters::FrameCounters;
use super::culling::{CullingEngine, CULL_INDEX_SHADOW_BASE};

/// Shadow map edge length in texels
const SHADOW_MAP_SIZE: u32 = 1024;

/// Depth-only shadow mapping for spot lights.
pub struct ShadowPass {
    drawer: Arc<dyn Drawer>,
    shadow_map: Arc<dyn RenderTarget>,
    counters: Arc<FrameCounters>,
}

impl ShadowPass {
    /// Create the pass and its fixed-size shadow map target.
    ///
    /// # Errors
    ///
    /// Configuration error if the shadow drawer is not installed.
    pub fn new(
        device: &mut dyn Device,
        drawers: &DrawerRegistry,
        counters: Arc<FrameCounters>,
    ) -> Result<Self> {
        let drawer = drawers.require(DrawerKind::Shadow)?;
        let shadow_map = device.create_render_target(RenderTargetDesc {
            width: SHADOW_MAP_SIZE,
            height: SHADOW_MAP_SIZE,
            format: TextureFormat::D24_UNORM_S8_UINT,
        })?;
        Ok(Self { drawer, shadow_map, counters })
    }

    /// The shadow map target sampled by the lighting drawers
    pub fn shadow_map(&self) -> &Arc<dyn RenderTarget> {
        &self.shadow_map
    }

    /// Record one depth-only command list per visible spot light.
    ///
    /// Lights whose volume contains no shadow casters record nothing.
    pub fn record(
        &self,
        device: &dyn Device,
        snapshot: &[(SceneObjectKey, SceneObject)],
        spot_lights: &[SpotLight],
        culling: &mut CullingEngine,
    ) -> Result<Vec<CommandList>> {
        let mut lists = Vec::new();

        for (light_index, light) in spot_lights.iter().enumerate() {
            let cull_index = CULL_INDEX_SHADOW_BASE + light_index as u32;
            let volume = CullVolume::sphere(light.position, light.range);

            if !culling.cull_test(cull_index, &volume, snapshot) {
                continue;
            }

            let mut recorder = device.create_recorder()?;
            recorder.set_render_targets(&[], Some(&self.shadow_map))?;
            recorder.clear(&[ClearValue::DepthStencil { depth: 1.0, stencil: 0 }])?;
            recorder.set_viewport(Viewport::full(SHADOW_MAP_SIZE, SHADOW_MAP_SIZE))?;
            recorder.set_blend_state(BlendState::Disabled)?;
            recorder.set_depth_stencil_state(DepthStencilState::geometry(true))?;
            recorder.set_cull_mode(CullMode::CounterClockwise)?;

            self.drawer.update_per_light(&LightParams {
                position: light.position,
                direction: light.direction,
                color: Vec4::ONE,
                range: light.range,
                cone_angle_cos: light.cone_angle.cos(),
            })?;

            let mut recorded_any = false;
            for (_, object, _) in culling.visible(cull_index, snapshot) {
                let Some(drawable) = object.drawable() else { continue };
                if !drawable.cast_shadow || !drawable.geometry.is_ready() {
                    continue;
                }

                self.drawer.update_per_object(&ObjectParams {
                    world: drawable.world,
                    material_slot: drawable.material_slot,
                })?;
                self.drawer.draw(recorder.as_mut(), &drawable.geometry)?;
                self.counters.add_draw_call(drawable.geometry.primitive_count());
                recorded_any = true;
            }

            if recorded_any {
                lists.push(recorder.finish("shadow")?);
            }
        }

        Ok(lists)
    }
}

#[cfg(test)]
#[path = "shadow_pass_tests.rs"]
mod tests;
