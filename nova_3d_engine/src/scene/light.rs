/// Light sources consumed by the light accumulation pass.
///
/// Lights are culled against the camera volume each frame into per-kind
/// visible subsets before accumulation. Directional lights affect the whole
/// screen and are only gated by their enabled flag.

use glam::{Vec3, Vec4};
use crate::camera::CullVolume;
use super::bounds::Sphere;

/// Infinite-distance light (sun)
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec4,
    pub enabled: bool,
}

/// Omnidirectional light with a finite range
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub range: f32,
    pub color: Vec4,
    pub enabled: bool,
}

/// Cone light with a finite range
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub range: f32,
    /// Cone half-angle in radians
    pub cone_angle: f32,
    pub color: Vec4,
    pub enabled: bool,
}

/// Any light source
#[derive(Debug, Clone, Copy)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    /// Whether the light is enabled
    pub fn is_enabled(&self) -> bool {
        match self {
            Light::Directional(l) => l.enabled,
            Light::Point(l) => l.enabled,
            Light::Spot(l) => l.enabled,
        }
    }

    /// World-space influence sphere (None for directional lights)
    pub fn influence_sphere(&self) -> Option<Sphere> {
        match self {
            Light::Directional(_) => None,
            Light::Point(l) => Some(Sphere::new(l.position, l.range)),
            Light::Spot(l) => Some(Sphere::new(l.position, l.range)),
        }
    }
}

/// Per-kind visible light subsets for one frame.
#[derive(Default)]
pub struct VisibleLights {
    pub directional: Vec<DirectionalLight>,
    pub point: Vec<PointLight>,
    pub spot: Vec<SpotLight>,
}

impl VisibleLights {
    /// Total number of visible lights
    pub fn len(&self) -> usize {
        self.directional.len() + self.point.len() + self.spot.len()
    }

    /// Whether no light survived culling
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cull a light set against a camera volume into per-kind visible subsets.
///
/// Directional lights pass if enabled; point and spot lights additionally
/// need their influence sphere to overlap the volume.
pub fn cull_lights(lights: &[Light], volume: &CullVolume) -> VisibleLights {
    let mut visible = VisibleLights::default();

    for light in lights {
        if !light.is_enabled() {
            continue;
        }

        match light {
            Light::Directional(l) => visible.directional.push(*l),
            Light::Point(l) => {
                if volume.intersects_sphere(&Sphere::new(l.position, l.range)) {
                    visible.point.push(*l);
                }
            }
            Light::Spot(l) => {
                if volume.intersects_sphere(&Sphere::new(l.position, l.range)) {
                    visible.spot.push(*l);
                }
            }
        }
    }

    visible
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
