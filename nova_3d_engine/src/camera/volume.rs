/// Culling volumes — the query shapes passed to the culling engine and
/// the spatial index.
///
/// A `CullVolume` pairs a shape (frustum, sphere or box) with an origin
/// point. The origin is the reference for the distances reported by cull
/// tests (nearest-first / farthest-first draw ordering); it has no effect
/// on the containment classification itself.

use glam::Vec3;
use crate::scene::{AABB, Sphere};
use super::frustum::{Containment, Frustum};

/// Shape of a culling volume
#[derive(Debug, Clone, Copy)]
pub enum VolumeShape {
    /// Camera or shadow-projector frustum
    Frustum(Frustum),
    /// Range sphere (point/spot light influence, streaming radius)
    Sphere(Sphere),
    /// Axis-aligned box
    Box(AABB),
}

/// A culling volume with a distance-reference origin.
#[derive(Debug, Clone, Copy)]
pub struct CullVolume {
    /// Query shape
    pub shape: VolumeShape,
    /// Reference point for distance metrics (typically the camera position)
    pub origin: Vec3,
}

impl CullVolume {
    /// Frustum volume with an explicit origin (camera position)
    pub fn frustum(frustum: Frustum, origin: Vec3) -> Self {
        Self { shape: VolumeShape::Frustum(frustum), origin }
    }

    /// Sphere volume; the origin is the sphere center
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            shape: VolumeShape::Sphere(Sphere::new(center, radius)),
            origin: center,
        }
    }

    /// Box volume; the origin is the box center
    pub fn boxed(aabb: AABB) -> Self {
        Self { origin: aabb.center(), shape: VolumeShape::Box(aabb) }
    }

    /// 3-way containment classification of an AABB against this volume
    pub fn classify_aabb(&self, aabb: &AABB) -> Containment {
        match &self.shape {
            VolumeShape::Frustum(frustum) => frustum.classify_aabb(aabb),
            VolumeShape::Sphere(sphere) => {
                if !sphere.intersects_aabb(aabb) {
                    Containment::Disjoint
                } else if sphere.contains_aabb(aabb) {
                    Containment::Contains
                } else {
                    Containment::Intersects
                }
            }
            VolumeShape::Box(volume) => {
                if !volume.intersects(aabb) {
                    Containment::Disjoint
                } else if volume.contains(aabb) {
                    Containment::Contains
                } else {
                    Containment::Intersects
                }
            }
        }
    }

    /// Test if an AABB overlaps this volume (conservative)
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.classify_aabb(aabb) != Containment::Disjoint
    }

    /// Test if a sphere overlaps this volume (conservative)
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        match &self.shape {
            VolumeShape::Frustum(frustum) => frustum.intersects_sphere(sphere),
            VolumeShape::Sphere(own) => own.intersects_sphere(sphere),
            VolumeShape::Box(aabb) => sphere.intersects_aabb(aabb),
        }
    }

    /// Distance from the volume origin to a point.
    ///
    /// Only meaningful for draw ordering; not a penetration depth.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.origin.distance(point)
    }
}

#[cfg(test)]
#[path = "volume_tests.rs"]
mod tests;
