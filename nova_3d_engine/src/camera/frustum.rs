/// View frustum as six clipping planes.
///
/// A plane is stored as a Vec4 (A, B, C, D) with the normal (A, B, C)
/// pointing into the visible volume, so a point P is inside when
/// dot(plane, (P, 1)) >= 0 holds for every plane. Most callers get their
/// frustum from `from_view_projection()`; shadow projectors may fill the
/// planes directly.

use glam::{Mat4, Vec3, Vec4};
use crate::scene::{AABB, Sphere};

/// Result of a 3-way containment classification against a culling volume.
///
/// Used by spatial structures (QuadTree) and the culling engine for
/// hierarchical culling:
/// - `Disjoint` → skip the entire subtree
/// - `Contains` → collect all objects without further testing
/// - `Intersects` → test individual objects and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// The tested box is entirely outside the volume
    Disjoint,
    /// The tested box partially overlaps the volume
    Intersects,
    /// The tested box is entirely inside the volume
    Contains,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// The six planes, indexable by the `PLANE_*` constants.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Order: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes from a view-projection matrix
    /// (Gribb & Hartmann). Valid for perspective and orthographic
    /// projections alike.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row = |i: usize| {
            Vec4::new(vp.x_axis[i], vp.y_axis[i], vp.z_axis[i], vp.w_axis[i])
        };
        let w = row(3);

        let mut planes = [
            w + row(0), // left
            w - row(0), // right
            w + row(1), // bottom
            w - row(1), // top
            w + row(2), // near
            w - row(2), // far
        ];

        // Normalize each plane so (A, B, C) is a unit vector
        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// AABB corner most aligned with a plane normal (the "positive vertex")
    fn positive_vertex(aabb: &AABB, normal: Vec3) -> Vec3 {
        Vec3::new(
            if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
            if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
            if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
        )
    }

    /// AABB corner least aligned with a plane normal (the "negative vertex")
    fn negative_vertex(aabb: &AABB, normal: Vec3) -> Vec3 {
        Vec3::new(
            if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
            if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
            if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
        )
    }

    /// Whether an AABB overlaps the frustum.
    ///
    /// Positive-vertex test: if the corner most aligned with a plane's
    /// normal lies behind that plane, the box is fully outside. The test
    /// is conservative near frustum corners (false positives possible,
    /// false negatives not).
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();
            if normal.dot(Self::positive_vertex(aabb, normal)) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }

    /// 3-way classification of an AABB against the frustum.
    ///
    /// Checks the positive and the negative vertex against each plane:
    /// - p-vertex outside any plane → `Disjoint` (early out)
    /// - n-vertex outside any plane → at least `Intersects`
    /// - all n-vertices inside all planes → `Contains`
    pub fn classify_aabb(&self, aabb: &AABB) -> Containment {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();

            if normal.dot(Self::positive_vertex(aabb, normal)) + plane.w < 0.0 {
                return Containment::Disjoint;
            }

            if normal.dot(Self::negative_vertex(aabb, normal)) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { Containment::Contains } else { Containment::Intersects }
    }

    /// Test if a sphere intersects this frustum.
    ///
    /// A sphere is outside if its center is farther than `radius` behind
    /// any plane. Conservative like `intersects_aabb`.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        for plane in &self.planes {
            if plane.truncate().dot(sphere.center) + plane.w < -sphere.radius {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
