/// Bounding primitives used for culling and spatial partitioning.

use glam::{Mat4, Vec3};

// ===== AABB =====

/// Axis-Aligned Bounding Box
///
/// Used for frustum culling and quadtree partitioning. Object-space boxes
/// are transformed by the world matrix at culling time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Construct from corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Center point of this AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent (size) of this AABB along each axis
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// World-space AABB of this local-space box under `matrix`.
    ///
    /// Arvo's method: each matrix axis is projected onto the box extents,
    /// giving the tight result without visiting all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Whether `other` lies entirely within this box.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Whether the two boxes overlap or touch.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Closest point of the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Farthest corner of the box from `point`
    pub fn farthest_corner(&self, point: Vec3) -> Vec3 {
        let center = self.center();
        Vec3::new(
            if point.x < center.x { self.max.x } else { self.min.x },
            if point.y < center.y { self.max.y } else { self.min.y },
            if point.z < center.z { self.max.z } else { self.min.z },
        )
    }
}

// ===== SPHERE =====

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Construct from center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Test if this sphere overlaps an AABB
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        let closest = aabb.closest_point(self.center);
        closest.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Test if this sphere fully contains an AABB
    pub fn contains_aabb(&self, aabb: &AABB) -> bool {
        let farthest = aabb.farthest_corner(self.center);
        farthest.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Test if this sphere overlaps another sphere
    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
