use std::sync::Arc;
use glam::Vec3;
use crate::camera::CullVolume;
use crate::scene::{ComponentRegistry, Cullable, SceneObject, SceneObjectKey};
use crate::render::counters::FrameCounters;
use super::*;

/// Registry with spheres of radius 1 at the given positions.
/// Returns the snapshot the culling engine operates on.
fn snapshot_with_spheres(
    positions: &[Vec3],
) -> (Vec<(SceneObjectKey, crate::scene::SceneObject)>, Vec<SceneObjectKey>) {
    let registry = ComponentRegistry::new();
    let keys: Vec<SceneObjectKey> = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            registry
                .add(
                    SceneObject::new(format!("obj_{}", i), format!("Object {}", i))
                        .with_cullable(Cullable::sphere(position, 1.0)),
                )
                .unwrap()
        })
        .collect();
    (registry.snapshot(), keys)
}

fn engine() -> CullingEngine {
    CullingEngine::new(Arc::new(FrameCounters::new()))
}

// ============================================================================
// BASIC CULL TESTS
// ============================================================================

#[test]
fn test_cull_test_reports_any_visible() {
    let (snapshot, _) = snapshot_with_spheres(&[Vec3::ZERO, Vec3::new(500.0, 0.0, 0.0)]);
    let mut culling = engine();

    let volume = CullVolume::sphere(Vec3::ZERO, 10.0);
    assert!(culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot));

    let nothing = CullVolume::sphere(Vec3::new(-500.0, 0.0, 0.0), 1.0);
    let mut culling = engine();
    assert!(!culling.cull_test(CULL_INDEX_CAMERA, &nothing, &snapshot));
}

#[test]
fn test_inactive_and_invisible_objects_are_ignored() {
    let registry = ComponentRegistry::new();
    let inactive = registry
        .add(SceneObject::new("a", "a").with_cullable(Cullable::sphere(Vec3::ZERO, 1.0)))
        .unwrap();
    registry.with_object_mut(inactive, |o| o.set_active(false));

    let hidden = registry
        .add(SceneObject::new("b", "b").with_cullable(Cullable::sphere(Vec3::ZERO, 1.0)))
        .unwrap();
    registry.with_object_mut(hidden, |o| o.set_visible(false));

    let snapshot = registry.snapshot();
    let mut culling = engine();
    let volume = CullVolume::sphere(Vec3::ZERO, 10.0);

    assert!(!culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot));
}

#[test]
fn test_object_without_cullable_is_always_retained() {
    let registry = ComponentRegistry::new();
    let key = registry.add(SceneObject::new("hud", "HUD")).unwrap();
    let snapshot = registry.snapshot();

    let mut culling = engine();
    let volume = CullVolume::sphere(Vec3::new(10_000.0, 0.0, 0.0), 0.1);
    assert!(culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot));

    let result = culling.result(CULL_INDEX_CAMERA, key).unwrap();
    assert!(!result.culled);
    assert_eq!(result.distance, 0.0);
}

#[test]
fn test_distance_is_reported_from_volume_origin() {
    let (snapshot, keys) = snapshot_with_spheres(&[Vec3::new(0.0, 0.0, -25.0)]);
    let mut culling = engine();

    let volume = CullVolume::sphere(Vec3::ZERO, 100.0);
    culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot);

    let result = culling.result(CULL_INDEX_CAMERA, keys[0]).unwrap();
    assert!((result.distance - 25.0).abs() < 1e-5);
}

// ============================================================================
// CACHE BEHAVIOR
// ============================================================================

#[test]
fn test_repeat_cull_test_is_served_from_cache() {
    let (snapshot, _) = snapshot_with_spheres(&[Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)]);
    let counters = Arc::new(FrameCounters::new());
    let mut culling = CullingEngine::new(Arc::clone(&counters));

    let volume = CullVolume::sphere(Vec3::ZERO, 10.0);
    culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot);
    assert_eq!(counters.culls(), 2);

    // Same index, same frame: no new cull invocations
    culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot);
    assert_eq!(counters.culls(), 2);
}

#[test]
fn test_begin_frame_invalidates_cache() {
    let (snapshot, _) = snapshot_with_spheres(&[Vec3::ZERO]);
    let counters = Arc::new(FrameCounters::new());
    let mut culling = CullingEngine::new(Arc::clone(&counters));

    let volume = CullVolume::sphere(Vec3::ZERO, 10.0);
    culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot);
    culling.begin_frame();
    culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot);

    assert_eq!(counters.culls(), 2);
}

// ============================================================================
// CULL INDEX ISOLATION
// ============================================================================

#[test]
fn test_distinct_cull_indices_never_share_results() {
    // Object visible to the camera but outside the shadow light's volume
    let (snapshot, keys) = snapshot_with_spheres(&[Vec3::new(0.0, 0.0, -5.0)]);
    let mut culling = engine();

    let camera_volume = CullVolume::sphere(Vec3::ZERO, 50.0);
    let light_volume = CullVolume::sphere(Vec3::new(100.0, 0.0, 0.0), 10.0);

    assert!(culling.cull_test(CULL_INDEX_CAMERA, &camera_volume, &snapshot));
    assert!(!culling.cull_test(CULL_INDEX_SHADOW_BASE, &light_volume, &snapshot));

    // Camera sees it, the light does not — independently tracked
    assert!(!culling.result(CULL_INDEX_CAMERA, keys[0]).unwrap().culled);
    assert!(culling.result(CULL_INDEX_SHADOW_BASE, keys[0]).unwrap().culled);
}

#[test]
fn test_cached_not_visible_does_not_leak_across_indices() {
    let (snapshot, keys) = snapshot_with_spheres(&[Vec3::new(0.0, 0.0, -5.0)]);
    let mut culling = engine();

    // First the light index caches a "not visible" result
    let light_volume = CullVolume::sphere(Vec3::new(100.0, 0.0, 0.0), 10.0);
    assert!(!culling.cull_test(CULL_INDEX_SHADOW_BASE, &light_volume, &snapshot));

    // The camera index must still test and see the object
    let camera_volume = CullVolume::sphere(Vec3::ZERO, 50.0);
    assert!(culling.cull_test(CULL_INDEX_CAMERA, &camera_volume, &snapshot));
    assert!(!culling.result(CULL_INDEX_CAMERA, keys[0]).unwrap().culled);
}

// ============================================================================
// VISIBLE LISTS AND SORT POLICIES
// ============================================================================

#[test]
fn test_visible_preserves_input_order() {
    let (snapshot, keys) =
        snapshot_with_spheres(&[Vec3::new(0.0, 0.0, -30.0), Vec3::new(0.0, 0.0, -10.0)]);
    let mut culling = engine();

    let volume = CullVolume::sphere(Vec3::ZERO, 100.0);
    culling.cull_test(CULL_INDEX_CAMERA, &volume, &snapshot);

    let visible = culling.visible(CULL_INDEX_CAMERA, &snapshot);
    assert_eq!(visible.len(), 2);
    assert_eq!(*visible[0].0, keys[0]);
    assert_eq!(*visible[1].0, keys[1]);
}

#[test]
fn test_sort_opaque_is_nearest_first() {
    let mut list = vec![("far", 30.0), ("near", 5.0), ("mid", 12.0)];
    CullingEngine::sort_opaque(&mut list);
    assert_eq!(list.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["near", "mid", "far"]);
}

#[test]
fn test_sort_transparent_is_farthest_first() {
    let mut list = vec![("far", 30.0), ("near", 5.0), ("mid", 12.0)];
    CullingEngine::sort_transparent(&mut list);
    assert_eq!(list.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["far", "mid", "near"]);
}

#[test]
fn test_sorts_are_stable_on_equal_distance() {
    let mut list = vec![("first", 10.0), ("second", 10.0), ("third", 10.0)];
    CullingEngine::sort_opaque(&mut list);
    assert_eq!(
        list.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
        vec!["first", "second", "third"]
    );

    let mut list = vec![("first", 10.0), ("second", 10.0)];
    CullingEngine::sort_transparent(&mut list);
    assert_eq!(list.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["first", "second"]);
}
