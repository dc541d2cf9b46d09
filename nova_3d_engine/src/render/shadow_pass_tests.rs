use std::sync::{Arc, Mutex};
use glam::{Mat4, Vec3, Vec4};
use crate::device::mock_device::MockDevice;
use crate::device::{BufferDesc, BufferUsage, CommandRecorder, Device};
use crate::drawer::{
    Drawer, DrawerKind, DrawerRegistry, FrameParams, LightParams, ObjectParams,
};
use crate::error::Result;
use crate::scene::{
    ComponentRegistry, Cullable, Drawable, GeometryBinding, SceneObject,
    SceneObjectKey, SpotLight,
};
use crate::render::counters::FrameCounters;
use crate::render::culling::{CullingEngine, CULL_INDEX_CAMERA, CULL_INDEX_SHADOW_BASE};
use super::ShadowPass;

/// Drawer that records which objects it rendered.
struct DepthDrawer {
    objects: Arc<Mutex<Vec<u32>>>,
}

impl DepthDrawer {
    fn new() -> (Arc<Self>, Arc<Mutex<Vec<u32>>>) {
        let objects = Arc::new(Mutex::new(Vec::new()));
        (Arc::new(Self { objects: Arc::clone(&objects) }), objects)
    }
}

impl Drawer for DepthDrawer {
    fn update_per_frame(&self, _frame: &FrameParams) -> Result<()> {
        Ok(())
    }

    fn update_per_light(&self, _light: &LightParams) -> Result<()> {
        Ok(())
    }

    fn update_per_object(&self, object: &ObjectParams) -> Result<()> {
        self.objects.lock().unwrap().push(object.material_slot);
        Ok(())
    }

    fn draw(&self, cmd: &mut dyn CommandRecorder, geometry: &GeometryBinding) -> Result<()> {
        if let Some(vertex_buffer) = &geometry.vertex_buffer {
            cmd.bind_vertex_buffer(vertex_buffer, 0)?;
        }
        cmd.draw(geometry.topology, geometry.vertex_count, 0)
    }
}

fn spot(position: Vec3, range: f32) -> SpotLight {
    SpotLight {
        position,
        direction: Vec3::NEG_Y,
        range,
        cone_angle: 0.6,
        color: Vec4::ONE,
        enabled: true,
    }
}

fn caster(device: &mut MockDevice, id: &str, position: Vec3, slot: u32) -> SceneObject {
    let buffer = device
        .create_vertex_buffer(BufferDesc { size: 72, usage: BufferUsage::Vertex })
        .unwrap();
    let mut drawable = Drawable::deferred_opaque(
        GeometryBinding::triangles(buffer, 6),
        Mat4::from_translation(position),
    );
    drawable.material_slot = slot;

    SceneObject::new(id, id)
        .with_drawable(drawable)
        .with_cullable(Cullable::sphere(position, 1.0))
}

struct Fixture {
    device: MockDevice,
    registry: ComponentRegistry,
    pass: ShadowPass,
    culling: CullingEngine,
    drawn: Arc<Mutex<Vec<u32>>>,
}

impl Fixture {
    fn new() -> Self {
        let mut device = MockDevice::new();
        let (drawer, drawn) = DepthDrawer::new();
        let mut drawers = DrawerRegistry::new();
        drawers.install(DrawerKind::Shadow, drawer).unwrap();

        let counters = Arc::new(FrameCounters::new());
        let pass = ShadowPass::new(&mut device, &drawers, Arc::clone(&counters)).unwrap();

        Self {
            device,
            registry: ComponentRegistry::new(),
            pass,
            culling: CullingEngine::new(counters),
            drawn,
        }
    }

    fn record(&mut self, lights: &[SpotLight]) -> Vec<&'static str> {
        let snapshot: Vec<(SceneObjectKey, SceneObject)> = self.registry.snapshot();
        self.pass
            .record(&self.device, &snapshot, lights, &mut self.culling)
            .unwrap()
            .iter()
            .map(|list| list.label())
            .collect()
    }
}

// ============================================================================
// RECORDING
// ============================================================================

#[test]
fn test_no_lights_records_no_lists() {
    let mut fixture = Fixture::new();
    let object = caster(&mut fixture.device, "rock", Vec3::ZERO, 0);
    fixture.registry.add(object).unwrap();

    assert!(fixture.record(&[]).is_empty());
}

#[test]
fn test_light_with_no_casters_in_range_records_nothing() {
    let mut fixture = Fixture::new();
    let object = caster(&mut fixture.device, "rock", Vec3::ZERO, 0);
    fixture.registry.add(object).unwrap();

    let labels = fixture.record(&[spot(Vec3::new(500.0, 10.0, 0.0), 20.0)]);
    assert!(labels.is_empty());
}

#[test]
fn test_one_list_per_shadowing_light() {
    let mut fixture = Fixture::new();
    let a = caster(&mut fixture.device, "a", Vec3::ZERO, 0);
    let b = caster(&mut fixture.device, "b", Vec3::new(100.0, 0.0, 0.0), 1);
    fixture.registry.add(a).unwrap();
    fixture.registry.add(b).unwrap();

    let labels = fixture.record(&[
        spot(Vec3::new(0.0, 10.0, 0.0), 20.0),
        spot(Vec3::new(100.0, 10.0, 0.0), 20.0),
    ]);

    assert_eq!(labels, vec!["shadow", "shadow"]);
}

#[test]
fn test_only_in_range_casters_are_drawn() {
    let mut fixture = Fixture::new();
    let near = caster(&mut fixture.device, "near", Vec3::ZERO, 7);
    let far = caster(&mut fixture.device, "far", Vec3::new(500.0, 0.0, 0.0), 9);
    fixture.registry.add(near).unwrap();
    fixture.registry.add(far).unwrap();

    fixture.record(&[spot(Vec3::new(0.0, 10.0, 0.0), 20.0)]);

    assert_eq!(*fixture.drawn.lock().unwrap(), vec![7]);
}

#[test]
fn test_non_casters_are_skipped() {
    let mut fixture = Fixture::new();
    let mut object = caster(&mut fixture.device, "no_shadow", Vec3::ZERO, 3);
    object.drawable_mut().unwrap().cast_shadow = false;
    fixture.registry.add(object).unwrap();

    let labels = fixture.record(&[spot(Vec3::new(0.0, 10.0, 0.0), 20.0)]);

    assert!(labels.is_empty());
    assert!(fixture.drawn.lock().unwrap().is_empty());
}

// ============================================================================
// CULL INDEX ISOLATION
// ============================================================================

#[test]
fn test_shadow_culling_is_isolated_from_camera_culling() {
    let mut fixture = Fixture::new();
    // In front of the light but behind any camera at the origin
    let object = caster(&mut fixture.device, "caster", Vec3::new(0.0, 0.0, 40.0), 0);
    fixture.registry.add(object).unwrap();

    let snapshot = fixture.registry.snapshot();

    // Camera at origin looking -Z never sees the object
    let camera = crate::camera::Camera::look_at(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::Y,
        std::f32::consts::FRAC_PI_2,
        800,
        600,
        0.1,
        1000.0,
    );
    fixture
        .culling
        .cull_test(CULL_INDEX_CAMERA, &camera.cull_volume(), &snapshot);

    let labels = fixture.record(&[spot(Vec3::new(0.0, 10.0, 40.0), 20.0)]);

    // The light still gets its shadow list
    assert_eq!(labels, vec!["shadow"]);

    // And the two indices disagree about the same object
    let key = snapshot[0].0;
    assert!(fixture.culling.result(CULL_INDEX_CAMERA, key).unwrap().culled);
    assert!(!fixture.culling.result(CULL_INDEX_SHADOW_BASE, key).unwrap().culled);
}
