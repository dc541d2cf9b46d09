use std::sync::{Arc, Mutex};
use glam::{Vec3, Vec4};
use crate::camera::Camera;
use crate::device::mock_device::{recording, MockDevice};
use crate::device::CommandRecorder;
use crate::drawer::{
    Drawer, DrawerKind, DrawerRegistry, FrameParams, LightParams, ObjectParams,
};
use crate::error::Result;
use crate::scene::{
    DirectionalLight, GeometryBinding, PointLight, SpotLight, VisibleLights,
};
use crate::render::counters::FrameCounters;
use crate::render::targets::{GeometryBuffer, LightBuffer};
use super::LightPass;

/// Drawer stub that records the lights it was fed and issues the
/// geometry's draw call, so the command stream shows the pass structure.
struct ProxyDrawer {
    lights: Arc<Mutex<Vec<Vec3>>>,
}

impl ProxyDrawer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            lights: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

impl Drawer for ProxyDrawer {
    fn update_per_frame(&self, _frame: &FrameParams) -> Result<()> {
        Ok(())
    }

    fn update_per_light(&self, light: &LightParams) -> Result<()> {
        self.lights.lock().unwrap().push(light.position);
        Ok(())
    }

    fn update_per_object(&self, _object: &ObjectParams) -> Result<()> {
        Ok(())
    }

    fn draw(&self, cmd: &mut dyn CommandRecorder, geometry: &GeometryBinding) -> Result<()> {
        if let Some(vertex_buffer) = &geometry.vertex_buffer {
            cmd.bind_vertex_buffer(vertex_buffer, 0)?;
        }
        if let Some(index_buffer) = &geometry.index_buffer {
            cmd.bind_index_buffer(index_buffer, 0, geometry.index_type)?;
            cmd.draw_indexed(geometry.topology, geometry.index_count, 0, 0)
        } else {
            cmd.draw(geometry.topology, geometry.vertex_count, 0)
        }
    }
}

struct Fixture {
    device: MockDevice,
    pass: LightPass,
    gbuffer: GeometryBuffer,
    light_buffer: LightBuffer,
    counters: Arc<FrameCounters>,
}

impl Fixture {
    fn new() -> Self {
        let mut device = MockDevice::new();
        let mut drawers = DrawerRegistry::new();
        drawers.install(DrawerKind::DirectionalLight, ProxyDrawer::new()).unwrap();
        drawers.install(DrawerKind::PointLight, ProxyDrawer::new()).unwrap();
        drawers.install(DrawerKind::SpotLight, ProxyDrawer::new()).unwrap();
        drawers.install(DrawerKind::StencilVolume, ProxyDrawer::new()).unwrap();

        let counters = Arc::new(FrameCounters::new());
        let pass = LightPass::new(&mut device, &drawers, Arc::clone(&counters)).unwrap();
        let gbuffer = GeometryBuffer::new(&mut device, 800, 600).unwrap();
        let light_buffer = LightBuffer::new(&mut device, 800, 600).unwrap();

        Self { device, pass, gbuffer, light_buffer, counters }
    }

    fn record(&self, lights: &VisibleLights) -> Option<Vec<String>> {
        let camera = Camera::look_at(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            std::f32::consts::FRAC_PI_2,
            800,
            600,
            0.1,
            1000.0,
        );
        self.pass
            .record(&self.device, &camera, lights, &self.gbuffer, &self.light_buffer)
            .unwrap()
            .map(recording)
    }
}

fn point_light(position: Vec3, range: f32) -> VisibleLights {
    VisibleLights {
        point: vec![PointLight {
            position,
            range,
            color: Vec4::ONE,
            enabled: true,
        }],
        ..VisibleLights::default()
    }
}

fn cull_modes(commands: &[String]) -> Vec<&str> {
    commands
        .iter()
        .filter_map(|c| c.strip_prefix("set_cull_mode "))
        .collect()
}

// ============================================================================
// EMPTY / DIRECTIONAL
// ============================================================================

#[test]
fn test_no_lights_records_nothing() {
    let fixture = Fixture::new();
    assert!(fixture.record(&VisibleLights::default()).is_none());
}

#[test]
fn test_directional_light_accumulates_without_stencil() {
    let fixture = Fixture::new();
    let lights = VisibleLights {
        directional: vec![DirectionalLight {
            direction: Vec3::NEG_Y,
            color: Vec4::ONE,
            enabled: true,
        }],
        ..VisibleLights::default()
    };

    let commands = fixture.record(&lights).unwrap();

    // Additive accumulation, no stencil configuration anywhere
    assert!(commands.iter().any(|c| c == "set_blend_state Additive"));
    assert!(!commands.iter().any(|c| c.contains("stencil=Always")));
    assert!(!commands.iter().any(|c| c.contains("stencil=NotEqual")));
    // Fullscreen quad: non-indexed draw of 6 vertices
    assert!(commands.iter().any(|c| c == "draw TriangleList 6 0"));
}

#[test]
fn test_one_quad_per_directional_light() {
    let fixture = Fixture::new();
    let sun = DirectionalLight {
        direction: Vec3::NEG_Y,
        color: Vec4::ONE,
        enabled: true,
    };
    let lights = VisibleLights {
        directional: vec![sun, sun, sun],
        ..VisibleLights::default()
    };

    let commands = fixture.record(&lights).unwrap();
    let quads = commands.iter().filter(|c| *c == "draw TriangleList 6 0").count();
    assert_eq!(quads, 3);
}

// ============================================================================
// POINT LIGHT STENCIL TECHNIQUE
// ============================================================================

#[test]
fn test_point_light_marks_then_lights() {
    let fixture = Fixture::new();
    let commands = fixture
        .record(&point_light(Vec3::new(0.0, 0.0, -50.0), 10.0))
        .unwrap();

    // Marking: two-sided rasterization, stencil increments on depth fail
    let mark = commands
        .iter()
        .position(|c| c.contains("stencil=Always/Increment"))
        .expect("marking stencil state not found");
    // Lighting: only marked pixels pass
    let lit = commands
        .iter()
        .position(|c| c.contains("stencil=NotEqual/Keep"))
        .expect("lighting stencil state not found");
    assert!(mark < lit, "marking pass must precede lighting pass");

    // The marking pass rasterizes two-sided
    assert!(commands[..mark].iter().any(|c| c == "set_cull_mode None"));

    // Two sphere draws: marking + lighting
    let sphere_draws = commands.iter().filter(|c| c.starts_with("draw_indexed")).count();
    assert_eq!(sphere_draws, 2);
}

#[test]
fn test_camera_outside_volume_uses_counter_clockwise_culling() {
    let fixture = Fixture::new();
    // Distance 50, range 10: camera is outside the volume
    let commands = fixture
        .record(&point_light(Vec3::new(0.0, 0.0, -50.0), 10.0))
        .unwrap();

    let modes = cull_modes(&commands);
    // None (marking) → CounterClockwise (lighting) → CounterClockwise (restore)
    assert_eq!(modes, ["None", "CounterClockwise", "CounterClockwise"]);
}

#[test]
fn test_camera_inside_volume_switches_to_clockwise_culling() {
    let fixture = Fixture::new();
    // Distance 5, range 10: camera is inside the volume
    let commands = fixture
        .record(&point_light(Vec3::new(0.0, 0.0, -5.0), 10.0))
        .unwrap();

    let modes = cull_modes(&commands);
    assert_eq!(modes, ["None", "Clockwise", "CounterClockwise"]);
}

#[test]
fn test_default_culling_restored_after_all_lights() {
    let fixture = Fixture::new();
    let mut lights = point_light(Vec3::new(0.0, 0.0, -5.0), 10.0);
    lights.spot.push(SpotLight {
        position: Vec3::new(0.0, 0.0, -3.0),
        direction: Vec3::NEG_Y,
        range: 20.0,
        cone_angle: 0.6,
        color: Vec4::ONE,
        enabled: true,
    });

    let commands = fixture.record(&lights).unwrap();
    let modes = cull_modes(&commands);
    assert_eq!(modes.last(), Some(&"CounterClockwise"));
}

// ============================================================================
// ACCUMULATION SEMANTICS
// ============================================================================

#[test]
fn test_lighting_passes_blend_additively() {
    let fixture = Fixture::new();
    let commands = fixture
        .record(&point_light(Vec3::new(0.0, 0.0, -50.0), 10.0))
        .unwrap();

    // Marking draws with blending disabled, lighting accumulates
    let mark_blend = commands.iter().position(|c| c == "set_blend_state Disabled").unwrap();
    let lit_blend = commands.iter().position(|c| c == "set_blend_state Additive").unwrap();
    assert!(mark_blend < lit_blend);
}

#[test]
fn test_light_buffer_bound_with_scene_depth() {
    let fixture = Fixture::new();
    let commands = fixture
        .record(&point_light(Vec3::new(0.0, 0.0, -50.0), 10.0))
        .unwrap();

    // One color target (accumulation) plus the G-buffer depth for stencil
    assert_eq!(commands[0], "set_render_targets colors=1 depth=true");
    // Color + stencil cleared, scene depth preserved
    assert_eq!(commands[1], "clear 2");
}

#[test]
fn test_spot_light_uses_same_stencil_technique() {
    let fixture = Fixture::new();
    let lights = VisibleLights {
        spot: vec![SpotLight {
            position: Vec3::new(0.0, 0.0, -30.0),
            direction: Vec3::NEG_Y,
            range: 8.0,
            cone_angle: 0.5,
            color: Vec4::ONE,
            enabled: true,
        }],
        ..VisibleLights::default()
    };

    let commands = fixture.record(&lights).unwrap();
    assert!(commands.iter().any(|c| c.contains("stencil=Always/Increment")));
    assert!(commands.iter().any(|c| c.contains("stencil=NotEqual/Keep")));
}

#[test]
fn test_draw_call_counters() {
    let fixture = Fixture::new();
    fixture.record(&point_light(Vec3::new(0.0, 0.0, -50.0), 10.0));

    // Marking + lighting draws for one volume light
    assert_eq!(fixture.counters.draw_calls(), 2);
}
