use super::*;
use glam::Vec3;
use std::time::Duration;

fn quad() -> MeshData {
    let positions = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
    ];
    MeshData::from_streams(&positions, None, None, None, vec![0, 1, 2, 2, 3, 0]).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_scene_defaults() {
    let scene = Scene::new(quad());
    assert_eq!(scene.instance_count(), INSTANCE_COUNT);
    assert_eq!(scene.velocities.len(), INSTANCE_COUNT as usize);
    assert_eq!(scene.sim_params.instance_count, INSTANCE_COUNT);
    assert_eq!(scene.textures.len(), 1);
    assert_eq!(scene.textures.find(DEFAULT_TEXTURE_NAME), Some(scene.textures.default_handle()));
    assert!(scene.environment.is_none());
}

#[test]
fn test_buffer_sizes() {
    let scene = Scene::with_instance_count(quad(), 10);
    assert_eq!(scene.instance_bytes(), 640);
    assert_eq!(scene.velocity_bytes(), 160);
    assert_eq!(scene.sim_params.instance_count, 10);
}

#[test]
fn test_zero_instances() {
    let scene = Scene::with_instance_count(quad(), 0);
    assert_eq!(scene.instance_count(), 0);
    assert_eq!(scene.instance_bytes(), 0);
}

// ============================================================================
// Per-frame update
// ============================================================================

#[test]
fn test_advance_uses_slot_clock() {
    let mut scene = Scene::new(quad());
    let start = Instant::now();
    scene.reset_clock(start);

    let slot0 = FrameSlot::from_frame(0);
    let slot1 = FrameSlot::from_frame(1);
    let p0 = scene.advance(slot0, start + Duration::from_millis(16));
    let p1 = scene.advance(slot1, start + Duration::from_millis(32));
    let p2 = scene.advance(slot0, start + Duration::from_millis(48));

    assert!((p0.delta_time - 0.016).abs() < 1e-5);
    assert!((p1.delta_time - 0.032).abs() < 1e-5);
    assert!((p2.delta_time - 0.032).abs() < 1e-5);
    // Tunables are untouched by the update
    assert_eq!(p2.max_speed, scene.sim_params.max_speed);
    assert_eq!(scene.stats.total_frames(), 3);
}

#[test]
fn test_advance_caps_instance_count_at_seeded_instances() {
    let mut scene = Scene::with_instance_count(quad(), 4);
    scene.sim_params.instance_count = 200;
    let start = Instant::now();
    scene.reset_clock(start);

    let params = scene.advance(FrameSlot::from_frame(0), start + Duration::from_millis(16));
    assert_eq!(params.instance_count, 4);
    assert!(params.instance_count <= scene.instance_count());
}

#[test]
fn test_advance_keeps_smaller_instance_count() {
    let mut scene = Scene::with_instance_count(quad(), 8);
    scene.sim_params.instance_count = 3;
    let start = Instant::now();
    scene.reset_clock(start);

    let params = scene.advance(FrameSlot::from_frame(0), start + Duration::from_millis(16));
    assert_eq!(params.instance_count, 3);
}

#[test]
fn test_material_constants_follow_environment() {
    let mut scene = Scene::new(quad());
    let sky = scene.textures.insert("sky", ImageData::solid(4, 2, [0, 0, 255, 255]));
    scene.environment = Some(sky);
    assert_eq!(scene.material_constants().extra_indices.y, 1);
}
