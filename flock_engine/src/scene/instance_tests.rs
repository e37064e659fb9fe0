use super::*;
use crate::config::INSTANCE_COUNT;

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_instance_size() {
    assert_eq!(InstanceData::SIZE, 64);
}

#[test]
fn test_initial_instances_spacing_and_centre() {
    let instances = initial_instances(INSTANCE_COUNT);
    assert_eq!(instances.len(), INSTANCE_COUNT as usize);

    for pair in instances.windows(2) {
        let step = pair[1].position().x - pair[0].position().x;
        assert!((step - INSTANCE_SPACING).abs() < 1e-4);
    }

    let sum: Vec3 = instances.iter().map(|i| i.position()).sum();
    assert!(sum.length() < 1e-2, "row is not centred: {:?}", sum);
}

#[test]
fn test_initial_instances_empty_and_single() {
    assert!(initial_instances(0).is_empty());
    let one = initial_instances(1);
    assert_eq!(one[0].position(), Vec3::ZERO);
}

// ============================================================================
// Velocities
// ============================================================================

#[test]
fn test_velocities_within_speed_range() {
    let params = SimParams::default();
    for velocity in initial_velocities(INSTANCE_COUNT, &params) {
        let speed = velocity.truncate().length();
        assert!(speed >= params.min_speed - 1e-4 && speed <= params.max_speed + 1e-4, "speed {}", speed);
        assert_eq!(velocity.w, 0.0);
    }
}

#[test]
fn test_velocities_are_deterministic() {
    let params = SimParams::default();
    assert_eq!(initial_velocities(16, &params), initial_velocities(16, &params));
}

#[test]
fn test_velocities_vary() {
    let params = SimParams::default();
    let velocities = initial_velocities(8, &params);
    assert!(velocities.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn test_velocities_follow_seeded_generator() {
    let params = SimParams::default();
    let mut rng = StdRng::seed_from_u64(VELOCITY_SEED);
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let phi: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let speed = params.min_speed + rng.gen::<f32>() * (params.max_speed - params.min_speed);

    let first = initial_velocities(1, &params)[0];
    assert!((first.z - z * speed).abs() < 1e-5);
    assert!((first.truncate().length() - speed).abs() < 1e-4);
    let r = (1.0 - z * z).max(0.0).sqrt();
    assert!((first.x - r * phi.cos() * speed).abs() < 1e-4);
}

#[test]
fn test_velocities_prefix_is_stable() {
    // Growing the flock keeps the existing boids' velocities
    let params = SimParams::default();
    let small = initial_velocities(4, &params);
    let large = initial_velocities(32, &params);
    assert_eq!(&large[..4], &small[..]);
}
