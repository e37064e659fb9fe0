use super::*;

#[test]
fn test_staging_capacity_fits_largest_float_image() {
    assert_eq!(STAGING_CAPACITY, 268_435_456);
}

#[test]
fn test_default_present_mode_order() {
    let config = Config::default();
    assert_eq!(config.present_modes, vec![PresentMode::FifoRelaxed, PresentMode::Fifo]);
}

#[test]
fn test_default_fence_timeout_is_unbounded() {
    assert_eq!(Config::default().fence_timeout_ns, u64::MAX);
}

#[test]
fn test_shader_path_joins_dir() {
    let config = Config {
        shader_dir: PathBuf::from("assets/spv"),
        ..Config::default()
    };
    assert_eq!(config.shader_path("boids.comp.spv"), PathBuf::from("assets/spv/boids.comp.spv"));
}

#[test]
fn test_validation_stats_total() {
    let stats = ValidationStats { errors: 1, warnings: 2, info: 3, verbose: 4 };
    assert_eq!(stats.total(), 10);
}
