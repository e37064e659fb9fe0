use super::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

// ============================================================================
// FrameStats
// ============================================================================

#[test]
fn test_first_tick_has_no_duration() {
    let mut stats = FrameStats::new();
    assert_eq!(stats.tick(Instant::now()), 0.0);
    assert_eq!(stats.total_frames(), 1);
}

#[test]
fn test_tick_returns_frame_duration() {
    let mut stats = FrameStats::new();
    let t0 = Instant::now();
    stats.tick(t0);
    let dt = stats.tick(t0 + ms(16));
    assert!((dt - 0.016).abs() < 1e-6);
}

#[test]
fn test_window_average_and_fps() {
    let mut stats = FrameStats::new();
    let t0 = Instant::now();
    stats.tick(t0);
    for i in 1..=50u64 {
        stats.tick(t0 + ms(20 * i));
    }
    // 50 frames of 20 ms close the one-second window
    assert!((stats.average_frame_ms() - 20.0).abs() < 0.01);
    assert!((stats.fps() - 50.0).abs() < 0.01);
}

#[test]
fn test_no_average_before_first_window() {
    let mut stats = FrameStats::default();
    let t0 = Instant::now();
    stats.tick(t0);
    stats.tick(t0 + ms(100));
    assert_eq!(stats.fps(), 0.0);
}

// ============================================================================
// SlotClock
// ============================================================================

#[test]
fn test_slot_clock_measures_per_slot() {
    let start = Instant::now();
    let mut clock = SlotClock::new(start);
    let slot0 = FrameSlot::from_frame(0);
    let slot1 = FrameSlot::from_frame(1);

    assert!((clock.advance(slot0, start + ms(10)) - 0.010).abs() < 1e-6);
    assert!((clock.advance(slot1, start + ms(20)) - 0.020).abs() < 1e-6);
    // Slot 0 covers the time since its own previous dispatch, not the last frame
    assert!((clock.advance(slot0, start + ms(30)) - 0.020).abs() < 1e-6);
    assert!((clock.advance(slot1, start + ms(40)) - 0.020).abs() < 1e-6);
}

#[test]
fn test_slot_clock_clamps_long_stalls() {
    let start = Instant::now();
    let mut clock = SlotClock::new(start);
    let dt = clock.advance(FrameSlot::from_frame(0), start + Duration::from_secs(5));
    assert_eq!(dt, MAX_SIMULATION_STEP);
}
