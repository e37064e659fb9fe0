use super::*;

// ============================================================================
// FrameSlot / SemaphoreIndex
// ============================================================================

#[test]
fn test_frame_slot_bounds() {
    assert!(FrameSlot::new(0).is_some());
    assert!(FrameSlot::new(PENDING_FRAMES - 1).is_some());
    assert!(FrameSlot::new(PENDING_FRAMES).is_none());
}

#[test]
fn test_frame_slot_from_frame_wraps() {
    for frame in 0..10u64 {
        assert_eq!(FrameSlot::from_frame(frame).index(), frame as usize % PENDING_FRAMES);
    }
}

#[test]
fn test_frame_slot_all() {
    let slots: Vec<usize> = FrameSlot::all().map(|s| s.index()).collect();
    assert_eq!(slots, (0..PENDING_FRAMES).collect::<Vec<_>>());
}

#[test]
fn test_semaphore_index_bounds() {
    assert!(SemaphoreIndex::new(2, 3).is_some());
    assert!(SemaphoreIndex::new(3, 3).is_none());
}

// ============================================================================
// PerSlot
// ============================================================================

#[test]
fn test_per_slot_from_fn() {
    let arena = PerSlot::from_fn(|slot| slot.index() * 10);
    for slot in FrameSlot::all() {
        assert_eq!(*arena.get(slot), slot.index() * 10);
    }
}

#[test]
fn test_per_slot_try_from_fn_error() {
    let result: Result<PerSlot<u32>, String> = PerSlot::try_from_fn(|slot| {
        if slot.index() == 1 { Err("boom".to_string()) } else { Ok(0) }
    });
    assert_eq!(result.unwrap_err(), "boom");
}

#[test]
fn test_per_slot_try_from_fn_ok() {
    let arena: PerSlot<usize> = PerSlot::try_from_fn(|slot| Ok::<_, ()>(slot.index() + 1)).unwrap();
    assert_eq!(arena.iter().map(|(_, v)| *v).sum::<usize>(), (1..=PENDING_FRAMES).sum());
}

#[test]
fn test_per_slot_get_mut_and_iter_mut() {
    let mut arena = PerSlot::from_fn(|_| 0u32);
    *arena.get_mut(FrameSlot::from_frame(1)) = 5;
    for (_, value) in arena.iter_mut() {
        *value += 1;
    }
    assert_eq!(*arena.get(FrameSlot::from_frame(0)), 1);
    assert_eq!(*arena.get(FrameSlot::from_frame(1)), 6);
    assert_eq!(arena.map(|v| *v * 2).into_values().collect::<Vec<_>>(), vec![2, 12]);
}

// ============================================================================
// FrameCounter
// ============================================================================

#[test]
fn test_counter_two_images_two_slots() {
    let mut counter = FrameCounter::new(2);
    let mut slots = Vec::new();
    let mut semaphores = Vec::new();
    for _ in 0..5 {
        slots.push(counter.slot().index());
        semaphores.push(counter.semaphore().index());
        counter.advance();
    }
    assert_eq!(slots, vec![0, 1, 0, 1, 0]);
    assert_eq!(semaphores, vec![0, 1, 0, 1, 0]);
    assert_eq!(counter.frame_number(), 5);
}

#[test]
fn test_counter_three_images_diverge() {
    let mut counter = FrameCounter::new(3);
    let mut pairs = Vec::new();
    for _ in 0..6 {
        pairs.push((counter.slot().index(), counter.semaphore().index()));
        counter.advance();
    }
    assert_eq!(pairs, vec![(0, 0), (1, 1), (0, 2), (1, 0), (0, 1), (1, 2)]);
}

#[test]
fn test_counter_set_image_count_resets_semaphore() {
    let mut counter = FrameCounter::new(3);
    counter.advance();
    counter.advance();
    counter.set_image_count(2);
    assert_eq!(counter.semaphore().index(), 0);
    assert_eq!(counter.image_count(), 2);
    assert_eq!(counter.frame_number(), 2);
}
