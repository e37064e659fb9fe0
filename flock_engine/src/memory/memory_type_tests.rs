use super::*;

/// Typical discrete GPU layout
fn discrete_table() -> MemoryTypeTable {
    MemoryTypeTable::new(vec![
        MemoryProperties::DEVICE_LOCAL,
        MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT,
        MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT | MemoryProperties::HOST_CACHED,
        MemoryProperties::DEVICE_LOCAL | MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT,
    ])
}

// ============================================================================
// Lowest qualifying index
// ============================================================================

#[test]
fn test_index_zero_is_a_success() {
    let table = discrete_table();
    assert_eq!(table.find_memory_type(0b1111, MemoryProperties::DEVICE_LOCAL), Some(0));
}

#[test]
fn test_returns_lowest_superset_match() {
    let table = discrete_table();
    let host = MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT;
    assert_eq!(table.find_memory_type(0b1111, host), Some(1));
}

#[test]
fn test_type_bits_mask_out_candidates() {
    let table = discrete_table();
    let host = MemoryProperties::HOST_VISIBLE | MemoryProperties::HOST_COHERENT;
    // Types 1 and 2 are not allowed by the resource
    assert_eq!(table.find_memory_type(0b1001, host), Some(3));
    assert_eq!(table.find_memory_type(0b1001, MemoryProperties::DEVICE_LOCAL), Some(0));
    assert_eq!(table.find_memory_type(0b1000, MemoryProperties::DEVICE_LOCAL), Some(3));
}

#[test]
fn test_empty_requirement_takes_first_allowed() {
    let table = discrete_table();
    assert_eq!(table.find_memory_type(0b0100, MemoryProperties::empty()), Some(2));
}

#[test]
fn test_no_match_returns_none() {
    let table = discrete_table();
    assert_eq!(table.find_memory_type(0b0110, MemoryProperties::DEVICE_LOCAL), None);
    assert_eq!(table.find_memory_type(0, MemoryProperties::empty()), None);
    assert_eq!(table.find_memory_type(0b1111, MemoryProperties::LAZILY_ALLOCATED), None);
}

#[test]
fn test_brute_force_agrees_over_all_masks() {
    let table = discrete_table();
    let requests = [
        MemoryProperties::DEVICE_LOCAL,
        MemoryProperties::HOST_VISIBLE,
        MemoryProperties::HOST_CACHED,
        MemoryProperties::DEVICE_LOCAL | MemoryProperties::HOST_VISIBLE,
    ];
    for bits in 0u32..16 {
        for required in requests {
            let expected = (0..table.len() as u32)
                .filter(|i| bits & (1 << i) != 0)
                .find(|&i| table.properties(i).unwrap().contains(required));
            assert_eq!(table.find_memory_type(bits, required), expected, "bits {:#b} {:?}", bits, required);
        }
    }
}

// ============================================================================
// Degraded fallback
// ============================================================================

#[test]
fn test_degrade_drops_lazily_allocated() {
    let table = discrete_table();
    let wanted = MemoryProperties::DEVICE_LOCAL | MemoryProperties::LAZILY_ALLOCATED;
    assert_eq!(table.find_memory_type_or_degrade(0b1111, wanted), Ok(0));
}

#[test]
fn test_degrade_prefers_exact_match() {
    let table = MemoryTypeTable::new(vec![
        MemoryProperties::DEVICE_LOCAL,
        MemoryProperties::DEVICE_LOCAL | MemoryProperties::LAZILY_ALLOCATED,
    ]);
    let wanted = MemoryProperties::DEVICE_LOCAL | MemoryProperties::LAZILY_ALLOCATED;
    assert_eq!(table.find_memory_type_or_degrade(0b11, wanted), Ok(1));
}

#[test]
fn test_degrade_fails_when_nothing_left() {
    let table = discrete_table();
    let result = table.find_memory_type_or_degrade(0b0110, MemoryProperties::DEVICE_LOCAL);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_describe_lists_every_type() {
    let lines = discrete_table().describe();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("memory type 0"));
}
