use super::*;
use std::collections::BTreeSet;

// ============================================================================
// Basic allocation tests
// ============================================================================

#[test]
fn test_sequential_create() {
    let mut ids = MakeId::new(100);
    assert_eq!(ids.create_id(), Some(0));
    assert_eq!(ids.create_id(), Some(1));
    assert_eq!(ids.create_id(), Some(2));
    assert!(ids.is_id(1));
    assert!(!ids.is_id(3));
}

#[test]
fn test_new_has_everything_available() {
    let ids = MakeId::new(9);
    assert_eq!(ids.available_ids(), 10);
    assert_eq!(ids.largest_continuous_range(), 10);
    assert_eq!(ids.free_range_count(), 1);
    assert_eq!(ids.max_id(), 9);
}

#[test]
fn test_exhaustion_returns_none() {
    let mut ids = MakeId::new(1);
    assert_eq!(ids.create_id(), Some(0));
    assert_eq!(ids.create_id(), Some(1));
    assert_eq!(ids.create_id(), None);
    assert_eq!(ids.available_ids(), 0);
}

#[test]
fn test_full_u32_space() {
    let mut ids = MakeId::new(u32::MAX);
    assert_eq!(ids.available_ids(), u32::MAX as u64 + 1);
    assert_eq!(ids.create_id(), Some(0));
    assert!(ids.destroy_id(0));
    assert!(!ids.destroy_id(u32::MAX));
}

// ============================================================================
// Destroy and reuse tests
// ============================================================================

#[test]
fn test_destroy_returns_smallest_first() {
    let mut ids = MakeId::new(100);
    for _ in 0..5 {
        ids.create_id();
    }
    assert!(ids.destroy_id(3));
    assert!(ids.destroy_id(1));

    // Unlike a LIFO free list, the smallest free ID always comes back first
    assert_eq!(ids.create_id(), Some(1));
    assert_eq!(ids.create_id(), Some(3));
    assert_eq!(ids.create_id(), Some(5));
}

#[test]
fn test_double_destroy_is_rejected() {
    let mut ids = MakeId::new(10);
    let id = ids.create_id().unwrap();
    assert!(ids.destroy_id(id));
    assert!(!ids.destroy_id(id));
    assert!(!ids.destroy_id(7));
    assert!(!ids.destroy_id(11));
}

#[test]
fn test_destroy_merges_adjacent_ranges() {
    let mut ids = MakeId::new(9);
    for _ in 0..10 {
        ids.create_id();
    }
    assert_eq!(ids.free_range_count(), 0);

    ids.destroy_id(2);
    ids.destroy_id(4);
    assert_eq!(ids.free_range_count(), 2);

    // Filling the gap collapses both neighbours into one range
    ids.destroy_id(3);
    assert_eq!(ids.free_range_count(), 1);
    assert_eq!(ids.largest_continuous_range(), 3);
}

// ============================================================================
// Range tests
// ============================================================================

#[test]
fn test_create_range_picks_lowest_fitting_run() {
    let mut ids = MakeId::new(99);
    let first = ids.create_range_id(10).unwrap();
    assert_eq!(first, 0);

    // Free 2..=3 (too small) and 5..=8 (fits 4)
    assert!(ids.destroy_range(2, 2));
    assert!(ids.destroy_range(5, 4));

    assert_eq!(ids.create_range_id(4), Some(5));
    assert_eq!(ids.create_range_id(2), Some(2));
    assert_eq!(ids.create_range_id(3), Some(10));
}

#[test]
fn test_destroy_range_rejects_partial_overlap() {
    let mut ids = MakeId::new(20);
    ids.create_range_id(5).unwrap(); // 0..=4
    assert!(ids.destroy_id(2));
    // 1..=3 overlaps the already free 2
    assert!(!ids.destroy_range(1, 3));
    assert!(ids.is_id(1));
    assert!(ids.is_id(3));
}

#[test]
fn test_create_range_too_large() {
    let mut ids = MakeId::new(7);
    assert_eq!(ids.create_range_id(9), None);
    assert_eq!(ids.create_range_id(8), Some(0));
    assert_eq!(ids.create_id(), None);
}

// ============================================================================
// Property test against a reference model
// ============================================================================

/// Small deterministic generator, good enough to drive random sequences
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

#[test]
fn test_create_always_returns_smallest_unused() {
    let max_id = 63;
    let mut ids = MakeId::new(max_id);
    let mut used = BTreeSet::new();
    let mut rng = Lcg(0x5eed);

    for _ in 0..5_000 {
        if rng.next() % 3 != 0 {
            let expected = (0..=max_id).find(|id| !used.contains(id));
            let created = ids.create_id();
            assert_eq!(created, expected);
            if let Some(id) = created {
                used.insert(id);
            }
        } else if !used.is_empty() {
            let victim = *used.iter().nth(rng.next() as usize % used.len()).unwrap();
            assert!(ids.destroy_id(victim));
            used.remove(&victim);
        }

        assert_eq!(ids.available_ids(), (max_id as u64 + 1) - used.len() as u64);
        for id in 0..=max_id {
            assert_eq!(ids.is_id(id), used.contains(&id));
        }
    }
}
