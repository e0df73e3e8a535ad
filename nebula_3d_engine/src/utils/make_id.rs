/// Compact integer ID allocator.
///
/// Hands out the smallest unused `u32` ID so IDs stay low and densely packed,
/// which makes them usable as flat array indices (e.g. a draw ID on APIs that
/// have no native draw-ID support). Free IDs are tracked as sorted, disjoint,
/// non-adjacent inclusive ranges; destroying IDs merges neighbouring ranges so
/// the free list never fragments.
///
/// # Example
///
/// ```ignore
/// let mut ids = MakeId::new(u16::MAX as u32);
/// let a = ids.create_id().unwrap();     // 0
/// let b = ids.create_id().unwrap();     // 1
/// ids.destroy_id(a);                    // 0 is free again
/// assert_eq!(ids.create_id(), Some(0)); // smallest free ID wins
/// ```
#[derive(Debug, Clone)]
pub struct MakeId {
    free_ranges: Vec<FreeRange>,
    max_id: u32,
}

/// Inclusive range of free IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FreeRange {
    first: u32,
    last: u32,
}

impl FreeRange {
    fn len(&self) -> u64 {
        (self.last - self.first) as u64 + 1
    }
}

impl MakeId {
    /// Create an allocator managing the IDs `0..=max_id`
    pub fn new(max_id: u32) -> Self {
        Self {
            free_ranges: vec![FreeRange { first: 0, last: max_id }],
            max_id,
        }
    }

    /// Highest ID this allocator can hand out
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Allocate the smallest free ID, `None` once every ID is in use
    pub fn create_id(&mut self) -> Option<u32> {
        let range = self.free_ranges.first_mut()?;
        let id = range.first;
        if range.first == range.last {
            self.free_ranges.remove(0);
        } else {
            range.first += 1;
        }
        Some(id)
    }

    /// Allocate `count` consecutive IDs and return the first one
    ///
    /// Picks the lowest run of free IDs that is long enough.
    pub fn create_range_id(&mut self, count: u32) -> Option<u32> {
        debug_assert!(count > 0, "MakeId: a range must contain at least one ID");
        if count == 0 {
            return None;
        }
        let index = self.free_ranges.iter().position(|range| range.len() >= count as u64)?;
        let range = &mut self.free_ranges[index];
        let id = range.first;
        if range.len() == count as u64 {
            self.free_ranges.remove(index);
        } else {
            range.first += count;
        }
        Some(id)
    }

    /// Release a single ID, returns false if it was not allocated
    pub fn destroy_id(&mut self, id: u32) -> bool {
        self.destroy_range(id, 1)
    }

    /// Release `count` consecutive IDs starting at `id`
    ///
    /// Returns false (and changes nothing) if any ID of the range is out of
    /// bounds or not currently allocated.
    pub fn destroy_range(&mut self, id: u32, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let end = match id.checked_add(count - 1) {
            Some(end) if end <= self.max_id => end,
            _ => return false,
        };

        // Index of the first free range starting after `id`
        let position = self.free_ranges.partition_point(|range| range.first <= id);

        // Reject double frees
        if position > 0 && self.free_ranges[position - 1].last >= id {
            return false;
        }
        if position < self.free_ranges.len() && self.free_ranges[position].first <= end {
            return false;
        }

        let merges_previous = position > 0 && self.free_ranges[position - 1].last + 1 == id;
        let merges_next = position < self.free_ranges.len()
            && end.checked_add(1) == Some(self.free_ranges[position].first);

        match (merges_previous, merges_next) {
            (true, true) => {
                self.free_ranges[position - 1].last = self.free_ranges[position].last;
                self.free_ranges.remove(position);
            }
            (true, false) => self.free_ranges[position - 1].last = end,
            (false, true) => self.free_ranges[position].first = id,
            (false, false) => self.free_ranges.insert(position, FreeRange { first: id, last: end }),
        }
        true
    }

    /// Whether `id` is currently allocated
    pub fn is_id(&self, id: u32) -> bool {
        if id > self.max_id {
            return false;
        }
        let position = self.free_ranges.partition_point(|range| range.first <= id);
        !(position > 0 && self.free_ranges[position - 1].last >= id)
    }

    /// Number of IDs still available
    pub fn available_ids(&self) -> u64 {
        self.free_ranges.iter().map(FreeRange::len).sum()
    }

    /// Size of the longest run of free IDs
    pub fn largest_continuous_range(&self) -> u64 {
        self.free_ranges.iter().map(FreeRange::len).max().unwrap_or(0)
    }

    /// Number of separate free ranges (1 when nothing is fragmented)
    pub fn free_range_count(&self) -> usize {
        self.free_ranges.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "make_id_tests.rs"]
mod tests;
