/// Render queue index ranges and their merge
///
/// Every scene pass of a workspace declares the render queue indices it
/// draws. The workspace merges these declarations into the minimal set of
/// disjoint ranges, and scene culling buckets visible renderable managers
/// into those ranges once per frame.

use crate::scene::RenderableManagerKey;

/// Inclusive render queue index interval plus the renderable managers
/// gathered into it for the current frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderQueueIndexRange {
    pub minimum_render_queue_index: u8,
    pub maximum_render_queue_index: u8,
    /// Transient, cleared at the start of every workspace execution
    pub renderable_managers: Vec<RenderableManagerKey>,
}

impl RenderQueueIndexRange {
    pub fn new(minimum_render_queue_index: u8, maximum_render_queue_index: u8) -> Self {
        debug_assert!(minimum_render_queue_index <= maximum_render_queue_index, "Invalid render queue index range");
        Self {
            minimum_render_queue_index,
            maximum_render_queue_index,
            renderable_managers: Vec::new(),
        }
    }

    /// Whether this range intersects `[minimum, maximum]`
    pub fn overlaps(&self, minimum: u8, maximum: u8) -> bool {
        self.minimum_render_queue_index <= maximum && self.maximum_render_queue_index >= minimum
    }
}

/// Sort-and-coalesce interval merge
///
/// Ranges are sorted by their start; overlapping or adjacent ranges are
/// merged. `[(0,2), (2,5), (10,12)]` becomes `[(0,5), (10,12)]`.
pub fn merge_render_queue_index_ranges(mut ranges: Vec<(u8, u8)>) -> Vec<RenderQueueIndexRange> {
    ranges.sort_unstable();

    let mut merged: Vec<RenderQueueIndexRange> = Vec::with_capacity(ranges.len());
    for (minimum, maximum) in ranges {
        debug_assert!(minimum <= maximum, "Invalid render queue index range ({}, {})", minimum, maximum);
        match merged.last_mut() {
            Some(last) if (minimum as u16) <= last.maximum_render_queue_index as u16 + 1 => {
                last.maximum_render_queue_index = last.maximum_render_queue_index.max(maximum);
            }
            _ => merged.push(RenderQueueIndexRange::new(minimum, maximum)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(ranges: &[RenderQueueIndexRange]) -> Vec<(u8, u8)> {
        ranges
            .iter()
            .map(|range| (range.minimum_render_queue_index, range.maximum_render_queue_index))
            .collect()
    }

    #[test]
    fn test_overlapping_ranges_are_coalesced() {
        let merged = merge_render_queue_index_ranges(vec![(0, 2), (2, 5), (10, 12)]);
        assert_eq!(bounds(&merged), vec![(0, 5), (10, 12)]);
    }

    #[test]
    fn test_unsorted_nested_and_adjacent_ranges() {
        let merged = merge_render_queue_index_ranges(vec![(20, 30), (0, 9), (10, 11), (22, 25), (40, 40)]);
        assert_eq!(bounds(&merged), vec![(0, 11), (20, 30), (40, 40)]);
    }

    #[test]
    fn test_full_range_and_empty_input() {
        assert!(merge_render_queue_index_ranges(Vec::new()).is_empty());
        let merged = merge_render_queue_index_ranges(vec![(0, 255), (254, 255), (3, 7)]);
        assert_eq!(bounds(&merged), vec![(0, 255)]);
        assert!(merged[0].renderable_managers.is_empty());
    }

    #[test]
    fn test_overlaps() {
        let range = RenderQueueIndexRange::new(10, 20);
        assert!(range.overlaps(0, 10));
        assert!(range.overlaps(20, 255));
        assert!(!range.overlaps(21, 30));
    }
}
