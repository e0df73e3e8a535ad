/// Scene culling manager
///
/// Buckets the renderable managers visible from a camera into the merged
/// render queue index ranges of a compositor workspace.

use slotmap::SlotMap;
use crate::compositor::RenderQueueIndexRange;
use super::{CameraSceneItem, Frustum, RenderableManager, RenderableManagerKey};

/// Cullable and uncullable renderable manager sets of one scene
///
/// Cullable managers are frustum tested against their world bounding box.
/// Uncullable managers (sky boxes, full screen effects) are always gathered.
#[derive(Debug, Default)]
pub struct SceneCullingManager {
    cullable_renderable_managers: Vec<RenderableManagerKey>,
    uncullable_renderable_managers: Vec<RenderableManagerKey>,
}

impl SceneCullingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_renderable_manager(&mut self, key: RenderableManagerKey, cullable: bool) {
        debug_assert!(!self.contains(key), "Renderable manager registered twice");
        if cullable {
            self.cullable_renderable_managers.push(key);
        } else {
            self.uncullable_renderable_managers.push(key);
        }
    }

    pub fn unregister_renderable_manager(&mut self, key: RenderableManagerKey) {
        self.cullable_renderable_managers.retain(|registered| *registered != key);
        self.uncullable_renderable_managers.retain(|registered| *registered != key);
    }

    pub fn contains(&self, key: RenderableManagerKey) -> bool {
        self.cullable_renderable_managers.contains(&key) || self.uncullable_renderable_managers.contains(&key)
    }

    pub fn number_of_cullable_renderable_managers(&self) -> usize {
        self.cullable_renderable_managers.len()
    }

    pub fn number_of_uncullable_renderable_managers(&self) -> usize {
        self.uncullable_renderable_managers.len()
    }

    /// Gather the renderable managers visible from `camera` into `ranges`
    ///
    /// A manager is added to every range its render queue interval overlaps.
    /// The ranges must have been cleared by the caller. Returns the number of
    /// gathered managers.
    pub fn gather_render_queue_index_ranges_renderable_managers(
        &self,
        renderable_managers: &SlotMap<RenderableManagerKey, RenderableManager>,
        camera: &CameraSceneItem,
        aspect_ratio: f32,
        ranges: &mut [RenderQueueIndexRange],
    ) -> usize {
        debug_assert!(
            ranges.iter().all(|range| range.renderable_managers.is_empty()),
            "Render queue index ranges must be cleared before gathering"
        );
        let frustum = Frustum::from_view_projection(&camera.view_projection_matrix(aspect_ratio));
        let mut number_of_gathered = 0;

        let uncullable = self.uncullable_renderable_managers.iter().map(|key| (*key, false));
        let cullable = self.cullable_renderable_managers.iter().map(|key| (*key, true));
        for (key, frustum_tested) in uncullable.chain(cullable) {
            let Some(manager) = renderable_managers.get(key) else {
                continue;
            };
            if !manager.is_visible() || (frustum_tested && !frustum.intersects_aabb(manager.world_aabb())) {
                continue;
            }

            let mut gathered = false;
            for range in ranges.iter_mut() {
                if manager.overlaps_render_queue_index_range(range.minimum_render_queue_index, range.maximum_render_queue_index) {
                    range.renderable_managers.push(key);
                    gathered = true;
                }
            }
            if gathered {
                number_of_gathered += 1;
            }
        }
        number_of_gathered
    }
}

#[cfg(test)]
#[path = "scene_culling_manager_tests.rs"]
mod tests;
