/// Scene resource: cameras, lights, meshes and renderable managers.
///
/// Uses SlotMaps for O(1) insert/remove with stable keys. Renderable
/// managers are registered with the scene culling manager on insertion, as
/// cullable or uncullable.

use slotmap::{new_key_type, SlotMap};
use crate::compositor::RenderQueueIndexRange;
use crate::resource::LoadingState;
use crate::utils::AssetId;
use super::{CameraSceneItem, LightSceneItem, RenderableManager, SceneCullingManager};

new_key_type! {
    /// Stable key of a camera scene item
    pub struct CameraSceneItemKey;
    /// Stable key of a light scene item
    pub struct LightSceneItemKey;
    /// Stable key of a mesh scene item
    pub struct MeshSceneItemKey;
    /// Stable key of a renderable manager
    pub struct RenderableManagerKey;
}

/// Mesh placed in a scene, drawn through its renderable manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSceneItem {
    pub mesh_asset_id: AssetId,
    pub renderable_manager: RenderableManagerKey,
}

/// A scene ready to be rendered by a compositor workspace
///
/// Workspaces skip scene work silently until the scene is loaded.
#[derive(Debug, Default)]
pub struct SceneResource {
    asset_id: AssetId,
    loading_state: LoadingState,
    cameras: SlotMap<CameraSceneItemKey, CameraSceneItem>,
    lights: SlotMap<LightSceneItemKey, LightSceneItem>,
    meshes: SlotMap<MeshSceneItemKey, MeshSceneItem>,
    renderable_managers: SlotMap<RenderableManagerKey, RenderableManager>,
    culling_manager: SceneCullingManager,
}

impl SceneResource {
    pub fn new(asset_id: AssetId) -> Self {
        Self { asset_id, ..Default::default() }
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading_state
    }

    pub fn set_loading_state(&mut self, loading_state: LoadingState) {
        self.loading_state = loading_state;
    }

    pub fn is_loaded(&self) -> bool {
        self.loading_state.is_loaded()
    }

    // ===== CAMERAS =====

    pub fn add_camera(&mut self, camera: CameraSceneItem) -> CameraSceneItemKey {
        self.cameras.insert(camera)
    }

    pub fn camera(&self, key: CameraSceneItemKey) -> Option<&CameraSceneItem> {
        self.cameras.get(key)
    }

    pub fn camera_mut(&mut self, key: CameraSceneItemKey) -> Option<&mut CameraSceneItem> {
        self.cameras.get_mut(key)
    }

    pub fn remove_camera(&mut self, key: CameraSceneItemKey) -> Option<CameraSceneItem> {
        self.cameras.remove(key)
    }

    // ===== LIGHTS =====

    pub fn add_light(&mut self, light: LightSceneItem) -> LightSceneItemKey {
        self.lights.insert(light)
    }

    pub fn light(&self, key: LightSceneItemKey) -> Option<&LightSceneItem> {
        self.lights.get(key)
    }

    pub fn light_mut(&mut self, key: LightSceneItemKey) -> Option<&mut LightSceneItem> {
        self.lights.get_mut(key)
    }

    pub fn remove_light(&mut self, key: LightSceneItemKey) -> Option<LightSceneItem> {
        self.lights.remove(key)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightSceneItemKey, &LightSceneItem)> + '_ {
        self.lights.iter()
    }

    pub fn number_of_lights(&self) -> usize {
        self.lights.len()
    }

    // ===== RENDERABLE MANAGERS =====

    /// Add a renderable manager and register it for culling
    pub fn add_renderable_manager(&mut self, renderable_manager: RenderableManager, cullable: bool) -> RenderableManagerKey {
        let key = self.renderable_managers.insert(renderable_manager);
        self.culling_manager.register_renderable_manager(key, cullable);
        key
    }

    pub fn renderable_manager(&self, key: RenderableManagerKey) -> Option<&RenderableManager> {
        self.renderable_managers.get(key)
    }

    pub fn renderable_manager_mut(&mut self, key: RenderableManagerKey) -> Option<&mut RenderableManager> {
        self.renderable_managers.get_mut(key)
    }

    pub fn remove_renderable_manager(&mut self, key: RenderableManagerKey) -> Option<RenderableManager> {
        self.culling_manager.unregister_renderable_manager(key);
        self.renderable_managers.remove(key)
    }

    pub fn renderable_managers(&self) -> &SlotMap<RenderableManagerKey, RenderableManager> {
        &self.renderable_managers
    }

    // ===== MESHES =====

    /// Add a mesh together with the renderable manager drawing it
    pub fn add_mesh_scene_item(&mut self, mesh_asset_id: AssetId, renderable_manager: RenderableManager) -> MeshSceneItemKey {
        let renderable_manager = self.add_renderable_manager(renderable_manager, true);
        self.meshes.insert(MeshSceneItem { mesh_asset_id, renderable_manager })
    }

    pub fn mesh_scene_item(&self, key: MeshSceneItemKey) -> Option<&MeshSceneItem> {
        self.meshes.get(key)
    }

    /// Remove a mesh and its renderable manager
    pub fn remove_mesh_scene_item(&mut self, key: MeshSceneItemKey) -> Option<MeshSceneItem> {
        let mesh = self.meshes.remove(key)?;
        self.remove_renderable_manager(mesh.renderable_manager);
        Some(mesh)
    }

    pub fn number_of_mesh_scene_items(&self) -> usize {
        self.meshes.len()
    }

    // ===== CULLING =====

    pub fn culling_manager(&self) -> &SceneCullingManager {
        &self.culling_manager
    }

    /// Gather the renderable managers visible from a camera of this scene
    ///
    /// Returns 0 if the camera key is stale.
    pub fn gather_render_queue_index_ranges_renderable_managers(
        &self,
        camera: CameraSceneItemKey,
        aspect_ratio: f32,
        ranges: &mut [RenderQueueIndexRange],
    ) -> usize {
        match self.cameras.get(camera) {
            Some(camera) => self.culling_manager.gather_render_queue_index_ranges_renderable_managers(
                &self.renderable_managers,
                camera,
                aspect_ratio,
                ranges,
            ),
            None => 0,
        }
    }
}

#[cfg(test)]
#[path = "scene_resource_tests.rs"]
mod tests;
