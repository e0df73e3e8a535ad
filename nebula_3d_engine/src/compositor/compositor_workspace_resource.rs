/// Compositor workspace resources
///
/// A workspace resource is the ordered list of compositor nodes one
/// workspace instance executes. Its loading state is owned by the asset
/// streaming side; workspace instances poll it and react once per
/// load or reload transition.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_err;
use crate::resource::LoadingState;
use crate::utils::AssetId;

#[derive(Debug, Clone)]
pub struct CompositorWorkspaceResource {
    asset_id: AssetId,
    compositor_node_asset_ids: Vec<AssetId>,
    loading_state: LoadingState,
    reload_counter: u32,
}

impl CompositorWorkspaceResource {
    /// New, still unloaded workspace resource
    pub fn new(asset_id: AssetId, compositor_node_asset_ids: Vec<AssetId>) -> Self {
        Self {
            asset_id,
            compositor_node_asset_ids,
            loading_state: LoadingState::Unloaded,
            reload_counter: 0,
        }
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    /// Nodes in execution order
    pub fn compositor_node_asset_ids(&self) -> &[AssetId] {
        &self.compositor_node_asset_ids
    }

    pub fn set_compositor_node_asset_ids(&mut self, compositor_node_asset_ids: Vec<AssetId>) {
        self.compositor_node_asset_ids = compositor_node_asset_ids;
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading_state
    }

    /// Change the loading state, every transition to `Loaded` counts as a (re)load
    pub fn set_loading_state(&mut self, loading_state: LoadingState) {
        if loading_state == LoadingState::Loaded && self.loading_state != LoadingState::Loaded {
            self.reload_counter = self.reload_counter.wrapping_add(1);
        }
        self.loading_state = loading_state;
    }

    pub fn is_loaded(&self) -> bool {
        self.loading_state.is_loaded()
    }

    /// Load generation: bumped by every transition to `Loaded` and by re-registration
    pub fn reload_counter(&self) -> u32 {
        self.reload_counter
    }
}

/// Workspace resources of a renderer, by asset ID
#[derive(Debug, Default)]
pub struct CompositorWorkspaceResourceManager {
    resources: FxHashMap<AssetId, CompositorWorkspaceResource>,
}

impl CompositorWorkspaceResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workspace resource, replacing any previous one with the same asset ID
    ///
    /// A replacement continues the reload counter of the resource it
    /// replaces and counts as one more generation, so instances built from
    /// the previous node list rebuild on their next update.
    pub fn add_compositor_workspace_resource(&mut self, mut resource: CompositorWorkspaceResource) {
        if let Some(previous) = self.resources.get(&resource.asset_id()) {
            resource.reload_counter = previous.reload_counter
                .wrapping_add(1)
                .wrapping_add(resource.reload_counter);
        }
        self.resources.insert(resource.asset_id(), resource);
    }

    pub fn compositor_workspace_resource(&self, asset_id: AssetId) -> Option<&CompositorWorkspaceResource> {
        self.resources.get(&asset_id)
    }

    pub fn compositor_workspace_resource_mut(&mut self, asset_id: AssetId) -> Option<&mut CompositorWorkspaceResource> {
        self.resources.get_mut(&asset_id)
    }

    /// Update the loading state of a registered workspace resource
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace resource uses this asset ID.
    pub fn set_loading_state(&mut self, asset_id: AssetId, loading_state: LoadingState) -> Result<()> {
        let resource = self.resources.get_mut(&asset_id).ok_or_else(|| {
            engine_err!("nebula3d::CompositorWorkspaceResourceManager",
                "Unknown compositor workspace resource {}", asset_id)
        })?;
        resource.set_loading_state(loading_state);
        Ok(())
    }

    /// Force a reload: instances rebuild their nodes on their next update
    pub fn reload_compositor_workspace_resource(&mut self, asset_id: AssetId) -> Result<()> {
        self.set_loading_state(asset_id, LoadingState::Unloaded)?;
        self.set_loading_state(asset_id, LoadingState::Loaded)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
