/// Compositor node resource manager
///
/// Node resources are shared between every workspace instance using them.
/// When a node is requested but not registered yet, the manager performs a
/// synchronous sub-load through its loader; compositor nodes are small and
/// only requested when a workspace (re)loads.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_debug};
use crate::utils::AssetId;
use super::CompositorNodeResource;

/// Produces compositor node resources on demand
pub trait CompositorNodeResourceLoader: Send {
    fn load_compositor_node_resource(&mut self, asset_id: AssetId) -> Result<CompositorNodeResource>;
}

impl<F> CompositorNodeResourceLoader for F
where
    F: FnMut(AssetId) -> Result<CompositorNodeResource> + Send,
{
    fn load_compositor_node_resource(&mut self, asset_id: AssetId) -> Result<CompositorNodeResource> {
        self(asset_id)
    }
}

#[derive(Default)]
pub struct CompositorNodeResourceManager {
    resources: FxHashMap<AssetId, Arc<CompositorNodeResource>>,
    loader: Option<Box<dyn CompositorNodeResourceLoader>>,
}

impl CompositorNodeResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the loader used for nodes that aren't registered
    pub fn set_loader(&mut self, loader: impl CompositorNodeResourceLoader + 'static) {
        self.loader = Some(Box::new(loader));
    }

    /// Register an already built node resource, replacing a previous one
    pub fn add_compositor_node_resource(&mut self, resource: CompositorNodeResource) -> Arc<CompositorNodeResource> {
        let resource = Arc::new(resource);
        self.resources.insert(resource.asset_id(), resource.clone());
        resource
    }

    pub fn compositor_node_resource(&self, asset_id: AssetId) -> Option<&Arc<CompositorNodeResource>> {
        self.resources.get(&asset_id)
    }

    /// Forget a node resource, instances still holding it keep it alive
    pub fn remove_compositor_node_resource(&mut self, asset_id: AssetId) -> Option<Arc<CompositorNodeResource>> {
        self.resources.remove(&asset_id)
    }

    /// Return a fully loaded node resource, loading it synchronously if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the node isn't registered and there is no loader,
    /// or if the loader fails.
    pub fn load_compositor_node_resource_by_asset_id(&mut self, asset_id: AssetId) -> Result<Arc<CompositorNodeResource>> {
        if let Some(resource) = self.resources.get(&asset_id) {
            return Ok(resource.clone());
        }
        let Some(loader) = self.loader.as_mut() else {
            engine_bail!("nebula3d::CompositorNodeResourceManager",
                "Compositor node {} is unknown and no loader is installed", asset_id);
        };
        let resource = loader.load_compositor_node_resource(asset_id)?;
        debug_assert_eq!(resource.asset_id(), asset_id, "Loader returned another compositor node");
        engine_debug!("nebula3d::CompositorNodeResourceManager",
            "Loaded compositor node {} ({} targets)", asset_id, resource.targets().len());
        Ok(self.add_compositor_node_resource(resource))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_registered_resource_is_shared() {
        let mut manager = CompositorNodeResourceManager::new();
        let registered = manager.add_compositor_node_resource(CompositorNodeResource::new(AssetId::new("Final")));
        let loaded = manager.load_compositor_node_resource_by_asset_id(AssetId::new("Final")).unwrap();
        assert!(Arc::ptr_eq(&registered, &loaded));
    }

    #[test]
    fn test_unknown_without_loader_fails() {
        let mut manager = CompositorNodeResourceManager::new();
        assert!(manager.load_compositor_node_resource_by_asset_id(AssetId::new("Missing")).is_err());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_loader_runs_once_per_node() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut manager = CompositorNodeResourceManager::new();
        manager.set_loader(move |asset_id: AssetId| -> Result<CompositorNodeResource> {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(CompositorNodeResource::new(asset_id))
        });

        manager.load_compositor_node_resource_by_asset_id(AssetId::new("Forward")).unwrap();
        manager.load_compositor_node_resource_by_asset_id(AssetId::new("Forward")).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(manager.len(), 1);
    }
}
