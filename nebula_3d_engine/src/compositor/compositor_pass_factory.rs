/// Compositor pass factory
///
/// Registry of instance pass constructors keyed by pass type ID. The
/// default registry knows every built-in pass; applications add their own
/// pass types with `register` without touching the workspace code.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_err};
use crate::resource::Renderer;
use crate::utils::CompositorPassTypeId;
use super::passes::{
    CompositorInstancePassClear, CompositorInstancePassCopy, CompositorInstancePassDebugGui,
    CompositorInstancePassGenerateMipmaps, CompositorInstancePassResolveMultisample,
    CompositorInstancePassScene, CompositorInstancePassShadowMap,
};
use super::{
    CompositorInstancePass, CompositorNodeResource, CompositorResourcePass,
    CompositorResourcePassClear, CompositorResourcePassCopy, CompositorResourcePassDebugGui,
    CompositorResourcePassGenerateMipmaps, CompositorResourcePassResolveMultisample,
    CompositorResourcePassScene, CompositorResourcePassShadowMap,
};

/// Builds the instance pass of one resource pass
pub type CompositorInstancePassConstructor = fn(
    resource_pass: &Arc<dyn CompositorResourcePass>,
    node: &CompositorNodeResource,
    renderer: &Renderer,
) -> Result<Box<dyn CompositorInstancePass>>;

/// Concrete type of a resource pass, an error if the registry is inconsistent
pub fn downcast_resource_pass<T: CompositorResourcePass>(resource_pass: &Arc<dyn CompositorResourcePass>) -> Result<&T> {
    resource_pass.as_any().downcast_ref::<T>().ok_or_else(|| {
        engine_err!("nebula3d::CompositorPassFactory",
            "Resource pass of type {} isn't a {}", resource_pass.pass_type_id(), std::any::type_name::<T>())
    })
}

pub struct CompositorPassFactory {
    constructors: FxHashMap<CompositorPassTypeId, CompositorInstancePassConstructor>,
}

impl CompositorPassFactory {
    /// Factory without any registered pass type
    pub fn empty() -> Self {
        Self { constructors: FxHashMap::default() }
    }

    /// Register a pass type, replacing any previous constructor for it
    pub fn register(&mut self, pass_type_id: CompositorPassTypeId, constructor: CompositorInstancePassConstructor) {
        self.constructors.insert(pass_type_id, constructor);
    }

    pub fn is_registered(&self, pass_type_id: CompositorPassTypeId) -> bool {
        self.constructors.contains_key(&pass_type_id)
    }

    /// Build the instance pass of a resource pass
    ///
    /// # Errors
    ///
    /// Returns an error if the pass type isn't registered or its constructor fails.
    pub fn create(
        &self,
        resource_pass: &Arc<dyn CompositorResourcePass>,
        node: &CompositorNodeResource,
        renderer: &Renderer,
    ) -> Result<Box<dyn CompositorInstancePass>> {
        let pass_type_id = resource_pass.pass_type_id();
        let Some(constructor) = self.constructors.get(&pass_type_id) else {
            engine_bail!("nebula3d::CompositorPassFactory",
                "Unknown compositor pass type {} in node {}", pass_type_id, node.asset_id());
        };
        constructor(resource_pass, node, renderer)
    }
}

impl Default for CompositorPassFactory {
    /// Factory knowing every built-in pass
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register(CompositorResourcePassClear::pass_type(), |resource_pass, _, _| {
            let resource_pass = downcast_resource_pass::<CompositorResourcePassClear>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassClear::new(resource_pass)))
        });
        factory.register(CompositorResourcePassScene::pass_type(), |resource_pass, _, _| {
            let resource_pass = downcast_resource_pass::<CompositorResourcePassScene>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassScene::new(resource_pass)))
        });
        factory.register(CompositorResourcePassShadowMap::pass_type(), |resource_pass, _, renderer| {
            let resource_pass = downcast_resource_pass::<CompositorResourcePassShadowMap>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassShadowMap::new(resource_pass, renderer.capabilities())))
        });
        factory.register(CompositorResourcePassResolveMultisample::pass_type(), |resource_pass, _, _| {
            let resource_pass = downcast_resource_pass::<CompositorResourcePassResolveMultisample>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassResolveMultisample::new(resource_pass)))
        });
        factory.register(CompositorResourcePassCopy::pass_type(), |resource_pass, _, _| {
            let resource_pass = downcast_resource_pass::<CompositorResourcePassCopy>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassCopy::new(resource_pass)))
        });
        factory.register(CompositorResourcePassGenerateMipmaps::pass_type(), |resource_pass, _, _| {
            let resource_pass = downcast_resource_pass::<CompositorResourcePassGenerateMipmaps>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassGenerateMipmaps::new(resource_pass)))
        });
        factory.register(CompositorResourcePassDebugGui::pass_type(), |resource_pass, _, _| {
            downcast_resource_pass::<CompositorResourcePassDebugGui>(resource_pass)?;
            Ok(Box::new(CompositorInstancePassDebugGui::new()))
        });
        factory
    }
}
