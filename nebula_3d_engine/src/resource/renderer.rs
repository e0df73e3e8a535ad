/// Renderer runtime context
///
/// Owns the shared RHI handle and everything compositor workspace instances
/// of one RHI share: the three resource caches, the global material
/// properties, the compositor resource managers, the pass factory and the
/// light buffer. Nothing here is global; a renderer is constructed
/// explicitly and passed by reference to whoever needs it.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::engine_info;
use crate::compositor::{CompositorNodeResourceManager, CompositorPassFactory, CompositorWorkspaceResourceManager};
use crate::rhi::{lock_rhi, Rhi, RhiCapabilities};
use crate::scene::LightBufferManager;
use super::{FramebufferManager, MaterialProperties, RenderPassManager, RenderTargetTextureManager};

/// Optional subsystems, resolved once at startup
///
/// A disabled subsystem is replaced by a no-op implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererFeatures {
    /// Workspaces may be executed through a running VR manager
    pub vr: bool,
    /// Debug GUI passes record their draw calls
    pub debug_gui: bool,
    /// Every compositor pass is wrapped into a named debug event
    pub graphics_debugger: bool,
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Sample count new workspace instances start with (1, 2, 4 or 8)
    pub default_number_of_multisamples: u8,
    /// Resolution scale new workspace instances start with
    pub default_resolution_scale: f32,
    /// Capacity of the light buffer
    pub maximum_number_of_lights: u32,
    pub features: RendererFeatures,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default_number_of_multisamples: 1,
            default_resolution_scale: 1.0,
            maximum_number_of_lights: 64,
            features: RendererFeatures::default(),
        }
    }
}

/// Renderer runtime context
pub struct Renderer {
    pub(crate) rhi: Arc<Mutex<dyn Rhi>>,
    pub(crate) capabilities: RhiCapabilities,
    pub(crate) config: RendererConfig,
    pub(crate) render_pass_manager: RenderPassManager,
    pub(crate) render_target_texture_manager: RenderTargetTextureManager,
    pub(crate) framebuffer_manager: FramebufferManager,
    pub(crate) material_properties: MaterialProperties,
    pub(crate) compositor_workspace_resource_manager: CompositorWorkspaceResourceManager,
    pub(crate) compositor_node_resource_manager: CompositorNodeResourceManager,
    pub(crate) compositor_pass_factory: CompositorPassFactory,
    pub(crate) light_buffer_manager: LightBufferManager,
}

impl Renderer {
    /// Create a renderer on top of a shared RHI
    ///
    /// # Errors
    ///
    /// Returns an error if the RHI lock is poisoned.
    pub fn new(rhi: Arc<Mutex<dyn Rhi>>, config: RendererConfig) -> Result<Self> {
        let (name, capabilities) = {
            let rhi = lock_rhi(&rhi)?;
            (rhi.name().to_string(), *rhi.capabilities())
        };
        debug_assert!(
            matches!(config.default_number_of_multisamples, 1 | 2 | 4 | 8),
            "Invalid default number of multisamples {}", config.default_number_of_multisamples
        );
        engine_info!("nebula3d::Renderer",
            "Renderer created on the {} RHI (up to {}x MSAA)", name, capabilities.maximum_number_of_multisamples);

        Ok(Self {
            rhi,
            capabilities,
            light_buffer_manager: LightBufferManager::new(config.maximum_number_of_lights),
            config,
            render_pass_manager: RenderPassManager::new(),
            render_target_texture_manager: RenderTargetTextureManager::new(),
            framebuffer_manager: FramebufferManager::new(),
            material_properties: MaterialProperties::new(),
            compositor_workspace_resource_manager: CompositorWorkspaceResourceManager::new(),
            compositor_node_resource_manager: CompositorNodeResourceManager::new(),
            compositor_pass_factory: CompositorPassFactory::default(),
        })
    }

    /// Shared RHI handle
    pub fn rhi(&self) -> &Arc<Mutex<dyn Rhi>> {
        &self.rhi
    }

    /// RHI capabilities, queried once at construction
    pub fn capabilities(&self) -> &RhiCapabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn features(&self) -> RendererFeatures {
        self.config.features
    }

    pub fn render_pass_manager(&self) -> &RenderPassManager {
        &self.render_pass_manager
    }

    pub fn render_target_texture_manager(&self) -> &RenderTargetTextureManager {
        &self.render_target_texture_manager
    }

    pub fn render_target_texture_manager_mut(&mut self) -> &mut RenderTargetTextureManager {
        &mut self.render_target_texture_manager
    }

    pub fn framebuffer_manager(&self) -> &FramebufferManager {
        &self.framebuffer_manager
    }

    pub fn framebuffer_manager_mut(&mut self) -> &mut FramebufferManager {
        &mut self.framebuffer_manager
    }

    pub fn material_properties(&self) -> &MaterialProperties {
        &self.material_properties
    }

    pub fn material_properties_mut(&mut self) -> &mut MaterialProperties {
        &mut self.material_properties
    }

    pub fn compositor_workspace_resource_manager(&self) -> &CompositorWorkspaceResourceManager {
        &self.compositor_workspace_resource_manager
    }

    pub fn compositor_workspace_resource_manager_mut(&mut self) -> &mut CompositorWorkspaceResourceManager {
        &mut self.compositor_workspace_resource_manager
    }

    pub fn compositor_node_resource_manager(&self) -> &CompositorNodeResourceManager {
        &self.compositor_node_resource_manager
    }

    pub fn compositor_node_resource_manager_mut(&mut self) -> &mut CompositorNodeResourceManager {
        &mut self.compositor_node_resource_manager
    }

    pub fn compositor_pass_factory(&self) -> &CompositorPassFactory {
        &self.compositor_pass_factory
    }

    /// Register custom pass types here
    pub fn compositor_pass_factory_mut(&mut self) -> &mut CompositorPassFactory {
        &mut self.compositor_pass_factory
    }

    pub fn light_buffer_manager(&self) -> &LightBufferManager {
        &self.light_buffer_manager
    }

    /// Release every GPU object the caches hold, announcements are kept
    pub fn clear_rhi_resources(&mut self) {
        self.framebuffer_manager.clear_rhi_resources();
        self.render_target_texture_manager.clear_rhi_resources();
        self.light_buffer_manager.clear_rhi_resources();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::null::{NullRhi, NullRhiConfig};

    #[test]
    fn test_new_copies_capabilities() {
        let mut config = NullRhiConfig::default();
        config.capabilities.maximum_number_of_multisamples = 4;
        let renderer = Renderer::new(NullRhi::new(config).into_shared(), RendererConfig::default()).unwrap();
        assert_eq!(renderer.capabilities().maximum_number_of_multisamples, 4);
        assert_eq!(renderer.light_buffer_manager().maximum_number_of_lights(), 64);
        assert!(renderer.framebuffer_manager().is_empty());
        assert!(!renderer.features().debug_gui);
    }
}
