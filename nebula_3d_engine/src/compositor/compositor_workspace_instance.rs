/// Compositor workspace instance
///
/// Executes one compositor workspace against a render target once per
/// frame. The instance follows the loading state of its workspace resource,
/// builds its node instances once the resource is loaded, keeps the shared
/// resource caches in sync with its multisample and resolution scale
/// settings, records every node into one command buffer and submits it.
///
/// # Frame
///
/// ```text
/// execute()
///   -> clear command buffer and gathered renderable managers
///   -> follow the workspace resource loading state (skip while loading)
///   -> publish GlobalNumberOfMultisamples
///   -> drop cached GPU resources on settings change, resolve them again
///   -> begin scene, cull, fill light buffer
///   -> fill every node, threading the bound render target through
///   -> submit, end scene, present
/// ```

use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_info, engine_warn};
use crate::resource::{LoadingState, MainRenderTargetSettings, MaterialProperties, MaterialPropertyValue, Renderer};
use crate::rhi::{lock_rhi, CommandBuffer, RenderTarget, Rhi};
use crate::utils::AssetId;
use crate::vr::VrManager;
use super::passes::CompositorInstancePassShadowMap;
use super::{
    merge_render_queue_index_ranges, CompositorContextData, CompositorNodeInstance, RenderQueueIndexRange, SceneView,
};

/// Location of a pass inside the node instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassLocation {
    node_index: usize,
    target_index: usize,
    pass_index: usize,
}

pub struct CompositorWorkspaceInstance {
    compositor_workspace_resource_id: AssetId,
    number_of_multisamples: u8,
    resolution_scale: f32,
    render_queue_index_ranges: Vec<RenderQueueIndexRange>,
    compositor_node_instances: Vec<CompositorNodeInstance>,
    shadow_map_location: Option<PassLocation>,
    command_buffer: CommandBuffer,
    /// Reload counter of the workspace resource the node instances were built from
    loaded_reload_counter: Option<u32>,
    /// Settings the cached GPU resources were resolved against
    resolved_settings: Option<MainRenderTargetSettings>,
    framebuffers_initialized: bool,
    execution_render_target: Option<RenderTarget>,
}

impl CompositorWorkspaceInstance {
    /// Create an instance of a registered workspace resource
    ///
    /// Node instances are built by the first `execute` after the resource
    /// reached `LoadingState::Loaded`.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace resource isn't registered.
    pub fn new(renderer: &Renderer, compositor_workspace_resource_id: AssetId) -> Result<Self> {
        if renderer
            .compositor_workspace_resource_manager()
            .compositor_workspace_resource(compositor_workspace_resource_id)
            .is_none()
        {
            engine_bail!("nebula3d::CompositorWorkspaceInstance",
                "Compositor workspace {} isn't registered", compositor_workspace_resource_id);
        }
        let config = renderer.config();
        let mut instance = Self {
            compositor_workspace_resource_id,
            number_of_multisamples: 1,
            resolution_scale: config.default_resolution_scale,
            render_queue_index_ranges: Vec::new(),
            compositor_node_instances: Vec::new(),
            shadow_map_location: None,
            command_buffer: CommandBuffer::new(),
            loaded_reload_counter: None,
            resolved_settings: None,
            framebuffers_initialized: false,
            execution_render_target: None,
        };
        instance.set_number_of_multisamples(renderer, config.default_number_of_multisamples);
        Ok(instance)
    }

    pub fn compositor_workspace_resource_id(&self) -> AssetId {
        self.compositor_workspace_resource_id
    }

    pub fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }

    /// Change the sample count of multisample render target textures
    ///
    /// Valid values are 1, 2, 4 and 8; values above what the RHI supports
    /// are clamped. GPU resources are recreated by the next `execute`.
    pub fn set_number_of_multisamples(&mut self, renderer: &Renderer, number_of_multisamples: u8) {
        debug_assert!(
            matches!(number_of_multisamples, 1 | 2 | 4 | 8),
            "Invalid number of multisamples {}", number_of_multisamples
        );
        let maximum = renderer.capabilities().maximum_number_of_multisamples.max(1);
        let clamped = number_of_multisamples.clamp(1, maximum);
        if clamped != number_of_multisamples {
            engine_debug!("nebula3d::CompositorWorkspaceInstance",
                "{}x MSAA requested, the RHI supports up to {}x", number_of_multisamples, maximum);
        }
        self.number_of_multisamples = clamped;
    }

    pub fn resolution_scale(&self) -> f32 {
        self.resolution_scale
    }

    /// Change the scale applied to render target textures allowing it
    pub fn set_resolution_scale(&mut self, resolution_scale: f32) {
        debug_assert!(resolution_scale > 0.0, "Invalid resolution scale {}", resolution_scale);
        self.resolution_scale = resolution_scale;
    }

    /// Merged render queue index ranges, with last frame's renderable managers
    pub fn render_queue_index_ranges(&self) -> &[RenderQueueIndexRange] {
        &self.render_queue_index_ranges
    }

    pub fn compositor_node_instances(&self) -> &[CompositorNodeInstance] {
        &self.compositor_node_instances
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_reload_counter.is_some()
    }

    /// The shadow map pass of this workspace, if any
    pub fn first_compositor_instance_pass_shadow_map(&self) -> Option<&CompositorInstancePassShadowMap> {
        let location = self.shadow_map_location?;
        self.compositor_node_instances
            .get(location.node_index)?
            .compositor_instance_pass(location.target_index, location.pass_index)?
            .as_any()
            .downcast_ref()
    }

    pub fn first_compositor_instance_pass_shadow_map_mut(&mut self) -> Option<&mut CompositorInstancePassShadowMap> {
        let location = self.shadow_map_location?;
        self.compositor_node_instances
            .get_mut(location.node_index)?
            .compositor_instance_pass_mut(location.target_index, location.pass_index)?
            .as_any_mut()
            .downcast_mut()
    }

    /// Render target of the frame in flight, `None` outside of `execute`
    pub fn execution_render_target(&self) -> Option<&RenderTarget> {
        self.execution_render_target.as_ref()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Follow the loading state of the workspace resource
    ///
    /// Node instances are rebuilt once per load or reload transition, and
    /// destroyed when the resource leaves the loaded state.
    ///
    /// # Errors
    ///
    /// Returns an error if a node can't be loaded or a pass can't be built.
    pub fn update_loading_state(&mut self, rhi: &mut dyn Rhi, renderer: &mut Renderer) -> Result<()> {
        let (loading_state, reload_counter) = match renderer
            .compositor_workspace_resource_manager()
            .compositor_workspace_resource(self.compositor_workspace_resource_id)
        {
            Some(resource) => (resource.loading_state(), resource.reload_counter()),
            None => (LoadingState::Unloaded, 0),
        };

        if loading_state.is_loaded() {
            if self.loaded_reload_counter != Some(reload_counter) {
                self.on_loading_state_change(rhi, renderer, loading_state)?;
                self.loaded_reload_counter = Some(reload_counter);
            }
        } else if self.loaded_reload_counter.is_some() {
            self.on_loading_state_change(rhi, renderer, loading_state)?;
        }
        Ok(())
    }

    fn on_loading_state_change(&mut self, rhi: &mut dyn Rhi, renderer: &mut Renderer, loading_state: LoadingState) -> Result<()> {
        self.destroy_compositor_node_instances(renderer);
        if !loading_state.is_loaded() {
            engine_debug!("nebula3d::CompositorWorkspaceInstance",
                "Compositor workspace {} is {:?}, node instances destroyed",
                self.compositor_workspace_resource_id, loading_state);
            return Ok(());
        }
        if let Err(error) = self.create_compositor_node_instances(rhi, renderer) {
            self.destroy_compositor_node_instances(renderer);
            return Err(error);
        }
        engine_info!("nebula3d::CompositorWorkspaceInstance",
            "Compositor workspace {} loaded ({} nodes, {} render queue index ranges)",
            self.compositor_workspace_resource_id,
            self.compositor_node_instances.len(),
            self.render_queue_index_ranges.len());
        Ok(())
    }

    fn create_compositor_node_instances(&mut self, rhi: &mut dyn Rhi, renderer: &mut Renderer) -> Result<()> {
        let compositor_node_asset_ids = renderer
            .compositor_workspace_resource_manager()
            .compositor_workspace_resource(self.compositor_workspace_resource_id)
            .map(|resource| resource.compositor_node_asset_ids().to_vec())
            .unwrap_or_default();
        debug_assert!(
            !compositor_node_asset_ids.is_empty(),
            "Compositor workspace {} has no nodes", self.compositor_workspace_resource_id
        );

        let mut declared_ranges = Vec::new();
        for compositor_node_asset_id in compositor_node_asset_ids {
            let resource = renderer
                .compositor_node_resource_manager
                .load_compositor_node_resource_by_asset_id(compositor_node_asset_id)?;
            let node = CompositorNodeInstance::new(resource, renderer)?;

            // Announce only, GPU resources are created on first use
            for (asset_id, signature) in node.resource().render_target_textures() {
                renderer.render_target_texture_manager.add_render_target_texture(*asset_id, *signature);
            }
            for (compositor_framebuffer_id, signature) in node.resource().framebuffers() {
                renderer.framebuffer_manager.add_framebuffer(*compositor_framebuffer_id, signature.clone());
            }

            let node_index = self.compositor_node_instances.len();
            for (target_index, pass_index, pass) in node.compositor_instance_passes() {
                if !pass.as_any().is::<CompositorInstancePassShadowMap>() {
                    continue;
                }
                match self.shadow_map_location {
                    None => self.shadow_map_location = Some(PassLocation { node_index, target_index, pass_index }),
                    Some(_) => engine_warn!("nebula3d::CompositorWorkspaceInstance",
                        "Compositor workspace {} has more than one shadow map pass, only the first one is tracked",
                        self.compositor_workspace_resource_id),
                }
            }
            declared_ranges.extend(node.declared_render_queue_index_ranges());
            self.compositor_node_instances.push(node);
        }
        self.render_queue_index_ranges = merge_render_queue_index_ranges(declared_ranges);

        for node in &mut self.compositor_node_instances {
            node.on_compositor_workspace_instance_loading_finished(rhi, renderer)?;
        }
        Ok(())
    }

    fn destroy_compositor_node_instances(&mut self, renderer: &mut Renderer) {
        for mut node in self.compositor_node_instances.drain(..) {
            node.on_compositor_workspace_instance_destroyed(renderer);
            for (asset_id, _) in node.resource().render_target_textures() {
                renderer.render_target_texture_manager.release_render_target_texture(*asset_id);
            }
            for (_, signature) in node.resource().framebuffers() {
                renderer.framebuffer_manager.release_framebuffer_by_signature(signature);
            }
        }
        self.render_queue_index_ranges.clear();
        self.shadow_map_location = None;
        self.loaded_reload_counter = None;
        self.resolved_settings = None;
        self.framebuffers_initialized = false;
    }

    /// Give every announcement back to the shared caches
    ///
    /// Call this before dropping an instance whose renderer lives on.
    pub fn release(&mut self, renderer: &mut Renderer) {
        self.destroy_compositor_node_instances(renderer);
        self.command_buffer.clear();
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Render one frame into `render_target`
    ///
    /// Does nothing while the workspace resource is loading. Without a
    /// scene view no culling happens and scene passes record nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the RHI lock is poisoned, the workspace can't be
    /// built, or the RHI fails to create a resource.
    pub fn execute(&mut self, renderer: &mut Renderer, render_target: &RenderTarget, scene_view: Option<SceneView<'_>>) -> Result<()> {
        let shared_rhi = renderer.rhi().clone();
        let mut rhi = lock_rhi(&shared_rhi)?;
        self.execute_with_rhi(&mut *rhi, renderer, render_target, scene_view)
    }

    /// Render through the VR manager if VR is enabled and running
    ///
    /// # Errors
    ///
    /// Returns whatever the chosen path returns.
    pub fn execute_vr(
        &mut self,
        renderer: &mut Renderer,
        vr_manager: &mut dyn VrManager,
        render_target: &RenderTarget,
        scene_view: Option<SceneView<'_>>,
    ) -> Result<()> {
        if renderer.features().vr && vr_manager.is_running() {
            vr_manager.execute_compositor_workspace_instance(self, renderer, render_target, scene_view)
        } else {
            self.execute(renderer, render_target, scene_view)
        }
    }

    fn execute_with_rhi(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        render_target: &RenderTarget,
        scene_view: Option<SceneView<'_>>,
    ) -> Result<()> {
        self.command_buffer.clear();
        for range in &mut self.render_queue_index_ranges {
            range.renderable_managers.clear();
        }

        self.update_loading_state(rhi, renderer)?;
        if !self.is_loaded() {
            return Ok(());
        }

        renderer.material_properties.set_property_by_id(
            MaterialProperties::global_number_of_multisamples_id(),
            MaterialPropertyValue::Integer(self.number_of_multisamples as i32),
        );

        let settings = MainRenderTargetSettings::new(render_target, self.number_of_multisamples, self.resolution_scale);
        if self.resolved_settings.is_some_and(|resolved| resolved != settings) {
            engine_debug!("nebula3d::CompositorWorkspaceInstance",
                "Render target settings changed to {}x{} ({}x MSAA, scale {}), releasing cached GPU resources",
                settings.width, settings.height, settings.number_of_multisamples, settings.resolution_scale);
            renderer.framebuffer_manager.clear_rhi_resources();
            renderer.render_target_texture_manager.clear_rhi_resources();
            self.framebuffers_initialized = false;
        }
        self.resolved_settings = Some(settings);

        if !self.framebuffers_initialized {
            for node in &self.compositor_node_instances {
                node.resolve_rhi_resources(rhi, renderer, &settings)?;
            }
            self.framebuffers_initialized = true;
        }

        self.execution_render_target = Some(render_target.clone());
        if !rhi.begin_scene() {
            engine_warn!("nebula3d::CompositorWorkspaceInstance", "RHI refused to begin a scene, frame skipped");
            self.execution_render_target = None;
            return Ok(());
        }
        let result = self.record_and_submit(rhi, renderer, render_target, settings, scene_view);
        rhi.end_scene();
        self.execution_render_target = None;
        result?;

        if let Some(swap_chain) = render_target.as_swap_chain() {
            swap_chain.present()?;
        }
        Ok(())
    }

    fn record_and_submit(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        render_target: &RenderTarget,
        settings: MainRenderTargetSettings,
        scene_view: Option<SceneView<'_>>,
    ) -> Result<()> {
        let Self { compositor_node_instances, render_queue_index_ranges, command_buffer, .. } = self;

        // A scene still streaming in is neither culled nor lit
        if let Some(scene_view) = scene_view.filter(|scene_view| scene_view.scene.is_loaded()) {
            let aspect_ratio = render_target.width() as f32 / render_target.height().max(1) as f32;
            scene_view.scene.gather_render_queue_index_ranges_renderable_managers(
                scene_view.camera,
                aspect_ratio,
                &mut render_queue_index_ranges[..],
            );
            let camera_position = scene_view.scene.camera(scene_view.camera).map(|camera| camera.position);
            if let Some(camera_position) = camera_position {
                renderer.light_buffer_manager.fill_light_buffer(rhi, scene_view.scene, camera_position, command_buffer)?;
            }
        }

        let context = CompositorContextData::new(settings, scene_view, &render_queue_index_ranges[..]);
        let mut bound_render_target = None;
        for node in compositor_node_instances.iter_mut() {
            bound_render_target = node.fill_command_buffer(
                rhi,
                renderer,
                bound_render_target,
                render_target,
                &context,
                command_buffer,
            )?;
        }

        command_buffer.submit_to_rhi(rhi);
        for node in compositor_node_instances.iter_mut() {
            node.on_post_command_buffer_dispatch();
        }
        renderer.light_buffer_manager.on_post_command_buffer_dispatch();
        Ok(())
    }
}

impl std::fmt::Debug for CompositorWorkspaceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositorWorkspaceInstance")
            .field("compositor_workspace_resource_id", &self.compositor_workspace_resource_id)
            .field("number_of_multisamples", &self.number_of_multisamples)
            .field("resolution_scale", &self.resolution_scale)
            .field("number_of_nodes", &self.compositor_node_instances.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "compositor_workspace_instance_tests.rs"]
mod tests;
