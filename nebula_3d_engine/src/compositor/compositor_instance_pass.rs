/// Compositor instance passes
///
/// Runtime counterpart of a resource pass: created by the pass factory when
/// a workspace loads, asked to record its commands every frame, and told
/// when the frame's command buffer was submitted.

use std::any::Any;
use crate::error::Result;
use crate::resource::{MainRenderTargetSettings, Renderer};
use crate::rhi::{CommandBuffer, RenderTarget, Rhi};
use crate::scene::{CameraSceneItemKey, LightSceneItemKey, SceneResource};
use super::RenderQueueIndexRange;

/// Scene, camera and light a workspace renders
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    pub scene: &'a SceneResource,
    pub camera: CameraSceneItemKey,
    pub light: Option<LightSceneItemKey>,
    /// Render both eyes with one instanced draw
    pub single_pass_stereo_instancing: bool,
}

impl<'a> SceneView<'a> {
    pub fn new(scene: &'a SceneResource, camera: CameraSceneItemKey) -> Self {
        Self { scene, camera, light: None, single_pass_stereo_instancing: false }
    }

    pub fn with_light(mut self, light: LightSceneItemKey) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_single_pass_stereo_instancing(mut self, single_pass_stereo_instancing: bool) -> Self {
        self.single_pass_stereo_instancing = single_pass_stereo_instancing;
        self
    }
}

/// Per-frame data shared by every pass of a workspace execution
pub struct CompositorContextData<'a> {
    /// Main render target the workspace resolves its resources against
    pub settings: MainRenderTargetSettings,
    pub scene_view: Option<SceneView<'a>>,
    /// Merged ranges with the renderable managers culled for this frame
    pub render_queue_index_ranges: &'a [RenderQueueIndexRange],
}

impl<'a> CompositorContextData<'a> {
    pub fn new(settings: MainRenderTargetSettings, scene_view: Option<SceneView<'a>>, render_queue_index_ranges: &'a [RenderQueueIndexRange]) -> Self {
        Self { settings, scene_view, render_queue_index_ranges }
    }

    /// Aspect ratio of the main render target
    pub fn aspect_ratio(&self) -> f32 {
        self.settings.width as f32 / self.settings.height.max(1) as f32
    }
}

/// Runtime compositor pass
pub trait CompositorInstancePass: Send + 'static {
    /// Called once every node of the workspace has been built
    fn on_compositor_workspace_instance_loading_finished(&mut self, _rhi: &mut dyn Rhi, _renderer: &mut Renderer) -> Result<()> {
        Ok(())
    }

    /// Called when the workspace tears its node instances down
    ///
    /// Gives back whatever the pass announced to the shared caches.
    fn on_compositor_workspace_instance_destroyed(&mut self, _renderer: &mut Renderer) {}

    /// Record the commands of this pass
    ///
    /// `render_target` is the target bound by the node, `None` if nothing
    /// is bound yet.
    fn on_fill_command_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        render_target: Option<&RenderTarget>,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()>;

    /// Called after the frame's command buffer was submitted
    fn on_post_command_buffer_dispatch(&mut self) {}

    /// Whether the pass binds render targets of its own
    ///
    /// The node rebinds its target before the next pass if so.
    fn binds_own_render_target(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
