use std::any::Any;
use crate::error::Result;
use crate::engine_trace;
use crate::resource::Renderer;
use crate::rhi::{CommandBuffer, RenderTarget, Rhi};
use crate::scene::RenderQueue;
use crate::compositor::{CompositorContextData, CompositorInstancePass, CompositorResourcePassScene};

/// Draws the culled renderables of its render queue index range
///
/// Nothing is recorded without a scene view or while the scene is loading.
pub struct CompositorInstancePassScene {
    render_queue: RenderQueue,
    transparent_pass: bool,
    number_of_drawn_renderables: usize,
}

impl CompositorInstancePassScene {
    pub fn new(resource_pass: &CompositorResourcePassScene) -> Self {
        Self {
            render_queue: RenderQueue::new(
                resource_pass.minimum_render_queue_index,
                resource_pass.maximum_render_queue_index,
                false,
            ),
            transparent_pass: resource_pass.transparent_pass,
            number_of_drawn_renderables: 0,
        }
    }

    pub fn is_transparent_pass(&self) -> bool {
        self.transparent_pass
    }

    /// Draw calls recorded by the last fill
    pub fn number_of_drawn_renderables(&self) -> usize {
        self.number_of_drawn_renderables
    }
}

impl CompositorInstancePass for CompositorInstancePassScene {
    fn on_fill_command_buffer(
        &mut self,
        _rhi: &mut dyn Rhi,
        _renderer: &mut Renderer,
        _render_target: Option<&RenderTarget>,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        self.number_of_drawn_renderables = 0;
        let Some(scene_view) = context.scene_view else {
            return Ok(());
        };
        if !scene_view.scene.is_loaded() {
            return Ok(());
        }

        self.render_queue.set_single_pass_stereo_instancing(scene_view.single_pass_stereo_instancing);
        self.render_queue.add_renderable_managers(scene_view.scene, context.render_queue_index_ranges);
        self.number_of_drawn_renderables = self.render_queue.fill_command_buffer(command_buffer);
        engine_trace!("nebula3d::CompositorInstancePassScene",
            "Recorded {} draw calls for render queue indices {}..={}",
            self.number_of_drawn_renderables,
            self.render_queue.minimum_render_queue_index(),
            self.render_queue.maximum_render_queue_index());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
