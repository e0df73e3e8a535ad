use std::any::Any;
use crate::error::Result;
use crate::resource::{CompositorFramebufferId, Renderer};
use crate::rhi::{CommandBuffer, RenderTarget, ResolveMultisampleFramebuffer, Rhi};
use crate::compositor::{CompositorContextData, CompositorInstancePass, CompositorResourcePassResolveMultisample};

/// Resolves a multisample framebuffer into the render target bound by its node
pub struct CompositorInstancePassResolveMultisample {
    source_multisample_compositor_framebuffer_id: CompositorFramebufferId,
}

impl CompositorInstancePassResolveMultisample {
    pub fn new(resource_pass: &CompositorResourcePassResolveMultisample) -> Self {
        Self {
            source_multisample_compositor_framebuffer_id: resource_pass.source_multisample_compositor_framebuffer_id,
        }
    }
}

impl CompositorInstancePass for CompositorInstancePassResolveMultisample {
    fn on_fill_command_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        render_target: Option<&RenderTarget>,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        debug_assert!(render_target.is_some(), "Resolve multisample pass without destination render target");
        let Some(destination) = render_target else {
            return Ok(());
        };
        let source = renderer.framebuffer_manager.get_framebuffer_by_compositor_framebuffer_id(
            rhi,
            &mut renderer.render_target_texture_manager,
            &mut renderer.render_pass_manager,
            self.source_multisample_compositor_framebuffer_id,
            &context.settings,
        )?;
        ResolveMultisampleFramebuffer::create(command_buffer, destination, &source);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
