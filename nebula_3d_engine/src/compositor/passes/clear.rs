use std::any::Any;
use crate::error::Result;
use crate::resource::Renderer;
use crate::rhi::{ClearFlags, ClearGraphics, CommandBuffer, RenderTarget, Rhi};
use crate::compositor::{CompositorContextData, CompositorInstancePass, CompositorResourcePassClear};

/// Clears the render target bound by its node
pub struct CompositorInstancePassClear {
    clear_flags: ClearFlags,
    color: [f32; 4],
    z: f32,
    stencil: u32,
}

impl CompositorInstancePassClear {
    pub fn new(resource_pass: &CompositorResourcePassClear) -> Self {
        Self {
            clear_flags: resource_pass.clear_flags,
            color: resource_pass.color,
            z: resource_pass.z,
            stencil: resource_pass.stencil,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }
}

impl CompositorInstancePass for CompositorInstancePassClear {
    fn on_fill_command_buffer(
        &mut self,
        _rhi: &mut dyn Rhi,
        _renderer: &mut Renderer,
        render_target: Option<&RenderTarget>,
        _context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        debug_assert!(render_target.is_some(), "Clear pass without render target");
        ClearGraphics::create(command_buffer, self.clear_flags, self.color, self.z, self.stencil);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
