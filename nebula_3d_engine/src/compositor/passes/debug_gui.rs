use std::any::Any;
use crate::error::Result;
use crate::resource::Renderer;
use crate::rhi::{CommandBuffer, RenderTarget, Rhi, SetDebugMarker};
use crate::compositor::{CompositorContextData, CompositorInstancePass};

/// Debug GUI hook
///
/// The GUI itself lives in the application; this pass only marks where it
/// is drawn, and does nothing unless the renderer enables the debug GUI.
#[derive(Default)]
pub struct CompositorInstancePassDebugGui;

impl CompositorInstancePassDebugGui {
    pub fn new() -> Self {
        Self
    }
}

impl CompositorInstancePass for CompositorInstancePassDebugGui {
    fn on_fill_command_buffer(
        &mut self,
        _rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        _render_target: Option<&RenderTarget>,
        _context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        if renderer.features().debug_gui {
            SetDebugMarker::create(command_buffer, "Debug GUI");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
