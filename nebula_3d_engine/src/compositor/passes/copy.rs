use std::any::Any;
use crate::error::Result;
use crate::resource::Renderer;
use crate::rhi::{CommandBuffer, CopyResource, RenderTarget, ResourceHandle, Rhi};
use crate::utils::AssetId;
use crate::compositor::{CompositorContextData, CompositorInstancePass, CompositorResourcePassCopy};

/// Copies one render target texture into another
pub struct CompositorInstancePassCopy {
    destination_texture_asset_id: AssetId,
    source_texture_asset_id: AssetId,
}

impl CompositorInstancePassCopy {
    pub fn new(resource_pass: &CompositorResourcePassCopy) -> Self {
        Self {
            destination_texture_asset_id: resource_pass.destination_texture_asset_id,
            source_texture_asset_id: resource_pass.source_texture_asset_id,
        }
    }
}

impl CompositorInstancePass for CompositorInstancePassCopy {
    fn on_fill_command_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        _render_target: Option<&RenderTarget>,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let textures = &mut renderer.render_target_texture_manager;
        let (destination, _) = textures.get_texture_by_asset_id(rhi, self.destination_texture_asset_id, &context.settings)?;
        let (source, _) = textures.get_texture_by_asset_id(rhi, self.source_texture_asset_id, &context.settings)?;
        debug_assert_eq!(
            (destination.width(), destination.height()), (source.width(), source.height()),
            "Copy between textures of different sizes"
        );
        CopyResource::create(command_buffer, ResourceHandle::from(destination), ResourceHandle::from(source));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
