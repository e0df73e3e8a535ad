use std::any::Any;
use crate::error::Result;
use crate::resource::{RenderTargetTextureFlags, Renderer};
use crate::rhi::{CommandBuffer, GenerateMipmaps, RenderTarget, Rhi};
use crate::utils::AssetId;
use crate::compositor::{CompositorContextData, CompositorInstancePass, CompositorResourcePassGenerateMipmaps};

/// Generates the mipmap chain of a render target texture
pub struct CompositorInstancePassGenerateMipmaps {
    texture_asset_id: AssetId,
}

impl CompositorInstancePassGenerateMipmaps {
    pub fn new(resource_pass: &CompositorResourcePassGenerateMipmaps) -> Self {
        Self { texture_asset_id: resource_pass.texture_asset_id }
    }
}

impl CompositorInstancePass for CompositorInstancePassGenerateMipmaps {
    fn on_fill_command_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        _render_target: Option<&RenderTarget>,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let (texture, signature) = renderer.render_target_texture_manager
            .get_texture_by_asset_id(rhi, self.texture_asset_id, &context.settings)?;
        debug_assert!(
            signature.flags().contains(RenderTargetTextureFlags::GENERATE_MIPMAPS),
            "Render target texture {} has no mipmaps to generate", self.texture_asset_id
        );
        GenerateMipmaps::create(command_buffer, &texture);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
