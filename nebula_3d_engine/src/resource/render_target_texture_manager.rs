/// Render target texture cache
///
/// Compositor nodes announce the render target textures they need by asset
/// ID and signature. The GPU texture is created on first access against a
/// concrete main render target, and recreated whenever the resolved size or
/// sample count changes.

use std::sync::Arc;
use crate::error::Result;
use crate::{engine_debug, engine_err, engine_trace};
use crate::rhi::{Rhi, RenderTarget, Texture2d, TextureDesc, TextureFlags};
use crate::utils::AssetId;
use super::render_target_texture_signature::{
    RenderTargetTextureSignature, RenderTargetTextureFlags,
};

/// Main render target parameters compositor resources are resolved against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainRenderTargetSettings {
    pub width: u32,
    pub height: u32,
    /// Framebuffer sample count requested by the workspace
    pub number_of_multisamples: u8,
    pub resolution_scale: f32,
}

impl MainRenderTargetSettings {
    pub fn new(render_target: &RenderTarget, number_of_multisamples: u8, resolution_scale: f32) -> Self {
        Self {
            width: render_target.width(),
            height: render_target.height(),
            number_of_multisamples,
            resolution_scale,
        }
    }
}

/// Parameters a GPU texture was created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedTexture {
    width: u32,
    height: u32,
    number_of_multisamples: u8,
}

struct RenderTargetTextureElement {
    asset_id: AssetId,
    signature: RenderTargetTextureSignature,
    texture: Option<(Arc<dyn Texture2d>, ResolvedTexture)>,
    number_of_references: u32,
}

/// Caches render target textures by asset ID
///
/// Elements are kept in a vector sorted by asset ID: they are added once per
/// compositor load and looked up every frame.
#[derive(Default)]
pub struct RenderTargetTextureManager {
    elements: Vec<RenderTargetTextureElement>,
}

impl RenderTargetTextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, asset_id: AssetId) -> std::result::Result<usize, usize> {
        self.elements.binary_search_by(|element| element.asset_id.cmp(&asset_id))
    }

    /// Announce a render target texture, no GPU allocation happens here
    ///
    /// Announcing an already known asset ID adds a logical reference. Both
    /// announcements must use the same signature.
    pub fn add_render_target_texture(&mut self, asset_id: AssetId, signature: RenderTargetTextureSignature) {
        match self.find(asset_id) {
            Ok(index) => {
                let element = &mut self.elements[index];
                debug_assert_eq!(
                    element.signature.signature_id(), signature.signature_id(),
                    "Render target texture {} announced with two different signatures", asset_id
                );
                element.number_of_references += 1;
            }
            Err(index) => {
                self.elements.insert(index, RenderTargetTextureElement {
                    asset_id,
                    signature,
                    texture: None,
                    number_of_references: 1,
                });
            }
        }
    }

    /// Drop one logical reference of the texture using this signature
    ///
    /// The element is removed, and its GPU texture released, once no
    /// reference is left.
    pub fn release_render_target_texture_by_signature(&mut self, signature: &RenderTargetTextureSignature) {
        let signature_id = signature.signature_id();
        let Some(index) = self.elements
            .iter()
            .position(|element| element.signature.signature_id() == signature_id)
        else {
            debug_assert!(false, "Unknown render target texture signature {:016x}", signature_id);
            return;
        };
        self.release_element(index);
    }

    /// Drop one logical reference of a texture
    pub fn release_render_target_texture(&mut self, asset_id: AssetId) {
        match self.find(asset_id) {
            Ok(index) => self.release_element(index),
            Err(_) => debug_assert!(false, "Unknown render target texture {}", asset_id),
        }
    }

    fn release_element(&mut self, index: usize) {
        let element = &mut self.elements[index];
        element.number_of_references -= 1;
        if element.number_of_references == 0 {
            self.elements.remove(index);
        }
    }

    /// Signature registered for an asset ID
    pub fn signature_by_asset_id(&self, asset_id: AssetId) -> Option<&RenderTargetTextureSignature> {
        self.find(asset_id).ok().map(|index| &self.elements[index].signature)
    }

    /// Already created texture, without creating it
    pub fn existing_texture_by_asset_id(&self, asset_id: AssetId) -> Option<&Arc<dyn Texture2d>> {
        let index = self.find(asset_id).ok()?;
        self.elements[index].texture.as_ref().map(|(texture, _)| texture)
    }

    /// Logical reference count of an asset ID, 0 if unknown
    pub fn number_of_references(&self, asset_id: AssetId) -> u32 {
        self.find(asset_id).map_or(0, |index| self.elements[index].number_of_references)
    }

    /// Return the GPU texture of an announced asset, creating it if needed
    ///
    /// The texture is (re)created when none exists yet or when the resolved
    /// size or sample count differs from the existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset ID was never announced or the RHI fails
    /// to create the texture.
    pub fn get_texture_by_asset_id(
        &mut self,
        rhi: &mut dyn Rhi,
        asset_id: AssetId,
        settings: &MainRenderTargetSettings,
    ) -> Result<(Arc<dyn Texture2d>, RenderTargetTextureSignature)> {
        let index = self.find(asset_id).map_err(|_| {
            engine_err!("nebula3d::RenderTargetTextureManager",
                "Render target texture {} was never announced", asset_id)
        })?;
        let element = &mut self.elements[index];
        let signature = element.signature;

        let (width, height) = signature.resolve_size(settings.width, settings.height, settings.resolution_scale);
        let resolved = ResolvedTexture {
            width,
            height,
            number_of_multisamples: signature.effective_number_of_multisamples(settings.number_of_multisamples),
        };
        if let Some((texture, existing)) = &element.texture {
            if *existing == resolved {
                return Ok((texture.clone(), signature));
            }
        }

        let mut flags = TextureFlags::RENDER_TARGET;
        if signature.flags().contains(RenderTargetTextureFlags::SHADER_RESOURCE) {
            flags |= TextureFlags::SHADER_RESOURCE;
        }
        if signature.flags().contains(RenderTargetTextureFlags::GENERATE_MIPMAPS) {
            flags |= TextureFlags::GENERATE_MIPMAPS;
        }
        let mut desc = TextureDesc::render_target(
            width, height, signature.texture_format(), flags, resolved.number_of_multisamples,
        );
        desc.debug_name = format!("Compositor render target texture {}", asset_id);

        // Drop the previous texture before allocating its replacement
        element.texture = None;
        let texture = rhi.create_texture_2d(&desc)?;
        engine_debug!("nebula3d::RenderTargetTextureManager",
            "Created render target texture {} ({}x{}, {}x MSAA)",
            asset_id, width, height, resolved.number_of_multisamples);
        element.texture = Some((texture.clone(), resolved));
        Ok((texture, signature))
    }

    /// Number of announced render target textures
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of GPU textures currently held
    pub fn number_of_created_textures(&self) -> usize {
        self.elements.iter().filter(|element| element.texture.is_some()).count()
    }

    /// Release every GPU texture and forget every announcement
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Release every GPU texture but keep the announcements
    ///
    /// Used when only the resolution or the sample count changed: the next
    /// access recreates the texture for the same logical slot.
    pub fn clear_rhi_resources(&mut self) {
        for element in &mut self.elements {
            element.texture = None;
        }
        engine_trace!("nebula3d::RenderTargetTextureManager", "Released render target texture GPU resources");
    }
}

#[cfg(test)]
#[path = "render_target_texture_manager_tests.rs"]
mod tests;
