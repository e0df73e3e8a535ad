/// Framebuffer cache
///
/// Compositor nodes refer to framebuffers by a node-local compositor
/// framebuffer ID mapped to a `FramebufferSignature`. Framebuffers sharing a
/// signature share one cache element with a logical reference count. The GPU
/// framebuffer is composed on first access from render target textures and a
/// render pass resolved through the other two caches.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_debug, engine_err, engine_trace};
use crate::rhi::{Rhi, Framebuffer, FramebufferAttachment, FramebufferDesc};
use crate::utils::StringId;
use super::{
    FramebufferSignature, FramebufferSignatureId, FramebufferSignatureAttachment,
    MainRenderTargetSettings, RenderPassManager, RenderTargetTextureManager,
};

/// Node-local framebuffer name
pub type CompositorFramebufferId = StringId;

struct FramebufferElement {
    signature: FramebufferSignature,
    framebuffer: Option<(Arc<dyn Framebuffer>, MainRenderTargetSettings)>,
    number_of_references: u32,
}

/// Caches framebuffers by signature ID
///
/// Elements are kept in a vector sorted by signature ID: they are added once
/// per compositor load and looked up every frame.
#[derive(Default)]
pub struct FramebufferManager {
    elements: Vec<FramebufferElement>,
    compositor_framebuffer_ids: FxHashMap<CompositorFramebufferId, FramebufferSignatureId>,
}

impl FramebufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, signature_id: FramebufferSignatureId) -> std::result::Result<usize, usize> {
        self.elements.binary_search_by(|element| element.signature.signature_id().cmp(&signature_id))
    }

    /// Announce a framebuffer, no GPU allocation happens here
    ///
    /// Every announcement of a signature adds one logical reference.
    pub fn add_framebuffer(&mut self, compositor_framebuffer_id: CompositorFramebufferId, signature: FramebufferSignature) {
        let signature_id = signature.signature_id();
        match self.find(signature_id) {
            Ok(index) => {
                debug_assert_eq!(self.elements[index].signature, signature, "Framebuffer signature ID collision");
                self.elements[index].number_of_references += 1;
            }
            Err(index) => {
                self.elements.insert(index, FramebufferElement {
                    signature,
                    framebuffer: None,
                    number_of_references: 1,
                });
            }
        }
        self.compositor_framebuffer_ids.insert(compositor_framebuffer_id, signature_id);
    }

    /// Drop one logical reference
    ///
    /// The element and its GPU framebuffer go away with the last reference.
    pub fn release_framebuffer_by_signature(&mut self, signature: &FramebufferSignature) {
        let signature_id = signature.signature_id();
        match self.find(signature_id) {
            Ok(index) => {
                let element = &mut self.elements[index];
                element.number_of_references -= 1;
                if element.number_of_references == 0 {
                    self.elements.remove(index);
                    self.compositor_framebuffer_ids.retain(|_, id| *id != signature_id);
                }
            }
            Err(_) => debug_assert!(false, "Unknown framebuffer signature {:016x}", signature_id),
        }
    }

    /// Signature a compositor framebuffer ID maps to
    pub fn signature_by_compositor_framebuffer_id(&self, compositor_framebuffer_id: CompositorFramebufferId) -> Option<&FramebufferSignature> {
        let signature_id = self.compositor_framebuffer_ids.get(&compositor_framebuffer_id)?;
        self.find(*signature_id).ok().map(|index| &self.elements[index].signature)
    }

    /// Logical reference count of a signature, 0 if unknown
    pub fn number_of_references(&self, signature_id: FramebufferSignatureId) -> u32 {
        self.find(signature_id).map_or(0, |index| self.elements[index].number_of_references)
    }

    /// Already created framebuffer, without creating it
    pub fn framebuffer_by_compositor_framebuffer_id(&self, compositor_framebuffer_id: CompositorFramebufferId) -> Option<&Arc<dyn Framebuffer>> {
        let signature_id = self.compositor_framebuffer_ids.get(&compositor_framebuffer_id)?;
        let index = self.find(*signature_id).ok()?;
        self.elements[index].framebuffer.as_ref().map(|(framebuffer, _)| framebuffer)
    }

    /// Return the GPU framebuffer of a compositor framebuffer ID, creating it if needed
    ///
    /// Attachments are resolved through the render target texture manager.
    /// If any attachment doesn't allow multisampling, the whole framebuffer
    /// falls back to a single sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID was never announced, one of its textures
    /// is unknown, or the RHI fails to create a resource.
    pub fn get_framebuffer_by_compositor_framebuffer_id(
        &mut self,
        rhi: &mut dyn Rhi,
        render_target_texture_manager: &mut RenderTargetTextureManager,
        render_pass_manager: &mut RenderPassManager,
        compositor_framebuffer_id: CompositorFramebufferId,
        settings: &MainRenderTargetSettings,
    ) -> Result<Arc<dyn Framebuffer>> {
        let signature_id = *self.compositor_framebuffer_ids.get(&compositor_framebuffer_id).ok_or_else(|| {
            engine_err!("nebula3d::FramebufferManager",
                "Compositor framebuffer {} was never announced", compositor_framebuffer_id)
        })?;
        let index = self.find(signature_id).map_err(|_| {
            engine_err!("nebula3d::FramebufferManager",
                "Compositor framebuffer {} lost its signature {:016x}", compositor_framebuffer_id, signature_id)
        })?;

        let element = &mut self.elements[index];
        if let Some((framebuffer, created_with)) = &element.framebuffer {
            if created_with == settings {
                return Ok(framebuffer.clone());
            }
        }
        element.framebuffer = None;

        let framebuffer = Self::create_framebuffer(
            rhi,
            render_target_texture_manager,
            render_pass_manager,
            &element.signature,
            compositor_framebuffer_id,
            settings,
        )?;
        element.framebuffer = Some((framebuffer.clone(), *settings));
        Ok(framebuffer)
    }

    fn create_framebuffer(
        rhi: &mut dyn Rhi,
        render_target_texture_manager: &mut RenderTargetTextureManager,
        render_pass_manager: &mut RenderPassManager,
        signature: &FramebufferSignature,
        compositor_framebuffer_id: CompositorFramebufferId,
        settings: &MainRenderTargetSettings,
    ) -> Result<Arc<dyn Framebuffer>> {
        let mut number_of_multisamples: Option<u8> = None;
        let mut color_attachments = Vec::with_capacity(signature.color_attachments().len());
        for attachment in signature.color_attachments() {
            color_attachments.push(Self::resolve_attachment(
                rhi, render_target_texture_manager, attachment, settings,
                &mut number_of_multisamples, compositor_framebuffer_id,
            )?);
        }
        let depth_stencil_attachment = match signature.depth_stencil_attachment() {
            Some(attachment) => Some(Self::resolve_attachment(
                rhi, render_target_texture_manager, attachment, settings,
                &mut number_of_multisamples, compositor_framebuffer_id,
            )?),
            None => None,
        };
        let number_of_multisamples = number_of_multisamples.unwrap_or(1);

        let color_formats: Vec<_> = color_attachments.iter().map(|attachment| attachment.texture.format()).collect();
        let depth_stencil_format = depth_stencil_attachment.as_ref().map(|attachment| attachment.texture.format());
        let render_pass = render_pass_manager.get_or_create_render_pass(
            rhi, &color_formats, depth_stencil_format, number_of_multisamples,
        )?;

        let framebuffer = rhi.create_framebuffer(FramebufferDesc {
            render_pass,
            color_attachments,
            depth_stencil_attachment,
            debug_name: format!("Compositor framebuffer {}", compositor_framebuffer_id),
        })?;
        engine_debug!("nebula3d::FramebufferManager",
            "Created framebuffer {} ({}x{}, {}x MSAA)",
            compositor_framebuffer_id, framebuffer.width(), framebuffer.height(), number_of_multisamples);
        Ok(framebuffer)
    }

    fn resolve_attachment(
        rhi: &mut dyn Rhi,
        render_target_texture_manager: &mut RenderTargetTextureManager,
        attachment: &FramebufferSignatureAttachment,
        settings: &MainRenderTargetSettings,
        number_of_multisamples: &mut Option<u8>,
        compositor_framebuffer_id: CompositorFramebufferId,
    ) -> Result<FramebufferAttachment> {
        let (texture, texture_signature) =
            render_target_texture_manager.get_texture_by_asset_id(rhi, attachment.texture_asset_id, settings)?;
        let used = texture_signature.effective_number_of_multisamples(settings.number_of_multisamples);
        match *number_of_multisamples {
            None => *number_of_multisamples = Some(used),
            Some(previous) => debug_assert_eq!(
                previous, used,
                "Framebuffer {} mixes multisample and single sample attachments", compositor_framebuffer_id
            ),
        }
        Ok(FramebufferAttachment {
            texture,
            mipmap_index: attachment.mipmap_index,
            layer_index: attachment.layer_index,
        })
    }

    /// Number of known signatures
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of GPU framebuffers currently held
    pub fn number_of_created_framebuffers(&self) -> usize {
        self.elements.iter().filter(|element| element.framebuffer.is_some()).count()
    }

    /// Release every GPU framebuffer and forget every announcement
    pub fn clear(&mut self) {
        self.elements.clear();
        self.compositor_framebuffer_ids.clear();
    }

    /// Release every GPU framebuffer but keep the announcements and counts
    pub fn clear_rhi_resources(&mut self) {
        for element in &mut self.elements {
            element.framebuffer = None;
        }
        engine_trace!("nebula3d::FramebufferManager", "Released framebuffer GPU resources");
    }
}

#[cfg(test)]
#[path = "framebuffer_manager_tests.rs"]
mod tests;
