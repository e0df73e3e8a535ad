/// Framebuffer signature
///
/// Identifies a compositor framebuffer by its attachments: up to eight color
/// attachments plus an optional depth-stencil attachment, each naming a
/// render target texture asset together with the mipmap and layer rendered
/// into. Identical attachment tuples always produce the same signature ID.

use crate::rhi::MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS;
use crate::utils::AssetId;
use super::signature_hasher::SignatureHasher;

/// Identifier derived from a framebuffer signature's attachments
pub type FramebufferSignatureId = u64;

/// One attachment of a framebuffer signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferSignatureAttachment {
    pub texture_asset_id: AssetId,
    pub mipmap_index: u8,
    pub layer_index: u8,
}

impl FramebufferSignatureAttachment {
    /// Attachment rendering into mipmap 0, layer 0
    pub fn new(texture_asset_id: AssetId) -> Self {
        Self { texture_asset_id, mipmap_index: 0, layer_index: 0 }
    }

    fn hash_into(&self, hasher: &mut SignatureHasher) {
        hasher
            .write_u32(self.texture_asset_id.id())
            .write_u8(self.mipmap_index)
            .write_u8(self.layer_index);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferSignature {
    color_attachments: Vec<FramebufferSignatureAttachment>,
    depth_stencil_attachment: Option<FramebufferSignatureAttachment>,
    signature_id: FramebufferSignatureId,
}

impl FramebufferSignature {
    pub fn new(
        color_attachments: Vec<FramebufferSignatureAttachment>,
        depth_stencil_attachment: Option<FramebufferSignatureAttachment>,
    ) -> Self {
        debug_assert!(
            color_attachments.len() <= MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS,
            "A framebuffer has at most {} color attachments", MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS
        );
        debug_assert!(
            !color_attachments.is_empty() || depth_stencil_attachment.is_some(),
            "A framebuffer needs at least one attachment"
        );

        let mut hasher = SignatureHasher::new();
        hasher.write_u32(color_attachments.len() as u32);
        for attachment in &color_attachments {
            attachment.hash_into(&mut hasher);
        }
        match &depth_stencil_attachment {
            Some(attachment) => {
                hasher.write_u8(1);
                attachment.hash_into(&mut hasher);
            }
            None => {
                hasher.write_u8(0);
            }
        }

        Self {
            color_attachments,
            depth_stencil_attachment,
            signature_id: hasher.finish(),
        }
    }

    pub fn color_attachments(&self) -> &[FramebufferSignatureAttachment] {
        &self.color_attachments
    }

    pub fn depth_stencil_attachment(&self) -> Option<&FramebufferSignatureAttachment> {
        self.depth_stencil_attachment.as_ref()
    }

    pub fn signature_id(&self) -> FramebufferSignatureId {
        self.signature_id
    }
}
