/// Render target texture signature
///
/// Value-typed description of a compositor render target texture. The
/// signature ID is a deterministic hash of every field and serves as the
/// cache key; the signature owns no GPU resource.

use bitflags::bitflags;
use crate::rhi::TextureFormat;
use super::signature_hasher::SignatureHasher;

/// Identifier derived from a signature's configuration
pub type RenderTargetTextureSignatureId = u64;

bitflags! {
    /// Render target texture behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderTargetTextureFlags: u8 {
        /// Texture follows the framebuffer multisample setting
        const ALLOW_MULTISAMPLE      = 1 << 0;
        /// Allocate a full mipmap chain, rendered mipmaps are generated
        const GENERATE_MIPMAPS       = 1 << 1;
        /// Relative sizes are multiplied by the workspace resolution scale,
        /// absolute sizes never are
        const ALLOW_RESOLUTION_SCALE = 1 << 2;
        /// Texture can be bound as shader resource
        const SHADER_RESOURCE        = 1 << 3;
    }
}

/// Absolute size, or size relative to the main render target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderTargetTextureSize {
    Absolute { width: u32, height: u32 },
    Relative { width_scale: f32, height_scale: f32 },
}

impl RenderTargetTextureSize {
    /// Same size as the main render target
    pub const MAIN_RENDER_TARGET: RenderTargetTextureSize =
        RenderTargetTextureSize::Relative { width_scale: 1.0, height_scale: 1.0 };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargetTextureSignature {
    size: RenderTargetTextureSize,
    texture_format: TextureFormat,
    flags: RenderTargetTextureFlags,
    signature_id: RenderTargetTextureSignatureId,
}

impl RenderTargetTextureSignature {
    pub fn new(size: RenderTargetTextureSize, texture_format: TextureFormat, flags: RenderTargetTextureFlags) -> Self {
        debug_assert!(
            !(flags.contains(RenderTargetTextureFlags::ALLOW_MULTISAMPLE)
                && flags.contains(RenderTargetTextureFlags::GENERATE_MIPMAPS)),
            "Multisample render target textures can't have mipmaps"
        );
        let mut hasher = SignatureHasher::new();
        match size {
            RenderTargetTextureSize::Absolute { width, height } => {
                debug_assert!(width > 0 && height > 0, "Absolute render target texture size must not be zero");
                hasher.write_u8(0).write_u32(width).write_u32(height);
            }
            RenderTargetTextureSize::Relative { width_scale, height_scale } => {
                debug_assert!(width_scale > 0.0 && height_scale > 0.0, "Relative scale must be positive");
                hasher.write_u8(1).write_f32(width_scale).write_f32(height_scale);
            }
        }
        hasher.write_u32(texture_format.code()).write_u8(flags.bits());

        Self {
            size,
            texture_format,
            flags,
            signature_id: hasher.finish(),
        }
    }

    pub fn size(&self) -> RenderTargetTextureSize {
        self.size
    }

    pub fn texture_format(&self) -> TextureFormat {
        self.texture_format
    }

    pub fn flags(&self) -> RenderTargetTextureFlags {
        self.flags
    }

    pub fn signature_id(&self) -> RenderTargetTextureSignatureId {
        self.signature_id
    }

    pub fn allow_multisample(&self) -> bool {
        self.flags.contains(RenderTargetTextureFlags::ALLOW_MULTISAMPLE)
    }

    pub fn allow_resolution_scale(&self) -> bool {
        self.flags.contains(RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE)
    }

    /// Pixel size against a main render target, rounded down, never below 1x1
    ///
    /// The resolution scale only applies to sizes relative to the main
    /// render target.
    pub fn resolve_size(&self, main_width: u32, main_height: u32, resolution_scale: f32) -> (u32, u32) {
        match self.size {
            RenderTargetTextureSize::Absolute { width, height } => (width.max(1), height.max(1)),
            RenderTargetTextureSize::Relative { width_scale, height_scale } => {
                let scale = if self.allow_resolution_scale() { resolution_scale } else { 1.0 };
                let width = main_width as f32 * width_scale * scale;
                let height = main_height as f32 * height_scale * scale;
                ((width as u32).max(1), (height as u32).max(1))
            }
        }
    }

    /// Sample count used for a given framebuffer sample count
    pub fn effective_number_of_multisamples(&self, number_of_multisamples: u8) -> u8 {
        if self.allow_multisample() { number_of_multisamples } else { 1 }
    }
}
