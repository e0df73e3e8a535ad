/// Texture formats, texture flags and the 2D texture resource

use bitflags::bitflags;
use crate::rhi::Resource;

/// Texture and render target format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Color formats
    R8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R11G11B10_FLOAT,
    R16G16B16A16_FLOAT,
    R32G32B32A32_FLOAT,
    R16_UNORM,
    R32_UINT,
    R32_FLOAT,

    // Depth formats
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Whether this is a depth (or depth-stencil) format
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT)
    }

    /// Size of one texel in bytes
    pub fn bytes_per_element(self) -> u32 {
        match self {
            TextureFormat::R8_UNORM => 1,
            TextureFormat::R16_UNORM => 2,
            TextureFormat::R8G8B8A8_UNORM
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8_UNORM
            | TextureFormat::B8G8R8A8_SRGB
            | TextureFormat::R11G11B10_FLOAT
            | TextureFormat::R32_UINT
            | TextureFormat::R32_FLOAT
            | TextureFormat::D32_FLOAT
            | TextureFormat::D24_UNORM_S8_UINT => 4,
            TextureFormat::R16G16B16A16_FLOAT => 8,
            TextureFormat::R32G32B32A32_FLOAT => 16,
        }
    }

    /// Stable numeric value, used when hashing formats into cache keys
    pub fn code(self) -> u32 {
        self as u32
    }
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// Texture can be sampled in shaders
        const SHADER_RESOURCE   = 1 << 0;
        /// Texture can be used as color or depth-stencil attachment
        const RENDER_TARGET     = 1 << 1;
        /// Texture can be written by compute shaders
        const UNORDERED_ACCESS  = 1 << 2;
        /// Full mipmap chain allocated and generated on the GPU
        const GENERATE_MIPMAPS  = 1 << 3;
        /// Upload data already contains every mipmap
        const DATA_CONTAINS_MIPMAPS = 1 << 4;
    }
}

/// Number of mipmaps of a full chain for the given size (1x1 included)
pub fn number_of_mipmaps(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Descriptor for creating a 2D texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub flags: TextureFlags,
    /// Number of multisamples (1, 2, 4 or 8), clamped to the backend maximum
    pub number_of_multisamples: u8,
    /// Initial data, `None` for render targets
    pub data: Option<Vec<u8>>,
    /// Debug name
    pub debug_name: String,
}

impl TextureDesc {
    /// Descriptor for a render target texture without initial data
    pub fn render_target(width: u32, height: u32, format: TextureFormat, flags: TextureFlags, number_of_multisamples: u8) -> Self {
        Self {
            width,
            height,
            format,
            flags: flags | TextureFlags::RENDER_TARGET,
            number_of_multisamples,
            data: None,
            debug_name: String::new(),
        }
    }
}

/// 2D texture resource
pub trait Texture2d: Resource {
    /// Width in pixels (mipmap 0)
    fn width(&self) -> u32;

    /// Height in pixels (mipmap 0)
    fn height(&self) -> u32;

    /// Pixel format
    fn format(&self) -> TextureFormat;

    /// Usage flags
    fn flags(&self) -> TextureFlags;

    /// Effective number of multisamples (after clamping)
    fn number_of_multisamples(&self) -> u8;

    /// Number of allocated mipmaps
    fn number_of_mipmaps(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_of_mipmaps() {
        assert_eq!(number_of_mipmaps(1, 1), 1);
        assert_eq!(number_of_mipmaps(0, 0), 1);
        assert_eq!(number_of_mipmaps(256, 256), 9);
        assert_eq!(number_of_mipmaps(800, 600), 10);
    }

    #[test]
    fn test_depth_formats() {
        assert!(TextureFormat::D32_FLOAT.is_depth());
        assert!(TextureFormat::D24_UNORM_S8_UINT.is_depth());
        assert!(!TextureFormat::R11G11B10_FLOAT.is_depth());
    }

    #[test]
    fn test_render_target_desc_sets_flag() {
        let desc = TextureDesc::render_target(64, 32, TextureFormat::R8G8B8A8_UNORM, TextureFlags::SHADER_RESOURCE, 4);
        assert!(desc.flags.contains(TextureFlags::RENDER_TARGET | TextureFlags::SHADER_RESOURCE));
        assert!(desc.data.is_none());
    }
}
