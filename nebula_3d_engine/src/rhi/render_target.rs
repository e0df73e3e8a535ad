/// Render passes, framebuffers, swap chains and the render target abstraction

use std::sync::Arc;
use crate::error::Result;
use crate::rhi::{Resource, ResourceType, Texture2d, TextureFormat};

// ===== RENDER PASS =====

/// Maximum number of simultaneously bound color attachments
pub const MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS: usize = 8;

/// Descriptor for creating a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassDesc {
    /// Color attachment formats (at most 8)
    pub color_attachment_formats: Vec<TextureFormat>,
    /// Optional depth-stencil attachment format
    pub depth_stencil_attachment_format: Option<TextureFormat>,
    /// Number of multisamples (1, 2, 4 or 8)
    pub number_of_multisamples: u8,
    pub debug_name: String,
}

/// Render pass resource: attachment formats and sample count a framebuffer
/// or pipeline state is compatible with
pub trait RenderPass: Resource {
    fn color_attachment_formats(&self) -> &[TextureFormat];

    fn depth_stencil_attachment_format(&self) -> Option<TextureFormat>;

    fn number_of_multisamples(&self) -> u8;

    fn number_of_color_attachments(&self) -> usize {
        self.color_attachment_formats().len()
    }
}

// ===== FRAMEBUFFER =====

/// One framebuffer attachment: a texture plus the mipmap and layer rendered into
#[derive(Clone)]
pub struct FramebufferAttachment {
    pub texture: Arc<dyn Texture2d>,
    pub mipmap_index: u8,
    pub layer_index: u8,
}

impl FramebufferAttachment {
    pub fn new(texture: Arc<dyn Texture2d>) -> Self {
        Self { texture, mipmap_index: 0, layer_index: 0 }
    }

    /// Width and height of the attached mipmap, never less than 1x1
    pub fn size(&self) -> (u32, u32) {
        let mip = self.mipmap_index as u32;
        ((self.texture.width() >> mip).max(1), (self.texture.height() >> mip).max(1))
    }
}

/// Descriptor for creating a framebuffer
#[derive(Clone)]
pub struct FramebufferDesc {
    /// Render pass the framebuffer is compatible with
    pub render_pass: Arc<dyn RenderPass>,
    /// Color attachments, same count and order as the render pass formats
    pub color_attachments: Vec<FramebufferAttachment>,
    /// Optional depth-stencil attachment
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
    pub debug_name: String,
}

/// Framebuffer resource
///
/// Holds references to its attachment textures for its whole lifetime.
pub trait Framebuffer: Resource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn render_pass(&self) -> &Arc<dyn RenderPass>;

    fn color_attachments(&self) -> &[FramebufferAttachment];

    fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment>;
}

// ===== SWAP CHAIN =====

/// Descriptor for creating a swap chain
#[derive(Debug, Clone)]
pub struct SwapChainDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: TextureFormat,
    pub depth_stencil_format: Option<TextureFormat>,
    pub debug_name: String,
}

/// Swap chain resource for presenting to a native window
///
/// Window handling itself is left to the application.
pub trait SwapChain: Resource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn render_pass(&self) -> &Arc<dyn RenderPass>;

    /// Present the back buffer
    fn present(&self) -> Result<()>;

    /// Resize the back buffers, e.g. after the window changed size
    fn resize_buffers(&self, width: u32, height: u32) -> Result<()>;

    fn fullscreen_state(&self) -> bool;

    fn set_fullscreen_state(&self, fullscreen: bool) -> Result<()>;
}

// ===== RENDER TARGET =====

/// Anything that can be rendered into: a framebuffer or a swap chain
#[derive(Clone)]
pub enum RenderTarget {
    Framebuffer(Arc<dyn Framebuffer>),
    SwapChain(Arc<dyn SwapChain>),
}

impl RenderTarget {
    pub fn width(&self) -> u32 {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.width(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.height(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.height(),
        }
    }

    /// Width and height
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Either `ResourceType::Framebuffer` or `ResourceType::SwapChain`
    pub fn resource_type(&self) -> ResourceType {
        match self {
            RenderTarget::Framebuffer(_) => ResourceType::Framebuffer,
            RenderTarget::SwapChain(_) => ResourceType::SwapChain,
        }
    }

    pub fn render_pass(&self) -> &Arc<dyn RenderPass> {
        match self {
            RenderTarget::Framebuffer(framebuffer) => framebuffer.render_pass(),
            RenderTarget::SwapChain(swap_chain) => swap_chain.render_pass(),
        }
    }

    pub fn as_swap_chain(&self) -> Option<&Arc<dyn SwapChain>> {
        match self {
            RenderTarget::SwapChain(swap_chain) => Some(swap_chain),
            RenderTarget::Framebuffer(_) => None,
        }
    }

    pub fn as_framebuffer(&self) -> Option<&Arc<dyn Framebuffer>> {
        match self {
            RenderTarget::Framebuffer(framebuffer) => Some(framebuffer),
            RenderTarget::SwapChain(_) => None,
        }
    }

    /// Whether both handles point to the same GPU object
    pub fn same_as(&self, other: &RenderTarget) -> bool {
        match (self, other) {
            (RenderTarget::Framebuffer(a), RenderTarget::Framebuffer(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (RenderTarget::SwapChain(a), RenderTarget::SwapChain(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<Arc<dyn Framebuffer>> for RenderTarget {
    fn from(framebuffer: Arc<dyn Framebuffer>) -> Self {
        RenderTarget::Framebuffer(framebuffer)
    }
}

impl From<Arc<dyn SwapChain>> for RenderTarget {
    fn from(swap_chain: Arc<dyn SwapChain>) -> Self {
        RenderTarget::SwapChain(swap_chain)
    }
}
