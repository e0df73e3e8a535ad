//! Renderer runtime context and the compositor resource caches
//!
//! Three layered caches turn declarative signatures into deduplicated GPU
//! objects: render passes, render target textures, and framebuffers composed
//! from both. They are shared by every compositor workspace instance of a
//! renderer and only touched from the rendering thread.

mod signature_hasher;
mod loading_state;
mod render_pass_manager;
mod render_target_texture_signature;
mod render_target_texture_manager;
mod framebuffer_signature;
mod framebuffer_manager;
mod material_properties;
mod renderer;

pub use loading_state::LoadingState;
pub use render_pass_manager::RenderPassManager;
pub use render_target_texture_signature::{
    RenderTargetTextureSignature, RenderTargetTextureSignatureId, RenderTargetTextureFlags, RenderTargetTextureSize,
};
pub use render_target_texture_manager::{RenderTargetTextureManager, MainRenderTargetSettings};
pub use framebuffer_signature::{FramebufferSignature, FramebufferSignatureId, FramebufferSignatureAttachment};
pub use framebuffer_manager::{FramebufferManager, CompositorFramebufferId};
pub use material_properties::{
    MaterialProperties, MaterialProperty, MaterialPropertyValue, GLOBAL_NUMBER_OF_MULTISAMPLES,
};
pub use renderer::{Renderer, RendererConfig, RendererFeatures};
