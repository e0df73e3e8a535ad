/// Null RHI resource implementations

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::utils::MakeId;
use crate::rhi::{
    Resource, ResourceType, ResourceHandle, RhiId, ResourceLifetime,
    RootSignature, RootParameter, ResourceGroup, GraphicsPipelineState, ComputePipelineState,
    VertexBuffer, IndexBuffer, IndexBufferFormat, UniformBuffer, IndirectBuffer, VertexArray,
    Texture2d, TextureFormat, TextureFlags, SamplerState, SamplerStateDesc,
    RenderPass, Framebuffer, FramebufferAttachment, SwapChain, QueryPool, QueryType,
};
use super::NullRhiRecorder;

/// Common bookkeeping of every null resource
#[derive(Debug)]
pub(crate) struct NullResourceBase {
    pub(crate) rhi_id: RhiId,
    pub(crate) debug_name: String,
    _lifetime: ResourceLifetime,
}

impl NullResourceBase {
    pub(crate) fn new(rhi_id: RhiId, debug_name: &str, lifetime: ResourceLifetime) -> Self {
        Self { rhi_id, debug_name: debug_name.to_string(), _lifetime: lifetime }
    }
}

/// Compact ID given back to its allocator on drop
#[derive(Debug)]
pub(crate) struct CompactId {
    pub(crate) id: u32,
    ids: Arc<Mutex<MakeId>>,
}

impl CompactId {
    pub(crate) fn new(id: u32, ids: Arc<Mutex<MakeId>>) -> Self {
        Self { id, ids }
    }
}

impl Drop for CompactId {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.ids.lock() {
            ids.destroy_id(self.id);
        }
    }
}

macro_rules! impl_null_resource {
    ($type_name:ident, $resource_type:expr) => {
        impl Resource for $type_name {
            fn resource_type(&self) -> ResourceType {
                $resource_type
            }

            fn rhi_id(&self) -> RhiId {
                self.base.rhi_id
            }

            fn debug_name(&self) -> &str {
                &self.base.debug_name
            }
        }
    };
}

// ============================================================================
// State resources
// ============================================================================

pub struct NullRootSignature {
    pub(crate) base: NullResourceBase,
    pub(crate) parameters: Vec<RootParameter>,
}

impl_null_resource!(NullRootSignature, ResourceType::RootSignature);

impl RootSignature for NullRootSignature {
    fn parameters(&self) -> &[RootParameter] {
        &self.parameters
    }
}

pub struct NullResourceGroup {
    pub(crate) base: NullResourceBase,
    pub(crate) root_parameter_index: u32,
    pub(crate) resources: Vec<ResourceHandle>,
    pub(crate) _sampler_states: Vec<Option<ResourceHandle>>,
}

impl_null_resource!(NullResourceGroup, ResourceType::ResourceGroup);

impl ResourceGroup for NullResourceGroup {
    fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    fn resources(&self) -> &[ResourceHandle] {
        &self.resources
    }
}

pub struct NullGraphicsPipelineState {
    pub(crate) base: NullResourceBase,
    pub(crate) id: CompactId,
    pub(crate) root_signature: Arc<dyn RootSignature>,
    pub(crate) render_pass: Arc<dyn RenderPass>,
}

impl_null_resource!(NullGraphicsPipelineState, ResourceType::GraphicsPipelineState);

impl GraphicsPipelineState for NullGraphicsPipelineState {
    fn id(&self) -> u32 {
        self.id.id
    }

    fn root_signature(&self) -> &Arc<dyn RootSignature> {
        &self.root_signature
    }

    fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }
}

pub struct NullComputePipelineState {
    pub(crate) base: NullResourceBase,
    pub(crate) id: CompactId,
    pub(crate) root_signature: Arc<dyn RootSignature>,
}

impl_null_resource!(NullComputePipelineState, ResourceType::ComputePipelineState);

impl ComputePipelineState for NullComputePipelineState {
    fn id(&self) -> u32 {
        self.id.id
    }

    fn root_signature(&self) -> &Arc<dyn RootSignature> {
        &self.root_signature
    }
}

pub struct NullSamplerState {
    pub(crate) base: NullResourceBase,
    pub(crate) desc: SamplerStateDesc,
}

impl_null_resource!(NullSamplerState, ResourceType::SamplerState);

impl SamplerState for NullSamplerState {
    fn desc(&self) -> &SamplerStateDesc {
        &self.desc
    }
}

pub struct NullQueryPool {
    pub(crate) base: NullResourceBase,
    pub(crate) query_type: QueryType,
    pub(crate) number_of_queries: u32,
}

impl_null_resource!(NullQueryPool, ResourceType::QueryPool);

impl QueryPool for NullQueryPool {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn number_of_queries(&self) -> u32 {
        self.number_of_queries
    }
}

// ============================================================================
// Buffers
// ============================================================================

pub struct NullVertexBuffer {
    pub(crate) base: NullResourceBase,
    pub(crate) number_of_bytes: u32,
}

impl_null_resource!(NullVertexBuffer, ResourceType::VertexBuffer);

impl VertexBuffer for NullVertexBuffer {
    fn number_of_bytes(&self) -> u32 {
        self.number_of_bytes
    }
}

pub struct NullIndexBuffer {
    pub(crate) base: NullResourceBase,
    pub(crate) number_of_bytes: u32,
    pub(crate) format: IndexBufferFormat,
}

impl_null_resource!(NullIndexBuffer, ResourceType::IndexBuffer);

impl IndexBuffer for NullIndexBuffer {
    fn number_of_bytes(&self) -> u32 {
        self.number_of_bytes
    }

    fn format(&self) -> IndexBufferFormat {
        self.format
    }
}

pub struct NullUniformBuffer {
    pub(crate) base: NullResourceBase,
    pub(crate) number_of_bytes: u32,
}

impl_null_resource!(NullUniformBuffer, ResourceType::UniformBuffer);

impl UniformBuffer for NullUniformBuffer {
    fn number_of_bytes(&self) -> u32 {
        self.number_of_bytes
    }
}

pub struct NullIndirectBuffer {
    pub(crate) base: NullResourceBase,
    pub(crate) number_of_bytes: u32,
}

impl_null_resource!(NullIndirectBuffer, ResourceType::IndirectBuffer);

impl IndirectBuffer for NullIndirectBuffer {
    fn number_of_bytes(&self) -> u32 {
        self.number_of_bytes
    }
}

pub struct NullVertexArray {
    pub(crate) base: NullResourceBase,
    pub(crate) id: CompactId,
    pub(crate) vertex_buffers: Vec<Arc<dyn VertexBuffer>>,
    pub(crate) index_buffer: Option<Arc<dyn IndexBuffer>>,
}

impl_null_resource!(NullVertexArray, ResourceType::VertexArray);

impl VertexArray for NullVertexArray {
    fn id(&self) -> u32 {
        self.id.id
    }

    fn vertex_buffers(&self) -> &[Arc<dyn VertexBuffer>] {
        &self.vertex_buffers
    }

    fn index_buffer(&self) -> Option<&Arc<dyn IndexBuffer>> {
        self.index_buffer.as_ref()
    }
}

// ============================================================================
// Textures and render targets
// ============================================================================

pub struct NullTexture2d {
    pub(crate) base: NullResourceBase,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: TextureFormat,
    pub(crate) flags: TextureFlags,
    pub(crate) number_of_multisamples: u8,
    pub(crate) number_of_mipmaps: u32,
}

impl_null_resource!(NullTexture2d, ResourceType::Texture2d);

impl Texture2d for NullTexture2d {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn flags(&self) -> TextureFlags {
        self.flags
    }

    fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }

    fn number_of_mipmaps(&self) -> u32 {
        self.number_of_mipmaps
    }
}

pub struct NullRenderPass {
    pub(crate) base: NullResourceBase,
    pub(crate) color_attachment_formats: Vec<TextureFormat>,
    pub(crate) depth_stencil_attachment_format: Option<TextureFormat>,
    pub(crate) number_of_multisamples: u8,
}

impl_null_resource!(NullRenderPass, ResourceType::RenderPass);

impl RenderPass for NullRenderPass {
    fn color_attachment_formats(&self) -> &[TextureFormat] {
        &self.color_attachment_formats
    }

    fn depth_stencil_attachment_format(&self) -> Option<TextureFormat> {
        self.depth_stencil_attachment_format
    }

    fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }
}

pub struct NullFramebuffer {
    pub(crate) base: NullResourceBase,
    pub(crate) render_pass: Arc<dyn RenderPass>,
    pub(crate) color_attachments: Vec<FramebufferAttachment>,
    pub(crate) depth_stencil_attachment: Option<FramebufferAttachment>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl_null_resource!(NullFramebuffer, ResourceType::Framebuffer);

impl Framebuffer for NullFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }

    fn color_attachments(&self) -> &[FramebufferAttachment] {
        &self.color_attachments
    }

    fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment> {
        self.depth_stencil_attachment.as_ref()
    }
}

pub struct NullSwapChain {
    pub(crate) base: NullResourceBase,
    pub(crate) render_pass: Arc<dyn RenderPass>,
    pub(crate) width: AtomicU32,
    pub(crate) height: AtomicU32,
    pub(crate) fullscreen: AtomicBool,
    pub(crate) recorder: Arc<NullRhiRecorder>,
}

impl_null_resource!(NullSwapChain, ResourceType::SwapChain);

impl SwapChain for NullSwapChain {
    fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }

    fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }

    fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }

    fn present(&self) -> Result<()> {
        self.recorder.record_present();
        Ok(())
    }

    fn resize_buffers(&self, width: u32, height: u32) -> Result<()> {
        // A minimized window reports 0x0; keep at least one pixel
        self.width.store(width.max(1), Ordering::Relaxed);
        self.height.store(height.max(1), Ordering::Relaxed);
        Ok(())
    }

    fn fullscreen_state(&self) -> bool {
        self.fullscreen.load(Ordering::Relaxed)
    }

    fn set_fullscreen_state(&self, fullscreen: bool) -> Result<()> {
        self.fullscreen.store(fullscreen, Ordering::Relaxed);
        Ok(())
    }
}
