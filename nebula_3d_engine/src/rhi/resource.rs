/// Resource base trait, resource type discriminator and type-erased handles
///
/// Every GPU object created by an RHI is shared through an `Arc`. The cache
/// that created it is the first owner; every consumer (a vertex array holding
/// its buffers, a framebuffer holding its attachments, a command buffer
/// referencing a pipeline state) clones the `Arc` for as long as it needs the
/// object. The backend deallocation runs in `Drop` once the last owner is gone.

use std::sync::Arc;
use crate::rhi::{
    RootSignature, ResourceGroup, GraphicsPipelineState, ComputePipelineState,
    VertexBuffer, IndexBuffer, UniformBuffer, IndirectBuffer, VertexArray,
    Texture2d, SamplerState, RenderPass, Framebuffer, SwapChain, QueryPool,
    RenderTarget,
};

/// Identifies the RHI instance that created a resource
///
/// Resources must only be used with the RHI that owns them. Backends check
/// this with debug assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RhiId(pub(crate) u32);

impl RhiId {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Resource type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    RootSignature,
    ResourceGroup,
    GraphicsPipelineState,
    ComputePipelineState,
    VertexBuffer,
    IndexBuffer,
    UniformBuffer,
    IndirectBuffer,
    VertexArray,
    Texture2d,
    SamplerState,
    RenderPass,
    Framebuffer,
    SwapChain,
    QueryPool,
}

impl ResourceType {
    /// Number of resource types
    pub const COUNT: usize = 15;

    /// All resource types, in discriminant order
    pub const ALL: [ResourceType; Self::COUNT] = [
        ResourceType::RootSignature,
        ResourceType::ResourceGroup,
        ResourceType::GraphicsPipelineState,
        ResourceType::ComputePipelineState,
        ResourceType::VertexBuffer,
        ResourceType::IndexBuffer,
        ResourceType::UniformBuffer,
        ResourceType::IndirectBuffer,
        ResourceType::VertexArray,
        ResourceType::Texture2d,
        ResourceType::SamplerState,
        ResourceType::RenderPass,
        ResourceType::Framebuffer,
        ResourceType::SwapChain,
        ResourceType::QueryPool,
    ];

    /// Dense index usable for per-type tables
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Base trait of every RHI resource
pub trait Resource: Send + Sync {
    /// Resource type discriminator
    fn resource_type(&self) -> ResourceType;

    /// RHI instance owning this resource
    fn rhi_id(&self) -> RhiId;

    /// Name given at creation, for debugging tools
    fn debug_name(&self) -> &str;
}

// ============================================================================
// Type-erased resource handle
// ============================================================================

/// Shared handle to any RHI resource
///
/// Used wherever resources of different kinds are stored side by side:
/// resource groups and the resource table of a command buffer.
#[derive(Clone)]
pub enum ResourceHandle {
    RootSignature(Arc<dyn RootSignature>),
    ResourceGroup(Arc<dyn ResourceGroup>),
    GraphicsPipelineState(Arc<dyn GraphicsPipelineState>),
    ComputePipelineState(Arc<dyn ComputePipelineState>),
    VertexBuffer(Arc<dyn VertexBuffer>),
    IndexBuffer(Arc<dyn IndexBuffer>),
    UniformBuffer(Arc<dyn UniformBuffer>),
    IndirectBuffer(Arc<dyn IndirectBuffer>),
    VertexArray(Arc<dyn VertexArray>),
    Texture2d(Arc<dyn Texture2d>),
    SamplerState(Arc<dyn SamplerState>),
    RenderPass(Arc<dyn RenderPass>),
    Framebuffer(Arc<dyn Framebuffer>),
    SwapChain(Arc<dyn SwapChain>),
    QueryPool(Arc<dyn QueryPool>),
}

/// Forward a `Resource` method call to whichever variant is stored
macro_rules! with_resource {
    ($handle:expr, $resource:ident => $body:expr) => {
        match $handle {
            ResourceHandle::RootSignature($resource) => $body,
            ResourceHandle::ResourceGroup($resource) => $body,
            ResourceHandle::GraphicsPipelineState($resource) => $body,
            ResourceHandle::ComputePipelineState($resource) => $body,
            ResourceHandle::VertexBuffer($resource) => $body,
            ResourceHandle::IndexBuffer($resource) => $body,
            ResourceHandle::UniformBuffer($resource) => $body,
            ResourceHandle::IndirectBuffer($resource) => $body,
            ResourceHandle::VertexArray($resource) => $body,
            ResourceHandle::Texture2d($resource) => $body,
            ResourceHandle::SamplerState($resource) => $body,
            ResourceHandle::RenderPass($resource) => $body,
            ResourceHandle::Framebuffer($resource) => $body,
            ResourceHandle::SwapChain($resource) => $body,
            ResourceHandle::QueryPool($resource) => $body,
        }
    };
}

/// `From<Arc<dyn X>>` plus a typed accessor for one variant
macro_rules! resource_handle_variant {
    ($variant:ident, $resource_trait:ident, $accessor:ident) => {
        impl From<Arc<dyn $resource_trait>> for ResourceHandle {
            fn from(resource: Arc<dyn $resource_trait>) -> Self {
                ResourceHandle::$variant(resource)
            }
        }

        impl ResourceHandle {
            pub fn $accessor(&self) -> Option<&Arc<dyn $resource_trait>> {
                match self {
                    ResourceHandle::$variant(resource) => Some(resource),
                    _ => None,
                }
            }
        }
    };
}

resource_handle_variant!(RootSignature, RootSignature, as_root_signature);
resource_handle_variant!(ResourceGroup, ResourceGroup, as_resource_group);
resource_handle_variant!(GraphicsPipelineState, GraphicsPipelineState, as_graphics_pipeline_state);
resource_handle_variant!(ComputePipelineState, ComputePipelineState, as_compute_pipeline_state);
resource_handle_variant!(VertexBuffer, VertexBuffer, as_vertex_buffer);
resource_handle_variant!(IndexBuffer, IndexBuffer, as_index_buffer);
resource_handle_variant!(UniformBuffer, UniformBuffer, as_uniform_buffer);
resource_handle_variant!(IndirectBuffer, IndirectBuffer, as_indirect_buffer);
resource_handle_variant!(VertexArray, VertexArray, as_vertex_array);
resource_handle_variant!(Texture2d, Texture2d, as_texture_2d);
resource_handle_variant!(SamplerState, SamplerState, as_sampler_state);
resource_handle_variant!(RenderPass, RenderPass, as_render_pass);
resource_handle_variant!(Framebuffer, Framebuffer, as_framebuffer);
resource_handle_variant!(SwapChain, SwapChain, as_swap_chain);
resource_handle_variant!(QueryPool, QueryPool, as_query_pool);

impl ResourceHandle {
    pub fn resource_type(&self) -> ResourceType {
        with_resource!(self, resource => resource.resource_type())
    }

    pub fn rhi_id(&self) -> RhiId {
        with_resource!(self, resource => resource.rhi_id())
    }

    pub fn debug_name(&self) -> &str {
        with_resource!(self, resource => resource.debug_name())
    }

    /// Framebuffers and swap chains can be rendered into
    pub fn as_render_target(&self) -> Option<RenderTarget> {
        match self {
            ResourceHandle::Framebuffer(framebuffer) => Some(RenderTarget::Framebuffer(framebuffer.clone())),
            ResourceHandle::SwapChain(swap_chain) => Some(RenderTarget::SwapChain(swap_chain.clone())),
            _ => None,
        }
    }
}

impl From<RenderTarget> for ResourceHandle {
    fn from(render_target: RenderTarget) -> Self {
        match render_target {
            RenderTarget::Framebuffer(framebuffer) => ResourceHandle::Framebuffer(framebuffer),
            RenderTarget::SwapChain(swap_chain) => ResourceHandle::SwapChain(swap_chain),
        }
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}(\"{}\")", self.resource_type(), self.debug_name())
    }
}
