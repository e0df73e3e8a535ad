/// Rhi trait - backend-agnostic GPU interface
///
/// An RHI is a resource factory plus the backend side of command dispatch:
/// one handler method per command kind. Command buffers are recorded without
/// any RHI and dispatched against one later (see `CommandBuffer`).

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::Result;
use crate::engine_err;
use crate::rhi::{
    RhiId, ResourceType, ResourceHandle, CommandBuffer, RenderTarget,
    RootSignature, RootSignatureDesc, ResourceGroup, ResourceGroupDesc,
    GraphicsPipelineState, GraphicsPipelineStateDesc,
    ComputePipelineState, ComputePipelineStateDesc,
    VertexBuffer, IndexBuffer, IndexBufferFormat, UniformBuffer, IndirectBuffer, BufferDesc,
    VertexArray, VertexArrayDesc, Texture2d, TextureDesc, SamplerState, SamplerStateDesc,
    RenderPass, RenderPassDesc, Framebuffer, FramebufferDesc, SwapChain, SwapChainDesc,
    QueryPool, QueryPoolDesc, Viewport, ScissorRectangle, ClearFlags,
    DrawArguments, DrawIndexedArguments,
};

static NEXT_RHI_ID: AtomicU32 = AtomicU32::new(0);

impl RhiId {
    /// Reserve a new, process-unique RHI instance id
    pub fn allocate() -> Self {
        RhiId(NEXT_RHI_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// What the backend supports, queried once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhiCapabilities {
    /// Maximum number of multisamples (1 = no MSAA)
    pub maximum_number_of_multisamples: u8,
    /// Maximum number of simultaneously bound color attachments
    pub maximum_number_of_simultaneous_render_targets: u32,
    /// Maximum width/height of a 2D texture
    pub maximum_texture_dimension: u32,
    /// Resources may be created from worker threads
    pub native_multithreading: bool,
    /// Shaders receive a draw ID natively
    pub draw_id: bool,
}

impl Default for RhiCapabilities {
    fn default() -> Self {
        Self {
            maximum_number_of_multisamples: 8,
            maximum_number_of_simultaneous_render_targets: 8,
            maximum_texture_dimension: 16384,
            native_multithreading: false,
            draw_id: false,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Live and total resource counts per resource type
///
/// Shared between an RHI and every resource it created, so destruction can
/// be accounted for no matter which owner drops the last reference.
#[derive(Debug)]
pub struct RhiStatistics {
    current: [AtomicU32; ResourceType::COUNT],
    created: [AtomicU64; ResourceType::COUNT],
}

impl RhiStatistics {
    pub fn new() -> Self {
        Self {
            current: std::array::from_fn(|_| AtomicU32::new(0)),
            created: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Number of live resources of this type
    pub fn current(&self, resource_type: ResourceType) -> u32 {
        self.current[resource_type.index()].load(Ordering::Relaxed)
    }

    /// Number of resources of this type created so far
    pub fn created(&self, resource_type: ResourceType) -> u64 {
        self.created[resource_type.index()].load(Ordering::Relaxed)
    }

    /// Number of live resources of all types
    pub fn total_current(&self) -> u32 {
        self.current.iter().map(|count| count.load(Ordering::Relaxed)).sum()
    }

    fn resource_created(&self, resource_type: ResourceType) {
        self.current[resource_type.index()].fetch_add(1, Ordering::Relaxed);
        self.created[resource_type.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn resource_destroyed(&self, resource_type: ResourceType) {
        self.current[resource_type.index()].fetch_sub(1, Ordering::Relaxed);
    }
}

impl Default for RhiStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifetime token embedded in backend resources
///
/// Counts the resource as live on creation and as destroyed when dropped.
#[derive(Debug)]
pub struct ResourceLifetime {
    statistics: Arc<RhiStatistics>,
    resource_type: ResourceType,
}

impl ResourceLifetime {
    pub fn new(statistics: &Arc<RhiStatistics>, resource_type: ResourceType) -> Self {
        statistics.resource_created(resource_type);
        Self { statistics: statistics.clone(), resource_type }
    }
}

impl Drop for ResourceLifetime {
    fn drop(&mut self) {
        self.statistics.resource_destroyed(self.resource_type);
    }
}

// ============================================================================
// Rhi trait
// ============================================================================

/// Backend-agnostic rendering hardware interface
///
/// Shared as `Arc<Mutex<dyn Rhi>>`; every method must be called from the
/// thread currently owning the lock. Invalid usage (resources of another RHI,
/// out of range root parameters, zero-sized draws) is caught by debug
/// assertions only.
pub trait Rhi: Send {
    // ===== INFORMATION =====

    /// Backend name (e.g. "Null")
    fn name(&self) -> &str;

    /// Instance id, stored in every resource created by this RHI
    fn rhi_id(&self) -> RhiId;

    fn capabilities(&self) -> &RhiCapabilities;

    fn statistics(&self) -> &Arc<RhiStatistics>;

    // ===== RESOURCE FACTORIES =====

    fn create_root_signature(&mut self, desc: &RootSignatureDesc) -> Result<Arc<dyn RootSignature>>;

    fn create_resource_group(&mut self, desc: ResourceGroupDesc) -> Result<Arc<dyn ResourceGroup>>;

    fn create_graphics_pipeline_state(&mut self, desc: GraphicsPipelineStateDesc) -> Result<Arc<dyn GraphicsPipelineState>>;

    fn create_compute_pipeline_state(&mut self, desc: ComputePipelineStateDesc) -> Result<Arc<dyn ComputePipelineState>>;

    fn create_vertex_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn VertexBuffer>>;

    fn create_index_buffer(&mut self, desc: &BufferDesc, format: IndexBufferFormat) -> Result<Arc<dyn IndexBuffer>>;

    fn create_uniform_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn UniformBuffer>>;

    fn create_indirect_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn IndirectBuffer>>;

    /// Create a vertex array
    ///
    /// On failure (e.g. no vertex array ID left) the buffer references held
    /// by `desc` are released again.
    fn create_vertex_array(&mut self, desc: VertexArrayDesc) -> Result<Arc<dyn VertexArray>>;

    fn create_texture_2d(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture2d>>;

    fn create_sampler_state(&mut self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>>;

    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    fn create_framebuffer(&mut self, desc: FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    fn create_swap_chain(&mut self, desc: &SwapChainDesc) -> Result<Arc<dyn SwapChain>>;

    fn create_query_pool(&mut self, desc: &QueryPoolDesc) -> Result<Arc<dyn QueryPool>>;

    // ===== FRAME =====

    /// Begin a scene, returns false if rendering is not possible right now
    fn begin_scene(&mut self) -> bool;

    fn end_scene(&mut self);

    /// Dispatch a non-empty command buffer against this RHI
    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer);

    // ===== COMMAND HANDLERS: COMMAND BUFFER =====

    fn execute_command_buffer(&mut self, command_buffer: &CommandBuffer);

    // ===== COMMAND HANDLERS: GRAPHICS =====

    fn set_graphics_root_signature(&mut self, root_signature: Option<&Arc<dyn RootSignature>>);

    fn set_graphics_pipeline_state(&mut self, graphics_pipeline_state: Option<&Arc<dyn GraphicsPipelineState>>);

    fn set_graphics_resource_group(&mut self, root_parameter_index: u32, resource_group: Option<&Arc<dyn ResourceGroup>>);

    fn set_graphics_vertex_array(&mut self, vertex_array: Option<&Arc<dyn VertexArray>>);

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]);

    fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]);

    fn set_graphics_render_target(&mut self, render_target: Option<&RenderTarget>);

    fn clear_graphics(&mut self, clear_flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32);

    /// Draw with arguments read from an indirect buffer
    fn draw_graphics(&mut self, indirect_buffer: &Arc<dyn IndirectBuffer>, indirect_buffer_offset: u32, number_of_draws: u32);

    /// Draw with arguments recorded inline in the command buffer
    fn draw_graphics_emulated(&mut self, draw_arguments: &[DrawArguments]);

    fn draw_indexed_graphics(&mut self, indirect_buffer: &Arc<dyn IndirectBuffer>, indirect_buffer_offset: u32, number_of_draws: u32);

    fn draw_indexed_graphics_emulated(&mut self, draw_indexed_arguments: &[DrawIndexedArguments]);

    // ===== COMMAND HANDLERS: COMPUTE =====

    fn set_compute_root_signature(&mut self, root_signature: Option<&Arc<dyn RootSignature>>);

    fn set_compute_pipeline_state(&mut self, compute_pipeline_state: Option<&Arc<dyn ComputePipelineState>>);

    fn set_compute_resource_group(&mut self, root_parameter_index: u32, resource_group: Option<&Arc<dyn ResourceGroup>>);

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32);

    // ===== COMMAND HANDLERS: RESOURCE =====

    fn set_texture_minimum_maximum_mipmap_index(&mut self, texture: &Arc<dyn Texture2d>, minimum_mipmap_index: u32, maximum_mipmap_index: u32);

    fn resolve_multisample_framebuffer(&mut self, destination: &RenderTarget, source: &Arc<dyn Framebuffer>);

    fn copy_resource(&mut self, destination: &ResourceHandle, source: &ResourceHandle);

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture2d>);

    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<dyn UniformBuffer>, data: &[u8]);

    // ===== COMMAND HANDLERS: QUERY =====

    fn reset_query_pool(&mut self, query_pool: &Arc<dyn QueryPool>, first_query_index: u32, number_of_queries: u32);

    fn begin_query(&mut self, query_pool: &Arc<dyn QueryPool>, query_index: u32, query_control_flags: u32);

    fn end_query(&mut self, query_pool: &Arc<dyn QueryPool>, query_index: u32);

    fn write_timestamp_query(&mut self, query_pool: &Arc<dyn QueryPool>, query_index: u32);

    // ===== COMMAND HANDLERS: DEBUG =====

    fn set_debug_marker(&mut self, name: &str);

    fn begin_debug_event(&mut self, name: &str);

    fn end_debug_event(&mut self);
}

/// Lock a shared RHI, turning lock poisoning into an engine error
pub fn lock_rhi(rhi: &Mutex<dyn Rhi>) -> Result<MutexGuard<'_, dyn Rhi + 'static>> {
    rhi.lock()
        .map_err(|_| engine_err!("nebula3d::Rhi", "RHI lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rhi_ids_are_unique() {
        let a = RhiId::allocate();
        let b = RhiId::allocate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_resource_lifetime_updates_statistics() {
        let statistics = Arc::new(RhiStatistics::new());
        let first = ResourceLifetime::new(&statistics, ResourceType::Texture2d);
        let second = ResourceLifetime::new(&statistics, ResourceType::Texture2d);
        assert_eq!(statistics.current(ResourceType::Texture2d), 2);
        drop(first);
        assert_eq!(statistics.current(ResourceType::Texture2d), 1);
        assert_eq!(statistics.created(ResourceType::Texture2d), 2);
        drop(second);
        assert_eq!(statistics.total_current(), 0);
    }
}
