/// Root signatures, resource groups, pipeline states, samplers and query pools

use std::sync::Arc;
use crate::rhi::{Resource, ResourceHandle, RenderPass};

// ===== ROOT SIGNATURE =====

/// Kind of a root signature parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootParameterType {
    /// Table of descriptors, bound through a resource group
    DescriptorTable,
    /// Inline 32-bit constants
    Constants32Bit,
}

/// One root signature parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootParameter {
    pub parameter_type: RootParameterType,
    /// Number of descriptors (tables) or of 32-bit values (constants)
    pub count: u32,
}

/// Descriptor for creating a root signature
#[derive(Debug, Clone, Default)]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
    pub debug_name: String,
}

/// Root signature resource: layout of the resources a pipeline consumes
pub trait RootSignature: Resource {
    fn parameters(&self) -> &[RootParameter];
}

// ===== RESOURCE GROUP =====

/// Descriptor for creating a resource group
#[derive(Clone)]
pub struct ResourceGroupDesc {
    /// Root signature the group is laid out for
    pub root_signature: Arc<dyn RootSignature>,
    /// Root parameter index the group binds to
    pub root_parameter_index: u32,
    /// Resources, in descriptor order
    pub resources: Vec<ResourceHandle>,
    /// Optional sampler per resource (same length as `resources` when present)
    pub sampler_states: Vec<Option<ResourceHandle>>,
    pub debug_name: String,
}

/// Resource group resource: a set of resources bound together
pub trait ResourceGroup: Resource {
    fn root_parameter_index(&self) -> u32;

    fn resources(&self) -> &[ResourceHandle];
}

// ===== PIPELINE STATES =====

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
    TriangleStrip,
}

/// Descriptor for creating a graphics pipeline state
#[derive(Clone)]
pub struct GraphicsPipelineStateDesc {
    pub root_signature: Arc<dyn RootSignature>,
    /// Render pass the pipeline will be used with
    pub render_pass: Arc<dyn RenderPass>,
    pub primitive_topology: PrimitiveTopology,
    pub debug_name: String,
}

/// Graphics pipeline state resource
pub trait GraphicsPipelineState: Resource {
    /// Compact ID, usable as a flat array index
    fn id(&self) -> u32;

    fn root_signature(&self) -> &Arc<dyn RootSignature>;

    fn render_pass(&self) -> &Arc<dyn RenderPass>;
}

/// Descriptor for creating a compute pipeline state
#[derive(Clone)]
pub struct ComputePipelineStateDesc {
    pub root_signature: Arc<dyn RootSignature>,
    pub debug_name: String,
}

/// Compute pipeline state resource
pub trait ComputePipelineState: Resource {
    /// Compact ID, usable as a flat array index
    fn id(&self) -> u32;

    fn root_signature(&self) -> &Arc<dyn RootSignature>;
}

// ===== SAMPLER =====

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Point,
    Linear,
    Anisotropic,
}

/// Texture addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureAddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Descriptor for creating a sampler state
#[derive(Debug, Clone)]
pub struct SamplerStateDesc {
    pub filter: FilterMode,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub max_anisotropy: u32,
    pub min_lod: f32,
    pub max_lod: f32,
    pub debug_name: String,
}

impl Default for SamplerStateDesc {
    fn default() -> Self {
        Self {
            filter: FilterMode::Linear,
            address_u: TextureAddressMode::Wrap,
            address_v: TextureAddressMode::Wrap,
            max_anisotropy: 1,
            min_lod: 0.0,
            max_lod: f32::MAX,
            debug_name: String::new(),
        }
    }
}

/// Sampler state resource
pub trait SamplerState: Resource {
    fn desc(&self) -> &SamplerStateDesc;
}

// ===== QUERY POOL =====

/// Kind of queries a pool holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Occlusion,
    PipelineStatistics,
    Timestamp,
}

/// Descriptor for creating a query pool
#[derive(Debug, Clone)]
pub struct QueryPoolDesc {
    pub query_type: QueryType,
    pub number_of_queries: u32,
    pub debug_name: String,
}

/// Query pool resource
pub trait QueryPool: Resource {
    fn query_type(&self) -> QueryType;

    fn number_of_queries(&self) -> u32;
}
