/// Buffer resources and vertex arrays

use std::sync::Arc;
use crate::rhi::Resource;

/// Index element format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBufferFormat {
    UnsignedShort,
    UnsignedInt,
}

impl IndexBufferFormat {
    /// Size of one index in bytes
    pub fn bytes_per_element(self) -> u32 {
        match self {
            IndexBufferFormat::UnsignedShort => 2,
            IndexBufferFormat::UnsignedInt => 4,
        }
    }
}

/// Descriptor for creating any kind of buffer
#[derive(Debug, Clone, Default)]
pub struct BufferDesc {
    /// Size in bytes
    pub number_of_bytes: u32,
    /// Initial data (must not exceed `number_of_bytes`)
    pub data: Option<Vec<u8>>,
    /// Debug name
    pub debug_name: String,
}

impl BufferDesc {
    pub fn new(number_of_bytes: u32, debug_name: &str) -> Self {
        Self {
            number_of_bytes,
            data: None,
            debug_name: debug_name.to_string(),
        }
    }
}

/// Vertex buffer resource
pub trait VertexBuffer: Resource {
    fn number_of_bytes(&self) -> u32;
}

/// Index buffer resource
pub trait IndexBuffer: Resource {
    fn number_of_bytes(&self) -> u32;
    fn format(&self) -> IndexBufferFormat;
}

/// Uniform (constant) buffer resource
pub trait UniformBuffer: Resource {
    fn number_of_bytes(&self) -> u32;
}

/// Indirect buffer resource holding draw or dispatch arguments
pub trait IndirectBuffer: Resource {
    fn number_of_bytes(&self) -> u32;
}

/// Descriptor for creating a vertex array
///
/// The vertex array keeps references to its buffers for its whole lifetime.
#[derive(Clone)]
pub struct VertexArrayDesc {
    pub vertex_buffers: Vec<Arc<dyn VertexBuffer>>,
    pub index_buffer: Option<Arc<dyn IndexBuffer>>,
    pub debug_name: String,
}

/// Vertex array resource (vertex buffers plus optional index buffer)
pub trait VertexArray: Resource {
    /// Compact ID, usable as a flat array index
    fn id(&self) -> u32;

    fn vertex_buffers(&self) -> &[Arc<dyn VertexBuffer>];

    fn index_buffer(&self) -> Option<&Arc<dyn IndexBuffer>>;
}
