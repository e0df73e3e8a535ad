/// Command definitions and the static dispatch table
///
/// Each command type offers a `create` function recording it into a command
/// buffer. At dispatch time, `DISPATCH_FUNCTIONS[index]` decodes the packet
/// and calls the matching handler method of the RHI.

use std::sync::Arc;
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use crate::rhi::{
    Rhi, CommandBuffer, CommandPacket, ResourceHandle, RenderTarget,
    RootSignature, ResourceGroup, GraphicsPipelineState, ComputePipelineState,
    VertexArray, IndirectBuffer, UniformBuffer, Texture2d, TextureFlags, Framebuffer, QueryPool,
};

// ============================================================================
// Dispatch function index
// ============================================================================

/// Identifies the handler of a command packet
///
/// The discriminant is the index into `DISPATCH_FUNCTIONS`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandDispatchFunctionIndex {
    // Command buffer
    ExecuteCommandBuffer = 0,
    // Graphics
    SetGraphicsRootSignature,
    SetGraphicsPipelineState,
    SetGraphicsResourceGroup,
    SetGraphicsVertexArray,
    SetGraphicsViewports,
    SetGraphicsScissorRectangles,
    SetGraphicsRenderTarget,
    ClearGraphics,
    DrawGraphics,
    DrawIndexedGraphics,
    // Compute
    SetComputeRootSignature,
    SetComputePipelineState,
    SetComputeResourceGroup,
    DispatchCompute,
    // Resource
    SetTextureMinimumMaximumMipmapIndex,
    ResolveMultisampleFramebuffer,
    CopyResource,
    GenerateMipmaps,
    CopyUniformBufferData,
    // Query
    ResetQueryPool,
    BeginQuery,
    EndQuery,
    WriteTimestampQuery,
    // Debug
    SetDebugMarker,
    BeginDebugEvent,
    EndDebugEvent,
}

impl CommandDispatchFunctionIndex {
    pub const COUNT: usize = 27;

    /// All indices, in discriminant order
    pub const ALL: [CommandDispatchFunctionIndex; Self::COUNT] = [
        Self::ExecuteCommandBuffer,
        Self::SetGraphicsRootSignature,
        Self::SetGraphicsPipelineState,
        Self::SetGraphicsResourceGroup,
        Self::SetGraphicsVertexArray,
        Self::SetGraphicsViewports,
        Self::SetGraphicsScissorRectangles,
        Self::SetGraphicsRenderTarget,
        Self::ClearGraphics,
        Self::DrawGraphics,
        Self::DrawIndexedGraphics,
        Self::SetComputeRootSignature,
        Self::SetComputePipelineState,
        Self::SetComputeResourceGroup,
        Self::DispatchCompute,
        Self::SetTextureMinimumMaximumMipmapIndex,
        Self::ResolveMultisampleFramebuffer,
        Self::CopyResource,
        Self::GenerateMipmaps,
        Self::CopyUniformBufferData,
        Self::ResetQueryPool,
        Self::BeginQuery,
        Self::EndQuery,
        Self::WriteTimestampQuery,
        Self::SetDebugMarker,
        Self::BeginDebugEvent,
        Self::EndDebugEvent,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

/// Decodes one packet and forwards it to the RHI
pub type DispatchFunction = fn(&CommandPacket<'_>, &mut dyn Rhi);

/// Handlers, indexed by `CommandDispatchFunctionIndex`
pub static DISPATCH_FUNCTIONS: [DispatchFunction; CommandDispatchFunctionIndex::COUNT] = [
    dispatch::execute_command_buffer,
    dispatch::set_graphics_root_signature,
    dispatch::set_graphics_pipeline_state,
    dispatch::set_graphics_resource_group,
    dispatch::set_graphics_vertex_array,
    dispatch::set_graphics_viewports,
    dispatch::set_graphics_scissor_rectangles,
    dispatch::set_graphics_render_target,
    dispatch::clear_graphics,
    dispatch::draw_graphics,
    dispatch::draw_indexed_graphics,
    dispatch::set_compute_root_signature,
    dispatch::set_compute_pipeline_state,
    dispatch::set_compute_resource_group,
    dispatch::dispatch_compute,
    dispatch::set_texture_minimum_maximum_mipmap_index,
    dispatch::resolve_multisample_framebuffer,
    dispatch::copy_resource,
    dispatch::generate_mipmaps,
    dispatch::copy_uniform_buffer_data,
    dispatch::reset_query_pool,
    dispatch::begin_query,
    dispatch::end_query,
    dispatch::write_timestamp_query,
    dispatch::set_debug_marker,
    dispatch::begin_debug_event,
    dispatch::end_debug_event,
];

// ============================================================================
// Inline data types
// ============================================================================

/// Viewport, in pixels
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering a whole render target
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle, in pixels
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ScissorRectangle {
    pub top_left_x: i32,
    pub top_left_y: i32,
    pub bottom_right_x: i32,
    pub bottom_right_y: i32,
}

/// Non-indexed draw arguments (same layout as the indirect buffer content)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    pub vertex_count_per_instance: u32,
    pub instance_count: u32,
    pub start_vertex_location: u32,
    pub start_instance_location: u32,
}

/// Indexed draw arguments (same layout as the indirect buffer content)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub start_instance_location: u32,
}

bitflags! {
    /// Which render target parts a clear touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR   = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
        const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

// ============================================================================
// Commands: command buffer
// ============================================================================

/// Execute another command buffer in place
pub struct ExecuteCommandBuffer;

impl ExecuteCommandBuffer {
    pub fn create(command_buffer: &mut CommandBuffer, command_buffer_to_execute: Arc<CommandBuffer>) {
        debug_assert!(!command_buffer_to_execute.is_empty(), "Can't execute an empty command buffer");
        command_buffer.add_command_buffer_command(
            CommandDispatchFunctionIndex::ExecuteCommandBuffer,
            command_buffer_to_execute,
        );
    }
}

// ============================================================================
// Commands: graphics
// ============================================================================

pub struct SetGraphicsRootSignature;

impl SetGraphicsRootSignature {
    pub fn create(command_buffer: &mut CommandBuffer, root_signature: Option<&Arc<dyn RootSignature>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetGraphicsRootSignature,
            &(),
            root_signature.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

pub struct SetGraphicsPipelineState;

impl SetGraphicsPipelineState {
    pub fn create(command_buffer: &mut CommandBuffer, graphics_pipeline_state: Option<&Arc<dyn GraphicsPipelineState>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetGraphicsPipelineState,
            &(),
            graphics_pipeline_state.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SetGraphicsResourceGroup {
    pub root_parameter_index: u32,
}

impl SetGraphicsResourceGroup {
    pub fn create(command_buffer: &mut CommandBuffer, root_parameter_index: u32, resource_group: Option<&Arc<dyn ResourceGroup>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetGraphicsResourceGroup,
            &SetGraphicsResourceGroup { root_parameter_index },
            resource_group.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

pub struct SetGraphicsVertexArray;

impl SetGraphicsVertexArray {
    pub fn create(command_buffer: &mut CommandBuffer, vertex_array: Option<&Arc<dyn VertexArray>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetGraphicsVertexArray,
            &(),
            vertex_array.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SetGraphicsViewports {
    pub number_of_viewports: u32,
}

impl SetGraphicsViewports {
    pub fn create(command_buffer: &mut CommandBuffer, viewports: &[Viewport]) {
        debug_assert!(!viewports.is_empty(), "At least one viewport is required");
        command_buffer.add_command_with_aux(
            CommandDispatchFunctionIndex::SetGraphicsViewports,
            &SetGraphicsViewports { number_of_viewports: viewports.len() as u32 },
            None,
            bytemuck::cast_slice(viewports),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SetGraphicsScissorRectangles {
    pub number_of_scissor_rectangles: u32,
}

impl SetGraphicsScissorRectangles {
    pub fn create(command_buffer: &mut CommandBuffer, scissor_rectangles: &[ScissorRectangle]) {
        debug_assert!(!scissor_rectangles.is_empty(), "At least one scissor rectangle is required");
        command_buffer.add_command_with_aux(
            CommandDispatchFunctionIndex::SetGraphicsScissorRectangles,
            &SetGraphicsScissorRectangles { number_of_scissor_rectangles: scissor_rectangles.len() as u32 },
            None,
            bytemuck::cast_slice(scissor_rectangles),
        );
    }
}

pub struct SetGraphicsRenderTarget;

impl SetGraphicsRenderTarget {
    pub fn create(command_buffer: &mut CommandBuffer, render_target: Option<&RenderTarget>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetGraphicsRenderTarget,
            &(),
            render_target.map(|render_target| ResourceHandle::from(render_target.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ClearGraphics {
    pub clear_flags: u32,
    pub color: [f32; 4],
    pub z: f32,
    pub stencil: u32,
}

impl ClearGraphics {
    pub fn create(command_buffer: &mut CommandBuffer, clear_flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32) {
        debug_assert!((0.0..=1.0).contains(&z), "Clear depth must be within [0, 1]");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::ClearGraphics,
            &ClearGraphics { clear_flags: clear_flags.bits(), color, z, stencil },
            None,
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DrawGraphics {
    pub indirect_buffer_offset: u32,
    pub number_of_draws: u32,
}

impl DrawGraphics {
    /// Draw with arguments stored in an indirect buffer
    pub fn create(command_buffer: &mut CommandBuffer, indirect_buffer: &Arc<dyn IndirectBuffer>, indirect_buffer_offset: u32, number_of_draws: u32) {
        debug_assert!(number_of_draws > 0, "Number of draws must not be zero");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::DrawGraphics,
            &DrawGraphics { indirect_buffer_offset, number_of_draws },
            Some(ResourceHandle::from(indirect_buffer.clone())),
        );
    }

    /// Draw with arguments recorded inline
    pub fn create_emulated(command_buffer: &mut CommandBuffer, draw_arguments: &[DrawArguments]) {
        debug_assert!(!draw_arguments.is_empty(), "Number of draws must not be zero");
        debug_assert!(
            draw_arguments.iter().all(|arguments| arguments.vertex_count_per_instance > 0 && arguments.instance_count > 0),
            "Zero-sized draw"
        );
        command_buffer.add_command_with_aux(
            CommandDispatchFunctionIndex::DrawGraphics,
            &DrawGraphics { indirect_buffer_offset: 0, number_of_draws: draw_arguments.len() as u32 },
            None,
            bytemuck::cast_slice(draw_arguments),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DrawIndexedGraphics {
    pub indirect_buffer_offset: u32,
    pub number_of_draws: u32,
}

impl DrawIndexedGraphics {
    /// Draw with arguments stored in an indirect buffer
    pub fn create(command_buffer: &mut CommandBuffer, indirect_buffer: &Arc<dyn IndirectBuffer>, indirect_buffer_offset: u32, number_of_draws: u32) {
        debug_assert!(number_of_draws > 0, "Number of draws must not be zero");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::DrawIndexedGraphics,
            &DrawIndexedGraphics { indirect_buffer_offset, number_of_draws },
            Some(ResourceHandle::from(indirect_buffer.clone())),
        );
    }

    /// Draw with arguments recorded inline
    pub fn create_emulated(command_buffer: &mut CommandBuffer, draw_indexed_arguments: &[DrawIndexedArguments]) {
        debug_assert!(!draw_indexed_arguments.is_empty(), "Number of draws must not be zero");
        debug_assert!(
            draw_indexed_arguments.iter().all(|arguments| arguments.index_count_per_instance > 0 && arguments.instance_count > 0),
            "Zero-sized draw"
        );
        command_buffer.add_command_with_aux(
            CommandDispatchFunctionIndex::DrawIndexedGraphics,
            &DrawIndexedGraphics { indirect_buffer_offset: 0, number_of_draws: draw_indexed_arguments.len() as u32 },
            None,
            bytemuck::cast_slice(draw_indexed_arguments),
        );
    }
}

// ============================================================================
// Commands: compute
// ============================================================================

pub struct SetComputeRootSignature;

impl SetComputeRootSignature {
    pub fn create(command_buffer: &mut CommandBuffer, root_signature: Option<&Arc<dyn RootSignature>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetComputeRootSignature,
            &(),
            root_signature.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

pub struct SetComputePipelineState;

impl SetComputePipelineState {
    pub fn create(command_buffer: &mut CommandBuffer, compute_pipeline_state: Option<&Arc<dyn ComputePipelineState>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetComputePipelineState,
            &(),
            compute_pipeline_state.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SetComputeResourceGroup {
    pub root_parameter_index: u32,
}

impl SetComputeResourceGroup {
    pub fn create(command_buffer: &mut CommandBuffer, root_parameter_index: u32, resource_group: Option<&Arc<dyn ResourceGroup>>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetComputeResourceGroup,
            &SetComputeResourceGroup { root_parameter_index },
            resource_group.map(|resource| ResourceHandle::from(resource.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DispatchCompute {
    pub group_count_x: u32,
    pub group_count_y: u32,
    pub group_count_z: u32,
}

impl DispatchCompute {
    pub fn create(command_buffer: &mut CommandBuffer, group_count_x: u32, group_count_y: u32, group_count_z: u32) {
        debug_assert!(group_count_x > 0 && group_count_y > 0 && group_count_z > 0, "Zero-sized dispatch");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::DispatchCompute,
            &DispatchCompute { group_count_x, group_count_y, group_count_z },
            None,
        );
    }
}

// ============================================================================
// Commands: resource
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SetTextureMinimumMaximumMipmapIndex {
    pub minimum_mipmap_index: u32,
    pub maximum_mipmap_index: u32,
}

impl SetTextureMinimumMaximumMipmapIndex {
    pub fn create(command_buffer: &mut CommandBuffer, texture: &Arc<dyn Texture2d>, minimum_mipmap_index: u32, maximum_mipmap_index: u32) {
        debug_assert!(minimum_mipmap_index <= maximum_mipmap_index, "Invalid mipmap index range");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::SetTextureMinimumMaximumMipmapIndex,
            &SetTextureMinimumMaximumMipmapIndex { minimum_mipmap_index, maximum_mipmap_index },
            Some(ResourceHandle::from(texture.clone())),
        );
    }
}

/// Resolve a multisample framebuffer into a single-sample render target
pub struct ResolveMultisampleFramebuffer;

impl ResolveMultisampleFramebuffer {
    pub fn create(command_buffer: &mut CommandBuffer, destination: &RenderTarget, source: &Arc<dyn Framebuffer>) {
        command_buffer.add_command(
            CommandDispatchFunctionIndex::ResolveMultisampleFramebuffer,
            &(),
            [ResourceHandle::from(destination.clone()), ResourceHandle::from(source.clone())],
        );
    }
}

pub struct CopyResource;

impl CopyResource {
    pub fn create(command_buffer: &mut CommandBuffer, destination: ResourceHandle, source: ResourceHandle) {
        debug_assert_eq!(destination.resource_type(), source.resource_type(), "Copy between different resource types");
        command_buffer.add_command(CommandDispatchFunctionIndex::CopyResource, &(), [destination, source]);
    }
}

pub struct GenerateMipmaps;

impl GenerateMipmaps {
    pub fn create(command_buffer: &mut CommandBuffer, texture: &Arc<dyn Texture2d>) {
        debug_assert!(
            texture.flags().contains(TextureFlags::GENERATE_MIPMAPS),
            "Texture \"{}\" was not created with GENERATE_MIPMAPS", texture.debug_name()
        );
        command_buffer.add_command(
            CommandDispatchFunctionIndex::GenerateMipmaps,
            &(),
            Some(ResourceHandle::from(texture.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CopyUniformBufferData {
    pub number_of_bytes: u32,
}

impl CopyUniformBufferData {
    pub fn create(command_buffer: &mut CommandBuffer, uniform_buffer: &Arc<dyn UniformBuffer>, data: &[u8]) {
        debug_assert!(data.len() as u32 <= uniform_buffer.number_of_bytes(), "Uniform buffer overflow");
        command_buffer.add_command_with_aux(
            CommandDispatchFunctionIndex::CopyUniformBufferData,
            &CopyUniformBufferData { number_of_bytes: data.len() as u32 },
            Some(ResourceHandle::from(uniform_buffer.clone())),
            data,
        );
    }
}

// ============================================================================
// Commands: query
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ResetQueryPool {
    pub first_query_index: u32,
    pub number_of_queries: u32,
}

impl ResetQueryPool {
    pub fn create(command_buffer: &mut CommandBuffer, query_pool: &Arc<dyn QueryPool>, first_query_index: u32, number_of_queries: u32) {
        debug_assert!(first_query_index + number_of_queries <= query_pool.number_of_queries(), "Query index out of range");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::ResetQueryPool,
            &ResetQueryPool { first_query_index, number_of_queries },
            Some(ResourceHandle::from(query_pool.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BeginQuery {
    pub query_index: u32,
    pub query_control_flags: u32,
}

impl BeginQuery {
    pub fn create(command_buffer: &mut CommandBuffer, query_pool: &Arc<dyn QueryPool>, query_index: u32, query_control_flags: u32) {
        debug_assert!(query_index < query_pool.number_of_queries(), "Query index out of range");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::BeginQuery,
            &BeginQuery { query_index, query_control_flags },
            Some(ResourceHandle::from(query_pool.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct EndQuery {
    pub query_index: u32,
}

impl EndQuery {
    pub fn create(command_buffer: &mut CommandBuffer, query_pool: &Arc<dyn QueryPool>, query_index: u32) {
        debug_assert!(query_index < query_pool.number_of_queries(), "Query index out of range");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::EndQuery,
            &EndQuery { query_index },
            Some(ResourceHandle::from(query_pool.clone())),
        );
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct WriteTimestampQuery {
    pub query_index: u32,
}

impl WriteTimestampQuery {
    pub fn create(command_buffer: &mut CommandBuffer, query_pool: &Arc<dyn QueryPool>, query_index: u32) {
        debug_assert!(query_index < query_pool.number_of_queries(), "Query index out of range");
        command_buffer.add_command(
            CommandDispatchFunctionIndex::WriteTimestampQuery,
            &WriteTimestampQuery { query_index },
            Some(ResourceHandle::from(query_pool.clone())),
        );
    }
}

// ============================================================================
// Commands: debug
// ============================================================================

pub struct SetDebugMarker;

impl SetDebugMarker {
    pub fn create(command_buffer: &mut CommandBuffer, name: &str) {
        command_buffer.add_command_with_aux(CommandDispatchFunctionIndex::SetDebugMarker, &(), None, name.as_bytes());
    }
}

pub struct BeginDebugEvent;

impl BeginDebugEvent {
    pub fn create(command_buffer: &mut CommandBuffer, name: &str) {
        command_buffer.add_command_with_aux(CommandDispatchFunctionIndex::BeginDebugEvent, &(), None, name.as_bytes());
    }
}

pub struct EndDebugEvent;

impl EndDebugEvent {
    pub fn create(command_buffer: &mut CommandBuffer) {
        command_buffer.add_command(CommandDispatchFunctionIndex::EndDebugEvent, &(), None);
    }
}

// ============================================================================
// Dispatch functions
// ============================================================================

mod dispatch {
    use super::*;

    pub(super) fn execute_command_buffer(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let Some(command_buffer) = packet.command_buffer(0) else {
            debug_assert!(false, "ExecuteCommandBuffer without command buffer");
            return;
        };
        rhi.execute_command_buffer(command_buffer);
    }

    pub(super) fn set_graphics_root_signature(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.set_graphics_root_signature(packet.resource(0).and_then(ResourceHandle::as_root_signature));
    }

    pub(super) fn set_graphics_pipeline_state(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.set_graphics_pipeline_state(packet.resource(0).and_then(ResourceHandle::as_graphics_pipeline_state));
    }

    pub(super) fn set_graphics_resource_group(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: SetGraphicsResourceGroup = packet.command();
        rhi.set_graphics_resource_group(
            command.root_parameter_index,
            packet.resource(0).and_then(ResourceHandle::as_resource_group),
        );
    }

    pub(super) fn set_graphics_vertex_array(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.set_graphics_vertex_array(packet.resource(0).and_then(ResourceHandle::as_vertex_array));
    }

    pub(super) fn set_graphics_viewports(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: SetGraphicsViewports = packet.command();
        let viewports = packet.auxiliary_elements::<Viewport>();
        debug_assert_eq!(viewports.len(), command.number_of_viewports as usize);
        rhi.set_graphics_viewports(&viewports);
    }

    pub(super) fn set_graphics_scissor_rectangles(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: SetGraphicsScissorRectangles = packet.command();
        let scissor_rectangles = packet.auxiliary_elements::<ScissorRectangle>();
        debug_assert_eq!(scissor_rectangles.len(), command.number_of_scissor_rectangles as usize);
        rhi.set_graphics_scissor_rectangles(&scissor_rectangles);
    }

    pub(super) fn set_graphics_render_target(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let render_target = packet.resource(0).and_then(ResourceHandle::as_render_target);
        rhi.set_graphics_render_target(render_target.as_ref());
    }

    pub(super) fn clear_graphics(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: ClearGraphics = packet.command();
        rhi.clear_graphics(
            ClearFlags::from_bits_truncate(command.clear_flags),
            command.color,
            command.z,
            command.stencil,
        );
    }

    pub(super) fn draw_graphics(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: DrawGraphics = packet.command();
        match packet.resource(0).and_then(ResourceHandle::as_indirect_buffer) {
            Some(indirect_buffer) => {
                rhi.draw_graphics(indirect_buffer, command.indirect_buffer_offset, command.number_of_draws)
            }
            None => rhi.draw_graphics_emulated(&packet.auxiliary_elements::<DrawArguments>()),
        }
    }

    pub(super) fn draw_indexed_graphics(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: DrawIndexedGraphics = packet.command();
        match packet.resource(0).and_then(ResourceHandle::as_indirect_buffer) {
            Some(indirect_buffer) => {
                rhi.draw_indexed_graphics(indirect_buffer, command.indirect_buffer_offset, command.number_of_draws)
            }
            None => rhi.draw_indexed_graphics_emulated(&packet.auxiliary_elements::<DrawIndexedArguments>()),
        }
    }

    pub(super) fn set_compute_root_signature(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.set_compute_root_signature(packet.resource(0).and_then(ResourceHandle::as_root_signature));
    }

    pub(super) fn set_compute_pipeline_state(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.set_compute_pipeline_state(packet.resource(0).and_then(ResourceHandle::as_compute_pipeline_state));
    }

    pub(super) fn set_compute_resource_group(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: SetComputeResourceGroup = packet.command();
        rhi.set_compute_resource_group(
            command.root_parameter_index,
            packet.resource(0).and_then(ResourceHandle::as_resource_group),
        );
    }

    pub(super) fn dispatch_compute(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: DispatchCompute = packet.command();
        rhi.dispatch_compute(command.group_count_x, command.group_count_y, command.group_count_z);
    }

    pub(super) fn set_texture_minimum_maximum_mipmap_index(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: SetTextureMinimumMaximumMipmapIndex = packet.command();
        let Some(texture) = packet.resource(0).and_then(ResourceHandle::as_texture_2d) else {
            debug_assert!(false, "SetTextureMinimumMaximumMipmapIndex without texture");
            return;
        };
        rhi.set_texture_minimum_maximum_mipmap_index(texture, command.minimum_mipmap_index, command.maximum_mipmap_index);
    }

    pub(super) fn resolve_multisample_framebuffer(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let destination = packet.resource(0).and_then(ResourceHandle::as_render_target);
        let source = packet.resource(1).and_then(ResourceHandle::as_framebuffer);
        let (Some(destination), Some(source)) = (destination, source) else {
            debug_assert!(false, "ResolveMultisampleFramebuffer needs a destination and a source");
            return;
        };
        rhi.resolve_multisample_framebuffer(&destination, source);
    }

    pub(super) fn copy_resource(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let (Some(destination), Some(source)) = (packet.resource(0), packet.resource(1)) else {
            debug_assert!(false, "CopyResource needs a destination and a source");
            return;
        };
        rhi.copy_resource(destination, source);
    }

    pub(super) fn generate_mipmaps(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let Some(texture) = packet.resource(0).and_then(ResourceHandle::as_texture_2d) else {
            debug_assert!(false, "GenerateMipmaps without texture");
            return;
        };
        rhi.generate_mipmaps(texture);
    }

    pub(super) fn copy_uniform_buffer_data(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: CopyUniformBufferData = packet.command();
        let Some(uniform_buffer) = packet.resource(0).and_then(ResourceHandle::as_uniform_buffer) else {
            debug_assert!(false, "CopyUniformBufferData without uniform buffer");
            return;
        };
        debug_assert_eq!(packet.auxiliary().len(), command.number_of_bytes as usize);
        rhi.copy_uniform_buffer_data(uniform_buffer, packet.auxiliary());
    }

    pub(super) fn reset_query_pool(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: ResetQueryPool = packet.command();
        if let Some(query_pool) = packet.resource(0).and_then(ResourceHandle::as_query_pool) {
            rhi.reset_query_pool(query_pool, command.first_query_index, command.number_of_queries);
        }
    }

    pub(super) fn begin_query(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: BeginQuery = packet.command();
        if let Some(query_pool) = packet.resource(0).and_then(ResourceHandle::as_query_pool) {
            rhi.begin_query(query_pool, command.query_index, command.query_control_flags);
        }
    }

    pub(super) fn end_query(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: EndQuery = packet.command();
        if let Some(query_pool) = packet.resource(0).and_then(ResourceHandle::as_query_pool) {
            rhi.end_query(query_pool, command.query_index);
        }
    }

    pub(super) fn write_timestamp_query(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        let command: WriteTimestampQuery = packet.command();
        if let Some(query_pool) = packet.resource(0).and_then(ResourceHandle::as_query_pool) {
            rhi.write_timestamp_query(query_pool, command.query_index);
        }
    }

    pub(super) fn set_debug_marker(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.set_debug_marker(std::str::from_utf8(packet.auxiliary()).unwrap_or_default());
    }

    pub(super) fn begin_debug_event(packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.begin_debug_event(std::str::from_utf8(packet.auxiliary()).unwrap_or_default());
    }

    pub(super) fn end_debug_event(_packet: &CommandPacket<'_>, rhi: &mut dyn Rhi) {
        rhi.end_debug_event();
    }
}
