/// NullRhi - RHI implementation without GPU

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::utils::MakeId;
use crate::{engine_bail, engine_err, engine_error, engine_info, engine_warn};
use crate::rhi::{
    Rhi, RhiId, RhiCapabilities, RhiStatistics, ResourceLifetime, ResourceType, ResourceHandle,
    CommandBuffer, CommandDispatchFunctionIndex, RenderTarget,
    RootSignature, RootSignatureDesc, ResourceGroup, ResourceGroupDesc,
    GraphicsPipelineState, GraphicsPipelineStateDesc, ComputePipelineState, ComputePipelineStateDesc,
    VertexBuffer, IndexBuffer, IndexBufferFormat, UniformBuffer, IndirectBuffer, BufferDesc,
    VertexArray, VertexArrayDesc, Texture2d, TextureDesc, TextureFlags, SamplerState, SamplerStateDesc,
    RenderPass, RenderPassDesc, Framebuffer, FramebufferDesc, SwapChain, SwapChainDesc,
    QueryPool, QueryPoolDesc, Viewport, ScissorRectangle, ClearFlags,
    DrawArguments, DrawIndexedArguments, MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS, number_of_mipmaps,
};
use super::null_resources::*;

// ============================================================================
// Configuration
// ============================================================================

/// Null RHI configuration
#[derive(Debug, Clone)]
pub struct NullRhiConfig {
    /// Capabilities advertised to the renderer
    pub capabilities: RhiCapabilities,
    /// Highest vertex array ID (IDs are 0..=max)
    pub maximum_vertex_array_id: u32,
    /// Highest graphics pipeline state ID
    pub maximum_graphics_pipeline_state_id: u32,
    /// Highest compute pipeline state ID
    pub maximum_compute_pipeline_state_id: u32,
}

impl Default for NullRhiConfig {
    fn default() -> Self {
        Self {
            capabilities: RhiCapabilities::default(),
            maximum_vertex_array_id: u16::MAX as u32,
            maximum_graphics_pipeline_state_id: u16::MAX as u32,
            maximum_compute_pipeline_state_id: u16::MAX as u32,
        }
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// What the Null RHI has been asked to do
///
/// Shared with the swap chains it creates, so presents are recorded too.
/// Grab it with `NullRhi::recorder()` before handing the RHI over.
#[derive(Debug, Default)]
pub struct NullRhiRecorder {
    dispatched_commands: Mutex<Vec<CommandDispatchFunctionIndex>>,
    number_of_presents: AtomicU32,
    number_of_begin_scenes: AtomicU32,
    number_of_end_scenes: AtomicU32,
    number_of_submitted_command_buffers: AtomicU32,
    number_of_uploaded_uniform_bytes: AtomicU64,
    inside_scene: AtomicBool,
}

impl NullRhiRecorder {
    /// Handlers invoked so far, in invocation order
    pub fn dispatched_commands(&self) -> Vec<CommandDispatchFunctionIndex> {
        self.dispatched_commands.lock().map(|commands| commands.clone()).unwrap_or_default()
    }

    /// How many times `command` has been dispatched
    pub fn count(&self, command: CommandDispatchFunctionIndex) -> usize {
        self.dispatched_commands
            .lock()
            .map(|commands| commands.iter().filter(|dispatched| **dispatched == command).count())
            .unwrap_or(0)
    }

    pub fn number_of_presents(&self) -> u32 {
        self.number_of_presents.load(Ordering::Relaxed)
    }

    pub fn number_of_begin_scenes(&self) -> u32 {
        self.number_of_begin_scenes.load(Ordering::Relaxed)
    }

    pub fn number_of_end_scenes(&self) -> u32 {
        self.number_of_end_scenes.load(Ordering::Relaxed)
    }

    pub fn number_of_submitted_command_buffers(&self) -> u32 {
        self.number_of_submitted_command_buffers.load(Ordering::Relaxed)
    }

    pub fn number_of_uploaded_uniform_bytes(&self) -> u64 {
        self.number_of_uploaded_uniform_bytes.load(Ordering::Relaxed)
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        if let Ok(mut commands) = self.dispatched_commands.lock() {
            commands.clear();
        }
        self.number_of_presents.store(0, Ordering::Relaxed);
        self.number_of_begin_scenes.store(0, Ordering::Relaxed);
        self.number_of_end_scenes.store(0, Ordering::Relaxed);
        self.number_of_submitted_command_buffers.store(0, Ordering::Relaxed);
        self.number_of_uploaded_uniform_bytes.store(0, Ordering::Relaxed);
    }

    fn record(&self, command: CommandDispatchFunctionIndex) {
        if let Ok(mut commands) = self.dispatched_commands.lock() {
            commands.push(command);
        }
    }

    pub(crate) fn record_present(&self) {
        debug_assert!(!self.inside_scene.load(Ordering::Relaxed), "Present must happen outside begin/end scene");
        self.number_of_presents.fetch_add(1, Ordering::Relaxed);
    }
}

// ============================================================================
// NullRhi
// ============================================================================

/// RHI backend that validates and records but renders nothing
pub struct NullRhi {
    rhi_id: RhiId,
    capabilities: RhiCapabilities,
    statistics: Arc<RhiStatistics>,
    recorder: Arc<NullRhiRecorder>,
    vertex_array_ids: Arc<Mutex<MakeId>>,
    graphics_pipeline_state_ids: Arc<Mutex<MakeId>>,
    compute_pipeline_state_ids: Arc<Mutex<MakeId>>,
    graphics_root_signature: Option<Arc<dyn RootSignature>>,
    compute_root_signature: Option<Arc<dyn RootSignature>>,
    render_target: Option<RenderTarget>,
    debug_event_depth: u32,
}

impl NullRhi {
    pub fn new(config: NullRhiConfig) -> Self {
        let rhi_id = RhiId::allocate();
        engine_info!("nebula3d::NullRhi", "Null RHI created (instance {})", rhi_id.id());
        Self {
            rhi_id,
            capabilities: config.capabilities,
            statistics: Arc::new(RhiStatistics::new()),
            recorder: Arc::new(NullRhiRecorder::default()),
            vertex_array_ids: Arc::new(Mutex::new(MakeId::new(config.maximum_vertex_array_id))),
            graphics_pipeline_state_ids: Arc::new(Mutex::new(MakeId::new(config.maximum_graphics_pipeline_state_id))),
            compute_pipeline_state_ids: Arc::new(Mutex::new(MakeId::new(config.maximum_compute_pipeline_state_id))),
            graphics_root_signature: None,
            compute_root_signature: None,
            render_target: None,
            debug_event_depth: 0,
        }
    }

    /// Recorder shared with this RHI and its swap chains
    pub fn recorder(&self) -> Arc<NullRhiRecorder> {
        self.recorder.clone()
    }

    /// Wrap into the shared form consumed by the renderer
    pub fn into_shared(self) -> Arc<Mutex<dyn Rhi>> {
        Arc::new(Mutex::new(self))
    }

    /// Currently bound graphics render target
    pub fn render_target(&self) -> Option<&RenderTarget> {
        self.render_target.as_ref()
    }

    fn base(&self, debug_name: &str, resource_type: ResourceType) -> NullResourceBase {
        NullResourceBase::new(self.rhi_id, debug_name, ResourceLifetime::new(&self.statistics, resource_type))
    }

    fn check_owner(&self, rhi_id: RhiId, debug_name: &str) {
        debug_assert_eq!(
            rhi_id, self.rhi_id,
            "Resource \"{}\" belongs to another RHI instance", debug_name
        );
    }

    fn clamp_multisamples(&self, number_of_multisamples: u8) -> u8 {
        debug_assert!(
            matches!(number_of_multisamples, 1 | 2 | 4 | 8),
            "Invalid number of multisamples {}", number_of_multisamples
        );
        number_of_multisamples.clamp(1, self.capabilities.maximum_number_of_multisamples.max(1))
    }

    fn allocate_id(ids: &Arc<Mutex<MakeId>>, kind: &str) -> Result<CompactId> {
        let id = ids
            .lock()
            .map_err(|_| engine_err!("nebula3d::NullRhi", "{} ID allocator lock poisoned", kind))?
            .create_id();
        match id {
            Some(id) => Ok(CompactId::new(id, ids.clone())),
            None => {
                engine_error!("nebula3d::NullRhi", "No free {} ID left", kind);
                Err(Error::OutOfMemory)
            }
        }
    }

    fn check_root_parameter_index(root_signature: Option<&Arc<dyn RootSignature>>, root_parameter_index: u32) {
        debug_assert!(root_signature.is_some(), "No root signature set");
        if let Some(root_signature) = root_signature {
            debug_assert!(
                (root_parameter_index as usize) < root_signature.parameters().len(),
                "Root parameter index {} out of bounds", root_parameter_index
            );
        }
    }
}

impl Default for NullRhi {
    fn default() -> Self {
        Self::new(NullRhiConfig::default())
    }
}

impl Rhi for NullRhi {
    fn name(&self) -> &str {
        "Null"
    }

    fn rhi_id(&self) -> RhiId {
        self.rhi_id
    }

    fn capabilities(&self) -> &RhiCapabilities {
        &self.capabilities
    }

    fn statistics(&self) -> &Arc<RhiStatistics> {
        &self.statistics
    }

    // ===== RESOURCE FACTORIES =====

    fn create_root_signature(&mut self, desc: &RootSignatureDesc) -> Result<Arc<dyn RootSignature>> {
        Ok(Arc::new(NullRootSignature {
            base: self.base(&desc.debug_name, ResourceType::RootSignature),
            parameters: desc.parameters.clone(),
        }))
    }

    fn create_resource_group(&mut self, desc: ResourceGroupDesc) -> Result<Arc<dyn ResourceGroup>> {
        self.check_owner(desc.root_signature.rhi_id(), desc.root_signature.debug_name());
        debug_assert!(
            (desc.root_parameter_index as usize) < desc.root_signature.parameters().len(),
            "Root parameter index {} out of bounds", desc.root_parameter_index
        );
        for resource in &desc.resources {
            self.check_owner(resource.rhi_id(), resource.debug_name());
        }
        Ok(Arc::new(NullResourceGroup {
            base: self.base(&desc.debug_name, ResourceType::ResourceGroup),
            root_parameter_index: desc.root_parameter_index,
            resources: desc.resources,
            _sampler_states: desc.sampler_states,
        }))
    }

    fn create_graphics_pipeline_state(&mut self, desc: GraphicsPipelineStateDesc) -> Result<Arc<dyn GraphicsPipelineState>> {
        self.check_owner(desc.root_signature.rhi_id(), desc.root_signature.debug_name());
        self.check_owner(desc.render_pass.rhi_id(), desc.render_pass.debug_name());
        // On failure `desc` drops here and releases its references
        let id = Self::allocate_id(&self.graphics_pipeline_state_ids, "graphics pipeline state")?;
        Ok(Arc::new(NullGraphicsPipelineState {
            base: self.base(&desc.debug_name, ResourceType::GraphicsPipelineState),
            id,
            root_signature: desc.root_signature,
            render_pass: desc.render_pass,
        }))
    }

    fn create_compute_pipeline_state(&mut self, desc: ComputePipelineStateDesc) -> Result<Arc<dyn ComputePipelineState>> {
        self.check_owner(desc.root_signature.rhi_id(), desc.root_signature.debug_name());
        let id = Self::allocate_id(&self.compute_pipeline_state_ids, "compute pipeline state")?;
        Ok(Arc::new(NullComputePipelineState {
            base: self.base(&desc.debug_name, ResourceType::ComputePipelineState),
            id,
            root_signature: desc.root_signature,
        }))
    }

    fn create_vertex_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn VertexBuffer>> {
        Ok(Arc::new(NullVertexBuffer {
            base: self.base(&desc.debug_name, ResourceType::VertexBuffer),
            number_of_bytes: desc.number_of_bytes,
        }))
    }

    fn create_index_buffer(&mut self, desc: &BufferDesc, format: IndexBufferFormat) -> Result<Arc<dyn IndexBuffer>> {
        Ok(Arc::new(NullIndexBuffer {
            base: self.base(&desc.debug_name, ResourceType::IndexBuffer),
            number_of_bytes: desc.number_of_bytes,
            format,
        }))
    }

    fn create_uniform_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn UniformBuffer>> {
        Ok(Arc::new(NullUniformBuffer {
            base: self.base(&desc.debug_name, ResourceType::UniformBuffer),
            number_of_bytes: desc.number_of_bytes,
        }))
    }

    fn create_indirect_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn IndirectBuffer>> {
        Ok(Arc::new(NullIndirectBuffer {
            base: self.base(&desc.debug_name, ResourceType::IndirectBuffer),
            number_of_bytes: desc.number_of_bytes,
        }))
    }

    fn create_vertex_array(&mut self, desc: VertexArrayDesc) -> Result<Arc<dyn VertexArray>> {
        for vertex_buffer in &desc.vertex_buffers {
            self.check_owner(vertex_buffer.rhi_id(), vertex_buffer.debug_name());
        }
        if let Some(index_buffer) = &desc.index_buffer {
            self.check_owner(index_buffer.rhi_id(), index_buffer.debug_name());
        }
        // The buffer references taken by `desc` are released on the error path
        let id = Self::allocate_id(&self.vertex_array_ids, "vertex array")?;
        Ok(Arc::new(NullVertexArray {
            base: self.base(&desc.debug_name, ResourceType::VertexArray),
            id,
            vertex_buffers: desc.vertex_buffers,
            index_buffer: desc.index_buffer,
        }))
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture2d>> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("nebula3d::NullRhi",
                "Texture \"{}\" has a zero size ({}x{})", desc.debug_name, desc.width, desc.height);
        }
        let maximum = self.capabilities.maximum_texture_dimension;
        if desc.width > maximum || desc.height > maximum {
            engine_bail!("nebula3d::NullRhi",
                "Texture \"{}\" exceeds the maximum dimension {} ({}x{})", desc.debug_name, maximum, desc.width, desc.height);
        }

        let mut number_of_multisamples = self.clamp_multisamples(desc.number_of_multisamples);
        if number_of_multisamples > 1 && desc.flags.contains(TextureFlags::GENERATE_MIPMAPS) {
            engine_warn!("nebula3d::NullRhi",
                "Texture \"{}\": multisample textures can't have mipmaps, MSAA disabled", desc.debug_name);
            number_of_multisamples = 1;
        }
        let mipmaps = if desc.flags.intersects(TextureFlags::GENERATE_MIPMAPS | TextureFlags::DATA_CONTAINS_MIPMAPS) {
            number_of_mipmaps(desc.width, desc.height)
        } else {
            1
        };

        Ok(Arc::new(NullTexture2d {
            base: self.base(&desc.debug_name, ResourceType::Texture2d),
            width: desc.width,
            height: desc.height,
            format: desc.format,
            flags: desc.flags,
            number_of_multisamples,
            number_of_mipmaps: mipmaps,
        }))
    }

    fn create_sampler_state(&mut self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>> {
        Ok(Arc::new(NullSamplerState {
            base: self.base(&desc.debug_name, ResourceType::SamplerState),
            desc: desc.clone(),
        }))
    }

    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        let maximum = (self.capabilities.maximum_number_of_simultaneous_render_targets as usize)
            .min(MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS);
        if desc.color_attachment_formats.len() > maximum {
            engine_bail!("nebula3d::NullRhi",
                "Render pass \"{}\" has {} color attachments, maximum is {}",
                desc.debug_name, desc.color_attachment_formats.len(), maximum);
        }
        debug_assert!(
            desc.depth_stencil_attachment_format.map_or(true, |format| format.is_depth()),
            "Depth-stencil attachment needs a depth format"
        );
        Ok(Arc::new(NullRenderPass {
            base: self.base(&desc.debug_name, ResourceType::RenderPass),
            color_attachment_formats: desc.color_attachment_formats.clone(),
            depth_stencil_attachment_format: desc.depth_stencil_attachment_format,
            number_of_multisamples: self.clamp_multisamples(desc.number_of_multisamples),
        }))
    }

    fn create_framebuffer(&mut self, desc: FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        self.check_owner(desc.render_pass.rhi_id(), desc.render_pass.debug_name());
        debug_assert_eq!(
            desc.color_attachments.len(), desc.render_pass.number_of_color_attachments(),
            "Framebuffer \"{}\" doesn't match its render pass", desc.debug_name
        );

        let mut size: Option<(u32, u32)> = None;
        for attachment in desc.color_attachments.iter().chain(desc.depth_stencil_attachment.iter()) {
            self.check_owner(attachment.texture.rhi_id(), attachment.texture.debug_name());
            debug_assert!(
                (attachment.mipmap_index as u32) < attachment.texture.number_of_mipmaps(),
                "Mipmap index out of range"
            );
            let attachment_size = attachment.size();
            match size {
                None => size = Some(attachment_size),
                Some(existing) => debug_assert_eq!(existing, attachment_size, "Framebuffer attachments differ in size"),
            }
        }
        let Some((width, height)) = size else {
            engine_bail!("nebula3d::NullRhi", "Framebuffer \"{}\" has no attachment", desc.debug_name);
        };

        Ok(Arc::new(NullFramebuffer {
            base: self.base(&desc.debug_name, ResourceType::Framebuffer),
            render_pass: desc.render_pass,
            color_attachments: desc.color_attachments,
            depth_stencil_attachment: desc.depth_stencil_attachment,
            width,
            height,
        }))
    }

    fn create_swap_chain(&mut self, desc: &SwapChainDesc) -> Result<Arc<dyn SwapChain>> {
        let render_pass = self.create_render_pass(&RenderPassDesc {
            color_attachment_formats: vec![desc.color_format],
            depth_stencil_attachment_format: desc.depth_stencil_format,
            number_of_multisamples: 1,
            debug_name: format!("{} render pass", desc.debug_name),
        })?;
        Ok(Arc::new(NullSwapChain {
            base: self.base(&desc.debug_name, ResourceType::SwapChain),
            render_pass,
            width: AtomicU32::new(desc.width.max(1)),
            height: AtomicU32::new(desc.height.max(1)),
            fullscreen: AtomicBool::new(false),
            recorder: self.recorder.clone(),
        }))
    }

    fn create_query_pool(&mut self, desc: &QueryPoolDesc) -> Result<Arc<dyn QueryPool>> {
        if desc.number_of_queries == 0 {
            engine_bail!("nebula3d::NullRhi", "Query pool \"{}\" has no query", desc.debug_name);
        }
        Ok(Arc::new(NullQueryPool {
            base: self.base(&desc.debug_name, ResourceType::QueryPool),
            query_type: desc.query_type,
            number_of_queries: desc.number_of_queries,
        }))
    }

    // ===== FRAME =====

    fn begin_scene(&mut self) -> bool {
        let was_inside = self.recorder.inside_scene.swap(true, Ordering::Relaxed);
        debug_assert!(!was_inside, "begin_scene called twice");
        self.recorder.number_of_begin_scenes.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn end_scene(&mut self) {
        let was_inside = self.recorder.inside_scene.swap(false, Ordering::Relaxed);
        debug_assert!(was_inside, "end_scene without begin_scene");
        debug_assert_eq!(self.debug_event_depth, 0, "Unbalanced debug events");
        self.recorder.number_of_end_scenes.fetch_add(1, Ordering::Relaxed);
        self.render_target = None;
        self.graphics_root_signature = None;
        self.compute_root_signature = None;
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) {
        self.recorder.number_of_submitted_command_buffers.fetch_add(1, Ordering::Relaxed);
        if !command_buffer.is_empty() {
            command_buffer.dispatch_to_rhi(self);
        }
    }

    // ===== COMMAND HANDLERS =====

    fn execute_command_buffer(&mut self, command_buffer: &CommandBuffer) {
        self.recorder.record(CommandDispatchFunctionIndex::ExecuteCommandBuffer);
        command_buffer.dispatch_to_rhi(self);
    }

    fn set_graphics_root_signature(&mut self, root_signature: Option<&Arc<dyn RootSignature>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsRootSignature);
        if let Some(root_signature) = root_signature {
            self.check_owner(root_signature.rhi_id(), root_signature.debug_name());
        }
        self.graphics_root_signature = root_signature.cloned();
    }

    fn set_graphics_pipeline_state(&mut self, graphics_pipeline_state: Option<&Arc<dyn GraphicsPipelineState>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsPipelineState);
        if let Some(graphics_pipeline_state) = graphics_pipeline_state {
            self.check_owner(graphics_pipeline_state.rhi_id(), graphics_pipeline_state.debug_name());
        }
    }

    fn set_graphics_resource_group(&mut self, root_parameter_index: u32, resource_group: Option<&Arc<dyn ResourceGroup>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsResourceGroup);
        Self::check_root_parameter_index(self.graphics_root_signature.as_ref(), root_parameter_index);
        if let Some(resource_group) = resource_group {
            self.check_owner(resource_group.rhi_id(), resource_group.debug_name());
        }
    }

    fn set_graphics_vertex_array(&mut self, vertex_array: Option<&Arc<dyn VertexArray>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsVertexArray);
        if let Some(vertex_array) = vertex_array {
            self.check_owner(vertex_array.rhi_id(), vertex_array.debug_name());
        }
    }

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsViewports);
        debug_assert!(!viewports.is_empty(), "At least one viewport is required");
    }

    fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsScissorRectangles);
        debug_assert!(!scissor_rectangles.is_empty(), "At least one scissor rectangle is required");
    }

    fn set_graphics_render_target(&mut self, render_target: Option<&RenderTarget>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetGraphicsRenderTarget);
        if let Some(render_target) = render_target {
            let handle = ResourceHandle::from(render_target.clone());
            self.check_owner(handle.rhi_id(), handle.debug_name());
        }
        self.render_target = render_target.cloned();
    }

    fn clear_graphics(&mut self, _clear_flags: ClearFlags, _color: [f32; 4], _z: f32, _stencil: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::ClearGraphics);
    }

    fn draw_graphics(&mut self, indirect_buffer: &Arc<dyn IndirectBuffer>, _indirect_buffer_offset: u32, number_of_draws: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::DrawGraphics);
        self.check_owner(indirect_buffer.rhi_id(), indirect_buffer.debug_name());
        debug_assert!(number_of_draws > 0, "Number of draws must not be zero");
    }

    fn draw_graphics_emulated(&mut self, draw_arguments: &[DrawArguments]) {
        self.recorder.record(CommandDispatchFunctionIndex::DrawGraphics);
        debug_assert!(!draw_arguments.is_empty(), "Number of draws must not be zero");
    }

    fn draw_indexed_graphics(&mut self, indirect_buffer: &Arc<dyn IndirectBuffer>, _indirect_buffer_offset: u32, number_of_draws: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::DrawIndexedGraphics);
        self.check_owner(indirect_buffer.rhi_id(), indirect_buffer.debug_name());
        debug_assert!(number_of_draws > 0, "Number of draws must not be zero");
    }

    fn draw_indexed_graphics_emulated(&mut self, draw_indexed_arguments: &[DrawIndexedArguments]) {
        self.recorder.record(CommandDispatchFunctionIndex::DrawIndexedGraphics);
        debug_assert!(!draw_indexed_arguments.is_empty(), "Number of draws must not be zero");
    }

    fn set_compute_root_signature(&mut self, root_signature: Option<&Arc<dyn RootSignature>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetComputeRootSignature);
        if let Some(root_signature) = root_signature {
            self.check_owner(root_signature.rhi_id(), root_signature.debug_name());
        }
        self.compute_root_signature = root_signature.cloned();
    }

    fn set_compute_pipeline_state(&mut self, compute_pipeline_state: Option<&Arc<dyn ComputePipelineState>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetComputePipelineState);
        if let Some(compute_pipeline_state) = compute_pipeline_state {
            self.check_owner(compute_pipeline_state.rhi_id(), compute_pipeline_state.debug_name());
        }
    }

    fn set_compute_resource_group(&mut self, root_parameter_index: u32, resource_group: Option<&Arc<dyn ResourceGroup>>) {
        self.recorder.record(CommandDispatchFunctionIndex::SetComputeResourceGroup);
        Self::check_root_parameter_index(self.compute_root_signature.as_ref(), root_parameter_index);
        if let Some(resource_group) = resource_group {
            self.check_owner(resource_group.rhi_id(), resource_group.debug_name());
        }
    }

    fn dispatch_compute(&mut self, _group_count_x: u32, _group_count_y: u32, _group_count_z: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::DispatchCompute);
    }

    fn set_texture_minimum_maximum_mipmap_index(&mut self, texture: &Arc<dyn Texture2d>, _minimum_mipmap_index: u32, maximum_mipmap_index: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::SetTextureMinimumMaximumMipmapIndex);
        self.check_owner(texture.rhi_id(), texture.debug_name());
        debug_assert!(maximum_mipmap_index < texture.number_of_mipmaps(), "Mipmap index out of range");
    }

    fn resolve_multisample_framebuffer(&mut self, destination: &RenderTarget, source: &Arc<dyn Framebuffer>) {
        self.recorder.record(CommandDispatchFunctionIndex::ResolveMultisampleFramebuffer);
        self.check_owner(source.rhi_id(), source.debug_name());
        debug_assert_eq!(destination.size(), (source.width(), source.height()), "Resolve between different sizes");
    }

    fn copy_resource(&mut self, destination: &ResourceHandle, source: &ResourceHandle) {
        self.recorder.record(CommandDispatchFunctionIndex::CopyResource);
        self.check_owner(destination.rhi_id(), destination.debug_name());
        self.check_owner(source.rhi_id(), source.debug_name());
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture2d>) {
        self.recorder.record(CommandDispatchFunctionIndex::GenerateMipmaps);
        self.check_owner(texture.rhi_id(), texture.debug_name());
    }

    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<dyn UniformBuffer>, data: &[u8]) {
        self.recorder.record(CommandDispatchFunctionIndex::CopyUniformBufferData);
        self.check_owner(uniform_buffer.rhi_id(), uniform_buffer.debug_name());
        debug_assert!(data.len() as u32 <= uniform_buffer.number_of_bytes(), "Uniform buffer overflow");
        self.recorder.number_of_uploaded_uniform_bytes.fetch_add(data.len() as u64, Ordering::Relaxed);
    }

    fn reset_query_pool(&mut self, query_pool: &Arc<dyn QueryPool>, _first_query_index: u32, _number_of_queries: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::ResetQueryPool);
        self.check_owner(query_pool.rhi_id(), query_pool.debug_name());
    }

    fn begin_query(&mut self, query_pool: &Arc<dyn QueryPool>, _query_index: u32, _query_control_flags: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::BeginQuery);
        self.check_owner(query_pool.rhi_id(), query_pool.debug_name());
    }

    fn end_query(&mut self, query_pool: &Arc<dyn QueryPool>, _query_index: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::EndQuery);
        self.check_owner(query_pool.rhi_id(), query_pool.debug_name());
    }

    fn write_timestamp_query(&mut self, query_pool: &Arc<dyn QueryPool>, _query_index: u32) {
        self.recorder.record(CommandDispatchFunctionIndex::WriteTimestampQuery);
        self.check_owner(query_pool.rhi_id(), query_pool.debug_name());
    }

    fn set_debug_marker(&mut self, _name: &str) {
        self.recorder.record(CommandDispatchFunctionIndex::SetDebugMarker);
    }

    fn begin_debug_event(&mut self, _name: &str) {
        self.recorder.record(CommandDispatchFunctionIndex::BeginDebugEvent);
        self.debug_event_depth += 1;
    }

    fn end_debug_event(&mut self) {
        self.recorder.record(CommandDispatchFunctionIndex::EndDebugEvent);
        debug_assert!(self.debug_event_depth > 0, "end_debug_event without begin_debug_event");
        self.debug_event_depth = self.debug_event_depth.saturating_sub(1);
    }
}

#[cfg(test)]
#[path = "null_rhi_tests.rs"]
mod tests;
