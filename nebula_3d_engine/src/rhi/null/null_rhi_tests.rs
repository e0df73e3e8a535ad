use super::*;
use crate::rhi::{
    RootParameter, RootParameterType, TextureFormat, PrimitiveTopology, FramebufferAttachment,
    QueryType, SetGraphicsRenderTarget, ClearGraphics, EndDebugEvent, BeginDebugEvent,
};

fn root_signature(rhi: &mut NullRhi) -> Arc<dyn RootSignature> {
    rhi.create_root_signature(&RootSignatureDesc {
        parameters: vec![RootParameter { parameter_type: RootParameterType::DescriptorTable, count: 2 }],
        debug_name: "root".to_string(),
    }).unwrap()
}

fn color_render_pass(rhi: &mut NullRhi, number_of_multisamples: u8) -> Arc<dyn RenderPass> {
    rhi.create_render_pass(&RenderPassDesc {
        color_attachment_formats: vec![TextureFormat::R8G8B8A8_UNORM],
        depth_stencil_attachment_format: Some(TextureFormat::D32_FLOAT),
        number_of_multisamples,
        debug_name: "pass".to_string(),
    }).unwrap()
}

fn swap_chain_desc() -> SwapChainDesc {
    SwapChainDesc {
        width: 640,
        height: 480,
        color_format: TextureFormat::B8G8R8A8_SRGB,
        depth_stencil_format: Some(TextureFormat::D32_FLOAT),
        debug_name: "main window".to_string(),
    }
}

// ============================================================================
// Statistics tests
// ============================================================================

#[test]
fn test_statistics_follow_resource_lifetime() {
    let mut rhi = NullRhi::default();
    let buffer = rhi.create_vertex_buffer(&BufferDesc::new(256, "vertices")).unwrap();
    assert_eq!(rhi.statistics().current(ResourceType::VertexBuffer), 1);
    assert_eq!(buffer.number_of_bytes(), 256);
    assert_eq!(buffer.rhi_id(), rhi.rhi_id());

    let extra_reference = buffer.clone();
    drop(buffer);
    assert_eq!(rhi.statistics().current(ResourceType::VertexBuffer), 1);
    drop(extra_reference);
    assert_eq!(rhi.statistics().current(ResourceType::VertexBuffer), 0);
    assert_eq!(rhi.statistics().created(ResourceType::VertexBuffer), 1);
}

#[test]
fn test_each_rhi_has_own_id() {
    let a = NullRhi::default();
    let b = NullRhi::default();
    assert_ne!(a.rhi_id(), b.rhi_id());
    assert_eq!(a.name(), "Null");
}

// ============================================================================
// Texture and framebuffer tests
// ============================================================================

#[test]
fn test_texture_multisamples_clamped_to_capability() {
    let mut config = NullRhiConfig::default();
    config.capabilities.maximum_number_of_multisamples = 4;
    let mut rhi = NullRhi::new(config);

    let desc = TextureDesc::render_target(128, 64, TextureFormat::R16G16B16A16_FLOAT, TextureFlags::SHADER_RESOURCE, 8);
    let texture = rhi.create_texture_2d(&desc).unwrap();
    assert_eq!(texture.number_of_multisamples(), 4);
    assert_eq!(texture.number_of_mipmaps(), 1);
}

#[test]
fn test_texture_mipmap_chain() {
    let mut rhi = NullRhi::default();
    let desc = TextureDesc::render_target(256, 64, TextureFormat::R8G8B8A8_UNORM, TextureFlags::GENERATE_MIPMAPS, 1);
    let texture = rhi.create_texture_2d(&desc).unwrap();
    assert_eq!(texture.number_of_mipmaps(), 9);
}

#[test]
fn test_texture_zero_size_rejected() {
    let mut rhi = NullRhi::default();
    let desc = TextureDesc::render_target(0, 64, TextureFormat::R8G8B8A8_UNORM, TextureFlags::empty(), 1);
    assert!(rhi.create_texture_2d(&desc).is_err());
    assert_eq!(rhi.statistics().current(ResourceType::Texture2d), 0);
}

#[test]
fn test_framebuffer_size_from_attachment_mipmap() {
    let mut rhi = NullRhi::default();
    let render_pass = rhi.create_render_pass(&RenderPassDesc {
        color_attachment_formats: vec![TextureFormat::R8G8B8A8_UNORM],
        depth_stencil_attachment_format: None,
        number_of_multisamples: 1,
        debug_name: "pass".to_string(),
    }).unwrap();
    let texture = rhi.create_texture_2d(&TextureDesc::render_target(
        256, 128, TextureFormat::R8G8B8A8_UNORM, TextureFlags::GENERATE_MIPMAPS, 1,
    )).unwrap();

    let mut attachment = FramebufferAttachment::new(texture.clone());
    attachment.mipmap_index = 2;
    let framebuffer = rhi.create_framebuffer(FramebufferDesc {
        render_pass,
        color_attachments: vec![attachment],
        depth_stencil_attachment: None,
        debug_name: "mip 2".to_string(),
    }).unwrap();

    assert_eq!((framebuffer.width(), framebuffer.height()), (64, 32));
    // The framebuffer keeps its attachment alive
    assert_eq!(Arc::strong_count(&texture), 2);
    drop(framebuffer);
    assert_eq!(Arc::strong_count(&texture), 1);
}

#[test]
fn test_render_pass_too_many_color_attachments() {
    let mut rhi = NullRhi::default();
    let result = rhi.create_render_pass(&RenderPassDesc {
        color_attachment_formats: vec![TextureFormat::R8_UNORM; MAXIMUM_NUMBER_OF_COLOR_ATTACHMENTS + 1],
        depth_stencil_attachment_format: None,
        number_of_multisamples: 1,
        debug_name: "too wide".to_string(),
    });
    assert!(result.is_err());
}

// ============================================================================
// Compact ID tests
// ============================================================================

#[test]
fn test_vertex_array_ids_are_reused() {
    let mut rhi = NullRhi::default();
    let vertex_buffer = rhi.create_vertex_buffer(&BufferDesc::new(64, "vb")).unwrap();
    let desc = VertexArrayDesc {
        vertex_buffers: vec![vertex_buffer.clone()],
        index_buffer: None,
        debug_name: "va".to_string(),
    };

    let first = rhi.create_vertex_array(desc.clone()).unwrap();
    let second = rhi.create_vertex_array(desc.clone()).unwrap();
    assert_eq!(first.id(), 0);
    assert_eq!(second.id(), 1);

    drop(first);
    let third = rhi.create_vertex_array(desc).unwrap();
    assert_eq!(third.id(), 0);
    drop(second);
    drop(third);
    assert_eq!(Arc::strong_count(&vertex_buffer), 1);
}

#[test]
fn test_vertex_array_id_exhaustion_releases_buffers() {
    let mut rhi = NullRhi::new(NullRhiConfig { maximum_vertex_array_id: 0, ..Default::default() });
    let vertex_buffer = rhi.create_vertex_buffer(&BufferDesc::new(64, "vb")).unwrap();
    let desc = VertexArrayDesc {
        vertex_buffers: vec![vertex_buffer.clone()],
        index_buffer: None,
        debug_name: "va".to_string(),
    };

    let _only = rhi.create_vertex_array(desc.clone()).unwrap();
    let result = rhi.create_vertex_array(desc);
    assert!(matches!(result, Err(Error::OutOfMemory)));
    // Only `_only` and the local handle remain
    assert_eq!(Arc::strong_count(&vertex_buffer), 2);
}

#[test]
fn test_graphics_pipeline_state_ids() {
    let mut rhi = NullRhi::default();
    let root_signature = root_signature(&mut rhi);
    let render_pass = color_render_pass(&mut rhi, 1);
    let desc = GraphicsPipelineStateDesc {
        root_signature,
        render_pass,
        primitive_topology: PrimitiveTopology::TriangleList,
        debug_name: "pso".to_string(),
    };
    let a = rhi.create_graphics_pipeline_state(desc.clone()).unwrap();
    let b = rhi.create_graphics_pipeline_state(desc).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(rhi.statistics().current(ResourceType::GraphicsPipelineState), 2);
}

// ============================================================================
// Swap chain tests
// ============================================================================

#[test]
fn test_swap_chain_present_is_recorded() {
    let mut rhi = NullRhi::default();
    let recorder = rhi.recorder();
    let swap_chain = rhi.create_swap_chain(&swap_chain_desc()).unwrap();

    assert_eq!(swap_chain.render_pass().number_of_color_attachments(), 1);
    swap_chain.present().unwrap();
    swap_chain.present().unwrap();
    assert_eq!(recorder.number_of_presents(), 2);
}

#[test]
fn test_swap_chain_resize_and_fullscreen() {
    let mut rhi = NullRhi::default();
    let swap_chain = rhi.create_swap_chain(&swap_chain_desc()).unwrap();
    swap_chain.resize_buffers(1920, 1080).unwrap();
    assert_eq!((swap_chain.width(), swap_chain.height()), (1920, 1080));

    swap_chain.resize_buffers(0, 0).unwrap();
    assert_eq!((swap_chain.width(), swap_chain.height()), (1, 1));

    assert!(!swap_chain.fullscreen_state());
    swap_chain.set_fullscreen_state(true).unwrap();
    assert!(swap_chain.fullscreen_state());
}

#[test]
fn test_query_pool_requires_queries() {
    let mut rhi = NullRhi::default();
    let empty = rhi.create_query_pool(&QueryPoolDesc {
        query_type: QueryType::Timestamp,
        number_of_queries: 0,
        debug_name: "empty".to_string(),
    });
    assert!(empty.is_err());
}

// ============================================================================
// Frame tests
// ============================================================================

#[test]
fn test_submit_dispatches_and_counts() {
    let mut rhi = NullRhi::default();
    let recorder = rhi.recorder();
    let swap_chain = rhi.create_swap_chain(&swap_chain_desc()).unwrap();
    let render_target = RenderTarget::from(swap_chain);

    let mut command_buffer = CommandBuffer::new();
    BeginDebugEvent::create(&mut command_buffer, "frame");
    SetGraphicsRenderTarget::create(&mut command_buffer, Some(&render_target));
    ClearGraphics::create(&mut command_buffer, ClearFlags::COLOR_DEPTH, [0.0, 0.0, 0.0, 1.0], 1.0, 0);
    EndDebugEvent::create(&mut command_buffer);

    assert!(rhi.begin_scene());
    command_buffer.submit_to_rhi(&mut rhi);
    assert!(rhi.render_target().is_some());
    rhi.end_scene();
    assert!(rhi.render_target().is_none());

    assert_eq!(recorder.number_of_begin_scenes(), 1);
    assert_eq!(recorder.number_of_end_scenes(), 1);
    assert_eq!(recorder.number_of_submitted_command_buffers(), 1);
    assert_eq!(recorder.dispatched_commands(), vec![
        CommandDispatchFunctionIndex::BeginDebugEvent,
        CommandDispatchFunctionIndex::SetGraphicsRenderTarget,
        CommandDispatchFunctionIndex::ClearGraphics,
        CommandDispatchFunctionIndex::EndDebugEvent,
    ]);

    recorder.reset();
    assert!(recorder.dispatched_commands().is_empty());
    assert_eq!(recorder.number_of_begin_scenes(), 0);
}

#[test]
fn test_submit_empty_command_buffer_dispatches_nothing() {
    let mut rhi = NullRhi::default();
    let recorder = rhi.recorder();
    let command_buffer = CommandBuffer::new();
    rhi.submit_command_buffer(&command_buffer);
    assert_eq!(recorder.number_of_submitted_command_buffers(), 1);
    assert!(recorder.dispatched_commands().is_empty());
}

#[test]
fn test_into_shared_locks() {
    let rhi = NullRhi::default().into_shared();
    let guard = crate::rhi::lock_rhi(&rhi).unwrap();
    assert_eq!(guard.name(), "Null");
}
