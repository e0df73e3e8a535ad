use std::sync::{Arc, Mutex};
use glam::{Quat, Vec3};
use crate::compositor::*;
use crate::error::Result;
use crate::resource::{
    FramebufferSignature, FramebufferSignatureAttachment, LoadingState, MaterialProperties, MaterialPropertyValue,
    Renderer, RendererConfig, RenderTargetTextureFlags, RenderTargetTextureSignature, RenderTargetTextureSize,
};
use crate::rhi::null::{NullRhi, NullRhiConfig, NullRhiRecorder};
use crate::rhi::{
    lock_rhi, ClearFlags, CommandDispatchFunctionIndex, RenderTarget, ResourceType, SwapChainDesc, TextureFormat,
};
use crate::scene::{AABB, CameraSceneItem, DrawCount, LightSceneItem, Renderable, RenderableManager, SceneResource};
use crate::utils::{AssetId, StringId};
use crate::vr::{NullVrManager, VrManager};

type Index = CommandDispatchFunctionIndex;

// ============================================================================
// TEST HELPERS
// ============================================================================

const WORKSPACE: &str = "Workspace/Forward";
const NODE: &str = "Node/Forward";
const SCENE_COLOR: &str = "Texture/SceneColor";
const SCENE_DEPTH: &str = "Texture/SceneDepth";
const SCENE_FRAMEBUFFER: &str = "Framebuffer/Scene";

struct Fixture {
    renderer: Renderer,
    recorder: Arc<NullRhiRecorder>,
    swap_chain: RenderTarget,
}

fn fixture(config: RendererConfig) -> Fixture {
    let mut rhi_config = NullRhiConfig::default();
    rhi_config.capabilities.maximum_number_of_multisamples = 4;
    let rhi = NullRhi::new(rhi_config);
    let recorder = rhi.recorder();
    let renderer = Renderer::new(rhi.into_shared(), config).unwrap();
    let swap_chain = lock_rhi(renderer.rhi())
        .unwrap()
        .create_swap_chain(&SwapChainDesc {
            width: 800,
            height: 600,
            color_format: TextureFormat::R8G8B8A8_UNORM,
            depth_stencil_format: Some(TextureFormat::D32_FLOAT),
            debug_name: "Main window".to_string(),
        })
        .unwrap();
    Fixture { renderer, recorder, swap_chain: RenderTarget::SwapChain(swap_chain) }
}

/// Forward node: scene into a multisample framebuffer, resolved into the main target
fn forward_node() -> CompositorNodeResource {
    let framebuffer = FramebufferSignature::new(
        vec![FramebufferSignatureAttachment::new(AssetId::new(SCENE_COLOR))],
        Some(FramebufferSignatureAttachment::new(AssetId::new(SCENE_DEPTH))),
    );
    CompositorNodeResource::new(AssetId::new(NODE))
        .with_render_target_texture(
            AssetId::new(SCENE_COLOR),
            RenderTargetTextureSignature::new(
                RenderTargetTextureSize::MAIN_RENDER_TARGET,
                TextureFormat::R8G8B8A8_UNORM,
                RenderTargetTextureFlags::ALLOW_MULTISAMPLE,
            ),
        )
        .with_render_target_texture(
            AssetId::new(SCENE_DEPTH),
            RenderTargetTextureSignature::new(
                RenderTargetTextureSize::MAIN_RENDER_TARGET,
                TextureFormat::D32_FLOAT,
                RenderTargetTextureFlags::ALLOW_MULTISAMPLE,
            ),
        )
        .with_framebuffer(StringId::new(SCENE_FRAMEBUFFER), framebuffer)
        .with_target(
            CompositorTarget::new(Some(StringId::new(SCENE_FRAMEBUFFER)))
                .with_pass(CompositorResourcePassClear::new(ClearFlags::COLOR_DEPTH, [0.1, 0.1, 0.1, 1.0]))
                .with_pass(CompositorResourcePassScene::new(0, 100))
                .with_pass(CompositorResourcePassScene::new(90, 200)),
        )
        .with_target(
            CompositorTarget::new(None)
                .with_pass(CompositorResourcePassResolveMultisample::new(StringId::new(SCENE_FRAMEBUFFER))),
        )
}

fn register_workspace(renderer: &mut Renderer, node: CompositorNodeResource, loaded: bool) {
    let node_asset_id = node.asset_id();
    renderer.compositor_node_resource_manager_mut().add_compositor_node_resource(node);
    renderer
        .compositor_workspace_resource_manager_mut()
        .add_compositor_workspace_resource(CompositorWorkspaceResource::new(AssetId::new(WORKSPACE), vec![node_asset_id]));
    if loaded {
        renderer
            .compositor_workspace_resource_manager_mut()
            .set_loading_state(AssetId::new(WORKSPACE), LoadingState::Loaded)
            .unwrap();
    }
}

fn current(renderer: &Renderer, resource_type: ResourceType) -> u32 {
    lock_rhi(renderer.rhi()).unwrap().statistics().current(resource_type)
}

fn scene_framebuffer(renderer: &Renderer) -> Option<Arc<dyn crate::rhi::Framebuffer>> {
    renderer
        .framebuffer_manager()
        .framebuffer_by_compositor_framebuffer_id(StringId::new(SCENE_FRAMEBUFFER))
        .cloned()
}

// ============================================================================
// LOADING TESTS
// ============================================================================

#[test]
fn test_new_requires_registered_workspace() {
    let fixture = fixture(RendererConfig::default());
    assert!(CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new("Workspace/Missing")).is_err());
}

#[test]
fn test_execute_skips_silently_while_loading() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), false);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();

    assert!(!instance.is_loaded());
    assert!(instance.compositor_node_instances().is_empty());
    assert_eq!(fixture.recorder.number_of_begin_scenes(), 0);
    assert_eq!(fixture.recorder.number_of_presents(), 0);
    assert!(fixture.renderer.framebuffer_manager().is_empty());
}

#[test]
fn test_load_announces_and_merges_ranges() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();

    assert!(instance.is_loaded());
    assert_eq!(instance.compositor_node_instances().len(), 1);
    let ranges: Vec<_> = instance
        .render_queue_index_ranges()
        .iter()
        .map(|range| (range.minimum_render_queue_index, range.maximum_render_queue_index))
        .collect();
    assert_eq!(ranges, vec![(0, 200)]);

    let renderer = &fixture.renderer;
    assert_eq!(renderer.render_target_texture_manager().number_of_references(AssetId::new(SCENE_COLOR)), 1);
    assert_eq!(renderer.framebuffer_manager().len(), 1);
    assert_eq!(renderer.framebuffer_manager().number_of_created_framebuffers(), 1);
    assert_eq!(renderer.render_target_texture_manager().number_of_created_textures(), 2);
    assert_eq!(fixture.recorder.number_of_presents(), 1);
    assert_eq!(fixture.recorder.count(Index::ResolveMultisampleFramebuffer), 1);
    assert!(instance.execution_render_target().is_none());
}

#[test]
fn test_reload_rebuilds_once_and_unload_releases() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    let first = scene_framebuffer(&fixture.renderer).unwrap();

    fixture
        .renderer
        .compositor_workspace_resource_manager_mut()
        .reload_compositor_workspace_resource(AssetId::new(WORKSPACE))
        .unwrap();
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();

    // Announcements were given back and made again, so the framebuffer is new
    let second = scene_framebuffer(&fixture.renderer).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(fixture.renderer.framebuffer_manager().len(), 1);
    let signature_id = fixture
        .renderer
        .framebuffer_manager()
        .signature_by_compositor_framebuffer_id(StringId::new(SCENE_FRAMEBUFFER))
        .unwrap()
        .signature_id();
    assert_eq!(fixture.renderer.framebuffer_manager().number_of_references(signature_id), 1);

    fixture
        .renderer
        .compositor_workspace_resource_manager_mut()
        .set_loading_state(AssetId::new(WORKSPACE), LoadingState::Unloaded)
        .unwrap();
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();

    assert!(!instance.is_loaded());
    assert!(fixture.renderer.framebuffer_manager().is_empty());
    assert!(fixture.renderer.render_target_texture_manager().is_empty());
    drop((first, second));
    assert_eq!(current(&fixture.renderer, ResourceType::Framebuffer), 0);
    assert_eq!(current(&fixture.renderer, ResourceType::Texture2d), 0);
}

#[test]
fn test_reregistered_workspace_rebuilds_with_new_nodes() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    assert_eq!(instance.compositor_node_instances()[0].resource().asset_id(), AssetId::new(NODE));

    let other = CompositorNodeResource::new(AssetId::new("Node/Other")).with_target(
        CompositorTarget::new(None).with_pass(CompositorResourcePassClear::new(ClearFlags::COLOR, [0.0; 4])),
    );
    register_workspace(&mut fixture.renderer, other, true);
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();

    assert_eq!(instance.compositor_node_instances().len(), 1);
    assert_eq!(instance.compositor_node_instances()[0].resource().asset_id(), AssetId::new("Node/Other"));
    // The forward node announcements were given back
    assert_eq!(fixture.renderer.render_target_texture_manager().number_of_references(AssetId::new(SCENE_COLOR)), 0);
    assert!(fixture.renderer.framebuffer_manager().is_empty());
    assert_eq!(fixture.recorder.count(Index::ClearGraphics), 2);
}

#[test]
fn test_unknown_node_fails_loading() {
    let mut fixture = fixture(RendererConfig::default());
    fixture
        .renderer
        .compositor_workspace_resource_manager_mut()
        .add_compositor_workspace_resource(CompositorWorkspaceResource::new(
            AssetId::new(WORKSPACE),
            vec![AssetId::new("Node/Missing")],
        ));
    fixture
        .renderer
        .compositor_workspace_resource_manager_mut()
        .set_loading_state(AssetId::new(WORKSPACE), LoadingState::Loaded)
        .unwrap();
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    assert!(instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).is_err());
    assert!(!instance.is_loaded());
    assert_eq!(fixture.recorder.number_of_begin_scenes(), 0);
}

#[test]
fn test_loader_builds_nodes_on_demand() {
    let mut fixture = fixture(RendererConfig::default());
    fixture.renderer.compositor_node_resource_manager_mut().set_loader(|asset_id: AssetId| -> Result<CompositorNodeResource> {
        assert_eq!(asset_id, AssetId::new(NODE));
        Ok(forward_node())
    });
    fixture
        .renderer
        .compositor_workspace_resource_manager_mut()
        .add_compositor_workspace_resource(CompositorWorkspaceResource::new(AssetId::new(WORKSPACE), vec![AssetId::new(NODE)]));
    fixture
        .renderer
        .compositor_workspace_resource_manager_mut()
        .set_loading_state(AssetId::new(WORKSPACE), LoadingState::Loaded)
        .unwrap();
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    assert!(instance.is_loaded());
    assert_eq!(fixture.renderer.compositor_node_resource_manager().len(), 1);
}

// ============================================================================
// SETTINGS TESTS
// ============================================================================

#[test]
fn test_number_of_multisamples_is_clamped_to_the_rhi() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    assert_eq!(instance.number_of_multisamples(), 1);

    instance.set_number_of_multisamples(&fixture.renderer, 8);
    assert_eq!(instance.number_of_multisamples(), 4);

    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    assert_eq!(
        fixture.renderer.material_properties().property_by_id(MaterialProperties::global_number_of_multisamples_id()),
        Some(&MaterialPropertyValue::Integer(4))
    );
}

#[test]
fn test_multisample_change_recreates_gpu_resources_only() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    let single_sample = scene_framebuffer(&fixture.renderer).unwrap();

    // Same settings, same framebuffer
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    assert!(Arc::ptr_eq(&single_sample, &scene_framebuffer(&fixture.renderer).unwrap()));

    instance.set_number_of_multisamples(&fixture.renderer, 4);
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    let multisample = scene_framebuffer(&fixture.renderer).unwrap();
    assert!(!Arc::ptr_eq(&single_sample, &multisample));
    assert_eq!(multisample.render_pass().number_of_multisamples(), 4);

    // Announcements survive the invalidation
    assert_eq!(fixture.renderer.render_target_texture_manager().number_of_references(AssetId::new(SCENE_COLOR)), 1);
    drop(single_sample);
    assert_eq!(current(&fixture.renderer, ResourceType::Framebuffer), 1);
}

#[test]
fn test_resolution_scale_resizes_scalable_textures() {
    let mut fixture = fixture(RendererConfig::default());
    let node = CompositorNodeResource::new(AssetId::new(NODE))
        .with_render_target_texture(
            AssetId::new(SCENE_COLOR),
            RenderTargetTextureSignature::new(
                RenderTargetTextureSize::MAIN_RENDER_TARGET,
                TextureFormat::R8G8B8A8_UNORM,
                RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE,
            ),
        )
        .with_framebuffer(
            StringId::new(SCENE_FRAMEBUFFER),
            FramebufferSignature::new(vec![FramebufferSignatureAttachment::new(AssetId::new(SCENE_COLOR))], None),
        )
        .with_target(
            CompositorTarget::new(Some(StringId::new(SCENE_FRAMEBUFFER)))
                .with_pass(CompositorResourcePassScene::new(0, 255)),
        );
    register_workspace(&mut fixture.renderer, node, true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    assert_eq!(scene_framebuffer(&fixture.renderer).unwrap().width(), 800);

    instance.set_resolution_scale(0.5);
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    let framebuffer = scene_framebuffer(&fixture.renderer).unwrap();
    assert_eq!((framebuffer.width(), framebuffer.height()), (400, 300));
}

// ============================================================================
// SCENE TESTS
// ============================================================================

fn scene() -> SceneResource {
    let mut scene = SceneResource::new(AssetId::new("Scene/Workspace"));
    let mut manager = RenderableManager::new(AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
    manager.add_renderable(Renderable::new(DrawCount::Vertices { number_of_vertices: 3, start_vertex: 0 }, 10));
    scene.add_renderable_manager(manager, false);
    scene.add_light(LightSceneItem::directional(Quat::from_rotation_x(-1.0), Vec3::ONE));
    scene.set_loading_state(LoadingState::Loaded);
    scene
}

#[test]
fn test_scene_view_gathers_and_fills_light_buffer() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    let mut scene = scene();
    let camera = scene.add_camera(CameraSceneItem::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY));

    instance
        .execute(&mut fixture.renderer, &fixture.swap_chain, Some(SceneView::new(&scene, camera)))
        .unwrap();

    assert_eq!(instance.render_queue_index_ranges()[0].renderable_managers.len(), 1);
    assert_eq!(fixture.recorder.count(Index::CopyUniformBufferData), 1);
    assert_eq!(fixture.renderer.light_buffer_manager().number_of_lights(), 1);

    // Without a scene view the gathered managers are dropped and nothing is uploaded
    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();
    assert!(instance.render_queue_index_ranges()[0].renderable_managers.is_empty());
    assert_eq!(fixture.recorder.count(Index::CopyUniformBufferData), 1);
}

#[test]
fn test_loading_scene_is_neither_culled_nor_lit() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    let mut scene = scene();
    scene.set_loading_state(LoadingState::Loading);
    let camera = scene.add_camera(CameraSceneItem::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY));

    instance
        .execute(&mut fixture.renderer, &fixture.swap_chain, Some(SceneView::new(&scene, camera)))
        .unwrap();

    assert!(instance.render_queue_index_ranges()[0].renderable_managers.is_empty());
    assert_eq!(fixture.recorder.count(Index::CopyUniformBufferData), 0);
    assert_eq!(fixture.renderer.light_buffer_manager().number_of_lights(), 0);
    assert_eq!(fixture.recorder.number_of_presents(), 1);

    scene.set_loading_state(LoadingState::Loaded);
    instance
        .execute(&mut fixture.renderer, &fixture.swap_chain, Some(SceneView::new(&scene, camera)))
        .unwrap();
    assert_eq!(instance.render_queue_index_ranges()[0].renderable_managers.len(), 1);
    assert_eq!(fixture.recorder.count(Index::CopyUniformBufferData), 1);
}

#[test]
fn test_shadow_map_pass_is_tracked() {
    let mut fixture = fixture(RendererConfig::default());
    let node = CompositorNodeResource::new(AssetId::new(NODE)).with_target(
        CompositorTarget::new(None)
            .with_pass(CompositorResourcePassShadowMap::new(0, 255, AssetId::new("Texture/ShadowMap")))
            .with_pass(CompositorResourcePassScene::new(0, 255)),
    );
    register_workspace(&mut fixture.renderer, node, true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();
    assert!(instance.first_compositor_instance_pass_shadow_map().is_none());

    instance.execute(&mut fixture.renderer, &fixture.swap_chain, None).unwrap();

    let shadow_map = instance.first_compositor_instance_pass_shadow_map().unwrap();
    assert_eq!(shadow_map.texture_asset_id(), AssetId::new("Texture/ShadowMap"));

    // Materials find the atlas through the render target texture manager
    let textures = fixture.renderer.render_target_texture_manager();
    assert!(textures.signature_by_asset_id(AssetId::new("Texture/ShadowMap")).is_some());
    let registered = textures.existing_texture_by_asset_id(AssetId::new("Texture/ShadowMap")).unwrap();
    assert!(Arc::ptr_eq(registered, shadow_map.depth_texture().unwrap()));

    instance.first_compositor_instance_pass_shadow_map_mut().unwrap().set_number_of_cascades(2);
    assert_eq!(instance.first_compositor_instance_pass_shadow_map().unwrap().number_of_cascades(), 2);

    instance.release(&mut fixture.renderer);
    assert!(fixture.renderer.render_target_texture_manager().is_empty());
    assert_eq!(current(&fixture.renderer, ResourceType::Texture2d), 0);
}

// ============================================================================
// VR TESTS
// ============================================================================

/// Renders both eyes into the same target
struct TwoEyeVrManager {
    running: bool,
    executions: Arc<Mutex<u32>>,
}

impl VrManager for TwoEyeVrManager {
    fn is_running(&self) -> bool {
        self.running
    }

    fn execute_compositor_workspace_instance(
        &mut self,
        compositor_workspace_instance: &mut CompositorWorkspaceInstance,
        renderer: &mut Renderer,
        render_target: &RenderTarget,
        scene_view: Option<SceneView<'_>>,
    ) -> Result<()> {
        for _ in 0..2 {
            *self.executions.lock().unwrap() += 1;
            compositor_workspace_instance.execute(renderer, render_target, scene_view)?;
        }
        Ok(())
    }
}

#[test]
fn test_execute_vr_selects_strategy() {
    let mut config = RendererConfig::default();
    config.features.vr = true;
    let mut fixture = fixture(config);
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    let executions = Arc::new(Mutex::new(0));
    let mut stopped = TwoEyeVrManager { running: false, executions: executions.clone() };
    instance.execute_vr(&mut fixture.renderer, &mut stopped, &fixture.swap_chain, None).unwrap();
    assert_eq!(*executions.lock().unwrap(), 0);
    assert_eq!(fixture.recorder.number_of_presents(), 1);

    let mut running = TwoEyeVrManager { running: true, executions: executions.clone() };
    instance.execute_vr(&mut fixture.renderer, &mut running, &fixture.swap_chain, None).unwrap();
    assert_eq!(*executions.lock().unwrap(), 2);
    assert_eq!(fixture.recorder.number_of_presents(), 3);

    instance.execute_vr(&mut fixture.renderer, &mut NullVrManager, &fixture.swap_chain, None).unwrap();
    assert_eq!(fixture.recorder.number_of_presents(), 4);
}

#[test]
fn test_execute_vr_ignores_running_manager_when_vr_is_disabled() {
    let mut fixture = fixture(RendererConfig::default());
    register_workspace(&mut fixture.renderer, forward_node(), true);
    let mut instance = CompositorWorkspaceInstance::new(&fixture.renderer, AssetId::new(WORKSPACE)).unwrap();

    let executions = Arc::new(Mutex::new(0));
    let mut running = TwoEyeVrManager { running: true, executions: executions.clone() };
    instance.execute_vr(&mut fixture.renderer, &mut running, &fixture.swap_chain, None).unwrap();
    assert_eq!(*executions.lock().unwrap(), 0);
    assert_eq!(fixture.recorder.number_of_presents(), 1);
}
