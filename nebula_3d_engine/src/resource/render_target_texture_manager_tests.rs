use super::*;
use crate::rhi::null::NullRhi;
use crate::rhi::{ResourceType, SwapChainDesc, TextureFormat};
use crate::resource::RenderTargetTextureSize;

fn settings(width: u32, height: u32, number_of_multisamples: u8, resolution_scale: f32) -> MainRenderTargetSettings {
    MainRenderTargetSettings { width, height, number_of_multisamples, resolution_scale }
}

fn hdr_signature(flags: RenderTargetTextureFlags) -> RenderTargetTextureSignature {
    RenderTargetTextureSignature::new(
        RenderTargetTextureSize::MAIN_RENDER_TARGET,
        TextureFormat::R16G16B16A16_FLOAT,
        flags,
    )
}

// ============================================================================
// Size resolution
// ============================================================================

#[test]
fn test_resolution_scale_rounds_down() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderTargetTextureManager::new();
    let asset_id = AssetId::new("HdrColor");
    manager.add_render_target_texture(asset_id, hdr_signature(RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE));

    let (texture, _) = manager.get_texture_by_asset_id(&mut rhi, asset_id, &settings(801, 601, 1, 0.5)).unwrap();
    assert_eq!((texture.width(), texture.height()), (400, 300));
}

#[test]
fn test_resolved_size_never_below_one() {
    let signature = hdr_signature(RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE);
    assert_eq!(signature.resolve_size(1, 1, 0.1), (1, 1));
    assert_eq!(signature.resolve_size(3, 2, 0.25), (1, 1));
}

#[test]
fn test_resolution_scale_ignored_without_flag() {
    let signature = hdr_signature(RenderTargetTextureFlags::empty());
    assert_eq!(signature.resolve_size(801, 601, 0.5), (801, 601));
}

#[test]
fn test_absolute_size_ignores_main_render_target() {
    let signature = RenderTargetTextureSignature::new(
        RenderTargetTextureSize::Absolute { width: 2048, height: 2048 },
        TextureFormat::D32_FLOAT,
        RenderTargetTextureFlags::empty(),
    );
    assert_eq!(signature.resolve_size(800, 600, 0.5), (2048, 2048));
}

#[test]
fn test_resolution_scale_leaves_absolute_size_alone() {
    let signature = RenderTargetTextureSignature::new(
        RenderTargetTextureSize::Absolute { width: 1024, height: 512 },
        TextureFormat::R8G8B8A8_UNORM,
        RenderTargetTextureFlags::ALLOW_RESOLUTION_SCALE,
    );
    assert_eq!(signature.resolve_size(800, 600, 0.5), (1024, 512));
    assert_eq!(signature.resolve_size(800, 600, 2.0), (1024, 512));
}

#[test]
fn test_relative_scale_halves_main_size() {
    let signature = RenderTargetTextureSignature::new(
        RenderTargetTextureSize::Relative { width_scale: 0.5, height_scale: 0.25 },
        TextureFormat::R11G11B10_FLOAT,
        RenderTargetTextureFlags::empty(),
    );
    assert_eq!(signature.resolve_size(1920, 1080, 1.0), (960, 270));
}

// ============================================================================
// Lazy creation and caching
// ============================================================================

#[test]
fn test_texture_created_lazily_and_cached() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderTargetTextureManager::new();
    let asset_id = AssetId::new("HdrColor");
    manager.add_render_target_texture(asset_id, hdr_signature(RenderTargetTextureFlags::empty()));
    assert_eq!(rhi.statistics().created(ResourceType::Texture2d), 0);
    assert!(manager.existing_texture_by_asset_id(asset_id).is_none());

    let main = settings(800, 600, 1, 1.0);
    let (first, signature) = manager.get_texture_by_asset_id(&mut rhi, asset_id, &main).unwrap();
    let (second, _) = manager.get_texture_by_asset_id(&mut rhi, asset_id, &main).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(signature.texture_format(), TextureFormat::R16G16B16A16_FLOAT);
    assert_eq!(rhi.statistics().created(ResourceType::Texture2d), 1);
}

#[test]
fn test_texture_recreated_on_multisample_change() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderTargetTextureManager::new();
    let msaa = AssetId::new("MsaaColor");
    let single = AssetId::new("ResolvedColor");
    manager.add_render_target_texture(msaa, hdr_signature(RenderTargetTextureFlags::ALLOW_MULTISAMPLE));
    manager.add_render_target_texture(single, hdr_signature(RenderTargetTextureFlags::SHADER_RESOURCE));

    let (before, _) = manager.get_texture_by_asset_id(&mut rhi, msaa, &settings(800, 600, 1, 1.0)).unwrap();
    let (single_before, _) = manager.get_texture_by_asset_id(&mut rhi, single, &settings(800, 600, 1, 1.0)).unwrap();
    let (after, _) = manager.get_texture_by_asset_id(&mut rhi, msaa, &settings(800, 600, 4, 1.0)).unwrap();
    let (single_after, _) = manager.get_texture_by_asset_id(&mut rhi, single, &settings(800, 600, 4, 1.0)).unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.number_of_multisamples(), 4);
    // Textures that don't allow multisampling are unaffected
    assert!(Arc::ptr_eq(&single_before, &single_after));
    assert_eq!(single_after.number_of_multisamples(), 1);
}

#[test]
fn test_texture_created_against_swap_chain_size() {
    let mut rhi = NullRhi::default();
    let swap_chain = rhi.create_swap_chain(&SwapChainDesc {
        width: 1280,
        height: 720,
        color_format: TextureFormat::B8G8R8A8_SRGB,
        depth_stencil_format: None,
        debug_name: "window".to_string(),
    }).unwrap();
    let main = MainRenderTargetSettings::new(&RenderTarget::from(swap_chain), 1, 1.0);

    let mut manager = RenderTargetTextureManager::new();
    let asset_id = AssetId::new("Depth");
    manager.add_render_target_texture(asset_id, RenderTargetTextureSignature::new(
        RenderTargetTextureSize::MAIN_RENDER_TARGET,
        TextureFormat::D32_FLOAT,
        RenderTargetTextureFlags::empty(),
    ));
    let (texture, _) = manager.get_texture_by_asset_id(&mut rhi, asset_id, &main).unwrap();
    assert_eq!((texture.width(), texture.height()), (1280, 720));
}

#[test]
fn test_unknown_asset_id_is_an_error() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderTargetTextureManager::new();
    let result = manager.get_texture_by_asset_id(&mut rhi, AssetId::new("Missing"), &settings(8, 8, 1, 1.0));
    assert!(result.is_err());
}

// ============================================================================
// Reference counting and invalidation
// ============================================================================

#[test]
fn test_logical_reference_counting() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderTargetTextureManager::new();
    let asset_id = AssetId::new("Shared");
    let signature = hdr_signature(RenderTargetTextureFlags::empty());
    manager.add_render_target_texture(asset_id, signature);
    manager.add_render_target_texture(asset_id, signature);
    assert_eq!(manager.number_of_references(asset_id), 2);
    assert_eq!(manager.len(), 1);
    manager.get_texture_by_asset_id(&mut rhi, asset_id, &settings(64, 64, 1, 1.0)).unwrap();

    manager.release_render_target_texture_by_signature(&signature);
    assert_eq!(manager.number_of_references(asset_id), 1);
    assert_eq!(rhi.statistics().current(ResourceType::Texture2d), 1);

    manager.release_render_target_texture(asset_id);
    assert!(manager.is_empty());
    assert_eq!(rhi.statistics().current(ResourceType::Texture2d), 0);
}

#[test]
fn test_clear_rhi_resources_keeps_announcements() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderTargetTextureManager::new();
    let asset_id = AssetId::new("HdrColor");
    manager.add_render_target_texture(asset_id, hdr_signature(RenderTargetTextureFlags::empty()));
    let main = settings(320, 240, 1, 1.0);
    let (before, _) = manager.get_texture_by_asset_id(&mut rhi, asset_id, &main).unwrap();
    drop(before);

    manager.clear_rhi_resources();
    assert_eq!(manager.number_of_created_textures(), 0);
    assert_eq!(manager.len(), 1);
    assert_eq!(rhi.statistics().current(ResourceType::Texture2d), 0);

    manager.get_texture_by_asset_id(&mut rhi, asset_id, &main).unwrap();
    assert_eq!(rhi.statistics().created(ResourceType::Texture2d), 2);

    manager.clear();
    assert!(manager.is_empty());
}
