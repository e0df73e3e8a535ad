use super::*;
use crate::rhi::null::NullRhi;
use crate::rhi::ResourceType;

#[test]
fn test_same_configuration_returns_cached_pass() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderPassManager::new();
    let formats = [TextureFormat::R16G16B16A16_FLOAT];

    let first = manager.get_or_create_render_pass(&mut rhi, &formats, Some(TextureFormat::D32_FLOAT), 4).unwrap();
    let second = manager.get_or_create_render_pass(&mut rhi, &formats, Some(TextureFormat::D32_FLOAT), 4).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(manager.len(), 1);
    assert_eq!(rhi.statistics().created(ResourceType::RenderPass), 1);
}

#[test]
fn test_each_parameter_is_part_of_the_key() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderPassManager::new();
    let hdr = [TextureFormat::R16G16B16A16_FLOAT];

    manager.get_or_create_render_pass(&mut rhi, &hdr, None, 1).unwrap();
    manager.get_or_create_render_pass(&mut rhi, &hdr, None, 4).unwrap();
    manager.get_or_create_render_pass(&mut rhi, &hdr, Some(TextureFormat::D32_FLOAT), 1).unwrap();
    manager.get_or_create_render_pass(&mut rhi, &[TextureFormat::R8G8B8A8_UNORM], None, 1).unwrap();
    manager.get_or_create_render_pass(&mut rhi, &[], Some(TextureFormat::D32_FLOAT), 1).unwrap();
    assert_eq!(manager.len(), 5);
}

#[test]
fn test_color_format_order_matters() {
    let a = RenderPassManager::render_pass_id(&[TextureFormat::R8_UNORM, TextureFormat::R32_FLOAT], None, 1);
    let b = RenderPassManager::render_pass_id(&[TextureFormat::R32_FLOAT, TextureFormat::R8_UNORM], None, 1);
    assert_ne!(a, b);
}

#[test]
fn test_clear_releases_passes() {
    let mut rhi = NullRhi::default();
    let mut manager = RenderPassManager::new();
    manager.get_or_create_render_pass(&mut rhi, &[TextureFormat::R8G8B8A8_UNORM], None, 1).unwrap();
    assert_eq!(rhi.statistics().current(ResourceType::RenderPass), 1);
    manager.clear();
    assert!(manager.is_empty());
    assert_eq!(rhi.statistics().current(ResourceType::RenderPass), 0);
}
