use glam::{Quat, Vec3};
use crate::resource::LoadingState;
use crate::scene::{AABB, CameraSceneItem, LightSceneItem, RenderableManager, SceneResource};
use crate::utils::AssetId;

#[test]
fn test_new_scene_is_unloaded_and_empty() {
    let scene = SceneResource::new(AssetId::new("Scene/Empty"));
    assert_eq!(scene.asset_id(), AssetId::new("Scene/Empty"));
    assert_eq!(scene.loading_state(), LoadingState::Unloaded);
    assert!(!scene.is_loaded());
    assert_eq!(scene.number_of_lights(), 0);
    assert!(scene.renderable_managers().is_empty());
}

#[test]
fn test_keys_stay_valid_after_removals() {
    let mut scene = SceneResource::new(AssetId::new("Scene/Keys"));
    let first = scene.add_light(LightSceneItem::point(Vec3::ZERO, Vec3::ONE, 1.0));
    let second = scene.add_light(LightSceneItem::point(Vec3::X, Vec3::ONE, 2.0));

    assert!(scene.remove_light(first).is_some());
    assert!(scene.light(first).is_none());
    assert_eq!(scene.light(second).unwrap().radius, 2.0);

    // A reused slot never revives a removed key
    let third = scene.add_light(LightSceneItem::directional(Quat::IDENTITY, Vec3::ONE));
    assert_ne!(first, third);
    assert!(scene.light(first).is_none());
}

#[test]
fn test_mesh_scene_item_owns_its_renderable_manager() {
    let mut scene = SceneResource::new(AssetId::new("Scene/Meshes"));
    let mesh = scene.add_mesh_scene_item(
        AssetId::new("Mesh/Crate"),
        RenderableManager::new(AABB::new(Vec3::ZERO, Vec3::ONE)),
    );
    let renderable_manager = scene.mesh_scene_item(mesh).unwrap().renderable_manager;
    assert!(scene.renderable_manager(renderable_manager).is_some());
    assert_eq!(scene.culling_manager().number_of_cullable_renderable_managers(), 1);

    scene.remove_mesh_scene_item(mesh);
    assert_eq!(scene.number_of_mesh_scene_items(), 0);
    assert!(scene.renderable_manager(renderable_manager).is_none());
    assert_eq!(scene.culling_manager().number_of_cullable_renderable_managers(), 0);
}

#[test]
fn test_camera_mutation_through_key() {
    let mut scene = SceneResource::new(AssetId::new("Scene/Camera"));
    let camera = scene.add_camera(CameraSceneItem::new(Vec3::ZERO, Quat::IDENTITY));
    scene.camera_mut(camera).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
    assert_eq!(scene.camera(camera).unwrap().position, Vec3::new(1.0, 2.0, 3.0));

    scene.set_loading_state(LoadingState::Loaded);
    assert!(scene.is_loaded());
}
