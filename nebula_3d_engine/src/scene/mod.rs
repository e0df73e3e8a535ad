//! Scene module
//!
//! Scene resources (cameras, lights, meshes, renderable managers), frustum
//! culling into render queue index ranges, the render queue recording the
//! draw calls of scene passes, and the light buffer.

mod aabb;
mod frustum;
mod scene_item;
mod renderable_manager;
mod scene_resource;
mod scene_culling_manager;
mod render_queue;
mod light_buffer_manager;

pub use aabb::AABB;
pub use frustum::{
    Frustum, FrustumTest, PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use scene_item::{CameraSceneItem, LightSceneItem, LightType};
pub use renderable_manager::{DrawCount, Renderable, RenderableManager};
pub use scene_resource::{
    SceneResource, MeshSceneItem, CameraSceneItemKey, LightSceneItemKey, MeshSceneItemKey, RenderableManagerKey,
};
pub use scene_culling_manager::SceneCullingManager;
pub use render_queue::{RenderQueue, MAXIMUM_NUMBER_OF_QUEUED_RENDERABLES};
pub use light_buffer_manager::{LightBufferManager, LightBufferHeader, PackedLight, NUMBER_OF_LIGHT_BUFFERS};
