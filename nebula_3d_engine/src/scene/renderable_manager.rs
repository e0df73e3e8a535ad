/// Renderables and the renderable manager grouping them
///
/// A renderable manager is the unit of culling: it owns a local bounding box
/// and a world transform, and lists the renderables (draw calls) of one scene
/// object. Renderables whose vertex array or pipeline state is still being
/// created (streaming, pipeline compilation) are simply skipped by the
/// render queue until both are available.

use std::sync::Arc;
use glam::Mat4;
use crate::rhi::{GraphicsPipelineState, VertexArray};
use super::AABB;

/// What a renderable draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCount {
    /// Non-indexed draw
    Vertices { number_of_vertices: u32, start_vertex: u32 },
    /// Indexed draw, the vertex array must carry an index buffer
    Indices { number_of_indices: u32, start_index: u32, base_vertex: i32 },
}

/// One draw call of a renderable manager
#[derive(Clone)]
pub struct Renderable {
    pub vertex_array: Option<Arc<dyn VertexArray>>,
    pub graphics_pipeline_state: Option<Arc<dyn GraphicsPipelineState>>,
    pub draw_count: DrawCount,
    pub number_of_instances: u32,
    /// Render queue the renderable is drawn in (0..=255)
    pub render_queue_index: u8,
    pub cast_shadows: bool,
}

impl Renderable {
    pub fn new(draw_count: DrawCount, render_queue_index: u8) -> Self {
        Self {
            vertex_array: None,
            graphics_pipeline_state: None,
            draw_count,
            number_of_instances: 1,
            render_queue_index,
            cast_shadows: false,
        }
    }

    pub fn with_vertex_array(mut self, vertex_array: Arc<dyn VertexArray>) -> Self {
        self.vertex_array = Some(vertex_array);
        self
    }

    pub fn with_graphics_pipeline_state(mut self, graphics_pipeline_state: Arc<dyn GraphicsPipelineState>) -> Self {
        self.graphics_pipeline_state = Some(graphics_pipeline_state);
        self
    }

    pub fn with_cast_shadows(mut self, cast_shadows: bool) -> Self {
        self.cast_shadows = cast_shadows;
        self
    }

    /// Both GPU objects are available
    pub fn is_ready(&self) -> bool {
        self.vertex_array.is_some() && self.graphics_pipeline_state.is_some()
    }
}

impl std::fmt::Debug for Renderable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderable")
            .field("draw_count", &self.draw_count)
            .field("render_queue_index", &self.render_queue_index)
            .field("cast_shadows", &self.cast_shadows)
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Group of renderables sharing a transform and a bounding box
#[derive(Debug, Clone)]
pub struct RenderableManager {
    renderables: Vec<Renderable>,
    transform: Mat4,
    local_aabb: AABB,
    world_aabb: AABB,
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    cast_shadows: bool,
    visible: bool,
}

impl RenderableManager {
    pub fn new(local_aabb: AABB) -> Self {
        Self {
            renderables: Vec::new(),
            transform: Mat4::IDENTITY,
            local_aabb,
            world_aabb: local_aabb,
            minimum_render_queue_index: 0,
            maximum_render_queue_index: 0,
            cast_shadows: false,
            visible: true,
        }
    }

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    pub fn add_renderable(&mut self, renderable: Renderable) {
        self.renderables.push(renderable);
        self.update_cached_renderables_data();
    }

    /// Replace every renderable, e.g. once a streamed mesh finished loading
    pub fn set_renderables(&mut self, renderables: Vec<Renderable>) {
        self.renderables = renderables;
        self.update_cached_renderables_data();
    }

    /// Mutable access, cached render queue data is refreshed afterwards
    pub fn update_renderables<F: FnOnce(&mut Vec<Renderable>)>(&mut self, update: F) {
        update(&mut self.renderables);
        self.update_cached_renderables_data();
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.world_aabb = self.local_aabb.transformed(&transform);
    }

    pub fn local_aabb(&self) -> &AABB {
        &self.local_aabb
    }

    pub fn set_local_aabb(&mut self, local_aabb: AABB) {
        self.local_aabb = local_aabb;
        self.world_aabb = local_aabb.transformed(&self.transform);
    }

    /// World-space bounding box, kept in sync with the transform
    pub fn world_aabb(&self) -> &AABB {
        &self.world_aabb
    }

    pub fn minimum_render_queue_index(&self) -> u8 {
        self.minimum_render_queue_index
    }

    pub fn maximum_render_queue_index(&self) -> u8 {
        self.maximum_render_queue_index
    }

    /// Whether any renderable lies within `[minimum, maximum]`
    pub fn overlaps_render_queue_index_range(&self, minimum: u8, maximum: u8) -> bool {
        !self.renderables.is_empty()
            && self.minimum_render_queue_index <= maximum
            && self.maximum_render_queue_index >= minimum
    }

    /// At least one renderable casts shadows
    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update_cached_renderables_data(&mut self) {
        let indices = self.renderables.iter().map(|renderable| renderable.render_queue_index);
        self.minimum_render_queue_index = indices.clone().min().unwrap_or(0);
        self.maximum_render_queue_index = indices.max().unwrap_or(0);
        self.cast_shadows = self.renderables.iter().any(|renderable| renderable.cast_shadows);
    }
}
