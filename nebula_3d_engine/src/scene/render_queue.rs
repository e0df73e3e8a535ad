/// Render queue - sorts and records the draw calls of a scene pass.
///
/// Renderables are gathered from the renderable managers culling bucketed
/// into the workspace's render queue index ranges, sorted by a 64-bit key and
/// recorded with redundant state changes removed:
///
/// ```text
/// bits 63..56  render queue index
/// bits 55..24  graphics pipeline state ID
/// bits 23..0   queued renderable index
/// ```

use std::sync::Arc;
use rdst::RadixSort;
use crate::engine_warn;
use crate::compositor::RenderQueueIndexRange;
use crate::rhi::{
    CommandBuffer, DrawArguments, DrawGraphics, DrawIndexedArguments, DrawIndexedGraphics,
    GraphicsPipelineState, RootSignature, SetGraphicsPipelineState, SetGraphicsRootSignature,
    SetGraphicsVertexArray, VertexArray,
};
use super::{DrawCount, Renderable, SceneResource};

/// Maximum number of renderables a queue can sort in one frame
pub const MAXIMUM_NUMBER_OF_QUEUED_RENDERABLES: usize = 1 << 24;

struct QueuedRenderable {
    vertex_array: Arc<dyn VertexArray>,
    graphics_pipeline_state: Arc<dyn GraphicsPipelineState>,
    draw_count: DrawCount,
    number_of_instances: u32,
}

/// Draw calls of one scene pass for the current frame
pub struct RenderQueue {
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    cast_shadows_only: bool,
    /// 2 when both eyes are drawn with one instanced draw
    instance_multiplier: u32,
    /// At most `MAXIMUM_NUMBER_OF_QUEUED_RENDERABLES`, the width of the sort key index bits
    maximum_number_of_queued_renderables: usize,
    overflow_reported: bool,
    queued_renderables: Vec<QueuedRenderable>,
    sort_keys: Vec<u64>,
}

fn sort_key(render_queue_index: u8, graphics_pipeline_state_id: u32, queued_index: usize) -> u64 {
    ((render_queue_index as u64) << 56) | ((graphics_pipeline_state_id as u64) << 24) | queued_index as u64
}

fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl RenderQueue {
    /// Queue for renderables in `[minimum, maximum]`, optionally only shadow casters
    pub fn new(minimum_render_queue_index: u8, maximum_render_queue_index: u8, cast_shadows_only: bool) -> Self {
        debug_assert!(minimum_render_queue_index <= maximum_render_queue_index, "Invalid render queue index range");
        Self {
            minimum_render_queue_index,
            maximum_render_queue_index,
            cast_shadows_only,
            instance_multiplier: 1,
            maximum_number_of_queued_renderables: MAXIMUM_NUMBER_OF_QUEUED_RENDERABLES,
            overflow_reported: false,
            queued_renderables: Vec::new(),
            sort_keys: Vec::new(),
        }
    }

    pub fn minimum_render_queue_index(&self) -> u8 {
        self.minimum_render_queue_index
    }

    pub fn maximum_render_queue_index(&self) -> u8 {
        self.maximum_render_queue_index
    }

    /// Double every instance count so one draw covers both eyes
    pub fn set_single_pass_stereo_instancing(&mut self, single_pass_stereo_instancing: bool) {
        self.instance_multiplier = if single_pass_stereo_instancing { 2 } else { 1 };
    }

    pub fn maximum_number_of_queued_renderables(&self) -> usize {
        self.maximum_number_of_queued_renderables
    }

    /// Lower the per-frame capacity, clamped to `1..=MAXIMUM_NUMBER_OF_QUEUED_RENDERABLES`
    pub fn set_maximum_number_of_queued_renderables(&mut self, maximum_number_of_queued_renderables: usize) {
        self.maximum_number_of_queued_renderables =
            maximum_number_of_queued_renderables.clamp(1, MAXIMUM_NUMBER_OF_QUEUED_RENDERABLES);
    }

    pub fn number_of_queued_renderables(&self) -> usize {
        self.queued_renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued_renderables.is_empty()
    }

    pub fn clear(&mut self) {
        self.queued_renderables.clear();
        self.sort_keys.clear();
        self.overflow_reported = false;
    }

    /// Queue the renderables of the gathered managers this queue is interested in
    ///
    /// Each renderable is taken from the single merged range containing its
    /// render queue index, so managers listed in several ranges are never
    /// queued twice. Renderables still waiting for their vertex array or
    /// pipeline state are skipped.
    pub fn add_renderable_managers(&mut self, scene: &SceneResource, ranges: &[RenderQueueIndexRange]) {
        for range in ranges {
            if !range.overlaps(self.minimum_render_queue_index, self.maximum_render_queue_index) {
                continue;
            }
            let minimum = range.minimum_render_queue_index.max(self.minimum_render_queue_index);
            let maximum = range.maximum_render_queue_index.min(self.maximum_render_queue_index);

            for key in &range.renderable_managers {
                let Some(manager) = scene.renderable_manager(*key) else {
                    continue;
                };
                if self.cast_shadows_only && !manager.cast_shadows() {
                    continue;
                }
                for renderable in manager.renderables() {
                    if (minimum..=maximum).contains(&renderable.render_queue_index) {
                        self.add_renderable(renderable);
                    }
                }
            }
        }
    }

    fn add_renderable(&mut self, renderable: &Renderable) {
        if self.cast_shadows_only && !renderable.cast_shadows {
            return;
        }
        let (Some(vertex_array), Some(graphics_pipeline_state)) =
            (&renderable.vertex_array, &renderable.graphics_pipeline_state)
        else {
            return;
        };
        let empty = match renderable.draw_count {
            DrawCount::Vertices { number_of_vertices, .. } => number_of_vertices == 0,
            DrawCount::Indices { number_of_indices, .. } => number_of_indices == 0,
        };
        if empty || renderable.number_of_instances == 0 {
            return;
        }
        let queued_index = self.queued_renderables.len();
        // The index must fit the low sort key bits, excess renderables are dropped for this frame
        if queued_index >= self.maximum_number_of_queued_renderables {
            if !self.overflow_reported {
                engine_warn!("nebula3d::RenderQueue",
                    "Render queue full ({} renderables), further renderables are skipped this frame",
                    self.maximum_number_of_queued_renderables);
                self.overflow_reported = true;
            }
            return;
        }

        self.sort_keys.push(sort_key(renderable.render_queue_index, graphics_pipeline_state.id(), queued_index));
        self.queued_renderables.push(QueuedRenderable {
            vertex_array: vertex_array.clone(),
            graphics_pipeline_state: graphics_pipeline_state.clone(),
            draw_count: renderable.draw_count,
            number_of_instances: renderable.number_of_instances,
        });
    }

    /// Sort, record every queued draw call and empty the queue
    ///
    /// Returns the number of recorded draw calls.
    pub fn fill_command_buffer(&mut self, command_buffer: &mut CommandBuffer) -> usize {
        self.sort_keys.radix_sort_unstable();

        let mut current_root_signature: Option<&Arc<dyn RootSignature>> = None;
        let mut current_graphics_pipeline_state: Option<&Arc<dyn GraphicsPipelineState>> = None;
        let mut current_vertex_array: Option<&Arc<dyn VertexArray>> = None;

        for sort_key in &self.sort_keys {
            let queued = &self.queued_renderables[(*sort_key & 0xFF_FFFF) as usize];

            if !current_graphics_pipeline_state.is_some_and(|current| same_object(current, &queued.graphics_pipeline_state)) {
                let root_signature = queued.graphics_pipeline_state.root_signature();
                if !current_root_signature.is_some_and(|current| same_object(current, root_signature)) {
                    SetGraphicsRootSignature::create(command_buffer, Some(root_signature));
                    current_root_signature = Some(root_signature);
                }
                SetGraphicsPipelineState::create(command_buffer, Some(&queued.graphics_pipeline_state));
                current_graphics_pipeline_state = Some(&queued.graphics_pipeline_state);
            }

            if !current_vertex_array.is_some_and(|current| same_object(current, &queued.vertex_array)) {
                SetGraphicsVertexArray::create(command_buffer, Some(&queued.vertex_array));
                current_vertex_array = Some(&queued.vertex_array);
            }

            match queued.draw_count {
                DrawCount::Vertices { number_of_vertices, start_vertex } => {
                    DrawGraphics::create_emulated(command_buffer, &[DrawArguments {
                        vertex_count_per_instance: number_of_vertices,
                        instance_count: queued.number_of_instances * self.instance_multiplier,
                        start_vertex_location: start_vertex,
                        start_instance_location: 0,
                    }]);
                }
                DrawCount::Indices { number_of_indices, start_index, base_vertex } => {
                    debug_assert!(queued.vertex_array.index_buffer().is_some(), "Indexed draw without index buffer");
                    DrawIndexedGraphics::create_emulated(command_buffer, &[DrawIndexedArguments {
                        index_count_per_instance: number_of_indices,
                        instance_count: queued.number_of_instances * self.instance_multiplier,
                        start_index_location: start_index,
                        base_vertex_location: base_vertex,
                        start_instance_location: 0,
                    }]);
                }
            }
        }

        let number_of_draws = self.sort_keys.len();
        self.clear();
        number_of_draws
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
