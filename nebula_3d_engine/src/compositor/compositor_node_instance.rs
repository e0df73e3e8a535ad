/// Compositor node instances
///
/// Runtime form of a compositor node resource: one instance pass per
/// resource pass, grouped by target. Every frame the node binds the render
/// target of each of its targets and lets the passes record their commands.

use std::sync::Arc;
use crate::error::Result;
use crate::engine_trace;
use crate::resource::{CompositorFramebufferId, MainRenderTargetSettings, Renderer};
use crate::rhi::{
    BeginDebugEvent, CommandBuffer, EndDebugEvent, RenderTarget, Rhi, ScissorRectangle,
    SetGraphicsRenderTarget, SetGraphicsScissorRectangles, SetGraphicsViewports, Viewport,
};
use super::{
    CompositorContextData, CompositorInstancePass, CompositorNodeResource, UNLIMITED_NUMBER_OF_EXECUTIONS,
};

/// Instance pass plus its execution bookkeeping
struct CompositorInstancePassSlot {
    pass: Box<dyn CompositorInstancePass>,
    debug_name: String,
    number_of_executions_to_perform: u32,
    skip_first_execution: bool,
}

impl CompositorInstancePassSlot {
    /// Whether the pass runs this frame, consuming one execution if so
    fn begin_execution(&mut self) -> bool {
        if self.skip_first_execution {
            self.skip_first_execution = false;
            return false;
        }
        match self.number_of_executions_to_perform {
            0 => false,
            UNLIMITED_NUMBER_OF_EXECUTIONS => true,
            _ => {
                self.number_of_executions_to_perform -= 1;
                true
            }
        }
    }
}

struct CompositorInstanceTarget {
    /// `None` renders into the render target the workspace executes against
    compositor_framebuffer_id: Option<CompositorFramebufferId>,
    passes: Vec<CompositorInstancePassSlot>,
}

pub struct CompositorNodeInstance {
    resource: Arc<CompositorNodeResource>,
    targets: Vec<CompositorInstanceTarget>,
}

impl CompositorNodeInstance {
    /// Build the instance passes of a node with the renderer's pass factory
    ///
    /// # Errors
    ///
    /// Returns an error if a pass type isn't registered with the factory.
    pub fn new(resource: Arc<CompositorNodeResource>, renderer: &Renderer) -> Result<Self> {
        let factory = renderer.compositor_pass_factory();
        let mut targets = Vec::with_capacity(resource.targets().len());
        for target in resource.targets() {
            let mut passes = Vec::with_capacity(target.passes.len());
            for resource_pass in &target.passes {
                let settings = resource_pass.settings();
                passes.push(CompositorInstancePassSlot {
                    pass: factory.create(resource_pass, &resource, renderer)?,
                    debug_name: if settings.debug_name.is_empty() {
                        resource_pass.pass_type_id().to_string()
                    } else {
                        settings.debug_name.clone()
                    },
                    number_of_executions_to_perform: settings.number_of_executions,
                    skip_first_execution: settings.skip_first_execution,
                });
            }
            targets.push(CompositorInstanceTarget {
                compositor_framebuffer_id: target.compositor_framebuffer_id,
                passes,
            });
        }
        Ok(Self { resource, targets })
    }

    pub fn resource(&self) -> &Arc<CompositorNodeResource> {
        &self.resource
    }

    pub fn number_of_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn number_of_passes(&self, target_index: usize) -> usize {
        self.targets.get(target_index).map_or(0, |target| target.passes.len())
    }

    pub fn compositor_instance_pass(&self, target_index: usize, pass_index: usize) -> Option<&dyn CompositorInstancePass> {
        let slot = self.targets.get(target_index)?.passes.get(pass_index)?;
        Some(slot.pass.as_ref())
    }

    pub fn compositor_instance_pass_mut(&mut self, target_index: usize, pass_index: usize) -> Option<&mut dyn CompositorInstancePass> {
        let slot = self.targets.get_mut(target_index)?.passes.get_mut(pass_index)?;
        Some(slot.pass.as_mut())
    }

    /// Every instance pass with its (target, pass) index, in execution order
    pub fn compositor_instance_passes(&self) -> impl Iterator<Item = (usize, usize, &dyn CompositorInstancePass)> + '_ {
        self.targets.iter().enumerate().flat_map(|(target_index, target)| {
            target
                .passes
                .iter()
                .enumerate()
                .map(move |(pass_index, slot)| (target_index, pass_index, slot.pass.as_ref()))
        })
    }

    /// Render queue index ranges declared by the resource passes
    pub fn declared_render_queue_index_ranges(&self) -> Vec<(u8, u8)> {
        self.resource
            .targets()
            .iter()
            .flat_map(|target| target.passes.iter())
            .filter_map(|pass| pass.render_queue_index_range())
            .collect()
    }

    pub(crate) fn on_compositor_workspace_instance_loading_finished(&mut self, rhi: &mut dyn Rhi, renderer: &mut Renderer) -> Result<()> {
        for target in &mut self.targets {
            for slot in &mut target.passes {
                slot.pass.on_compositor_workspace_instance_loading_finished(rhi, renderer)?;
            }
        }
        Ok(())
    }

    /// Create the GPU textures and framebuffers of this node up front
    pub(crate) fn resolve_rhi_resources(
        &self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        settings: &MainRenderTargetSettings,
    ) -> Result<()> {
        for (asset_id, _) in self.resource.render_target_textures() {
            renderer.render_target_texture_manager.get_texture_by_asset_id(rhi, *asset_id, settings)?;
        }
        for target in &self.targets {
            if let Some(compositor_framebuffer_id) = target.compositor_framebuffer_id {
                renderer.framebuffer_manager.get_framebuffer_by_compositor_framebuffer_id(
                    rhi,
                    &mut renderer.render_target_texture_manager,
                    &mut renderer.render_pass_manager,
                    compositor_framebuffer_id,
                    settings,
                )?;
            }
        }
        Ok(())
    }

    /// Record the commands of every target
    ///
    /// `render_target` is what the previous node left bound; the returned
    /// target is what this node leaves bound for the next one.
    pub(crate) fn fill_command_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        mut render_target: Option<RenderTarget>,
        execution_render_target: &RenderTarget,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<Option<RenderTarget>> {
        let graphics_debugger = renderer.features().graphics_debugger;
        for target in &mut self.targets {
            let target_render_target = match target.compositor_framebuffer_id {
                Some(compositor_framebuffer_id) => RenderTarget::from(
                    renderer.framebuffer_manager.get_framebuffer_by_compositor_framebuffer_id(
                        rhi,
                        &mut renderer.render_target_texture_manager,
                        &mut renderer.render_pass_manager,
                        compositor_framebuffer_id,
                        &context.settings,
                    )?,
                ),
                None => execution_render_target.clone(),
            };

            for slot in &mut target.passes {
                if !slot.begin_execution() {
                    engine_trace!("nebula3d::CompositorNodeInstance",
                        "Skipping pass \"{}\" of node {}", slot.debug_name, self.resource.asset_id());
                    continue;
                }

                let bound = render_target.as_ref().is_some_and(|bound| bound.same_as(&target_render_target));
                if !bound {
                    bind_render_target(command_buffer, &target_render_target);
                    render_target = Some(target_render_target.clone());
                }

                if graphics_debugger {
                    BeginDebugEvent::create(command_buffer, &slot.debug_name);
                }
                slot.pass.on_fill_command_buffer(rhi, renderer, render_target.as_ref(), context, command_buffer)?;
                if graphics_debugger {
                    EndDebugEvent::create(command_buffer);
                }

                if slot.pass.binds_own_render_target() {
                    render_target = None;
                }
            }
        }
        Ok(render_target)
    }

    pub(crate) fn on_compositor_workspace_instance_destroyed(&mut self, renderer: &mut Renderer) {
        for target in &mut self.targets {
            for slot in &mut target.passes {
                slot.pass.on_compositor_workspace_instance_destroyed(renderer);
            }
        }
    }

    pub(crate) fn on_post_command_buffer_dispatch(&mut self) {
        for target in &mut self.targets {
            for slot in &mut target.passes {
                slot.pass.on_post_command_buffer_dispatch();
            }
        }
    }
}

/// Bind a render target together with a viewport and scissor covering it
fn bind_render_target(command_buffer: &mut CommandBuffer, render_target: &RenderTarget) {
    let (width, height) = render_target.size();
    SetGraphicsRenderTarget::create(command_buffer, Some(render_target));
    SetGraphicsViewports::create(command_buffer, &[Viewport::full(width, height)]);
    SetGraphicsScissorRectangles::create(command_buffer, &[ScissorRectangle {
        top_left_x: 0,
        top_left_y: 0,
        bottom_right_x: width as i32,
        bottom_right_y: height as i32,
    }]);
}
