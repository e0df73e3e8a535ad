//! VR module
//!
//! A workspace executed through `CompositorWorkspaceInstance::execute_vr`
//! goes through the VR manager while VR is enabled and the VR runtime is
//! running, and renders like a plain `execute` otherwise. Device
//! integration lives outside the engine, behind `VrManager`.

use crate::compositor::{CompositorWorkspaceInstance, SceneView};
use crate::error::Result;
use crate::resource::Renderer;
use crate::rhi::RenderTarget;

/// VR runtime hook
///
/// Implementations usually render each eye by calling
/// `CompositorWorkspaceInstance::execute` with the eye's render target and
/// camera, then hand the results to the VR compositor.
pub trait VrManager {
    /// Whether the VR runtime is up and rendering is expected to go through it
    fn is_running(&self) -> bool;

    fn execute_compositor_workspace_instance(
        &mut self,
        compositor_workspace_instance: &mut CompositorWorkspaceInstance,
        renderer: &mut Renderer,
        render_target: &RenderTarget,
        scene_view: Option<SceneView<'_>>,
    ) -> Result<()>;
}

/// VR manager used when VR is disabled, never running
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVrManager;

impl VrManager for NullVrManager {
    fn is_running(&self) -> bool {
        false
    }

    fn execute_compositor_workspace_instance(
        &mut self,
        compositor_workspace_instance: &mut CompositorWorkspaceInstance,
        renderer: &mut Renderer,
        render_target: &RenderTarget,
        scene_view: Option<SceneView<'_>>,
    ) -> Result<()> {
        compositor_workspace_instance.execute(renderer, render_target, scene_view)
    }
}
