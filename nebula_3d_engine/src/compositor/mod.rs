//! Compositor module
//!
//! Declarative workspaces made of nodes, nodes made of targets, targets made
//! of resource passes; and their runtime counterparts which resolve the
//! declared framebuffers and render target textures through the shared
//! caches and record one command buffer per frame.

mod render_queue_index_range;
mod compositor_resource_pass;
mod compositor_node_resource;
mod compositor_node_resource_manager;
mod compositor_workspace_resource;
mod compositor_instance_pass;
mod compositor_pass_factory;
mod compositor_node_instance;
mod compositor_workspace_instance;
pub mod passes;

pub use render_queue_index_range::{RenderQueueIndexRange, merge_render_queue_index_ranges};
pub use compositor_resource_pass::{
    CompositorResourcePass, CompositorResourcePassSettings, UNLIMITED_NUMBER_OF_EXECUTIONS,
    CompositorResourcePassClear, CompositorResourcePassScene, CompositorResourcePassShadowMap,
    CompositorResourcePassResolveMultisample, CompositorResourcePassCopy, CompositorResourcePassGenerateMipmaps,
    CompositorResourcePassDebugGui,
};
pub use compositor_node_resource::{CompositorChannelId, CompositorTarget, CompositorNodeResource};
pub use compositor_node_resource_manager::{CompositorNodeResourceLoader, CompositorNodeResourceManager};
pub use compositor_workspace_resource::{CompositorWorkspaceResource, CompositorWorkspaceResourceManager};
pub use compositor_instance_pass::{CompositorInstancePass, CompositorContextData, SceneView};
pub use compositor_pass_factory::{CompositorPassFactory, CompositorInstancePassConstructor, downcast_resource_pass};
pub use compositor_node_instance::CompositorNodeInstance;
pub use compositor_workspace_instance::CompositorWorkspaceInstance;
pub use passes::*;
