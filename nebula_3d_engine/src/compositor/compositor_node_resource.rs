/// Compositor node resource
///
/// A node declares the render target textures and framebuffers it needs,
/// the channels it exchanges with neighbouring nodes, and an ordered list of
/// targets. Each target names the framebuffer its passes render into (or
/// none to keep rendering into the incoming render target) and holds an
/// ordered list of resource passes.

use std::fmt;
use std::sync::Arc;
use crate::resource::{CompositorFramebufferId, FramebufferSignature, RenderTargetTextureSignature};
use crate::utils::{AssetId, StringId};
use super::CompositorResourcePass;

/// Name of a node input or output channel
pub type CompositorChannelId = StringId;

/// Ordered passes rendering into one framebuffer
#[derive(Clone, Default)]
pub struct CompositorTarget {
    /// `None` renders into whatever the previous target left bound
    pub compositor_framebuffer_id: Option<CompositorFramebufferId>,
    pub passes: Vec<Arc<dyn CompositorResourcePass>>,
}

impl CompositorTarget {
    pub fn new(compositor_framebuffer_id: Option<CompositorFramebufferId>) -> Self {
        Self { compositor_framebuffer_id, passes: Vec::new() }
    }

    pub fn with_pass(mut self, pass: impl CompositorResourcePass) -> Self {
        self.passes.push(Arc::new(pass));
        self
    }
}

impl fmt::Debug for CompositorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositorTarget")
            .field("compositor_framebuffer_id", &self.compositor_framebuffer_id)
            .field("number_of_passes", &self.passes.len())
            .finish()
    }
}

/// Declarative compositor node
#[derive(Debug, Clone)]
pub struct CompositorNodeResource {
    asset_id: AssetId,
    input_channels: Vec<CompositorChannelId>,
    output_channels: Vec<CompositorChannelId>,
    render_target_textures: Vec<(AssetId, RenderTargetTextureSignature)>,
    framebuffers: Vec<(CompositorFramebufferId, FramebufferSignature)>,
    targets: Vec<CompositorTarget>,
}

impl CompositorNodeResource {
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            input_channels: Vec::new(),
            output_channels: Vec::new(),
            render_target_textures: Vec::new(),
            framebuffers: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn with_input_channel(mut self, channel: CompositorChannelId) -> Self {
        self.input_channels.push(channel);
        self
    }

    pub fn with_output_channel(mut self, channel: CompositorChannelId) -> Self {
        self.output_channels.push(channel);
        self
    }

    /// Declare a render target texture, announced to the texture cache on load
    pub fn with_render_target_texture(mut self, asset_id: AssetId, signature: RenderTargetTextureSignature) -> Self {
        self.render_target_textures.push((asset_id, signature));
        self
    }

    /// Declare a framebuffer, announced to the framebuffer cache on load
    pub fn with_framebuffer(mut self, compositor_framebuffer_id: CompositorFramebufferId, signature: FramebufferSignature) -> Self {
        self.framebuffers.push((compositor_framebuffer_id, signature));
        self
    }

    pub fn with_target(mut self, target: CompositorTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn input_channels(&self) -> &[CompositorChannelId] {
        &self.input_channels
    }

    pub fn output_channels(&self) -> &[CompositorChannelId] {
        &self.output_channels
    }

    pub fn render_target_textures(&self) -> &[(AssetId, RenderTargetTextureSignature)] {
        &self.render_target_textures
    }

    pub fn framebuffers(&self) -> &[(CompositorFramebufferId, FramebufferSignature)] {
        &self.framebuffers
    }

    pub fn targets(&self) -> &[CompositorTarget] {
        &self.targets
    }

    /// Total number of resource passes over all targets
    pub fn number_of_passes(&self) -> usize {
        self.targets.iter().map(|target| target.passes.len()).sum()
    }
}
