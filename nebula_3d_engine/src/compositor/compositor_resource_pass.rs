/// Compositor resource passes
///
/// Declarative pass descriptions stored in compositor node resources. The
/// pass factory turns each of them into an instance pass, looked up by its
/// pass type ID; instance pass constructors recover the concrete type with
/// `as_any`.

use std::any::Any;
use crate::resource::CompositorFramebufferId;
use crate::rhi::ClearFlags;
use crate::utils::{AssetId, CompositorPassTypeId, StringId};

/// `number_of_executions` value meaning "every frame"
pub const UNLIMITED_NUMBER_OF_EXECUTIONS: u32 = u32::MAX;

/// Settings every resource pass carries
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassSettings {
    /// Debug event name, empty for the pass type name
    pub debug_name: String,
    /// Skip the very first execution, e.g. for passes reading last frame's data
    pub skip_first_execution: bool,
    /// How many times the pass runs, `UNLIMITED_NUMBER_OF_EXECUTIONS` for every frame
    pub number_of_executions: u32,
}

impl Default for CompositorResourcePassSettings {
    fn default() -> Self {
        Self {
            debug_name: String::new(),
            skip_first_execution: false,
            number_of_executions: UNLIMITED_NUMBER_OF_EXECUTIONS,
        }
    }
}

/// Declarative description of one compositor pass
pub trait CompositorResourcePass: Send + Sync + 'static {
    /// Key into the pass factory registry
    fn pass_type_id(&self) -> CompositorPassTypeId;

    fn settings(&self) -> &CompositorResourcePassSettings;

    /// Render queue indices drawn by this pass, if it draws the scene
    fn render_queue_index_range(&self) -> Option<(u8, u8)> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Type name, pass type ID and settings access for a resource pass struct
macro_rules! compositor_resource_pass_type {
    ($pass:ident, $type_name:expr) => {
        impl $pass {
            pub const TYPE_NAME: &'static str = $type_name;

            /// Pass type ID this pass is registered under
            pub fn pass_type() -> CompositorPassTypeId {
                StringId::new(Self::TYPE_NAME)
            }

            pub fn with_settings(mut self, settings: CompositorResourcePassSettings) -> Self {
                self.settings = settings;
                self
            }
        }
    };
}

/// `CompositorResourcePass` for passes that don't draw the scene
macro_rules! impl_compositor_resource_pass {
    ($pass:ident) => {
        impl CompositorResourcePass for $pass {
            fn pass_type_id(&self) -> CompositorPassTypeId {
                Self::pass_type()
            }

            fn settings(&self) -> &CompositorResourcePassSettings {
                &self.settings
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

// ============================================================================
// Clear
// ============================================================================

/// Clear the render target of the pass
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassClear {
    pub settings: CompositorResourcePassSettings,
    pub clear_flags: ClearFlags,
    pub color: [f32; 4],
    pub z: f32,
    pub stencil: u32,
}

impl CompositorResourcePassClear {
    pub fn new(clear_flags: ClearFlags, color: [f32; 4]) -> Self {
        Self {
            settings: CompositorResourcePassSettings::default(),
            clear_flags,
            color,
            z: 1.0,
            stencil: 0,
        }
    }
}

compositor_resource_pass_type!(CompositorResourcePassClear, "Clear");
impl_compositor_resource_pass!(CompositorResourcePassClear);

// ============================================================================
// Scene
// ============================================================================

/// Draw the renderables of a render queue index range
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassScene {
    pub settings: CompositorResourcePassSettings,
    pub minimum_render_queue_index: u8,
    pub maximum_render_queue_index: u8,
    /// Transparent renderables are drawn back to front by their materials
    pub transparent_pass: bool,
    /// Material technique the pass renders with
    pub material_technique_id: StringId,
}

impl CompositorResourcePassScene {
    pub fn new(minimum_render_queue_index: u8, maximum_render_queue_index: u8) -> Self {
        debug_assert!(minimum_render_queue_index <= maximum_render_queue_index, "Invalid render queue index range");
        Self {
            settings: CompositorResourcePassSettings::default(),
            minimum_render_queue_index,
            maximum_render_queue_index,
            transparent_pass: false,
            material_technique_id: StringId::new("Default"),
        }
    }
}

compositor_resource_pass_type!(CompositorResourcePassScene, "Scene");

impl CompositorResourcePass for CompositorResourcePassScene {
    fn pass_type_id(&self) -> CompositorPassTypeId {
        Self::pass_type()
    }

    fn settings(&self) -> &CompositorResourcePassSettings {
        &self.settings
    }

    fn render_queue_index_range(&self) -> Option<(u8, u8)> {
        Some((self.minimum_render_queue_index, self.maximum_render_queue_index))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Shadow map
// ============================================================================

/// Render the shadow casters of a render queue index range into cascaded shadow maps
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassShadowMap {
    pub settings: CompositorResourcePassSettings,
    pub minimum_render_queue_index: u8,
    pub maximum_render_queue_index: u8,
    /// Asset ID under which the shadow map is published to materials
    pub texture_asset_id: AssetId,
    /// Width and height of each cascade
    pub shadow_map_size: u32,
    /// 1..=4
    pub number_of_cascades: u8,
    pub number_of_multisamples: u8,
    /// Blend between uniform (0) and logarithmic (1) cascade splits
    pub cascade_split_lambda: f32,
}

impl CompositorResourcePassShadowMap {
    pub fn new(minimum_render_queue_index: u8, maximum_render_queue_index: u8, texture_asset_id: AssetId) -> Self {
        debug_assert!(minimum_render_queue_index <= maximum_render_queue_index, "Invalid render queue index range");
        Self {
            settings: CompositorResourcePassSettings::default(),
            minimum_render_queue_index,
            maximum_render_queue_index,
            texture_asset_id,
            shadow_map_size: 1024,
            number_of_cascades: 4,
            number_of_multisamples: 1,
            cascade_split_lambda: 0.99,
        }
    }
}

compositor_resource_pass_type!(CompositorResourcePassShadowMap, "ShadowMap");

impl CompositorResourcePass for CompositorResourcePassShadowMap {
    fn pass_type_id(&self) -> CompositorPassTypeId {
        Self::pass_type()
    }

    fn settings(&self) -> &CompositorResourcePassSettings {
        &self.settings
    }

    fn render_queue_index_range(&self) -> Option<(u8, u8)> {
        Some((self.minimum_render_queue_index, self.maximum_render_queue_index))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Resolve multisample
// ============================================================================

/// Resolve a multisample framebuffer into the render target of the pass
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassResolveMultisample {
    pub settings: CompositorResourcePassSettings,
    pub source_multisample_compositor_framebuffer_id: CompositorFramebufferId,
}

impl CompositorResourcePassResolveMultisample {
    pub fn new(source_multisample_compositor_framebuffer_id: CompositorFramebufferId) -> Self {
        Self {
            settings: CompositorResourcePassSettings::default(),
            source_multisample_compositor_framebuffer_id,
        }
    }
}

compositor_resource_pass_type!(CompositorResourcePassResolveMultisample, "ResolveMultisample");
impl_compositor_resource_pass!(CompositorResourcePassResolveMultisample);

// ============================================================================
// Copy
// ============================================================================

/// Copy one render target texture into another
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassCopy {
    pub settings: CompositorResourcePassSettings,
    pub destination_texture_asset_id: AssetId,
    pub source_texture_asset_id: AssetId,
}

impl CompositorResourcePassCopy {
    pub fn new(destination_texture_asset_id: AssetId, source_texture_asset_id: AssetId) -> Self {
        Self {
            settings: CompositorResourcePassSettings::default(),
            destination_texture_asset_id,
            source_texture_asset_id,
        }
    }
}

compositor_resource_pass_type!(CompositorResourcePassCopy, "Copy");
impl_compositor_resource_pass!(CompositorResourcePassCopy);

// ============================================================================
// Generate mipmaps
// ============================================================================

/// Generate the mipmap chain of a render target texture
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResourcePassGenerateMipmaps {
    pub settings: CompositorResourcePassSettings,
    pub texture_asset_id: AssetId,
}

impl CompositorResourcePassGenerateMipmaps {
    pub fn new(texture_asset_id: AssetId) -> Self {
        Self { settings: CompositorResourcePassSettings::default(), texture_asset_id }
    }
}

compositor_resource_pass_type!(CompositorResourcePassGenerateMipmaps, "GenerateMipmaps");
impl_compositor_resource_pass!(CompositorResourcePassGenerateMipmaps);

// ============================================================================
// Debug GUI
// ============================================================================

/// Draw the debug GUI, if the renderer has the feature enabled
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositorResourcePassDebugGui {
    pub settings: CompositorResourcePassSettings,
}

impl CompositorResourcePassDebugGui {
    pub fn new() -> Self {
        Self::default()
    }
}

compositor_resource_pass_type!(CompositorResourcePassDebugGui, "DebugGui");
impl_compositor_resource_pass!(CompositorResourcePassDebugGui);
