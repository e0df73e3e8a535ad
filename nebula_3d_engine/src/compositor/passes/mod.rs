//! Built-in compositor instance passes

mod clear;
mod scene;
mod shadow_map;
mod resolve_multisample;
mod copy;
mod generate_mipmaps;
mod debug_gui;

pub use clear::CompositorInstancePassClear;
pub use scene::CompositorInstancePassScene;
pub use shadow_map::{
    CompositorInstancePassShadowMap, compute_cascade_split_distances, MAXIMUM_NUMBER_OF_SHADOW_CASCADES,
};
pub use resolve_multisample::CompositorInstancePassResolveMultisample;
pub use copy::CompositorInstancePassCopy;
pub use generate_mipmaps::CompositorInstancePassGenerateMipmaps;
pub use debug_gui::CompositorInstancePassDebugGui;
