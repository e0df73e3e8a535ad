/*!
# Nebula 3D Engine

Compositor-driven real-time rendering runtime on top of a backend-agnostic
rendering hardware interface (RHI).

## Architecture

- **RHI**: reference-counted GPU resources, command buffers recorded without
  any backend and dispatched in order, and the Null backend which renders
  nothing but honors the whole contract
- **Resource caches**: render passes, render target textures and
  framebuffers, created lazily from declarative signatures and shared by
  every compositor workspace of a renderer
- **Compositor**: workspaces made of nodes made of passes; a workspace
  instance records and submits one command buffer per frame
- **Scene**: cameras, lights and renderable managers, frustum culling into
  render queue index ranges, and the light buffer
- **VR**: strategy hook executing workspaces through a running VR runtime

Everything except the logger is constructed explicitly and passed by
reference.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod utils;
pub mod rhi;
pub mod resource;
pub mod compositor;
pub mod scene;
pub mod vr;

// Main nebula3d namespace module
pub mod nebula3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Process-wide logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod utils {
        pub use crate::utils::*;
    }

    pub mod rhi {
        pub use crate::rhi::*;
    }

    pub mod resource {
        pub use crate::resource::*;
    }

    pub mod compositor {
        pub use crate::compositor::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod vr {
        pub use crate::vr::*;
    }
}

// Re-export math library at crate root
pub use glam;
