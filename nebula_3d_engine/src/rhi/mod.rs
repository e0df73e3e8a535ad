//! Rendering hardware interface (RHI)
//!
//! Backend-agnostic GPU contract: reference-counted resources created by
//! factory methods, and command buffers recorded without any backend and
//! dispatched later through a static table of handlers. `null` provides a
//! complete backend that renders nothing.

mod resource;
mod rhi;
mod texture;
mod buffer;
mod state;
mod render_target;
mod command;
mod command_buffer;
pub mod null;

pub use resource::*;
pub use rhi::*;
pub use texture::*;
pub use buffer::*;
pub use state::*;
pub use render_target::*;
pub use command::*;
pub use command_buffer::*;
