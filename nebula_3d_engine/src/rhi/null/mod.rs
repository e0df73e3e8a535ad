//! Null RHI backend
//!
//! Implements the complete RHI contract without touching a GPU: resources
//! are plain bookkeeping objects, command handlers only validate and record.
//! Useful as a reference for backend authors, for headless runs and for
//! tests, which observe it through `NullRhiRecorder` and `RhiStatistics`.

mod null_resources;
mod null_rhi;

pub use null_resources::*;
pub use null_rhi::{NullRhi, NullRhiConfig, NullRhiRecorder};
