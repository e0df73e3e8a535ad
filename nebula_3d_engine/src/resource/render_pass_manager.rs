/// Render pass cache
///
/// Render passes are cheap and few. They are keyed by a hash of their
/// attachment formats and sample count and live as long as the manager.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_debug;
use crate::rhi::{Rhi, RenderPass, RenderPassDesc, TextureFormat};
use super::signature_hasher::SignatureHasher;

/// Caches GPU render passes by configuration
#[derive(Default)]
pub struct RenderPassManager {
    render_passes: FxHashMap<u64, Arc<dyn RenderPass>>,
}

impl RenderPassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key of a render pass configuration
    pub fn render_pass_id(
        color_attachment_formats: &[TextureFormat],
        depth_stencil_attachment_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> u64 {
        let mut hasher = SignatureHasher::new();
        hasher.write_u32(color_attachment_formats.len() as u32);
        for format in color_attachment_formats {
            hasher.write_u32(format.code());
        }
        match depth_stencil_attachment_format {
            Some(format) => hasher.write_u8(1).write_u32(format.code()),
            None => hasher.write_u8(0),
        };
        hasher.write_u8(number_of_multisamples);
        hasher.finish()
    }

    /// Return the cached render pass for this configuration, creating it on a miss
    pub fn get_or_create_render_pass(
        &mut self,
        rhi: &mut dyn Rhi,
        color_attachment_formats: &[TextureFormat],
        depth_stencil_attachment_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> Result<Arc<dyn RenderPass>> {
        let id = Self::render_pass_id(color_attachment_formats, depth_stencil_attachment_format, number_of_multisamples);
        if let Some(render_pass) = self.render_passes.get(&id) {
            debug_assert_eq!(render_pass.color_attachment_formats(), color_attachment_formats);
            return Ok(render_pass.clone());
        }

        let render_pass = rhi.create_render_pass(&RenderPassDesc {
            color_attachment_formats: color_attachment_formats.to_vec(),
            depth_stencil_attachment_format,
            number_of_multisamples,
            debug_name: format!("Compositor render pass {:016x}", id),
        })?;
        engine_debug!("nebula3d::RenderPassManager",
            "Created render pass with {} color attachment(s), {}x MSAA",
            color_attachment_formats.len(), number_of_multisamples);
        self.render_passes.insert(id, render_pass.clone());
        Ok(render_pass)
    }

    /// Number of cached render passes
    pub fn len(&self) -> usize {
        self.render_passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.render_passes.is_empty()
    }

    /// Release every cached render pass
    pub fn clear(&mut self) {
        self.render_passes.clear();
    }
}

#[cfg(test)]
#[path = "render_pass_manager_tests.rs"]
mod tests;
