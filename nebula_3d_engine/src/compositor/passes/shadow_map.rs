/// Cascaded shadow map pass
///
/// Renders the shadow casters of its render queue index range once per
/// cascade. Cascades are square tiles laid side by side in one depth atlas,
/// which is a render target texture registered under the pass texture asset
/// ID so materials can sample it. The camera frustum is split with the
/// practical split scheme and every slice is enclosed in a bounding sphere,
/// so the light projection of a cascade doesn't change size when the camera
/// rotates.

use std::any::Any;
use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::{engine_debug, engine_warn};
use crate::resource::{
    MainRenderTargetSettings, RenderTargetTextureFlags, RenderTargetTextureManager, RenderTargetTextureSignature,
    RenderTargetTextureSize, Renderer,
};
use crate::rhi::{
    ClearFlags, ClearGraphics, CommandBuffer, Framebuffer, FramebufferAttachment, FramebufferDesc,
    RenderTarget, Rhi, RhiCapabilities, ScissorRectangle, SetGraphicsRenderTarget,
    SetGraphicsScissorRectangles, SetGraphicsViewports, Texture2d, TextureFormat, Viewport,
};
use crate::scene::{CameraSceneItem, RenderQueue};
use crate::utils::AssetId;
use crate::compositor::{CompositorContextData, CompositorInstancePass, CompositorResourcePassShadowMap};

pub const MAXIMUM_NUMBER_OF_SHADOW_CASCADES: u8 = 4;

const SHADOW_MAP_FORMAT: TextureFormat = TextureFormat::D32_FLOAT;

/// Far distance of every cascade
///
/// Blends a logarithmic split (`lambda` = 1) with a uniform split
/// (`lambda` = 0). The last distance is always `far_z`.
pub fn compute_cascade_split_distances(near_z: f32, far_z: f32, number_of_cascades: u8, lambda: f32) -> Vec<f32> {
    debug_assert!(near_z > 0.0 && far_z > near_z, "Invalid clip distances");
    let number_of_cascades = number_of_cascades.clamp(1, MAXIMUM_NUMBER_OF_SHADOW_CASCADES);
    let ratio = far_z / near_z;
    (1..=number_of_cascades)
        .map(|cascade| {
            let p = cascade as f32 / number_of_cascades as f32;
            let logarithmic = near_z * ratio.powf(p);
            let uniform = near_z + (far_z - near_z) * p;
            lambda * logarithmic + (1.0 - lambda) * uniform
        })
        .collect()
}

/// Light view-projection enclosing the camera frustum slice `[near_z, far_z]`
fn compute_cascade_view_projection(camera: &CameraSceneItem, aspect_ratio: f32, near_z: f32, far_z: f32, light_direction: Vec3) -> Mat4 {
    let inverse_view = camera.view_matrix().inverse();
    let tan_half_fov_y = (camera.fov_y * 0.5).tan();
    let tan_half_fov_x = tan_half_fov_y * aspect_ratio;

    let mut corners = [Vec3::ZERO; 8];
    for (index, corner) in corners.iter_mut().enumerate() {
        let z = if index < 4 { near_z } else { far_z };
        let (sign_x, sign_y) = match index % 4 {
            0 => (-1.0, -1.0),
            1 => (1.0, -1.0),
            2 => (1.0, 1.0),
            _ => (-1.0, 1.0),
        };
        *corner = inverse_view.transform_point3(Vec3::new(sign_x * z * tan_half_fov_x, sign_y * z * tan_half_fov_y, -z));
    }

    let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
    let radius = corners.iter().map(|corner| corner.distance(center)).fold(0.0_f32, f32::max).max(f32::EPSILON);
    // Snap to reduce shimmering
    let radius = (radius * 16.0).ceil() / 16.0;

    let light_direction = light_direction.try_normalize().unwrap_or(Vec3::NEG_Y);
    let up = if light_direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let light_view = Mat4::look_at_rh(center - light_direction * radius, center, up);
    Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, 2.0 * radius) * light_view
}

struct ShadowCascade {
    split_distance: f32,
    view_projection_matrix: Mat4,
}

pub struct CompositorInstancePassShadowMap {
    texture_asset_id: AssetId,
    shadow_map_size: u32,
    number_of_cascades: u8,
    number_of_multisamples: u8,
    cascade_split_lambda: f32,
    maximum_number_of_multisamples: u8,
    render_queue: RenderQueue,
    /// Signature the atlas is currently announced with
    announced_signature: Option<RenderTargetTextureSignature>,
    depth_texture: Option<Arc<dyn Texture2d>>,
    framebuffer: Option<Arc<dyn Framebuffer>>,
    cascades: Vec<ShadowCascade>,
}

impl CompositorInstancePassShadowMap {
    pub fn new(resource_pass: &CompositorResourcePassShadowMap, capabilities: &RhiCapabilities) -> Self {
        let mut pass = Self {
            texture_asset_id: resource_pass.texture_asset_id,
            shadow_map_size: 1,
            number_of_cascades: 1,
            number_of_multisamples: 1,
            cascade_split_lambda: 0.0,
            maximum_number_of_multisamples: capabilities.maximum_number_of_multisamples.max(1),
            render_queue: RenderQueue::new(
                resource_pass.minimum_render_queue_index,
                resource_pass.maximum_render_queue_index,
                true,
            ),
            announced_signature: None,
            depth_texture: None,
            framebuffer: None,
            cascades: Vec::new(),
        };
        pass.set_shadow_map_size(resource_pass.shadow_map_size);
        pass.set_number_of_cascades(resource_pass.number_of_cascades);
        pass.set_number_of_multisamples(resource_pass.number_of_multisamples);
        pass.set_cascade_split_lambda(resource_pass.cascade_split_lambda);
        pass
    }

    /// Asset ID the shadow map atlas is registered under in the render target texture manager
    pub fn texture_asset_id(&self) -> AssetId {
        self.texture_asset_id
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Width and height of every cascade, the atlas is recreated on the next fill
    pub fn set_shadow_map_size(&mut self, shadow_map_size: u32) {
        debug_assert!(shadow_map_size > 0, "Shadow map size must not be zero");
        self.shadow_map_size = shadow_map_size.max(1);
    }

    pub fn number_of_cascades(&self) -> u8 {
        self.number_of_cascades
    }

    /// Clamped to `1..=MAXIMUM_NUMBER_OF_SHADOW_CASCADES`
    pub fn set_number_of_cascades(&mut self, number_of_cascades: u8) {
        self.number_of_cascades = number_of_cascades.clamp(1, MAXIMUM_NUMBER_OF_SHADOW_CASCADES);
    }

    pub fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }

    /// Clamped to what the RHI supports
    pub fn set_number_of_multisamples(&mut self, number_of_multisamples: u8) {
        debug_assert!(
            matches!(number_of_multisamples, 1 | 2 | 4 | 8),
            "Invalid number of multisamples {}", number_of_multisamples
        );
        let clamped = number_of_multisamples.clamp(1, self.maximum_number_of_multisamples);
        if clamped != number_of_multisamples {
            engine_warn!("nebula3d::CompositorInstancePassShadowMap",
                "{}x shadow map MSAA isn't supported, using {}x", number_of_multisamples, clamped);
        }
        self.number_of_multisamples = clamped;
    }

    pub fn cascade_split_lambda(&self) -> f32 {
        self.cascade_split_lambda
    }

    /// Clamped to `[0, 1]`
    pub fn set_cascade_split_lambda(&mut self, cascade_split_lambda: f32) {
        self.cascade_split_lambda = cascade_split_lambda.clamp(0.0, 1.0);
    }

    /// Width and height of the atlas holding every cascade
    pub fn atlas_size(&self) -> (u32, u32) {
        (self.shadow_map_size * u32::from(self.number_of_cascades), self.shadow_map_size)
    }

    /// Depth atlas, `None` before the workspace finished loading
    pub fn depth_texture(&self) -> Option<&Arc<dyn Texture2d>> {
        self.depth_texture.as_ref()
    }

    /// Tile of a cascade inside the atlas
    pub fn cascade_viewport(&self, cascade: u8) -> Option<Viewport> {
        (cascade < self.number_of_cascades).then(|| Viewport {
            top_left_x: (u32::from(cascade) * self.shadow_map_size) as f32,
            top_left_y: 0.0,
            width: self.shadow_map_size as f32,
            height: self.shadow_map_size as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        })
    }

    /// Far distance of every cascade, from the last fill
    pub fn cascade_split_distances(&self) -> Vec<f32> {
        self.cascades.iter().map(|cascade| cascade.split_distance).collect()
    }

    /// Light view-projection of every cascade, from the last fill
    pub fn cascade_view_projection_matrices(&self) -> Vec<Mat4> {
        self.cascades.iter().map(|cascade| cascade.view_projection_matrix).collect()
    }

    fn atlas_signature(&self) -> RenderTargetTextureSignature {
        let (width, height) = self.atlas_size();
        RenderTargetTextureSignature::new(
            RenderTargetTextureSize::Absolute { width, height },
            SHADOW_MAP_FORMAT,
            RenderTargetTextureFlags::ALLOW_MULTISAMPLE | RenderTargetTextureFlags::SHADER_RESOURCE,
        )
    }

    /// Keep the atlas announcement in line with the current size and cascade count
    fn announce_atlas(&mut self, render_target_texture_manager: &mut RenderTargetTextureManager) {
        let signature = self.atlas_signature();
        if self.announced_signature.is_some_and(|announced| announced.signature_id() == signature.signature_id()) {
            return;
        }
        if self.announced_signature.take().is_some() {
            render_target_texture_manager.release_render_target_texture(self.texture_asset_id);
        }
        render_target_texture_manager.add_render_target_texture(self.texture_asset_id, signature);
        self.announced_signature = Some(signature);
        self.framebuffer = None;
        self.depth_texture = None;
    }

    fn resolve_atlas(&mut self, rhi: &mut dyn Rhi, renderer: &mut Renderer) -> Result<()> {
        self.announce_atlas(&mut renderer.render_target_texture_manager);

        // Absolute size: only the sample count of these settings matters
        let settings = MainRenderTargetSettings {
            width: 1,
            height: 1,
            number_of_multisamples: self.number_of_multisamples,
            resolution_scale: 1.0,
        };
        let (depth_texture, _) =
            renderer.render_target_texture_manager.get_texture_by_asset_id(rhi, self.texture_asset_id, &settings)?;
        let up_to_date = self.framebuffer.is_some()
            && self.depth_texture.as_ref().is_some_and(|current| Arc::ptr_eq(current, &depth_texture));
        if up_to_date {
            return Ok(());
        }

        self.framebuffer = None;
        let render_pass = renderer.render_pass_manager.get_or_create_render_pass(
            rhi, &[], Some(SHADOW_MAP_FORMAT), depth_texture.number_of_multisamples(),
        )?;
        let framebuffer = rhi.create_framebuffer(FramebufferDesc {
            render_pass,
            color_attachments: Vec::new(),
            depth_stencil_attachment: Some(FramebufferAttachment::new(depth_texture.clone())),
            debug_name: format!("Shadow map {}", self.texture_asset_id),
        })?;
        engine_debug!("nebula3d::CompositorInstancePassShadowMap",
            "Shadow map {} uses {} cascade(s) of {}x{} ({}x MSAA)",
            self.texture_asset_id, self.number_of_cascades, self.shadow_map_size, self.shadow_map_size,
            depth_texture.number_of_multisamples());
        self.depth_texture = Some(depth_texture);
        self.framebuffer = Some(framebuffer);
        Ok(())
    }
}

impl CompositorInstancePass for CompositorInstancePassShadowMap {
    fn on_compositor_workspace_instance_loading_finished(&mut self, rhi: &mut dyn Rhi, renderer: &mut Renderer) -> Result<()> {
        self.resolve_atlas(rhi, renderer)
    }

    fn on_compositor_workspace_instance_destroyed(&mut self, renderer: &mut Renderer) {
        self.framebuffer = None;
        self.depth_texture = None;
        self.cascades.clear();
        if self.announced_signature.take().is_some() {
            renderer.render_target_texture_manager.release_render_target_texture(self.texture_asset_id);
        }
    }

    fn on_fill_command_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        renderer: &mut Renderer,
        _render_target: Option<&RenderTarget>,
        context: &CompositorContextData<'_>,
        command_buffer: &mut CommandBuffer,
    ) -> Result<()> {
        let Some(scene_view) = context.scene_view else {
            return Ok(());
        };
        let scene = scene_view.scene;
        let (Some(camera), Some(light)) = (
            scene.camera(scene_view.camera),
            scene_view.light.and_then(|light| scene.light(light)),
        ) else {
            return Ok(());
        };
        if !scene.is_loaded() {
            return Ok(());
        }
        self.resolve_atlas(rhi, renderer)?;
        let Some(framebuffer) = self.framebuffer.clone() else {
            return Ok(());
        };

        let (atlas_width, atlas_height) = self.atlas_size();
        SetGraphicsRenderTarget::create(command_buffer, Some(&RenderTarget::Framebuffer(framebuffer)));
        SetGraphicsViewports::create(command_buffer, &[Viewport::full(atlas_width, atlas_height)]);
        SetGraphicsScissorRectangles::create(command_buffer, &[ScissorRectangle {
            top_left_x: 0,
            top_left_y: 0,
            bottom_right_x: atlas_width as i32,
            bottom_right_y: atlas_height as i32,
        }]);
        ClearGraphics::create(command_buffer, ClearFlags::DEPTH, [0.0; 4], 1.0, 0);

        let aspect_ratio = context.aspect_ratio();
        let split_distances = compute_cascade_split_distances(
            camera.near_z, camera.far_z, self.number_of_cascades, self.cascade_split_lambda,
        );
        let size = self.shadow_map_size as i32;
        let mut near_z = camera.near_z;
        self.cascades.clear();
        for (cascade, split_distance) in (0..self.number_of_cascades).zip(split_distances) {
            let view_projection_matrix =
                compute_cascade_view_projection(camera, aspect_ratio, near_z, split_distance, light.direction());
            self.cascades.push(ShadowCascade { split_distance, view_projection_matrix });
            near_z = split_distance;

            let Some(viewport) = self.cascade_viewport(cascade) else {
                break;
            };
            SetGraphicsViewports::create(command_buffer, &[viewport]);
            SetGraphicsScissorRectangles::create(command_buffer, &[ScissorRectangle {
                top_left_x: i32::from(cascade) * size,
                top_left_y: 0,
                bottom_right_x: (i32::from(cascade) + 1) * size,
                bottom_right_y: size,
            }]);
            self.render_queue.add_renderable_managers(scene, context.render_queue_index_ranges);
            self.render_queue.fill_command_buffer(command_buffer);
        }
        Ok(())
    }

    fn binds_own_render_target(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "shadow_map_tests.rs"]
mod tests;
