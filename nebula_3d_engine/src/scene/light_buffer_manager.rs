/// Light buffer manager
///
/// Packs the lights of a scene into a uniform buffer once per frame. Light
/// positions are stored relative to the camera so shaders keep precision
/// far away from the world origin. Two uniform buffers are used in turn:
/// the one written this frame is never the one the GPU may still read from
/// the previous submission.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use crate::error::Result;
use crate::{engine_debug, engine_warn};
use crate::rhi::{BufferDesc, CommandBuffer, CopyUniformBufferData, Rhi, UniformBuffer};
use super::SceneResource;

/// Number of uniform buffers rotated between submissions
pub const NUMBER_OF_LIGHT_BUFFERS: usize = 2;

/// Header at the start of the light buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LightBufferHeader {
    pub number_of_lights: u32,
    pub _padding: [u32; 3],
}

/// One light, as read by shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PackedLight {
    /// Camera-relative position
    pub position: [f32; 3],
    pub radius: f32,
    pub direction: [f32; 3],
    /// `LightType::code`
    pub light_type: u32,
    pub color: [f32; 3],
    pub cos_inner_angle: f32,
    pub cos_outer_angle: f32,
    pub _padding: [f32; 3],
}

/// Fills the double-buffered light uniform buffer
pub struct LightBufferManager {
    maximum_number_of_lights: u32,
    uniform_buffers: Vec<Arc<dyn UniformBuffer>>,
    current_buffer_index: usize,
    packed_lights: Vec<PackedLight>,
    bytes: Vec<u8>,
    number_of_lights: u32,
}

impl LightBufferManager {
    pub fn new(maximum_number_of_lights: u32) -> Self {
        Self {
            maximum_number_of_lights,
            uniform_buffers: Vec::with_capacity(NUMBER_OF_LIGHT_BUFFERS),
            current_buffer_index: 0,
            packed_lights: Vec::new(),
            bytes: Vec::new(),
            number_of_lights: 0,
        }
    }

    pub fn maximum_number_of_lights(&self) -> u32 {
        self.maximum_number_of_lights
    }

    /// Size of each uniform buffer
    pub fn number_of_bytes(&self) -> u32 {
        (std::mem::size_of::<LightBufferHeader>() + self.maximum_number_of_lights as usize * std::mem::size_of::<PackedLight>()) as u32
    }

    /// Number of lights written by the last fill
    pub fn number_of_lights(&self) -> u32 {
        self.number_of_lights
    }

    /// Uniform buffer the next fill writes into, `None` before the first fill
    pub fn current_uniform_buffer(&self) -> Option<&Arc<dyn UniformBuffer>> {
        self.uniform_buffers.get(self.current_buffer_index)
    }

    fn ensure_uniform_buffers(&mut self, rhi: &mut dyn Rhi) -> Result<()> {
        while self.uniform_buffers.len() < NUMBER_OF_LIGHT_BUFFERS {
            let name = format!("Light buffer {}", self.uniform_buffers.len());
            let uniform_buffer = rhi.create_uniform_buffer(&BufferDesc::new(self.number_of_bytes(), &name))?;
            self.uniform_buffers.push(uniform_buffer);
        }
        Ok(())
    }

    /// Pack the visible lights of `scene` and record their upload
    ///
    /// Lights beyond the configured maximum are dropped. Returns the number
    /// of lights written.
    pub fn fill_light_buffer(
        &mut self,
        rhi: &mut dyn Rhi,
        scene: &SceneResource,
        camera_position: Vec3,
        command_buffer: &mut CommandBuffer,
    ) -> Result<u32> {
        self.ensure_uniform_buffers(rhi)?;

        self.packed_lights.clear();
        for (_, light) in scene.lights() {
            if !light.visible {
                continue;
            }
            if self.packed_lights.len() as u32 >= self.maximum_number_of_lights {
                engine_warn!("nebula3d::LightBufferManager",
                    "Scene {} has more than {} visible lights, the rest is ignored",
                    scene.asset_id(), self.maximum_number_of_lights);
                break;
            }
            self.packed_lights.push(PackedLight {
                position: (light.position - camera_position).to_array(),
                radius: light.radius,
                direction: light.direction().to_array(),
                light_type: light.light_type.code(),
                color: light.color.to_array(),
                cos_inner_angle: light.inner_angle.cos(),
                cos_outer_angle: light.outer_angle.cos(),
                _padding: [0.0; 3],
            });
        }
        self.number_of_lights = self.packed_lights.len() as u32;

        let header = LightBufferHeader { number_of_lights: self.number_of_lights, _padding: [0; 3] };
        self.bytes.clear();
        self.bytes.extend_from_slice(bytemuck::bytes_of(&header));
        self.bytes.extend_from_slice(bytemuck::cast_slice(&self.packed_lights));

        let uniform_buffer = &self.uniform_buffers[self.current_buffer_index];
        CopyUniformBufferData::create(command_buffer, uniform_buffer, &self.bytes);
        Ok(self.number_of_lights)
    }

    /// Switch to the other uniform buffer once a command buffer was submitted
    pub fn on_post_command_buffer_dispatch(&mut self) {
        if !self.uniform_buffers.is_empty() {
            self.current_buffer_index = (self.current_buffer_index + 1) % self.uniform_buffers.len();
        }
    }

    /// Release the uniform buffers, they are recreated by the next fill
    pub fn clear_rhi_resources(&mut self) {
        self.uniform_buffers.clear();
        self.current_buffer_index = 0;
        engine_debug!("nebula3d::LightBufferManager", "Released light buffers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use crate::rhi::null::NullRhi;
    use crate::scene::LightSceneItem;
    use crate::utils::AssetId;

    fn scene_with_lights(count: usize) -> SceneResource {
        let mut scene = SceneResource::new(AssetId::new("Scene/Lights"));
        for index in 0..count {
            scene.add_light(LightSceneItem::point(Vec3::new(index as f32, 0.0, 0.0), Vec3::ONE, 2.0));
        }
        scene
    }

    #[test]
    fn test_packed_light_layout() {
        assert_eq!(std::mem::size_of::<LightBufferHeader>(), 16);
        assert_eq!(std::mem::size_of::<PackedLight>(), 64);
        assert_eq!(LightBufferManager::new(4).number_of_bytes(), 16 + 4 * 64);
    }

    #[test]
    fn test_fill_uploads_header_and_lights() {
        let mut rhi = NullRhi::default();
        let recorder = rhi.recorder();
        let mut manager = LightBufferManager::new(8);
        let scene = scene_with_lights(2);

        let mut command_buffer = CommandBuffer::new();
        assert_eq!(manager.fill_light_buffer(&mut rhi, &scene, Vec3::ZERO, &mut command_buffer).unwrap(), 2);
        command_buffer.submit_to_rhi(&mut rhi);

        assert_eq!(recorder.number_of_uploaded_uniform_bytes(), 16 + 2 * 64);
        let packet = command_buffer.packets().next().unwrap();
        let header: LightBufferHeader = bytemuck::pod_read_unaligned(&packet.auxiliary()[..16]);
        assert_eq!(header.number_of_lights, 2);
    }

    #[test]
    fn test_positions_are_camera_relative() {
        let mut rhi = NullRhi::default();
        let mut manager = LightBufferManager::new(8);
        let mut scene = SceneResource::new(AssetId::new("Scene/Lights"));
        scene.add_light(LightSceneItem::point(Vec3::new(100.0, 5.0, 0.0), Vec3::ONE, 1.0));
        let mut hidden = LightSceneItem::directional(Quat::IDENTITY, Vec3::ONE);
        hidden.visible = false;
        scene.add_light(hidden);

        let mut command_buffer = CommandBuffer::new();
        manager.fill_light_buffer(&mut rhi, &scene, Vec3::new(99.0, 5.0, 0.0), &mut command_buffer).unwrap();

        assert_eq!(manager.number_of_lights(), 1);
        let packet = command_buffer.packets().next().unwrap();
        let light: PackedLight = bytemuck::pod_read_unaligned(&packet.auxiliary()[16..80]);
        assert_eq!(light.position, [1.0, 0.0, 0.0]);
        assert_eq!(light.light_type, 1);
    }

    #[test]
    fn test_lights_beyond_maximum_are_dropped() {
        let mut rhi = NullRhi::default();
        let mut manager = LightBufferManager::new(3);
        let mut command_buffer = CommandBuffer::new();
        let written = manager.fill_light_buffer(&mut rhi, &scene_with_lights(5), Vec3::ZERO, &mut command_buffer).unwrap();
        assert_eq!(written, 3);
    }

    #[test]
    fn test_buffers_rotate_after_dispatch() {
        let mut rhi = NullRhi::default();
        let mut manager = LightBufferManager::new(1);
        assert!(manager.current_uniform_buffer().is_none());

        let mut command_buffer = CommandBuffer::new();
        manager.fill_light_buffer(&mut rhi, &scene_with_lights(1), Vec3::ZERO, &mut command_buffer).unwrap();
        let first = manager.current_uniform_buffer().unwrap().clone();
        manager.on_post_command_buffer_dispatch();
        let second = manager.current_uniform_buffer().unwrap().clone();
        manager.on_post_command_buffer_dispatch();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, manager.current_uniform_buffer().unwrap()));

        drop((first, second));
        command_buffer.clear();
        manager.clear_rhi_resources();
        assert_eq!(rhi.statistics().current(crate::rhi::ResourceType::UniformBuffer), 0);
    }
}
