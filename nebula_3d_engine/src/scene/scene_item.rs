/// Camera and light scene items

use glam::{Mat4, Quat, Vec3};

// ============================================================================
// Camera
// ============================================================================

/// Perspective camera placed in a scene
///
/// The camera looks down its local -Z axis. A custom view or projection
/// matrix, when set, replaces the one derived from the camera parameters
/// (VR managers use this for per-eye matrices).
#[derive(Debug, Clone)]
pub struct CameraSceneItem {
    /// World-space position
    pub position: Vec3,
    /// World-space orientation
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Near clip distance (> 0)
    pub near_z: f32,
    /// Far clip distance (> near)
    pub far_z: f32,
    custom_view_matrix: Option<Mat4>,
    custom_projection_matrix: Option<Mat4>,
}

impl CameraSceneItem {
    /// Camera with a 45 degree vertical field of view, near 0.1 and far 1000
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            fov_y: std::f32::consts::FRAC_PI_4,
            near_z: 0.1,
            far_z: 1000.0,
            custom_view_matrix: None,
            custom_projection_matrix: None,
        }
    }

    /// Camera at `position` looking at `target`
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let view = Mat4::look_at_rh(position, target, up);
        let rotation = Quat::from_mat4(&view.inverse());
        Self::new(position, rotation)
    }

    pub fn set_perspective(&mut self, fov_y: f32, near_z: f32, far_z: f32) {
        debug_assert!(fov_y > 0.0, "Field of view must be positive");
        debug_assert!(near_z > 0.0 && far_z > near_z, "Invalid clip distances");
        self.fov_y = fov_y;
        self.near_z = near_z;
        self.far_z = far_z;
    }

    /// World-space viewing direction
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn custom_view_matrix(&self) -> Option<&Mat4> {
        self.custom_view_matrix.as_ref()
    }

    pub fn set_custom_view_matrix(&mut self, view_matrix: Mat4) {
        self.custom_view_matrix = Some(view_matrix);
    }

    pub fn unset_custom_view_matrix(&mut self) {
        self.custom_view_matrix = None;
    }

    pub fn custom_projection_matrix(&self) -> Option<&Mat4> {
        self.custom_projection_matrix.as_ref()
    }

    pub fn set_custom_projection_matrix(&mut self, projection_matrix: Mat4) {
        self.custom_projection_matrix = Some(projection_matrix);
    }

    pub fn unset_custom_projection_matrix(&mut self) {
        self.custom_projection_matrix = None;
    }

    /// World to view transform
    pub fn view_matrix(&self) -> Mat4 {
        match self.custom_view_matrix {
            Some(view_matrix) => view_matrix,
            None => Mat4::from_rotation_translation(self.rotation, self.position).inverse(),
        }
    }

    /// View to clip transform (depth range [0, 1]) for a render target aspect ratio
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        match self.custom_projection_matrix {
            Some(projection_matrix) => projection_matrix,
            None => Mat4::perspective_rh(self.fov_y, aspect_ratio.max(f32::EPSILON), self.near_z, self.far_z),
        }
    }

    pub fn view_projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }
}

// ============================================================================
// Light
// ============================================================================

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    /// Value written into the light buffer
    pub fn code(self) -> u32 {
        match self {
            LightType::Directional => 0,
            LightType::Point => 1,
            LightType::Spot => 2,
        }
    }
}

/// Light source placed in a scene
///
/// Directional lights only use `rotation`, point lights only `position` and
/// `radius`, spot lights use everything.
#[derive(Debug, Clone)]
pub struct LightSceneItem {
    pub light_type: LightType,
    pub position: Vec3,
    pub rotation: Quat,
    /// Linear RGB color, premultiplied by intensity
    pub color: Vec3,
    /// Influence radius (point and spot lights)
    pub radius: f32,
    /// Inner cone angle in radians (spot lights)
    pub inner_angle: f32,
    /// Outer cone angle in radians (spot lights)
    pub outer_angle: f32,
    /// Invisible lights are not written into the light buffer
    pub visible: bool,
}

impl LightSceneItem {
    pub fn directional(rotation: Quat, color: Vec3) -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::ZERO,
            rotation,
            color,
            radius: 0.0,
            inner_angle: 0.0,
            outer_angle: 0.0,
            visible: true,
        }
    }

    pub fn point(position: Vec3, color: Vec3, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "Point light radius must be positive");
        Self {
            light_type: LightType::Point,
            position,
            rotation: Quat::IDENTITY,
            color,
            radius,
            inner_angle: 0.0,
            outer_angle: 0.0,
            visible: true,
        }
    }

    pub fn spot(position: Vec3, rotation: Quat, color: Vec3, radius: f32, inner_angle: f32, outer_angle: f32) -> Self {
        debug_assert!(inner_angle <= outer_angle, "Spot light inner angle exceeds the outer angle");
        Self {
            light_type: LightType::Spot,
            position,
            rotation,
            color,
            radius,
            inner_angle,
            outer_angle,
            visible: true,
        }
    }

    /// World-space direction the light shines into
    pub fn direction(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_view_matrix_moves_world_into_view_space() {
        let camera = CameraSceneItem::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_custom_matrices_override_derived_ones() {
        let mut camera = CameraSceneItem::new(Vec3::ZERO, Quat::IDENTITY);
        let custom = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0);
        camera.set_custom_projection_matrix(custom);
        assert_eq!(camera.projection_matrix(2.0), custom);
        camera.unset_custom_projection_matrix();
        assert_ne!(camera.projection_matrix(2.0), custom);

        camera.set_custom_view_matrix(Mat4::IDENTITY);
        camera.position = Vec3::ONE;
        assert_eq!(camera.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_light_direction_and_codes() {
        let light = LightSceneItem::directional(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2), Vec3::ONE);
        assert!((light.direction() - Vec3::NEG_Y).length() < 1e-5);
        assert_eq!(LightType::Directional.code(), 0);
        assert_eq!(LightSceneItem::point(Vec3::ZERO, Vec3::ONE, 5.0).light_type.code(), 1);
    }
}
