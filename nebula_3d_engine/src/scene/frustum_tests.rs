use glam::{Mat4, Vec3};
use super::*;

fn camera_frustum() -> Frustum {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

// ============================================================================
// Plane extraction
// ============================================================================

#[test]
fn test_planes_are_normalized() {
    for plane in &camera_frustum().planes {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4, "plane normal should be unit length");
    }
}

#[test]
fn test_near_and_far_planes_match_depth_range() {
    let frustum = camera_frustum();
    // Camera at z=5 looking down -Z, near 0.1, far 100
    assert!(frustum.contains_point(Vec3::new(0.0, 0.0, 4.85)));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 4.95)));
    assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -94.0)));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -96.0)));
}

// ============================================================================
// AABB tests
// ============================================================================

#[test]
fn test_box_in_front_is_visible() {
    let frustum = camera_frustum();
    let aabb = AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    assert!(frustum.intersects_aabb(&aabb));
    assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Inside);
}

#[test]
fn test_box_behind_camera_is_culled() {
    let frustum = camera_frustum();
    let aabb = AABB::new(Vec3::new(-0.5, -0.5, 9.0), Vec3::new(0.5, 0.5, 10.0));
    assert!(!frustum.intersects_aabb(&aabb));
    assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Outside);
}

#[test]
fn test_box_far_to_the_side_is_culled() {
    let frustum = camera_frustum();
    let aabb = AABB::new(Vec3::new(50.0, -0.5, -0.5), Vec3::new(51.0, 0.5, 0.5));
    assert!(!frustum.intersects_aabb(&aabb));
}

#[test]
fn test_box_straddling_plane_is_partial() {
    let frustum = camera_frustum();
    let aabb = AABB::new(Vec3::new(-0.5, -0.5, -200.0), Vec3::new(0.5, 0.5, -50.0));
    assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Partial);
    assert!(frustum.intersects_aabb(&aabb));
}

#[test]
fn test_orthographic_frustum() {
    let projection = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
    let frustum = Frustum::from_view_projection(&projection);
    assert!(frustum.contains_point(Vec3::new(9.0, -9.0, -50.0)));
    assert!(!frustum.contains_point(Vec3::new(11.0, 0.0, -50.0)));
    assert_eq!(frustum.planes.len(), PLANE_FAR + 1);
    assert!(frustum.planes[PLANE_LEFT].x > 0.0);
    assert!(frustum.planes[PLANE_RIGHT].x < 0.0);
    assert!(frustum.planes[PLANE_BOTTOM].y > 0.0);
    assert!(frustum.planes[PLANE_TOP].y < 0.0);
    assert!(frustum.planes[PLANE_NEAR].z < 0.0);
}
