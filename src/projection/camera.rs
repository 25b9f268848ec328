use crate::scroll::ViewportState;

use super::{Transform, Vec3};

/// Maps a world-space point to normalized device coordinates.
pub trait Projector {
    fn project(&self, world: Vec3, viewport: &ViewportState) -> Vec3;
}

/// An unrotated perspective camera looking down -z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    /// The robot page camera.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    /// The hero section camera, pulled in a little with a narrower view.
    pub fn hero() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 8.0),
            fov_y_degrees: 45.0,
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_fov(mut self, fov_y_degrees: f32) -> Self {
        self.fov_y_degrees = fov_y_degrees;
        self
    }

    pub fn view(&self) -> Transform {
        Transform::translate3d(-self.position.x, -self.position.y, -self.position.z)
    }

    pub fn projection(&self, aspect: f32) -> Transform {
        Transform::perspective(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

impl Projector for PerspectiveCamera {
    fn project(&self, world: Vec3, viewport: &ViewportState) -> Vec3 {
        let aspect = if viewport.height > 0.0 {
            viewport.width / viewport.height
        } else {
            1.0
        };
        self.projection(aspect)
            .then(&self.view())
            .transform_point3(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_origin_projects_to_center() {
        let ndc = PerspectiveCamera::default().project(Vec3::ZERO, &ViewportState::new(1200.0, 800.0));
        assert!(approx_eq(ndc.x, 0.0));
        assert!(approx_eq(ndc.y, 0.0));
    }

    #[test]
    fn test_frustum_edge_projects_to_one() {
        let camera = PerspectiveCamera::default();
        let edge = 10.0 * (25.0f32).to_radians().tan();
        let ndc = camera.project(Vec3::new(0.0, edge, 0.0), &ViewportState::new(1200.0, 800.0));
        assert!(approx_eq(ndc.y, 1.0));
    }

    #[test]
    fn test_aspect_follows_viewport() {
        let camera = PerspectiveCamera::hero();
        let point = Vec3::new(1.0, 1.0, 0.0);
        let square = camera.project(point, &ViewportState::new(800.0, 800.0));
        let wide = camera.project(point, &ViewportState::new(1600.0, 800.0));
        assert!(approx_eq(wide.x, square.x / 2.0));
        assert!(approx_eq(wide.y, square.y));
    }
}
