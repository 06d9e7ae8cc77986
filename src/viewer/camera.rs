static DEFAULT_Z_NEAR: f32 = 0.01;
static DEFAULT_Z_FAR: f32 = 100.0;

/// Fixed look-at camera for the demo viewer. Hand placement comes from the
/// tracking data, so no interactive controls are wired up.
pub struct Camera {
    pub cam_to_world: na::Isometry3<f32>,
    pub cam_to_screen: na::Perspective3<f32>,
}

impl Camera {
    pub fn new(eye: &na::Point3<f32>, center: &na::Point3<f32>, aspect: f32) -> Camera {
        Camera {
            cam_to_world: na::Isometry3::look_at_rh(eye, center, &na::Vector3::new(0.0, 1.0, 0.0))
                .inverse(),
            cam_to_screen: na::Perspective3::new(
                aspect,
                std::f32::consts::FRAC_PI_3,
                DEFAULT_Z_NEAR,
                DEFAULT_Z_FAR,
            ),
        }
    }

    pub fn view_proj(&self) -> glm::Mat4 {
        (self.cam_to_screen.to_projective() * self.cam_to_world.inverse()).to_homogeneous()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.cam_to_screen.set_aspect(aspect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_center_projects_to_screen_origin() {
        let center = na::Point3::new(0.0, 0.0, -0.3);
        let camera = Camera::new(&na::Point3::new(0.0, 0.15, 0.25), &center, 16.0 / 9.0);

        let cam_space = camera.cam_to_world.inverse() * center;
        let screen = camera.cam_to_screen.project_point(&cam_space);

        approx::assert_relative_eq!(screen.x, 0.0, epsilon = 1e-5);
        approx::assert_relative_eq!(screen.y, 0.0, epsilon = 1e-5);
    }
}
