use super::*;

/// Orthonormal camera basis for one frame.
///
/// Never stored across frames: the orbit recomputes and re-orthonormalizes
/// the basis from scratch every frame so numerical drift cannot accumulate.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Point3,
    pub forward: Normal,
    pub up: Normal,
    pub right: Normal,
}

impl Camera {
    pub fn look_at(position: Point3, target: Point3, world_up: Vec3) -> Self {
        let forward = normal![target - position];
        let right = normal![forward.cross(&world_up)];
        let up = normal![right.cross(&forward)];
        Self {
            position,
            forward,
            up,
            right,
        }
    }

    /// Primary ray through the center of a pixel.
    ///
    /// Pixel y counts upward from the bottom scanline; the compositor's quad
    /// flips V to match.
    pub fn primary_ray(&self, (px, py): (u32, u32), (width, height): (u32, u32)) -> Ray {
        let u = ((px as f32 + 0.5) / width as f32) * 2.0 - 1.0;
        let v = ((py as f32 + 0.5) / height as f32) * 2.0 - 1.0;
        let u = u * width as f32 / height as f32;
        let dir = self.forward.into_inner() + u * self.right.into_inner() + v * self.up.into_inner();
        Ray {
            origin: self.position,
            dir: normal![dir],
        }
    }
}

/// Fixed-radius horizontal orbit around a look-at target.
#[derive(Clone, Copy, Debug)]
pub struct Orbit {
    pub radius: f32,
    pub height: f32,
    pub angular_velocity: f32,
    pub target: Point3,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius: 5.0,
            height: 2.0,
            angular_velocity: 0.2,
            target: point![0.0, 0.0, -5.0],
        }
    }
}

impl Orbit {
    pub fn camera_at(&self, time: f32) -> Camera {
        let angle = time * self.angular_velocity;
        let position = point![
            self.radius * angle.cos(),
            self.height,
            self.radius * angle.sin()
        ];
        Camera::look_at(position, self.target, Y_AXIS)
    }
}
