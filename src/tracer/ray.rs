use super::*;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3,
    pub dir: Normal,
}

impl Ray {
    /// Direction is normalized on construction; all distance comparisons
    /// in the intersector assume unit length.
    pub fn new(origin: Point3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: normal![dir],
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Point3 {
        self.origin + t * self.dir.into_inner()
    }
}
