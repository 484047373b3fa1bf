use super::*;

/// A single sphere primitive. Immutable for the process lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f32,
    pub albedo: ColorRgb,
    /// Mirror reflectance in [0,1]. Zero terminates the bounce loop.
    pub reflectivity: f32,
}

impl Sphere {
    pub const fn new(center: Point3, radius: f32, albedo: ColorRgb, reflectivity: f32) -> Self {
        Self {
            center,
            radius,
            albedo,
            reflectivity,
        }
    }
}

/// A fixed ordered sequence of spheres. Insertion order is the tie-break
/// order for equal-distance intersections.
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The default scene: three colored spheres over a large ground sphere.
    pub fn demo() -> Self {
        Self::new(vec![
            Sphere::new(point![0.0, 0.0, -5.0], 1.0, ColorRgb::new(1.0, 0.2, 0.2), 0.3),
            Sphere::new(point![-2.0, 0.0, -6.0], 0.8, ColorRgb::new(0.2, 1.0, 0.2), 0.5),
            Sphere::new(point![2.0, 0.0, -4.0], 0.6, ColorRgb::new(0.2, 0.2, 1.0), 0.2),
            Sphere::new(
                point![0.0, -1001.0, -5.0],
                1000.0,
                ColorRgb::new(0.8, 0.8, 0.8),
                0.0,
            ),
        ])
    }

    #[inline]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    #[inline]
    pub fn sphere_count(&self) -> usize {
        self.spheres.len()
    }
}
