use super::*;

//
// Linear algebra
//

pub use na::{point, vector};

pub type Vec3 = na::Vector3<f32>;

pub type Point3 = na::Point3<f32>;

pub type Normal = na::UnitVector3<f32>;

pub const Y_AXIS: Vec3 = vector![0.0, 1.0, 0.0];

#[macro_export]
macro_rules! normal {
    ($v:expr) => {
        na::Unit::new_normalize($v)
    };

    ($x:expr, $y:expr, $z:expr) => {
        na::Unit::new_normalize(na::Vector3::<f32>::new($x, $y, $z))
    };
}

//
// Interpolation
//

pub fn lerp_scalar<T: num::Float>(a: T, b: T, t: T) -> T {
    a * (T::one() - t) + b * t
}

pub fn lerp_color(a: &ColorRgb, b: &ColorRgb, t: f32) -> ColorRgb {
    ColorRgb::new(
        lerp_scalar(a.red(), b.red(), t),
        lerp_scalar(a.green(), b.green(), t),
        lerp_scalar(a.blue(), b.blue(), t),
    )
}

/// Hermite blend between `edge0` and `edge1`, clamped to [0,1] outside the
/// edge interval. Exact at both edges.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

//
// Geometric
//

/// Mirror reflection of an incident direction about a surface normal.
pub fn reflect_dir(d: &Normal, n: &Normal) -> Normal {
    normal![d.into_inner() - 2.0 * d.dot(n) * n.into_inner()]
}

//
// Tests
//
