use std::{fmt, ops};

use super::*;

/// Linear-space RGB radiance value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorRgb([f32; 3]);

/// One pixel of the RGBA32F output image.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorRgba([f32; 4]);

impl ColorRgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    #[inline]
    pub const fn red(&self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub const fn green(&self) -> f32 {
        self.0[1]
    }

    #[inline]
    pub const fn blue(&self) -> f32 {
        self.0[2]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0[0].is_finite() && self.0[1].is_finite() && self.0[2].is_finite()
    }

    #[inline]
    pub fn max_component(self) -> f32 {
        self.0[0].max(self.0[1]).max(self.0[2])
    }

    /// Reinhard compression, maps any finite non-negative radiance into [0,1).
    pub fn tonemap(self) -> Self {
        let reinhard = |x: f32| x / (x + 1.0);
        Self::new(reinhard(self.red()), reinhard(self.green()), reinhard(self.blue()))
    }

    /// Gamma 2.2 encoding for display.
    pub fn gamma_encode(self) -> Self {
        let gamma = |x: f32| x.powf(1.0 / 2.2);
        Self::new(gamma(self.red()), gamma(self.green()), gamma(self.blue()))
    }

    pub fn with_alpha(self, a: f32) -> ColorRgba {
        ColorRgba::new(self.red(), self.green(), self.blue(), a)
    }
}

impl ops::Add for ColorRgb {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.red() + rhs.red(),
            self.green() + rhs.green(),
            self.blue() + rhs.blue(),
        )
    }
}

impl ops::AddAssign for ColorRgb {
    fn add_assign(&mut self, rhs: Self) {
        self.0[0] += rhs.0[0];
        self.0[1] += rhs.0[1];
        self.0[2] += rhs.0[2];
    }
}

impl ops::Mul for ColorRgb {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(
            self.red() * rhs.red(),
            self.green() * rhs.green(),
            self.blue() * rhs.blue(),
        )
    }
}

impl ops::Mul<f32> for ColorRgb {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.red() * rhs, self.green() * rhs, self.blue() * rhs)
    }
}

impl ops::Mul<ColorRgb> for f32 {
    type Output = ColorRgb;

    fn mul(self, rhs: ColorRgb) -> Self::Output {
        ColorRgb::new(self * rhs.red(), self * rhs.green(), self * rhs.blue())
    }
}

impl ops::MulAssign for ColorRgb {
    fn mul_assign(&mut self, rhs: Self) {
        self.0[0] *= rhs.0[0];
        self.0[1] *= rhs.0[1];
        self.0[2] *= rhs.0[2];
    }
}

impl fmt::Display for ColorRgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.red(), self.green(), self.blue())
    }
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    #[inline]
    pub const fn red(&self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub const fn green(&self) -> f32 {
        self.0[1]
    }

    #[inline]
    pub const fn blue(&self) -> f32 {
        self.0[2]
    }

    #[inline]
    #[allow(dead_code)]
    pub const fn alpha(&self) -> f32 {
        self.0[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    #[test]
    fn test_tonemap_bounds() {
        for x in [0.0, 0.25, 1.0, 10.0, 1e6, f32::MAX] {
            let mapped = ColorRgb::new(x, x, x).tonemap();
            assert!(mapped.red() >= 0.0 && mapped.red() < 1.0, "x={x}");
            assert!(mapped.is_finite());
        }
    }

    #[test]
    fn test_gamma_encode_bounds() {
        for x in [0.0, 0.25, 1.0, 10.0, 1e6] {
            let encoded = ColorRgb::new(x, x, x).tonemap().gamma_encode();
            assert!(encoded.red() >= 0.0 && encoded.red() <= 1.0, "x={x}");
            assert!(encoded.is_finite());
        }
    }

    #[test]
    fn test_tonemap_midpoint() {
        // Unit radiance compresses to exactly one half.
        let mapped = ColorRgb::WHITE.tonemap();
        assert_ulps_eq!(mapped.red(), 0.5, max_ulps = 1);
    }

    #[test]
    fn test_black_is_fixed_point() {
        let encoded = ColorRgb::BLACK.tonemap().gamma_encode();
        assert_eq!(encoded, ColorRgb::BLACK);
    }
}
