use super::*;

//
// Gradient sky: a cheap ambient environment without a full sky model.
//

pub const HORIZON: ColorRgb = ColorRgb::new(1.0, 1.0, 1.0);
pub const ZENITH: ColorRgb = ColorRgb::new(0.5, 0.7, 1.0);

/// Background radiance for a ray that escaped the scene. The blend is exact
/// at both ends: straight down returns the horizon color, straight up the
/// zenith color.
pub fn radiance(dir: &Normal) -> ColorRgb {
    let t = smoothstep(-1.0, 1.0, dir.y);
    lerp_color(&HORIZON, &ZENITH, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_values_are_exact() {
        assert_eq!(radiance(&normal![0.0, 1.0, 0.0]), ZENITH);
        assert_eq!(radiance(&normal![0.0, -1.0, 0.0]), HORIZON);
    }

    #[test]
    fn test_level_ray_blends_halfway() {
        let level = radiance(&normal![1.0, 0.0, 0.0]);
        let expected = lerp_color(&HORIZON, &ZENITH, 0.5);
        assert_eq!(level, expected);
    }
}
