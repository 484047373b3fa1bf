use super::*;

/// The nearest surface a ray struck. Built fresh per intersection test and
/// replaced wholesale when a closer hit turns up, never mutated in place.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub t: f32,
    pub point: Point3,
    pub normal: Normal,
    pub albedo: ColorRgb,
    pub reflectivity: f32,
}

/// Ray/sphere test: solve `a t^2 + b t + c = 0`.
///
/// Roots below `min_t` are rejected so a ray spawned on a surface cannot
/// re-hit it at distance zero; when the near root is rejected the far root
/// is tried (the origin may be inside the sphere). Degenerate spheres
/// (zero or negative radius, NaN anywhere) fail the discriminant or root
/// tests and report no hit; nothing here can panic on them.
pub fn intersect_sphere(
    ray: &Ray,
    sphere: &Sphere,
    min_t: f32,
    stats: &mut RayStats,
) -> Option<RayHit> {
    stats.sphere_tests += 1;

    let oc = ray.origin - sphere.center;
    let d = ray.dir.into_inner();
    let a = d.dot(&d);
    let b = 2.0 * oc.dot(&d);
    let c = oc.dot(&oc) - sphere.radius * sphere.radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t0 = (-b - sqrt_d) / (2.0 * a);
    let t1 = (-b + sqrt_d) / (2.0 * a);
    let t = if t0 >= min_t {
        t0
    } else if t1 >= min_t {
        t1
    } else {
        return None;
    };

    let point = ray.at(t);
    Some(RayHit {
        t,
        point,
        normal: normal![point - sphere.center],
        albedo: sphere.albedo,
        reflectivity: sphere.reflectivity,
    })
}

/// Nearest hit over the whole scene.
///
/// Strict less-than keeps the earliest sphere in scene order on an exact
/// distance tie, which makes results reproducible across runs.
pub fn intersect_scene(
    ray: &Ray,
    scene: &Scene,
    min_t: f32,
    stats: &mut RayStats,
) -> Option<RayHit> {
    stats.scene_tests += 1;

    let mut closest: Option<RayHit> = None;
    for sphere in scene.spheres() {
        if let Some(hit) = intersect_sphere(ray, sphere, min_t, stats) {
            match &closest {
                Some(best) if hit.t >= best.t => {}
                _ => closest = Some(hit),
            }
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-3;

    fn unit_sphere_at(center: Point3) -> Sphere {
        Sphere::new(center, 1.0, ColorRgb::new(1.0, 0.0, 0.0), 0.0)
    }

    #[test]
    fn test_head_on_hit_distance() {
        // Aimed at the center from outside: near root is |o - c| - r.
        let sphere = unit_sphere_at(point![0.0, 0.0, 0.0]);
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, -1.0]);
        let mut stats = RayStats::default();
        let hit = intersect_sphere(&ray, &sphere, EPSILON, &mut stats).unwrap();
        assert_relative_eq!(hit.t, 4.0, epsilon = 1e-4);
        assert_relative_eq!(hit.point.z, 1.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_grazing_miss() {
        // Closest approach exceeds the radius: no hit.
        let sphere = unit_sphere_at(point![0.0, 0.0, 0.0]);
        let ray = Ray::new(point![0.0, 1.5, 5.0], vector![0.0, 0.0, -1.0]);
        let mut stats = RayStats::default();
        assert!(intersect_sphere(&ray, &sphere, EPSILON, &mut stats).is_none());
    }

    #[test]
    fn test_behind_origin_misses() {
        // Both roots negative: sphere is behind the ray.
        let sphere = unit_sphere_at(point![0.0, 0.0, 5.0]);
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, -1.0]);
        let mut stats = RayStats::default();
        assert!(intersect_sphere(&ray, &sphere, EPSILON, &mut stats).is_none());
    }

    #[test]
    fn test_origin_on_surface_takes_far_root() {
        // The near root sits at the origin, under epsilon; the far root is
        // the sphere's diameter away.
        let sphere = unit_sphere_at(point![0.0, 0.0, 0.0]);
        let ray = Ray::new(point![0.0, 0.0, 1.0], vector![0.0, 0.0, -1.0]);
        let mut stats = RayStats::default();
        let hit = intersect_sphere(&ray, &sphere, EPSILON, &mut stats).unwrap();
        assert_relative_eq!(hit.t, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_radius_does_not_panic() {
        let sphere = Sphere::new(point![0.0, 0.0, 0.0], -1.0, ColorRgb::WHITE, 0.0);
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, -1.0]);
        let mut stats = RayStats::default();
        // Negative radius squares away; whatever it reports, it must not crash.
        let _ = intersect_sphere(&ray, &sphere, EPSILON, &mut stats);
    }

    #[test]
    fn test_tie_break_keeps_scene_order() {
        // Two coincident spheres: the first one in scene order must win,
        // every time.
        let first = Sphere::new(point![0.0, 0.0, 0.0], 1.0, ColorRgb::new(1.0, 0.0, 0.0), 0.0);
        let second = Sphere::new(point![0.0, 0.0, 0.0], 1.0, ColorRgb::new(0.0, 1.0, 0.0), 0.0);
        let scene = Scene::new(vec![first, second]);
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, -1.0]);
        for _ in 0..16 {
            let mut stats = RayStats::default();
            let hit = intersect_scene(&ray, &scene, EPSILON, &mut stats).unwrap();
            assert_eq!(hit.albedo, first.albedo);
        }
    }

    #[test]
    fn test_nearest_sphere_wins() {
        let near = Sphere::new(point![0.0, 0.0, 2.0], 0.5, ColorRgb::new(0.0, 0.0, 1.0), 0.0);
        let far = Sphere::new(point![0.0, 0.0, -2.0], 0.5, ColorRgb::new(0.0, 1.0, 0.0), 0.0);
        let scene = Scene::new(vec![far, near]);
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, -1.0]);
        let mut stats = RayStats::default();
        let hit = intersect_scene(&ray, &scene, EPSILON, &mut stats).unwrap();
        assert_eq!(hit.albedo, near.albedo);
        assert_relative_eq!(hit.t, 2.5, epsilon = 1e-4);
        assert_eq!(stats.sphere_tests, 2);
    }
}
