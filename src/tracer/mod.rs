use super::*;

pub mod sky;

mod intersect;
mod ray;

pub use intersect::{intersect_scene, intersect_sphere, RayHit};
pub use ray::Ray;

/// Canonical integrator parameters. One fixed set for the process lifetime;
/// every work unit reads them read-only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    pub max_bounces: u32,
    /// Offset applied when spawning rays off a surface, and the minimum
    /// accepted hit distance. Prevents self-intersection at the origin.
    pub surface_epsilon: f32,
    /// Bounce loop stops once the throughput's largest component drops
    /// below this. Deterministic cutoff, no Russian roulette.
    pub throughput_cutoff: f32,
    pub ambient: f32,
    /// Fraction of diffuse light that survives when the shadow ray is
    /// blocked.
    pub shadow_attenuation: f32,
    pub light_dir: Normal,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_bounces: 5,
            surface_epsilon: 1e-3,
            throughput_cutoff: 0.01,
            ambient: 0.1,
            shadow_attenuation: 0.2,
            light_dir: normal![2.0, 2.0, 3.0],
        }
    }
}

/// Counters for one shaded pixel. The bounce budget tests lean on these.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayStats {
    pub bounce_rays: u64,
    pub shadow_rays: u64,
    pub scene_tests: u64,
    pub sphere_tests: u64,
}

/// Integrate one pixel: a bounded bounce loop with early-exit predicates.
///
/// Termination, in priority order: no hit (sky), bounce budget exhausted,
/// throughput under the cutoff, non-reflective surface. The result is tone
/// mapped and gamma encoded, ready for display. Deterministic: the same
/// scene, params and ray always produce bit-identical output.
pub fn shade(scene: &Scene, params: &Params, primary: Ray, stats: &mut RayStats) -> ColorRgb {
    let mut ray = primary;
    let mut radiance = ColorRgb::BLACK;
    let mut throughput = ColorRgb::WHITE;

    for _ in 0..params.max_bounces {
        stats.bounce_rays += 1;
        let Some(hit) = intersect_scene(&ray, scene, params.surface_epsilon, stats) else {
            radiance += throughput * sky::radiance(&ray.dir);
            break;
        };

        let mut diffuse = hit.normal.dot(&params.light_dir).max(0.0);
        if diffuse > 0.0 {
            stats.shadow_rays += 1;
            let shadow_ray = Ray {
                origin: hit.point + params.surface_epsilon * hit.normal.into_inner(),
                dir: params.light_dir,
            };
            // The light sits at infinity, so any hit shadows the point.
            if intersect_scene(&shadow_ray, scene, params.surface_epsilon, stats).is_some() {
                diffuse *= params.shadow_attenuation;
            }
        }

        let lighting = params.ambient + diffuse;
        radiance += throughput * hit.albedo * (lighting * (1.0 - hit.reflectivity));

        throughput = throughput * hit.reflectivity;
        if throughput.max_component() < params.throughput_cutoff {
            break;
        }
        if hit.reflectivity <= 0.0 {
            break;
        }
        ray = Ray {
            origin: hit.point + params.surface_epsilon * hit.normal.into_inner(),
            dir: reflect_dir(&ray.dir, &hit.normal),
        };
    }

    radiance.tonemap().gamma_encode()
}
