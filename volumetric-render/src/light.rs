// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! The light precomputation kernel: per-voxel incident irradiance from a
//! fixed set of point lights, attenuated by the density field along each shadow ray.

use crate::grid::{IrradianceGrid, Volume};
use crate::math::{InnerSpace as _, Rgb, WorldPoint, WorldVector};
use crate::raycast::Raymarch;

/// A point light: world-space position and RGB intensity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointLight {
    pub position: [f64; 3],
    pub intensity: Rgb,
}

impl PointLight {
    pub fn new(position: [f64; 3], intensity: Rgb) -> Self {
        Self { position, intensity }
    }

    fn position_point(&self) -> WorldPoint {
        WorldPoint::new(self.position[0], self.position[1], self.position[2])
    }

    /// Rejects a negative intensity channel; intensities must stay non-negative.
    pub fn validate(&self) -> Result<(), crate::error::SceneError> {
        let [r, g, b] = self.intensity.to_array();
        if r < 0.0 || g < 0.0 || b < 0.0 {
            return Err(crate::error::SceneError::NegativeIntensity([r, g, b]));
        }
        Ok(())
    }
}

/// Computes incident irradiance for every voxel of `volume`, writing the result
/// into `irradiance`.
///
/// Lights are accumulated in the input order within a voxel, so results are
/// bitwise-reproducible for a fixed platform regardless of how voxels themselves
/// are scheduled.
pub fn update_light(
    volume: &Volume,
    lights: &[PointLight],
    density_factor: f32,
    step_length_light: f64,
    irradiance: &mut IrradianceGrid,
) {
    debug_assert_eq!(irradiance.shape(), volume.shape());
    let started = log::log_enabled!(log::Level::Trace).then(std::time::Instant::now);

    #[cfg(feature = "threads")]
    {
        use rayon::iter::{IndexedParallelIterator as _, ParallelIterator as _};
        let shape = volume.shape();
        irradiance
            .par_contents_mut()
            .enumerate()
            .for_each(|(flat, out)| {
                let idx = unflatten(flat, shape);
                *out = voxel_irradiance(volume, lights, density_factor, step_length_light, idx);
            });
    }
    #[cfg(not(feature = "threads"))]
    {
        for idx in volume.shape_indices() {
            let e = voxel_irradiance(volume, lights, density_factor, step_length_light, idx);
            *irradiance.get_mut(idx).expect("index from shape_indices is in range") = e;
        }
    }

    if let Some(started) = started {
        log::trace!(
            "update_light: {} voxels, {} lights, {:.3} ms",
            volume.shape().len(),
            lights.len(),
            started.elapsed().as_secs_f64() * 1e3
        );
    }
}

#[cfg(feature = "threads")]
fn unflatten(flat: usize, shape: crate::grid::Shape3) -> [usize; 3] {
    let x = flat % shape.x;
    let y = (flat / shape.x) % shape.y;
    let z = flat / (shape.x * shape.y);
    [x, y, z]
}

/// Sums every light's contribution for a single voxel.
fn voxel_irradiance(
    volume: &Volume,
    lights: &[PointLight],
    density_factor: f32,
    step_length_light: f64,
    idx: [usize; 3],
) -> Rgb {
    let p_ijk = volume.voxel_center(idx);
    let mut e = Rgb::ZERO;
    for light in lights {
        e += light_contribution(volume, light, density_factor, step_length_light, p_ijk);
    }
    e
}

/// Marches a shadow ray from the voxel toward one light and returns its
/// contribution, attenuated by transmittance and falling off as the inverse
/// square of distance.
fn light_contribution(
    volume: &Volume,
    light: &PointLight,
    density_factor: f32,
    step_length_light: f64,
    p_ijk: WorldPoint,
) -> Rgb {
    let v: WorldVector = light.position_point() - p_ijk;
    let r_squared = v.dot(v);
    let d = v.normalize();

    let mut transmittance = 1.0_f32;
    // The march begins AT the voxel itself, intentionally counting its own
    // extinction, so that it stays consistent with the camera pass's
    // emit-then-attenuate order for the same voxel.
    for pos in Raymarch::new(p_ijk, d, step_length_light) {
        let rho = volume.sample_density(pos);
        transmittance *= 1.0 - density_factor * rho * step_length_light as f32;
    }

    light.intensity * (transmittance / r_squared as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ColorGrid, DensityGrid, Shape3};
    use pretty_assertions::assert_eq;

    fn empty_volume(shape: Shape3) -> Volume {
        Volume::new(
            DensityGrid::filled(shape, 0.0),
            ColorGrid::filled(shape, Rgb::ONE),
            None,
        )
        .unwrap()
    }

    /// Inverse-square law: with D ≡ 0, E[voxel] = I / r² exactly.
    #[test]
    fn inverse_square_law_with_no_density() {
        let shape = Shape3::cubic(8);
        let volume = empty_volume(shape);
        let light = PointLight::new([0.0, 0.0, 5.0], Rgb::new(1.0, 1.0, 1.0));
        let mut irradiance = IrradianceGrid::filled(shape, Rgb::ZERO);
        update_light(&volume, &[light], 1.0, 3.0 / 8.0, &mut irradiance);

        for idx in [[0usize, 0, 0], [3, 3, 3], [7, 7, 7]] {
            let p = volume.voxel_center(idx);
            let v = WorldVector::new(0.0 - p.x, 0.0 - p.y, 5.0 - p.z);
            let expected = (v.dot(v)) as f32;
            let e = irradiance[idx];
            assert!((e.red - 1.0 / expected).abs() < 1e-4, "{idx:?}: {e:?} vs 1/{expected}");
            assert_eq!(e.red, e.green);
            assert_eq!(e.green, e.blue);
        }
    }

    /// Empty light set yields E ≡ 0 everywhere.
    #[test]
    fn empty_light_set_yields_zero_irradiance() {
        let shape = Shape3::cubic(4);
        let volume = empty_volume(shape);
        let mut irradiance = IrradianceGrid::filled(shape, Rgb::ONE);
        update_light(&volume, &[], 1.0, 0.1, &mut irradiance);
        for idx in irradiance.indices() {
            assert_eq!(irradiance[idx], Rgb::ZERO);
        }
    }

    /// Negative intensities are rejected, not tolerated silently.
    #[test]
    fn negative_intensity_is_rejected() {
        let light = PointLight::new([0.0, 0.0, 5.0], Rgb::new(-1.0, 1.0, 1.0));
        assert!(light.validate().is_err());
        assert!(PointLight::new([0.0, 0.0, 5.0], Rgb::new(1.0, 1.0, 1.0)).validate().is_ok());
    }

    /// Lights accumulate (not overwrite) across the voxel's loop.
    #[test]
    fn multiple_lights_accumulate() {
        let shape = Shape3::cubic(4);
        let volume = empty_volume(shape);
        let a = PointLight::new([2.0, 0.0, 0.0], Rgb::new(1.0, 0.0, 0.0));
        let b = PointLight::new([-2.0, 0.0, 0.0], Rgb::new(0.0, 1.0, 0.0));
        let mut irradiance = IrradianceGrid::filled(shape, Rgb::ZERO);
        update_light(&volume, &[a, b], 1.0, 0.1, &mut irradiance);
        let center = irradiance[[2, 2, 2]];
        assert!(center.red > 0.0);
        assert!(center.green > 0.0);
    }
}
