// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! Camera state and the camera-ray pass kernel: building the orbiting
//! camera basis, forming a primary ray per pixel, and marching it through the
//! volume to accumulate emitted color.

use crate::grid::Volume;
use crate::ior;
use crate::math::{FreeCoordinate, InnerSpace as _, Rgb, WorldPoint, WorldVector};
use crate::raycast::Raymarch;

/// Radius of the sphere that circumscribes the unit cube, used to fast-skip empty
/// space outside it before marching begins.
pub const CUBE_CIRCUMSCRIBED_SPHERE_RADIUS: FreeCoordinate = 0.866_025_403_784_438_6; // sqrt(3) / 2

/// Default vertical field of view, `2 * tan(33deg / 2)`.
pub const DEFAULT_FOV_TAN: f64 = 0.5924;
/// Default camera orbit distance.
pub const DEFAULT_DISTANCE: f64 = 3.0;

/// Camera orbit state: azimuth `φ`, elevation `θ` (clamped to `[-π/2, π/2]`),
/// orbit `distance`, and `fov_tan = 2 * tan(vertical FOV / 2)`.
///
/// `+Z` is up; the camera is right-handed and orbits on a sphere.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    phi: FreeCoordinate,
    theta: FreeCoordinate,
    distance: FreeCoordinate,
    fov_tan: FreeCoordinate,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            phi: 0.0,
            theta: 0.0,
            distance: DEFAULT_DISTANCE,
            fov_tan: DEFAULT_FOV_TAN,
        }
    }
}

impl Camera {
    pub fn phi(&self, degrees: bool) -> FreeCoordinate {
        to_unit(self.phi, degrees)
    }

    /// φ wraps freely; no clamping is applied.
    pub fn set_phi(&mut self, angle: FreeCoordinate, degrees: bool) {
        self.phi = from_unit(angle, degrees);
    }

    pub fn theta(&self, degrees: bool) -> FreeCoordinate {
        to_unit(self.theta, degrees)
    }

    /// θ is clamped to `[-π/2, π/2]`.
    pub fn set_theta(&mut self, angle: FreeCoordinate, degrees: bool) {
        self.theta = from_unit(angle, degrees).clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2);
    }

    pub fn distance(&self) -> FreeCoordinate {
        self.distance
    }

    /// Rejects non-positive distances.
    pub fn set_distance(&mut self, distance: FreeCoordinate) -> Result<(), crate::error::SceneError> {
        if distance <= 0.0 {
            return Err(crate::error::SceneError::NonPositiveDistance(ordered_float::OrderedFloat(distance)));
        }
        self.distance = distance;
        Ok(())
    }

    /// Vertical field of view, stored internally as `fov_tan`.
    pub fn vertical_fov(&self, degrees: bool) -> FreeCoordinate {
        to_unit(2.0 * (self.fov_tan / 2.0).atan(), degrees)
    }

    pub fn set_vertical_fov(&mut self, angle: FreeCoordinate, degrees: bool) {
        let radians = from_unit(angle, degrees);
        self.fov_tan = 2.0 * (radians / 2.0).tan();
    }

    /// Builds the orthonormal camera basis `(eye, forward, u, v)` from `(φ, θ)`.
    pub fn basis(&self) -> CameraBasis {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let eye = WorldPoint::new(
            self.distance * cos_phi * cos_theta,
            self.distance * sin_phi * cos_theta,
            self.distance * sin_theta,
        );
        let forward = -WorldVector::new(eye.x, eye.y, eye.z) / self.distance;
        let u = WorldVector::new(-sin_phi, cos_phi, 0.0);
        let v = WorldVector::new(-cos_phi * sin_theta, -sin_phi * sin_theta, cos_theta);
        CameraBasis {
            eye,
            forward,
            u,
            v,
            fov_tan: self.fov_tan,
            distance: self.distance,
        }
    }
}

fn to_unit(radians: FreeCoordinate, degrees: bool) -> FreeCoordinate {
    if degrees {
        radians.to_degrees()
    } else {
        radians
    }
}
fn from_unit(angle: FreeCoordinate, degrees: bool) -> FreeCoordinate {
    if degrees {
        angle.to_radians()
    } else {
        angle
    }
}

/// The orthonormal basis derived from a [`Camera`]'s current orbit state, plus the
/// two scalars (`fov_tan`, `distance`) needed to build a per-pixel ray.
#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    eye: WorldPoint,
    forward: WorldVector,
    u: WorldVector,
    v: WorldVector,
    fov_tan: FreeCoordinate,
    distance: FreeCoordinate,
}

impl CameraBasis {
    /// The normalized ray direction for pixel `(i, j)` of an image `(width, height)`.
    /// Pixel `(0, 0)` is the lower-left; `j` increases upward.
    pub fn pixel_ray_dir(&self, i: usize, j: usize, width: usize, height: usize) -> WorldVector {
        let x = i as FreeCoordinate - width as FreeCoordinate / 2.0;
        let y = j as FreeCoordinate / height as FreeCoordinate - 0.5;
        let d = self.forward + self.u * (self.fov_tan * x / height as FreeCoordinate) + self.v * (self.fov_tan * y);
        d.normalize()
    }

    pub fn eye(&self) -> WorldPoint {
        self.eye
    }
}

/// Render settings that govern both kernels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    pub step_length: FreeCoordinate,
    pub step_length_light: FreeCoordinate,
    pub stop_threshold: f32,
    pub background: Rgb,
    pub smoke_density_factor: f32,
}

impl Settings {
    /// Derives the two default step lengths from a grid's largest axis count.
    pub fn for_shape(shape: crate::grid::Shape3) -> Self {
        let n = shape.max_axis().max(1) as FreeCoordinate;
        Self {
            step_length: 1.0 / n,
            step_length_light: 3.0 / n,
            stop_threshold: 0.01,
            background: Rgb::new(0.2, 0.2, 0.2),
            smoke_density_factor: 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), crate::error::SceneError> {
        if self.step_length <= 0.0 {
            return Err(crate::error::SceneError::NonPositiveStep(ordered_float::OrderedFloat(
                self.step_length,
            )));
        }
        if self.step_length_light <= 0.0 {
            return Err(crate::error::SceneError::NonPositiveStep(ordered_float::OrderedFloat(
                self.step_length_light,
            )));
        }
        Ok(())
    }
}

/// Traces a single pixel ray: fast-skip to the bounding sphere, march
/// through the volume accumulating premultiplied emission weighted by the
/// precomputed irradiance, attenuate by running transmittance, optionally bend the
/// ray by the local IOR gradient, and composite the background at exit.
pub fn trace_pixel(
    volume: &Volume,
    irradiance: &crate::grid::IrradianceGrid,
    basis: &CameraBasis,
    settings: &Settings,
    pixel_dir: WorldVector,
) -> Rgb {
    let mut pos = basis.eye();
    let mut dir = pixel_dir;
    let mut color = Rgb::ZERO;
    let mut transmittance = 1.0_f32;

    // Fast-skip to the cube's circumscribed sphere.
    let skip = basis.distance - CUBE_CIRCUMSCRIBED_SPHERE_RADIUS;
    if skip > 0.0 {
        pos += dir * skip;
    }

    let mut march = Raymarch::new(pos, dir, settings.step_length);
    loop {
        if !march.may_still_enter() {
            break;
        }
        if transmittance < settings.stop_threshold {
            break;
        }

        let pos = march.peek();
        let rho = volume.sample_density(pos);
        let c = volume.sample_color(pos, Rgb::ZERO);
        let e = volume
            .voxel_index(pos)
            .and_then(|idx| irradiance.get(idx).copied())
            .unwrap_or(Rgb::ZERO);

        let extinction = settings.smoke_density_factor * rho * settings.step_length as f32;
        color += c.mul_element_wise(e) * (extinction * transmittance);
        transmittance *= 1.0 - extinction;

        // Bend the direction at `pos` before taking the step that leaves it, so the
        // segment leaving `pos` is advanced with the direction sampled here, not the
        // one carried over from the previous voxel.
        if volume.has_ior() {
            dir = ior::bend(volume, pos, march.dir(), settings.step_length);
            march.set_dir(dir);
        }
        march.advance();
    }

    color + settings.background * transmittance
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

    /// S1/property 1: with D ≡ 0, every pixel equals the background exactly.
    #[test]
    fn empty_volume_is_background_everywhere() {
        let shape = Shape3::cubic(16);
        let volume = empty_volume(shape);
        let irradiance = crate::grid::IrradianceGrid::filled(shape, Rgb::ZERO);
        let settings = Settings::for_shape(shape);
        let camera = Camera::default();
        let basis = camera.basis();

        for (i, j) in [(0, 0), (31, 31), (16, 16), (5, 27)] {
            let dir = basis.pixel_ray_dir(i, j, 32, 32);
            let color = trace_pixel(&volume, &irradiance, &basis, &settings, dir);
            assert_eq!(color, settings.background);
        }
    }

    /// Property 7: θ = 100° behaves exactly like θ = 90°.
    #[test]
    fn theta_is_clamped() {
        let mut a = Camera::default();
        a.set_theta(100.0, true);
        let mut b = Camera::default();
        b.set_theta(90.0, true);
        assert_eq!(a, b);
    }

    /// Property 6: φ and φ + 360° produce the same basis.
    #[test]
    fn phi_is_periodic() {
        let mut a = Camera::default();
        a.set_phi(40.0, true);
        let mut b = Camera::default();
        b.set_phi(400.0, true);
        let ba = a.basis();
        let bb = b.basis();
        assert!((ba.eye() - bb.eye()).magnitude() < 1e-9);
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        let mut camera = Camera::default();
        assert!(camera.set_distance(0.0).is_err());
        assert!(camera.set_distance(-1.0).is_err());
        assert_eq!(camera.distance(), DEFAULT_DISTANCE);
    }

    /// Camera and Settings are config types: they must round-trip through
    /// the same serde_json path a saved-scene loader would use.
    #[test]
    fn camera_and_settings_round_trip_through_json() {
        let mut camera = Camera::default();
        camera.set_phi(40.0, true);
        camera.set_theta(-10.0, true);
        let json = serde_json::to_string(&camera).unwrap();
        let round_tripped: Camera = serde_json::from_str(&json).unwrap();
        assert_eq!(camera, round_tripped);

        let settings = Settings::for_shape(Shape3::cubic(20));
        let json = serde_json::to_string(&settings).unwrap();
        let round_tripped: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, round_tripped);
    }
}
