// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! Scene state and the render driver: holds the input grids, the owned
//! irradiance grid, camera and settings, and coordinates the two kernels.
//!
//! `Scene` is a plain state struct that owns the data the kernels read;
//! `update_light` and `render` here are plain methods taking `&self`/`&mut
//! self`, with the actual per-voxel and per-pixel work delegated to free functions
//! in [`crate::light`] and [`crate::camera`] rather than closures capturing scene
//! fields.

use crate::camera::{Camera, Settings};
use crate::error::SceneError;
use crate::grid::{IrradianceGrid, Shape3, Volume};
use crate::image::Image;
use crate::light::{self, PointLight};

/// An opaque render scene: the four input grids (IOR optional), the point lights,
/// the precomputed irradiance grid, camera state, and render settings.
#[derive(Clone, Debug)]
pub struct Scene {
    volume: Volume,
    lights: Vec<PointLight>,
    irradiance: IrradianceGrid,
    camera: Camera,
    settings: Settings,
    /// Set once [`Scene::update_light`] has run at least once; purely diagnostic.
    /// Rendering before the first relight is legal and yields the all-background
    /// image, since `E ≡ 0` satisfies that on its own.
    lit: bool,
}

impl Scene {
    /// Constructs a scene from its input grids and initial lights. Grid shape
    /// mismatches and negative light intensities are reported immediately;
    /// `settings` default to [`Settings::for_shape`] and `camera` to
    /// [`Camera::default`].
    pub fn new(volume: Volume, lights: Vec<PointLight>) -> Result<Self, SceneError> {
        for light in &lights {
            light.validate()?;
        }
        let shape = volume.shape();
        let settings = Settings::for_shape(shape);
        log::debug!(
            "constructing scene: shape {:?}, {} lights, step_length {:.5}",
            shape,
            lights.len(),
            settings.step_length
        );
        Ok(Self {
            irradiance: IrradianceGrid::filled(shape, crate::math::Rgb::ZERO),
            volume,
            lights,
            camera: Camera::default(),
            settings,
            lit: false,
        })
    }

    pub fn shape(&self) -> Shape3 {
        self.volume.shape()
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Replaces the light set wholesale, rejecting a negative intensity
    /// without disturbing the previous lights. The irradiance grid is left as-is
    /// until the next [`Scene::update_light`] call.
    pub fn set_lights(&mut self, lights: Vec<PointLight>) -> Result<(), SceneError> {
        for light in &lights {
            light.validate()?;
        }
        self.lights = lights;
        Ok(())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the render settings wholesale, rejecting an invalid combination
    /// (non-positive step length) without disturbing the previous settings.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SceneError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn set_density_factor(&mut self, factor: f32) {
        self.settings.smoke_density_factor = factor;
    }

    pub fn set_background(&mut self, background: crate::math::Rgb) {
        self.settings.background = background;
    }

    pub fn set_step_length(&mut self, step_length: f64) -> Result<(), SceneError> {
        if step_length <= 0.0 {
            return Err(SceneError::NonPositiveStep(ordered_float::OrderedFloat(step_length)));
        }
        self.settings.step_length = step_length;
        Ok(())
    }

    pub fn set_step_length_light(&mut self, step_length_light: f64) -> Result<(), SceneError> {
        if step_length_light <= 0.0 {
            return Err(SceneError::NonPositiveStep(ordered_float::OrderedFloat(step_length_light)));
        }
        self.settings.step_length_light = step_length_light;
        Ok(())
    }

    pub fn set_stop_threshold(&mut self, stop_threshold: f32) {
        self.settings.stop_threshold = stop_threshold.clamp(0.0, 1.0);
    }

    /// Recomputes incident irradiance over every voxel, rewriting the irradiance
    /// grid. Idempotent; safe to call every frame for time-varying volumes.
    pub fn update_light(&mut self) {
        light::update_light(
            &self.volume,
            &self.lights,
            self.settings.smoke_density_factor,
            self.settings.step_length_light,
            &mut self.irradiance,
        );
        self.lit = true;
    }

    /// Traces every pixel ray into `target`, one pixel at a time (or in parallel
    /// across pixels when the `threads` feature is enabled).
    pub fn render(&self, target: &mut Image) {
        if !self.lit {
            log::debug!("render() called before update_light(); irradiance is all zero");
        }
        let started = log::log_enabled!(log::Level::Trace).then(std::time::Instant::now);
        let basis = self.camera.basis();
        let (width, height) = target.dimensions();

        #[cfg(feature = "threads")]
        {
            use rayon::iter::{IndexedParallelIterator as _, ParallelIterator as _};
            target.par_pixels_mut().enumerate().for_each(|(flat, out)| {
                let i = flat % width;
                let j = flat / width;
                let dir = basis.pixel_ray_dir(i, j, width, height);
                *out = crate::camera::trace_pixel(&self.volume, &self.irradiance, &basis, &self.settings, dir);
            });
        }
        #[cfg(not(feature = "threads"))]
        {
            for j in 0..height {
                for i in 0..width {
                    let dir = basis.pixel_ray_dir(i, j, width, height);
                    let color =
                        crate::camera::trace_pixel(&self.volume, &self.irradiance, &basis, &self.settings, dir);
                    target.set(i, j, color);
                }
            }
        }

        if let Some(started) = started {
            log::trace!(
                "render: {}x{} pixels, {:.3} ms",
                width,
                height,
                started.elapsed().as_secs_f64() * 1e3
            );
        }
    }
}
