// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! A physically motivated ray-marcher over a regular 3D grid.
//!
//! Given a voxelized extinction/density field, a voxelized emissive/albedo color
//! field, an optional voxelized index-of-refraction field, and a small set of point
//! lights, this crate produces a 2D color image in two coupled passes: a light
//! precomputation pass that integrates per-voxel incident irradiance, and a camera
//! ray pass that marches through the volume accumulating emitted color weighted by
//! that irradiance and attenuated by running transmittance, bending through any IOR
//! field along the way.
//!
//! The volume is always the axis-aligned unit cube `[-0.5, 0.5]³` centered at the
//! origin; this crate has no notion of mesh/surface rendering, multi-bounce global
//! illumination, spectral rendering, denoising, adaptive sampling, or a BVH.
//!
//! See [`Scene`] for the entry point: construct one from a [`Volume`] and a set of
//! [`PointLight`]s, call [`Scene::update_light`] at least once, then
//! [`Scene::render`] into an [`Image`] as many times as needed.

#![deny(rust_2018_idioms)]
#![warn(clippy::cast_lossless)]

pub mod camera;
pub mod error;
pub mod grid;
pub mod image;
pub mod ior;
pub mod light;
pub mod math;
pub mod raycast;
mod scene;

pub use camera::{Camera, Settings};
pub use error::SceneError;
pub use grid::{ColorGrid, DensityGrid, IorGrid, Shape3, Volume};
pub use image::Image;
pub use light::PointLight;
pub use math::Rgb;
pub use scene::Scene;
