// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! Built-in scenes, standing in for the scene-authoring "canvas" primitives that
//! are out of scope for the library (disks, rectangles, helices, Gaussian
//! splatting ingestion). These are deliberately simple: procedurally filled
//! grids, nothing resembling a general scene format.

use clap::ValueEnum;

use volumetric_render::grid::{ColorGrid, DensityGrid, IorGrid, Shape3};
use volumetric_render::math::Rgb;
use volumetric_render::{PointLight, Scene, Volume};

/// The default light used when the caller supplies none: a single light at
/// `(0, 0, 5)` with intensity `(50, 50, 50)`.
pub fn default_lights() -> Vec<PointLight> {
    vec![PointLight::new([0.0, 0.0, 5.0], Rgb::new(50.0, 50.0, 50.0))]
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BuiltinScene {
    /// A dense sphere at the origin, no lights — renders as a silhouette.
    Sphere,
    /// A single emissive voxel lit by one point light.
    EmissiveVoxel,
    /// A textured ground plane behind a graded-index lensing ball.
    Lensing,
}

fn voxel_center(idx: [usize; 3], shape: Shape3) -> [f64; 3] {
    [
        (idx[0] as f64 + 0.5) / shape.x as f64 - 0.5,
        (idx[1] as f64 + 0.5) / shape.y as f64 - 0.5,
        (idx[2] as f64 + 0.5) / shape.z as f64 - 0.5,
    ]
}

impl BuiltinScene {
    pub fn build(self) -> Scene {
        match self {
            BuiltinScene::Sphere => sphere_scene(),
            BuiltinScene::EmissiveVoxel => emissive_voxel_scene(),
            BuiltinScene::Lensing => lensing_scene(),
        }
    }
}

fn sphere_scene() -> Scene {
    let shape = Shape3::cubic(50);
    let density = DensityGrid::from_fn(shape, |idx| {
        let c = voxel_center(idx, shape);
        if c[0] * c[0] + c[1] * c[1] + c[2] * c[2] <= 0.25 * 0.25 {
            5.0
        } else {
            0.0
        }
    });
    let color = ColorGrid::filled(shape, Rgb::ONE);
    let volume = Volume::new(density, color, None).expect("matching shapes");
    Scene::new(volume, vec![]).expect("valid scene")
}

fn emissive_voxel_scene() -> Scene {
    let shape = Shape3::cubic(10);
    let mut density = DensityGrid::filled(shape, 0.0);
    let mut color = ColorGrid::filled(shape, Rgb::ZERO);
    *density.get_mut([5, 5, 5]).unwrap() = 1.0;
    *color.get_mut([5, 5, 5]).unwrap() = Rgb::new(1.0, 0.0, 0.0);
    let volume = Volume::new(density, color, None).expect("matching shapes");
    let lights = vec![PointLight::new([0.0, 0.0, 5.0], Rgb::new(10.0, 10.0, 10.0))];
    let mut scene = Scene::new(volume, lights).expect("valid scene");
    {
        let camera = scene.camera_mut();
        camera.set_phi(0.0, false);
        camera.set_theta(0.0, false);
        camera.set_distance(3.0).expect("positive distance");
    }
    scene
}

/// A checkered ground plane viewed through a smoothed, graded-index lensing ball:
/// the IOR field rises smoothly toward 1.5 near the origin so the gradient used
/// by the eikonal update stays finite.
fn lensing_scene() -> Scene {
    let shape = Shape3::cubic(50);
    let density = DensityGrid::from_fn(shape, |idx| {
        let c = voxel_center(idx, shape);
        let on_ground = (c[2] + 0.3).abs() < 0.5 / shape.z as f64;
        if on_ground {
            let checker = ((c[0] * 10.0).floor() as i64 + (c[1] * 10.0).floor() as i64) % 2 == 0;
            if checker {
                3.0
            } else {
                0.0
            }
        } else {
            0.0
        }
    });
    let color = ColorGrid::filled(shape, Rgb::new(0.8, 0.7, 0.5));
    let ior = IorGrid::from_fn(shape, |idx| {
        let c = voxel_center(idx, shape);
        let r2 = c[0] * c[0] + c[1] * c[1] + c[2] * c[2];
        let radius = 0.2_f64;
        // A smooth bump, not a hard step, so the central-difference gradient stays
        // finite everywhere.
        let t = (1.0 - (r2 / (radius * radius)).min(1.0)).max(0.0);
        (1.0 + 0.5 * t * t) as f32
    });
    let volume = Volume::new(density, color, Some(ior)).expect("matching shapes");
    Scene::new(volume, default_lights()).expect("valid scene")
}
