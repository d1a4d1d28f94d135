// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! IOR-driven ray bending: a first-order geometric-optics eikonal update
//! applied once per march step when an index-of-refraction field is present.
//!
//! The bend direction comes from a central-difference gradient of the IOR field,
//! the convention used by CPU volumetric renderers generally when no analytic
//! gradient is available.

use crate::grid::Volume;
use crate::math::{FreeCoordinate, InnerSpace as _, WorldPoint, WorldVector};

/// Central-difference gradient of the IOR field at `pos`, using unit offsets of one
/// voxel along each axis. The sampler returns 1 outside the cube, so the gradient
/// naturally goes to zero just outside the volume's boundary.
fn ior_gradient(volume: &Volume, pos: WorldPoint) -> WorldVector {
    let shape = volume.shape();
    let hx = 1.0 / shape.x as FreeCoordinate;
    let hy = 1.0 / shape.y as FreeCoordinate;
    let hz = 1.0 / shape.z as FreeCoordinate;

    let dx = (volume.sample_ior(WorldPoint::new(pos.x + hx, pos.y, pos.z))
        - volume.sample_ior(WorldPoint::new(pos.x - hx, pos.y, pos.z))) as FreeCoordinate
        / (2.0 * hx);
    let dy = (volume.sample_ior(WorldPoint::new(pos.x, pos.y + hy, pos.z))
        - volume.sample_ior(WorldPoint::new(pos.x, pos.y - hy, pos.z))) as FreeCoordinate
        / (2.0 * hy);
    let dz = (volume.sample_ior(WorldPoint::new(pos.x, pos.y, pos.z + hz))
        - volume.sample_ior(WorldPoint::new(pos.x, pos.y, pos.z - hz))) as FreeCoordinate
        / (2.0 * hz);

    WorldVector::new(dx, dy, dz)
}

/// Applies one eikonal bending step to `dir` at `pos` and returns the renormalized
/// result.
///
/// When `η` is uniformly 1 the gradient is zero everywhere and this is the identity
/// (up to renormalization of an already-unit vector), so straight-line marching is
/// recovered exactly.
pub fn bend(volume: &Volume, pos: WorldPoint, dir: WorldVector, step: FreeCoordinate) -> WorldVector {
    let gradient = ior_gradient(volume, pos);
    let eta0 = volume.sample_ior(pos) as FreeCoordinate;
    let tangential = gradient - dir * gradient.dot(dir);
    let bent = dir + tangential * (step / eta0);
    bent.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ColorGrid, DensityGrid, IorGrid, Shape3};
    use crate::math::Rgb;

    #[test]
    fn uniform_ior_does_not_bend() {
        let shape = Shape3::cubic(10);
        let volume = Volume::new(
            DensityGrid::filled(shape, 0.0),
            ColorGrid::filled(shape, Rgb::ONE),
            Some(IorGrid::filled(shape, 1.0)),
        )
        .unwrap();
        let dir = WorldVector::new(0.0, 0.0, 1.0);
        let bent = bend(&volume, WorldPoint::new(0.0, 0.0, 0.0), dir, 0.01);
        assert!((bent - dir).magnitude() < 1e-9);
    }

    #[test]
    fn bend_result_is_unit_length() {
        let shape = Shape3::cubic(10);
        let color = ColorGrid::filled(shape, Rgb::ONE);
        let ior = IorGrid::from_fn(shape, |[x, _, _]| 1.0 + x as f32 * 0.05);
        let volume = Volume::new(DensityGrid::filled(shape, 0.0), color, Some(ior)).unwrap();
        let dir = WorldVector::new(0.0, 0.0, 1.0);
        let bent = bend(&volume, WorldPoint::new(0.0, 0.0, 0.0), dir, 0.01);
        assert!((bent.magnitude() - 1.0).abs() < 1e-9);
    }
}
