// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! The grid sampler: dense 3D arrays over the unit cube, nearest-voxel
//! lookups, and the two traversal oracles (`inside_cube`, `may_still_enter`) shared
//! by both kernels.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::math::{FreeCoordinate, WorldPoint, WorldVector};

/// Voxel counts along each axis. Fixed once a grid is built; every grid attached to
/// the same [`crate::Volume`] must share one `Shape3`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Shape3 {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Shape3 {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    pub const fn cubic(n: usize) -> Self {
        Self::new(n, n, n)
    }

    pub fn len(&self) -> usize {
        self.x * self.y * self.z
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The largest axis count, used to derive default step lengths.
    pub fn max_axis(&self) -> usize {
        self.x.max(self.y).max(self.z)
    }

    fn flat_index(&self, idx: [usize; 3]) -> usize {
        (idx[2] * self.y + idx[1]) * self.x + idx[0]
    }

    fn in_bounds(&self, idx: [usize; 3]) -> bool {
        idx[0] < self.x && idx[1] < self.y && idx[2] < self.z
    }
}

/// A dense, row-major flat array over a [`Shape3`]. This is the single grid-view
/// type that density, color, IOR, and irradiance data are all expressed in terms of,
/// replacing the ad hoc "array or handle" duck-typing of the system this crate is
/// modeled on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridArray<T> {
    shape: Shape3,
    contents: Vec<T>,
}

impl<T> GridArray<T> {
    pub fn from_vec(shape: Shape3, contents: Vec<T>) -> Self {
        assert_eq!(
            contents.len(),
            shape.len(),
            "GridArray contents length does not match shape {shape:?}"
        );
        Self { shape, contents }
    }

    pub fn from_fn(shape: Shape3, mut f: impl FnMut([usize; 3]) -> T) -> Self {
        let mut contents = Vec::with_capacity(shape.len());
        for z in 0..shape.z {
            for y in 0..shape.y {
                for x in 0..shape.x {
                    contents.push(f([x, y, z]));
                }
            }
        }
        Self { shape, contents }
    }

    pub fn filled(shape: Shape3, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            contents: vec![value; shape.len()],
            shape,
        }
    }

    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    pub fn as_slice(&self) -> &[T] {
        &self.contents
    }

    pub fn get(&self, idx: [usize; 3]) -> Option<&T> {
        self.shape.in_bounds(idx).then(|| &self.contents[self.shape.flat_index(idx)])
    }

    pub fn get_mut(&mut self, idx: [usize; 3]) -> Option<&mut T> {
        if self.shape.in_bounds(idx) {
            let i = self.shape.flat_index(idx);
            Some(&mut self.contents[i])
        } else {
            None
        }
    }

    /// Iterates over every voxel index in the grid, in flat storage order.
    pub fn indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let shape = self.shape;
        (0..shape.z).flat_map(move |z| (0..shape.y).flat_map(move |y| (0..shape.x).map(move |x| [x, y, z])))
    }

    #[cfg(feature = "threads")]
    pub fn par_contents_mut(&mut self) -> rayon::slice::IterMut<'_, T>
    where
        T: Send,
    {
        use rayon::iter::IntoParallelRefMutIterator as _;
        self.contents.par_iter_mut()
    }
}

impl<T> Index<[usize; 3]> for GridArray<T> {
    type Output = T;
    fn index(&self, idx: [usize; 3]) -> &T {
        self.get(idx).expect("GridArray index out of bounds")
    }
}
impl<T> IndexMut<[usize; 3]> for GridArray<T> {
    fn index_mut(&mut self, idx: [usize; 3]) -> &mut T {
        self.get_mut(idx).expect("GridArray index out of bounds")
    }
}

/// Maps a world-space point to the voxel index that contains it, without bounds
/// checking: `floor((p + 0.5) * shape)`.
fn voxel_coords(p: WorldPoint, shape: Shape3) -> [i64; 3] {
    [
        ((p.x + 0.5) * shape.x as FreeCoordinate).floor() as i64,
        ((p.y + 0.5) * shape.y as FreeCoordinate).floor() as i64,
        ((p.z + 0.5) * shape.z as FreeCoordinate).floor() as i64,
    ]
}

fn voxel_index_in_range(coords: [i64; 3], shape: Shape3) -> Option<[usize; 3]> {
    let in_range = |c: i64, n: usize| c >= 0 && (c as usize) < n;
    if in_range(coords[0], shape.x) && in_range(coords[1], shape.y) && in_range(coords[2], shape.z) {
        Some([coords[0] as usize, coords[1] as usize, coords[2] as usize])
    } else {
        None
    }
}

/// Returns true iff every component of `p` lies strictly inside `(-0.5, 0.5)`.
pub fn inside_cube(p: WorldPoint) -> bool {
    let strictly_inside = |c: FreeCoordinate| -0.5 < c && c < 0.5;
    strictly_inside(p.x) && strictly_inside(p.y) && strictly_inside(p.z)
}

/// The march termination oracle: false as soon as `p` has passed the
/// cube on some axis in the direction of travel.
pub fn may_still_enter(p: WorldPoint, d: WorldVector) -> bool {
    let passed = |coord: FreeCoordinate, dir: FreeCoordinate| {
        (coord > 0.5 && dir > 0.0) || (coord < -0.5 && dir < 0.0)
    };
    !(passed(p.x, d.x) || passed(p.y, d.y) || passed(p.z, d.z))
}

/// The voxelized extinction/density field. All entries are expected to be
/// non-negative; this is a caller contract, not enforced here.
pub type DensityGrid = GridArray<f32>;
/// The voxelized emissive/albedo color field.
pub type ColorGrid = GridArray<crate::math::Rgb>;
/// The optional voxelized index-of-refraction field.
pub type IorGrid = GridArray<f32>;
/// Per-voxel incident irradiance, owned by the scene and rewritten on every
/// `update_light` call.
pub type IrradianceGrid = GridArray<crate::math::Rgb>;

/// Holds the three (or four, with IOR) input grids, all sharing one [`Shape3`], and
/// implements the pure nearest-voxel sampling operations.
///
/// The sampler performs no allocation and has no hidden state; it simply indexes into
/// caller-owned data.
#[derive(Clone, Debug)]
pub struct Volume {
    shape: Shape3,
    density: DensityGrid,
    color: ColorGrid,
    ior: Option<IorGrid>,
}

impl Volume {
    /// Constructs a volume, rejecting any shape mismatch between the three grids.
    pub fn new(
        density: DensityGrid,
        color: ColorGrid,
        ior: Option<IorGrid>,
    ) -> Result<Self, crate::error::SceneError> {
        let shape = density.shape();
        if color.shape() != shape {
            return Err(crate::error::SceneError::ShapeMismatch {
                what: "color grid",
                expected: shape,
                actual: color.shape(),
            });
        }
        if let Some(ior) = &ior {
            if ior.shape() != shape {
                return Err(crate::error::SceneError::ShapeMismatch {
                    what: "IOR grid",
                    expected: shape,
                    actual: ior.shape(),
                });
            }
        }
        Ok(Self {
            shape,
            density,
            color,
            ior,
        })
    }

    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    pub fn has_ior(&self) -> bool {
        self.ior.is_some()
    }

    pub fn density(&self) -> &DensityGrid {
        &self.density
    }

    pub fn color(&self) -> &ColorGrid {
        &self.color
    }

    pub fn ior_grid(&self) -> Option<&IorGrid> {
        self.ior.as_ref()
    }

    /// The world-space center of voxel `idx`.
    pub fn voxel_center(&self, idx: [usize; 3]) -> WorldPoint {
        WorldPoint::new(
            (idx[0] as FreeCoordinate + 0.5) / self.shape.x as FreeCoordinate - 0.5,
            (idx[1] as FreeCoordinate + 0.5) / self.shape.y as FreeCoordinate - 0.5,
            (idx[2] as FreeCoordinate + 0.5) / self.shape.z as FreeCoordinate - 0.5,
        )
    }

    /// `floor((p + 0.5) * shape)`, or `None` if any component falls outside
    /// `[0, shape-1]`.
    pub fn voxel_index(&self, p: WorldPoint) -> Option<[usize; 3]> {
        voxel_index_in_range(voxel_coords(p, self.shape), self.shape)
    }

    /// Every voxel index in the volume, in flat storage order.
    pub fn shape_indices(&self) -> impl Iterator<Item = [usize; 3]> {
        let shape = self.shape;
        (0..shape.z).flat_map(move |z| (0..shape.y).flat_map(move |y| (0..shape.x).map(move |x| [x, y, z])))
    }

    /// `sample_density(p)`: 0 outside the grid.
    pub fn sample_density(&self, p: WorldPoint) -> f32 {
        self.voxel_index(p).map(|idx| self.density[idx]).unwrap_or(0.0)
    }

    /// `sample_color(p)`: `default` outside the grid (typically zero).
    pub fn sample_color(&self, p: WorldPoint, default: crate::math::Rgb) -> crate::math::Rgb {
        self.voxel_index(p).map(|idx| self.color[idx]).unwrap_or(default)
    }

    /// `sample_ior(p)`: 1 outside the grid, and 1 everywhere when no IOR field was
    /// supplied at all.
    pub fn sample_ior(&self, p: WorldPoint) -> f32 {
        match &self.ior {
            None => 1.0,
            Some(ior) => self.voxel_index(p).map(|idx| ior[idx]).unwrap_or(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rgb;

    fn uniform_volume(shape: Shape3, density: f32) -> Volume {
        Volume::new(
            DensityGrid::filled(shape, density),
            ColorGrid::filled(shape, Rgb::ONE),
            None,
        )
        .unwrap()
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let density = DensityGrid::filled(Shape3::cubic(4), 0.0);
        let color = ColorGrid::filled(Shape3::cubic(5), Rgb::ZERO);
        assert!(Volume::new(density, color, None).is_err());
    }

    #[test]
    fn inside_cube_is_open() {
        assert!(inside_cube(WorldPoint::new(0.0, 0.0, 0.0)));
        assert!(!inside_cube(WorldPoint::new(0.5, 0.0, 0.0)));
        assert!(!inside_cube(WorldPoint::new(-0.5, 0.0, 0.0)));
        assert!(inside_cube(WorldPoint::new(0.49, -0.49, 0.0)));
    }

    #[test]
    fn may_still_enter_terminates_past_exit() {
        let d = WorldVector::new(1.0, 0.0, 0.0);
        assert!(may_still_enter(WorldPoint::new(0.4, 0.0, 0.0), d));
        assert!(!may_still_enter(WorldPoint::new(0.51, 0.0, 0.0), d));
        assert!(!may_still_enter(WorldPoint::new(-0.51, 0.0, 0.0), -d));
    }

    #[test]
    fn sample_outside_grid_returns_defaults() {
        let v = uniform_volume(Shape3::cubic(4), 2.0);
        let outside = WorldPoint::new(10.0, 10.0, 10.0);
        assert_eq!(v.sample_density(outside), 0.0);
        assert_eq!(v.sample_color(outside, Rgb::ZERO), Rgb::ZERO);
        assert_eq!(v.sample_ior(outside), 1.0);
    }

    #[test]
    fn voxel_center_round_trips_through_voxel_index() {
        let shape = Shape3::cubic(10);
        let v = uniform_volume(shape, 0.0);
        for idx in [[0, 0, 0], [5, 5, 5], [9, 9, 9]] {
            let center = v.voxel_center(idx);
            assert_eq!(v.voxel_index(center), Some(idx));
        }
    }
}
