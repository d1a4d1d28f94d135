// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! Numeric types shared by every module: world-space coordinates and linear color.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

pub use cgmath::{InnerSpace, Point3, Vector3};

/// World-space coordinate type. The volume always occupies `[-0.5, 0.5]` along each axis.
pub type FreeCoordinate = f64;

/// A point in world space.
pub type WorldPoint = Point3<FreeCoordinate>;

/// A (not necessarily normalized) direction in world space.
pub type WorldVector = Vector3<FreeCoordinate>;

/// Linear RGB color, with no alpha channel: this renderer has no notion of surface
/// opacity, only volumetric extinction, so every color value is a plain `Rgb`.
///
/// Channels are not clamped to `[0, 1]`; emission and irradiance accumulate without
/// an upper bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const ZERO: Self = Self {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };
    pub const ONE: Self = Self {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Component-wise product, used for `color * irradiance` weighting.
    #[must_use]
    pub fn mul_element_wise(self, other: Self) -> Self {
        Self {
            red: self.red * other.red,
            green: self.green * other.green,
            blue: self.blue * other.blue,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl Add for Rgb {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.red + rhs.red, self.green + rhs.green, self.blue + rhs.blue)
    }
}
impl AddAssign for Rgb {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl Sub for Rgb {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.red - rhs.red, self.green - rhs.green, self.blue - rhs.blue)
    }
}
impl Mul<f32> for Rgb {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.red * rhs, self.green * rhs, self.blue * rhs)
    }
}
impl MulAssign<f32> for Rgb {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_mul_element_wise() {
        let a = Rgb::new(1.0, 2.0, 3.0);
        let b = Rgb::new(0.5, 0.5, 2.0);
        assert_eq!(a.mul_element_wise(b), Rgb::new(0.5, 1.0, 6.0));
    }
}
