// Dual-licensed under the MIT License or the Apache License, Version 2.0.

//! The render target: a dense RGB image buffer owned by the driver and
//! overwritten on every camera pass.

use crate::math::Rgb;

/// A dense row-major RGB image of shape `(width, height)`.
///
/// Indexing convention: `i ∈ [0, width)` with `i = 0` at the
/// left, `j ∈ [0, height)` with `j = 0` at the bottom. Storage order is an
/// implementation choice, so long as [`Image::get`]/[`Image::set`] stay consistent
/// with it; this one stores rows bottom-to-top to match `j` directly.
#[derive(Clone, Debug)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Image {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::ZERO; width * height],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn flat_index(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    pub fn get(&self, i: usize, j: usize) -> Rgb {
        self.pixels[self.flat_index(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, color: Rgb) {
        let idx = self.flat_index(i, j);
        self.pixels[idx] = color;
    }

    /// Pixels in storage order, i.e. row `j = 0` first, each row left to right.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[cfg(feature = "threads")]
    pub fn par_pixels_mut(&mut self) -> rayon::slice::IterMut<'_, Rgb> {
        use rayon::iter::IntoParallelRefMutIterator as _;
        self.pixels.par_iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut image = Image::new(4, 3);
        image.set(2, 1, Rgb::new(1.0, 0.5, 0.25));
        assert_eq!(image.get(2, 1), Rgb::new(1.0, 0.5, 0.25));
        assert_eq!(image.get(0, 0), Rgb::ZERO);
    }
}
