//! The colour grid handed to display and export code.

use image::{Rgb, RgbImage};

use crate::tilemap::Tilemap;

pub type Color = Rgb<u8>;

/// Width x height grid of colours produced by one generation call.
///
/// Owned by the caller; holds no reference back to the generator.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    pixels: Tilemap<Color>,
}

impl PixelBuffer {
    pub fn from_tilemap(pixels: Tilemap<Color>) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.width
    }

    pub fn height(&self) -> usize {
        self.pixels.height
    }

    /// Colour at (x, y). Panics when out of range.
    pub fn at(&self, x: usize, y: usize) -> Color {
        *self.pixels.get(x, y)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.pixels.try_get(x, y).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.pixels.iter().map(|(x, y, &c)| (x, y, c))
    }

    /// Copy into an `image` buffer for encoding or display upload.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            self.at(x as usize, y as usize)
        })
    }
}
