//! PNG export of generated islands and grayscale previews.
//!
//! Export never touches generation state: a failed write leaves the
//! in-memory buffers intact and comes back as an error value.

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};
use noise::NoiseFn;
use tracing::info;

use crate::error::Result;
use crate::heightfield::{validate_dimensions, SamplingParams};
use crate::perlin::fractal_sum;
use crate::pixels::PixelBuffer;
use crate::tilemap::Tilemap;

/// Encode a pixel buffer as PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    buffer
        .to_rgb_image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write a pixel buffer to `path` as PNG.
pub fn save_png<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    buffer.to_rgb_image().save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), width = buffer.width(), height = buffer.height(), "exported island");
    Ok(())
}

/// `island_seed{seed}_{timestamp}.png`
pub fn export_filename(seed: u64, timestamp: i64) -> String {
    format!("island_seed{}_{}.png", seed, timestamp)
}

/// Save into an existing directory under a seed + timestamp file name.
/// Returns the full path written.
pub fn export_to_directory<P: AsRef<Path>>(buffer: &PixelBuffer, dir: P, seed: u64) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("export directory {} does not exist", dir.display()),
        )
        .into());
    }
    let path = dir.join(export_filename(seed, chrono::Utc::now().timestamp()));
    save_png(buffer, &path)?;
    Ok(path)
}

/// Map a value in [-1, 1] to a gray level.
fn noise_to_gray(value: f64) -> u8 {
    ((value * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0) as u8
}

/// Raw fbm rendered as grayscale, without any island shaping.
pub fn noise_preview<N>(noise: &N, width: usize, height: usize, sampling: &SamplingParams) -> Result<GrayImage>
where
    N: NoiseFn<f64, 2> + ?Sized,
{
    validate_dimensions(width, height)?;
    sampling.validate()?;

    let img = GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let nx = x as f64 / width as f64 * sampling.scale;
        let ny = y as f64 / height as f64 * sampling.scale;
        let v = fractal_sum(noise, nx, ny, sampling.octaves, sampling.persistence);
        Luma([noise_to_gray(v)])
    });
    Ok(img)
}

/// Elevation in [0, 1] as grayscale.
pub fn heightfield_image(heightfield: &Tilemap<f32>) -> GrayImage {
    GrayImage::from_fn(heightfield.width as u32, heightfield.height as u32, |x, y| {
        let h = *heightfield.get(x as usize, y as usize);
        Luma([(h.clamp(0.0, 1.0) * 255.0) as u8])
    })
}

pub fn export_noise_preview<N, P>(
    noise: &N,
    width: usize,
    height: usize,
    sampling: &SamplingParams,
    path: P,
) -> Result<()>
where
    N: NoiseFn<f64, 2> + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    noise_preview(noise, width, height, sampling)?.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "exported noise preview");
    Ok(())
}

pub fn export_heightfield<P: AsRef<Path>>(heightfield: &Tilemap<f32>, path: P) -> Result<()> {
    let path = path.as_ref();
    heightfield_image(heightfield).save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "exported height field");
    Ok(())
}
