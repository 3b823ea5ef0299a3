//! Application icon: a stylised round island on open water.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::{ExtendedColorType, Rgb, Rgba, RgbaImage};
use tracing::info;

use crate::error::{IslandError, Result};
use crate::pixels::Color;
use crate::terrain::blend_colors;

/// Sizes written into the multi-resolution icon file.
pub const ICON_SIZES: [u32; 4] = [16, 32, 48, 256];

const LAND: Color = Rgb([34, 139, 34]);
const BEACH: Color = Rgb([238, 214, 175]);
const WATER: Color = Rgb([0, 0, 139]);

/// Icon colour at normalised (nx, ny): land, then beach, then water by radius.
pub fn icon_color(nx: f32, ny: f32) -> Color {
    let dx = nx - 0.5;
    let dy = ny - 0.5;
    let max_distance = std::f32::consts::SQRT_2 * 0.5;
    let t = ((dx * dx + dy * dy).sqrt() / max_distance).min(1.0);

    if t < 0.4 {
        LAND
    } else if t < 0.45 {
        blend_colors(LAND, BEACH, (t - 0.4) / 0.05)
    } else if t < 0.5 {
        blend_colors(BEACH, WATER, (t - 0.45) / 0.05)
    } else {
        WATER
    }
}

pub fn render_icon(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let Rgb([r, g, b]) = icon_color(x as f32 / size as f32, y as f32 / size as f32);
        Rgba([r, g, b, 255])
    })
}

/// Write one `.ico` containing a frame per entry of `sizes` (each 1..=256).
pub fn write_ico<P: AsRef<Path>>(path: P, sizes: &[u32]) -> Result<()> {
    if let Some(&bad) = sizes.iter().find(|&&s| s == 0 || s > 256) {
        return Err(IslandError::invalid(format!("icon size {bad} outside 1..=256")));
    }

    let images: Vec<RgbaImage> = sizes.iter().map(|&s| render_icon(s)).collect();
    let frames = images
        .iter()
        .map(|img| IcoFrame::as_png(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    IcoEncoder::new(writer).encode_images(&frames)?;
    info!(path = %path.display(), frames = frames.len(), "wrote icon");
    Ok(())
}
