//! Island-shaped elevation synthesis.
//!
//! Each cell samples fbm, remaps it to [0, 1] and multiplies it by the
//! strongest island falloff covering that cell. Overlapping islands take the
//! maximum falloff rather than the sum, so shared shorelines merge without
//! raising the overlap above either island's own peak.

use noise::NoiseFn;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IslandError, Result};
use crate::perlin::{fractal_sum, validate_fbm_params};
use crate::tilemap::Tilemap;

/// Largest canvas (in pixels) we agree to allocate.
pub const MAX_PIXELS: usize = 16_384 * 16_384;

// =============================================================================
// PARAMETERS
// =============================================================================

/// Noise sampling parameters shared by every cell of a generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Spatial frequency multiplier applied to normalised coordinates
    pub scale: f64,
    /// Number of fbm octaves (>= 1)
    pub octaves: u32,
    /// Amplitude decay per octave, conventionally in (0, 1]
    pub persistence: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            scale: 4.0,
            octaves: 6,
            persistence: 0.5,
        }
    }
}

impl SamplingParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(IslandError::invalid(format!(
                "scale must be a positive finite number, got {}",
                self.scale
            )));
        }
        validate_fbm_params(self.octaves, self.persistence)
    }
}

/// One landmass: a radial smoothstep falloff around a normalised position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IslandCenter {
    /// Normalised horizontal position in [0, 1]
    pub x: f32,
    /// Normalised vertical position in [0, 1]
    pub y: f32,
    /// Peak strength in [0, 1]
    pub influence: f32,
    /// Falloff radius in normalised units (> 0)
    pub size: f32,
}

impl IslandCenter {
    pub fn new(x: f32, y: f32, influence: f32, size: f32) -> Self {
        Self { x, y, influence, size }
    }

    /// A single full-strength island covering the canvas.
    pub fn centered() -> Self {
        Self::new(0.5, 0.5, 1.0, 1.0)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.x) || !unit.contains(&self.y) {
            return Err(IslandError::invalid(format!(
                "island center position ({}, {}) must lie in [0, 1]",
                self.x, self.y
            )));
        }
        if !unit.contains(&self.influence) {
            return Err(IslandError::invalid(format!(
                "island influence must lie in [0, 1], got {}",
                self.influence
            )));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(IslandError::invalid(format!(
                "island size must be positive, got {}",
                self.size
            )));
        }
        Ok(())
    }

    /// Falloff contributed by this island at normalised (nx, ny).
    pub fn falloff_at(&self, nx: f32, ny: f32) -> f32 {
        let dx = nx - self.x;
        let dy = ny - self.y;
        let d = (dx * dx + dy * dy).sqrt() / self.size;
        smoothstep_falloff(d) * self.influence
    }
}

/// Reject an island list that cannot shape a height field.
pub fn validate_centers(centers: &[IslandCenter]) -> Result<()> {
    if centers.is_empty() {
        return Err(IslandError::invalid("at least one island center is required"));
    }
    centers.iter().try_for_each(IslandCenter::validate)
}

/// Check canvas dimensions before any allocation.
pub fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(IslandError::invalid(format!(
            "dimensions must be positive, got {width}x{height}"
        )));
    }
    match width.checked_mul(height) {
        Some(pixels) if pixels <= MAX_PIXELS => Ok(()),
        _ => Err(IslandError::ResourceCreation(format!(
            "{width}x{height} exceeds the maximum of {MAX_PIXELS} pixels"
        ))),
    }
}

// =============================================================================
// FALLOFF
// =============================================================================

/// `1 - smoothstep(d)` inside the unit radius, 0 outside.
/// Zero slope at both d = 0 and d = 1, so the island edge leaves no seam.
pub fn smoothstep_falloff(d: f32) -> f32 {
    if d < 1.0 {
        1.0 - (3.0 * d * d - 2.0 * d * d * d)
    } else {
        0.0
    }
}

/// Strongest falloff over all islands at (nx, ny).
pub fn combined_falloff(centers: &[IslandCenter], nx: f32, ny: f32) -> f32 {
    centers
        .iter()
        .map(|c| c.falloff_at(nx, ny))
        .fold(0.0, f32::max)
}

// =============================================================================
// SYNTHESIS
// =============================================================================

/// Elevation at normalised (nx, ny). Parameters must already be validated.
///
/// With `sea_level` set, submerged cells are scaled by `0.8 + 0.2 * h` so the
/// sea floor keeps some of the noise relief instead of flattening out.
pub fn height_at<N>(
    noise: &N,
    sampling: &SamplingParams,
    centers: &[IslandCenter],
    sea_level: Option<f32>,
    nx: f64,
    ny: f64,
) -> f32
where
    N: NoiseFn<f64, 2> + ?Sized,
{
    let raw = fractal_sum(
        noise,
        nx * sampling.scale,
        ny * sampling.scale,
        sampling.octaves,
        sampling.persistence,
    );
    let h = ((raw + 1.0) * 0.5) as f32;

    let gradient = combined_falloff(centers, nx as f32, ny as f32);
    let final_height = h * gradient;

    match sea_level {
        Some(sea) if final_height < sea => final_height * (0.8 + 0.2 * h),
        _ => final_height,
    }
}

/// Build the full height field for a `width` x `height` canvas.
///
/// All parameters are checked up front; on error no cell is computed.
pub fn synthesize_heightfield<N>(
    width: usize,
    height: usize,
    noise: &N,
    sampling: &SamplingParams,
    centers: &[IslandCenter],
    sea_level: Option<f32>,
) -> Result<Tilemap<f32>>
where
    N: NoiseFn<f64, 2> + Sync + ?Sized,
{
    validate_dimensions(width, height)?;
    sampling.validate()?;
    validate_centers(centers)?;

    if sampling.persistence > 1.0 {
        warn!(persistence = sampling.persistence, "persistence above 1.0 lets fine octaves dominate");
    }
    debug!(
        width,
        height,
        scale = sampling.scale,
        octaves = sampling.octaves,
        persistence = sampling.persistence,
        islands = centers.len(),
        "synthesizing height field"
    );

    let w = width as f64;
    let h = height as f64;
    let field = Tilemap::par_from_fn(width, height, 0.0f32, |x, y| {
        height_at(noise, sampling, centers, sea_level, x as f64 / w, y as f64 / h)
    });

    Ok(field)
}
