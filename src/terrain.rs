//! Elevation classification and terrain colouring.

use serde::{Deserialize, Serialize};

use crate::error::{IslandError, Result};
use crate::pixels::Color;
use image::Rgb;

/// Terrain bands, ordered from lowest to highest elevation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TerrainCategory {
    DeepWater,
    ShallowWater,
    Beach,
    Grass,
    Forest,
    Mountain,
    Snow,
}

impl TerrainCategory {
    pub fn all() -> &'static [TerrainCategory] {
        &[
            TerrainCategory::DeepWater,
            TerrainCategory::ShallowWater,
            TerrainCategory::Beach,
            TerrainCategory::Grass,
            TerrainCategory::Forest,
            TerrainCategory::Mountain,
            TerrainCategory::Snow,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TerrainCategory::DeepWater => "Deep Water",
            TerrainCategory::ShallowWater => "Shallow Water",
            TerrainCategory::Beach => "Beach",
            TerrainCategory::Grass => "Grass",
            TerrainCategory::Forest => "Forest",
            TerrainCategory::Mountain => "Mountain",
            TerrainCategory::Snow => "Snow",
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, TerrainCategory::DeepWater | TerrainCategory::ShallowWater)
    }

    /// At or above sea level (beach included).
    pub fn is_land(&self) -> bool {
        !self.is_water()
    }

    /// Flat display colour for this band.
    pub fn color(&self) -> Color {
        match self {
            TerrainCategory::DeepWater => Rgb([0, 0, 150]),
            TerrainCategory::ShallowWater => Rgb([0, 0, 255]),
            TerrainCategory::Beach => Rgb([255, 255, 150]),
            TerrainCategory::Grass => GRASS_COLOR,
            TerrainCategory::Forest => FOREST_COLOR,
            TerrainCategory::Mountain => Rgb([120, 120, 120]),
            TerrainCategory::Snow => Rgb([255, 255, 255]),
        }
    }
}

impl std::fmt::Display for TerrainCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

const GRASS_COLOR: Color = Rgb([50, 180, 50]);
const FOREST_COLOR: Color = Rgb([0, 100, 0]);

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Elevation cutoffs between terrain bands.
///
/// Must satisfy `sea - beach < sea < sea + beach < mountain < snow`;
/// use [`TerrainThresholds::new`] or [`TerrainThresholds::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainThresholds {
    pub sea_level: f32,
    pub beach_size: f32,
    pub mountain_level: f32,
    pub snow_level: f32,
}

impl Default for TerrainThresholds {
    fn default() -> Self {
        Self {
            sea_level: 0.4,
            beach_size: 0.05,
            mountain_level: 0.7,
            snow_level: 0.85,
        }
    }
}

impl TerrainThresholds {
    pub fn new(sea_level: f32, beach_size: f32, mountain_level: f32, snow_level: f32) -> Result<Self> {
        let thresholds = Self {
            sea_level,
            beach_size,
            mountain_level,
            snow_level,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let values = [self.sea_level, self.beach_size, self.mountain_level, self.snow_level];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(IslandError::invalid(format!("thresholds must be finite: {:?}", self)));
        }
        if self.beach_size <= 0.0 {
            return Err(IslandError::invalid(format!(
                "beach size must be positive, got {}",
                self.beach_size
            )));
        }
        if self.mountain_level <= self.beach_top() {
            return Err(IslandError::invalid(format!(
                "mountain level {} must be above sea level + beach size ({})",
                self.mountain_level,
                self.beach_top()
            )));
        }
        if self.snow_level <= self.mountain_level {
            return Err(IslandError::invalid(format!(
                "snow level {} must be above mountain level {}",
                self.snow_level, self.mountain_level
            )));
        }
        Ok(())
    }

    /// Upper bound of deep water.
    pub fn deep_water_limit(&self) -> f32 {
        self.sea_level - self.beach_size
    }

    /// Upper bound of the beach band.
    pub fn beach_top(&self) -> f32 {
        self.sea_level + self.beach_size
    }

    /// Grass below, forest above.
    pub fn forest_split(&self) -> f32 {
        (self.beach_top() + self.mountain_level) * 0.5
    }

    pub fn classify(&self, height: f32) -> TerrainCategory {
        if height < self.deep_water_limit() {
            TerrainCategory::DeepWater
        } else if height < self.sea_level {
            TerrainCategory::ShallowWater
        } else if height < self.beach_top() {
            TerrainCategory::Beach
        } else if height < self.mountain_level {
            if height < self.forest_split() {
                TerrainCategory::Grass
            } else {
                TerrainCategory::Forest
            }
        } else if height < self.snow_level {
            TerrainCategory::Mountain
        } else {
            TerrainCategory::Snow
        }
    }
}

// =============================================================================
// COLOUR POLICIES
// =============================================================================

/// How elevation turns into a pixel colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPolicy {
    /// One flat colour per band
    Discrete,
    /// Flat bands, except grass fades into forest across the vegetation band
    #[default]
    Continuous,
}

impl ColorPolicy {
    pub fn all() -> &'static [Self] {
        &[Self::Discrete, Self::Continuous]
    }
}

impl std::fmt::Display for ColorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discrete => write!(f, "discrete"),
            Self::Continuous => write!(f, "continuous"),
        }
    }
}

impl std::str::FromStr for ColorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "discrete" => Ok(Self::Discrete),
            "continuous" => Ok(Self::Continuous),
            other => Err(format!("unknown color policy '{other}' (expected discrete or continuous)")),
        }
    }
}

pub(crate) fn blend_colors(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |ca: u8, cb: u8| (ca as f32 + (cb as f32 - ca as f32) * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

/// Colour for `height` under `policy`. Thresholds are assumed validated.
pub fn terrain_color(height: f32, thresholds: &TerrainThresholds, policy: ColorPolicy) -> Color {
    let category = thresholds.classify(height);
    match (policy, category) {
        (ColorPolicy::Continuous, TerrainCategory::Grass | TerrainCategory::Forest) => {
            let band_start = thresholds.beach_top();
            let band_width = thresholds.mountain_level - band_start;
            blend_colors(GRASS_COLOR, FOREST_COLOR, (height - band_start) / band_width)
        }
        _ => category.color(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_ordering_enforced() {
        assert!(TerrainThresholds::new(0.4, 0.05, 0.7, 0.85).is_ok());

        // mountain <= sea + beach
        let err = TerrainThresholds::new(0.5, 0.1, 0.6, 0.9);
        assert!(matches!(err, Err(IslandError::InvalidConfiguration(_))));
        let err = TerrainThresholds::new(0.5, 0.1, 0.55, 0.9);
        assert!(matches!(err, Err(IslandError::InvalidConfiguration(_))));

        // snow <= mountain
        assert!(TerrainThresholds::new(0.4, 0.05, 0.7, 0.7).is_err());
        // zero-width beach collapses the shallow band
        assert!(TerrainThresholds::new(0.4, 0.0, 0.7, 0.85).is_err());
        assert!(TerrainThresholds::new(f32::NAN, 0.05, 0.7, 0.85).is_err());
    }

    #[test]
    fn test_classify_bands() {
        let t = TerrainThresholds::default();
        assert_eq!(t.classify(0.0), TerrainCategory::DeepWater);
        assert_eq!(t.classify(0.36), TerrainCategory::ShallowWater);
        assert_eq!(t.classify(0.4), TerrainCategory::Beach);
        assert_eq!(t.classify(0.46), TerrainCategory::Grass);
        // split between 0.45 and 0.7 sits at 0.575
        assert_eq!(t.classify(0.57), TerrainCategory::Grass);
        assert_eq!(t.classify(0.58), TerrainCategory::Forest);
        assert_eq!(t.classify(0.75), TerrainCategory::Mountain);
        assert_eq!(t.classify(0.85), TerrainCategory::Snow);
        assert_eq!(t.classify(1.0), TerrainCategory::Snow);
    }

    #[test]
    fn test_classification_is_monotonic() {
        let t = TerrainThresholds::default();
        let mut prev = t.classify(0.0);
        for i in 1..=1000 {
            let c = t.classify(i as f32 / 1000.0);
            assert!(c >= prev);
            prev = c;
        }
    }

    #[test]
    fn test_discrete_policy_uses_flat_colors() {
        let t = TerrainThresholds::default();
        for &h in &[0.1, 0.38, 0.42, 0.5, 0.6, 0.8, 0.9] {
            assert_eq!(terrain_color(h, &t, ColorPolicy::Discrete), t.classify(h).color());
        }
    }

    #[test]
    fn test_continuous_policy_blends_vegetation() {
        let t = TerrainThresholds::default();
        let start = t.beach_top();
        let mid = (start + t.mountain_level) * 0.5;

        assert_eq!(terrain_color(start, &t, ColorPolicy::Continuous), GRASS_COLOR);
        assert_eq!(terrain_color(mid, &t, ColorPolicy::Continuous), Rgb([25, 140, 25]));

        // Outside the vegetation band both policies agree
        for &h in &[0.1, 0.38, 0.42, 0.8, 0.9] {
            assert_eq!(
                terrain_color(h, &t, ColorPolicy::Continuous),
                terrain_color(h, &t, ColorPolicy::Discrete)
            );
        }
    }

    #[test]
    fn test_land_and_water() {
        assert!(TerrainCategory::DeepWater.is_water());
        assert!(TerrainCategory::ShallowWater.is_water());
        assert!(TerrainCategory::Beach.is_land());
        assert!(TerrainCategory::Snow.is_land());
        assert_eq!(TerrainCategory::all().iter().filter(|c| c.is_land()).count(), 5);
    }
}
