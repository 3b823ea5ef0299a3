//! Generation configuration, presets and JSON persistence

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::heightfield::{validate_centers, validate_dimensions, IslandCenter, SamplingParams};
use crate::perlin::{NoiseKind, DEFAULT_SEED};
use crate::terrain::{ColorPolicy, TerrainThresholds};

/// Island layout preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IslandPreset {
    /// One island filling the canvas
    #[default]
    Single,
    /// Two overlapping islands sharing a shoreline
    Twin,
    /// Scattered islands placed from the seed
    Archipelago,
}

impl IslandPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Single, Self::Twin, Self::Archipelago]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Single => "Single centred island",
            Self::Twin => "Two islands joined at the middle",
            Self::Archipelago => "Seeded scatter of small islands",
        }
    }

    /// Island centers for this preset. `count` only affects archipelagos.
    pub fn centers(&self, seed: u64, count: usize) -> Vec<IslandCenter> {
        match self {
            Self::Single => vec![IslandCenter::centered()],
            Self::Twin => vec![
                IslandCenter::new(0.35, 0.45, 1.0, 0.45),
                IslandCenter::new(0.65, 0.55, 0.9, 0.4),
            ],
            Self::Archipelago => archipelago_centers(seed, count.max(1)),
        }
    }
}

impl std::fmt::Display for IslandPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Twin => write!(f, "twin"),
            Self::Archipelago => write!(f, "archipelago"),
        }
    }
}

impl std::str::FromStr for IslandPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "twin" => Ok(Self::Twin),
            "archipelago" => Ok(Self::Archipelago),
            other => Err(format!("unknown preset '{other}' (expected single, twin or archipelago)")),
        }
    }
}

/// Offset keeping archipelago placement independent of the noise table.
const ARCHIPELAGO_SEED_OFFSET: u64 = 7919;

fn archipelago_centers(seed: u64, count: usize) -> Vec<IslandCenter> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(ARCHIPELAGO_SEED_OFFSET));
    (0..count)
        .map(|_| IslandCenter {
            x: rng.gen_range(0.15..0.85),
            y: rng.gen_range(0.15..0.85),
            influence: rng.gen_range(0.6..1.0),
            size: rng.gen_range(0.2..0.45),
        })
        .collect()
}

/// Everything a generation call depends on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub noise: NoiseKind,
    pub sampling: SamplingParams,
    pub thresholds: TerrainThresholds,
    pub centers: Vec<IslandCenter>,
    pub policy: ColorPolicy,
    /// Keep noise relief below sea level
    pub water_depth_variation: bool,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            seed: DEFAULT_SEED,
            noise: NoiseKind::default(),
            sampling: SamplingParams::default(),
            thresholds: TerrainThresholds::default(),
            centers: vec![IslandCenter::centered()],
            policy: ColorPolicy::default(),
            water_depth_variation: true,
        }
    }
}

impl IslandConfig {
    /// Default configuration with the centers of `preset`.
    pub fn from_preset(preset: IslandPreset, seed: u64, count: usize) -> Self {
        Self {
            seed,
            centers: preset.centers(seed, count),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)?;
        self.sampling.validate()?;
        self.thresholds.validate()?;
        validate_centers(&self.centers)
    }

    /// Sea level handed to the synthesizer when depth variation is on.
    pub fn depth_sea_level(&self) -> Option<f32> {
        self.water_depth_variation.then_some(self.thresholds.sea_level)
    }

    /// Read and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: IslandConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IslandError;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = IslandConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling.octaves, 6);
        assert_eq!(config.centers, vec![IslandCenter::centered()]);
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in IslandPreset::all() {
            let config = IslandConfig::from_preset(*preset, 42, 6);
            assert!(config.validate().is_ok(), "{preset} preset rejected");
        }
    }

    #[test]
    fn test_archipelago_is_seeded() {
        let a = IslandPreset::Archipelago.centers(5, 8);
        let b = IslandPreset::Archipelago.centers(5, 8);
        let c = IslandPreset::Archipelago.centers(6, 8);
        assert_eq!(a.len(), 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(IslandPreset::Archipelago.centers(5, 0).len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("island.json");

        let config = IslandConfig::from_preset(IslandPreset::Twin, 77, 0);
        config.save(&path).unwrap();
        let loaded = IslandConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: IslandConfig =
            serde_json::from_str(r#"{ "seed": 9, "policy": "discrete" }"#).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.policy, ColorPolicy::Discrete);
        assert_eq!(config.width, 512);
    }

    #[test]
    fn test_load_rejects_bad_thresholds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{ "thresholds": { "sea_level": 0.5, "beach_size": 0.1, "mountain_level": 0.55, "snow_level": 0.9 } }"#,
        )
        .unwrap();

        let err = IslandConfig::load(&path).unwrap_err();
        assert!(matches!(err, IslandError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_load_reports_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(IslandConfig::load(&path), Err(IslandError::ConfigFormat(_))));
    }
}
