//! End-to-end island generation: height field, classification, colour.
//!
//! Generation is a pure function of its inputs. Nothing here keeps state
//! between calls, so repeating a call with the same arguments reproduces the
//! same buffers bit for bit.

use std::time::Instant;

use noise::NoiseFn;
use tracing::{debug, info};

use crate::config::IslandConfig;
use crate::error::Result;
use crate::heightfield::{synthesize_heightfield, validate_centers, validate_dimensions, IslandCenter, SamplingParams};
use crate::perlin::NoiseSource;
use crate::pixels::PixelBuffer;
use crate::terrain::{terrain_color, ColorPolicy, TerrainCategory, TerrainThresholds};
use crate::tilemap::Tilemap;

/// Output of one generation pass.
#[derive(Clone, Debug)]
pub struct GeneratedIsland {
    pub heightfield: Tilemap<f32>,
    pub categories: Tilemap<TerrainCategory>,
    pub pixels: PixelBuffer,
    pub stats: TerrainStats,
}

/// Per-category pixel counts and elevation range.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainStats {
    counts: [usize; 7],
    pub total: usize,
    pub min_height: f32,
    pub max_height: f32,
}

impl TerrainStats {
    pub fn compute(heightfield: &Tilemap<f32>, categories: &Tilemap<TerrainCategory>) -> Self {
        let mut counts = [0usize; 7];
        for &category in categories.as_slice() {
            counts[category as usize] += 1;
        }
        let (min_height, max_height) = heightfield.min_max().unwrap_or((0.0, 0.0));
        Self {
            counts,
            total: categories.as_slice().len(),
            min_height,
            max_height,
        }
    }

    pub fn count(&self, category: TerrainCategory) -> usize {
        self.counts[category as usize]
    }

    pub fn land_count(&self) -> usize {
        TerrainCategory::all()
            .iter()
            .filter(|c| c.is_land())
            .map(|&c| self.count(c))
            .sum()
    }

    /// Share of pixels at or above sea level, in [0, 1].
    pub fn land_fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.land_count() as f64 / self.total as f64
    }
}

impl std::fmt::Display for TerrainStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Height range: {:.3} to {:.3} ({:.1}% land)",
            self.min_height,
            self.max_height,
            100.0 * self.land_fraction()
        )?;
        for &category in TerrainCategory::all() {
            let n = self.count(category);
            let pct = if self.total == 0 { 0.0 } else { 100.0 * n as f64 / self.total as f64 };
            writeln!(f, "  {:<14} {:>8} ({:>5.1}%)", category.name(), n, pct)?;
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn run<N>(
    width: usize,
    height: usize,
    noise: &N,
    sampling: &SamplingParams,
    centers: &[IslandCenter],
    thresholds: &TerrainThresholds,
    policy: ColorPolicy,
    depth_sea_level: Option<f32>,
) -> Result<GeneratedIsland>
where
    N: NoiseFn<f64, 2> + Sync + ?Sized,
{
    // Fail before touching a single pixel.
    validate_dimensions(width, height)?;
    sampling.validate()?;
    validate_centers(centers)?;
    thresholds.validate()?;

    let started = Instant::now();
    let heightfield = synthesize_heightfield(width, height, noise, sampling, centers, depth_sea_level)?;
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "height field ready");

    let categories = heightfield.par_map(|&h| thresholds.classify(h));
    let pixels = PixelBuffer::from_tilemap(heightfield.par_map(|&h| terrain_color(h, thresholds, policy)));
    let stats = TerrainStats::compute(&heightfield, &categories);

    info!(
        width,
        height,
        %policy,
        land_pct = 100.0 * stats.land_fraction(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "island generated"
    );

    Ok(GeneratedIsland {
        heightfield,
        categories,
        pixels,
        stats,
    })
}

/// Generate the colour buffer for an island.
///
/// Water depth variation is applied below `thresholds.sea_level`.
/// Any invalid argument is reported before generation starts.
pub fn synthesize<N>(
    width: usize,
    height: usize,
    noise: &N,
    sampling: &SamplingParams,
    centers: &[IslandCenter],
    thresholds: &TerrainThresholds,
    policy: ColorPolicy,
) -> Result<PixelBuffer>
where
    N: NoiseFn<f64, 2> + Sync + ?Sized,
{
    run(width, height, noise, sampling, centers, thresholds, policy, Some(thresholds.sea_level))
        .map(|island| island.pixels)
}

/// Like [`synthesize`] but also returns the height field, categories and stats.
pub fn generate_island<N>(noise: &N, config: &IslandConfig) -> Result<GeneratedIsland>
where
    N: NoiseFn<f64, 2> + Sync + ?Sized,
{
    run(
        config.width,
        config.height,
        noise,
        &config.sampling,
        &config.centers,
        &config.thresholds,
        config.policy,
        config.depth_sea_level(),
    )
}

/// Holds a validated configuration and the noise source built from its seed.
///
/// Configuration can only change through `&mut self`, so it cannot move
/// under a generation pass that borrows the generator.
#[derive(Clone, Debug)]
pub struct IslandGenerator {
    config: IslandConfig,
    noise: NoiseSource,
}

impl IslandGenerator {
    pub fn new(config: IslandConfig) -> Result<Self> {
        config.validate()?;
        let noise = config.noise.build(config.seed);
        Ok(Self { config, noise })
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    pub fn noise(&self) -> &NoiseSource {
        &self.noise
    }

    /// Rebuild the noise source for a new seed.
    pub fn reseed(&mut self, seed: u64) {
        debug!(seed, "reseeding");
        self.config.seed = seed;
        self.noise = self.config.noise.build(seed);
    }

    pub fn set_thresholds(&mut self, thresholds: TerrainThresholds) -> Result<()> {
        thresholds.validate()?;
        self.config.thresholds = thresholds;
        Ok(())
    }

    pub fn set_sampling(&mut self, sampling: SamplingParams) -> Result<()> {
        sampling.validate()?;
        self.config.sampling = sampling;
        Ok(())
    }

    pub fn set_centers(&mut self, centers: Vec<IslandCenter>) -> Result<()> {
        validate_centers(&centers)?;
        self.config.centers = centers;
        Ok(())
    }

    pub fn set_policy(&mut self, policy: ColorPolicy) {
        self.config.policy = policy;
    }

    pub fn generate(&self) -> Result<GeneratedIsland> {
        generate_island(&self.noise, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IslandError;
    use crate::perlin::NoiseGenerator;

    fn scenario() -> (NoiseGenerator, SamplingParams, Vec<IslandCenter>, TerrainThresholds) {
        (
            NoiseGenerator::new(1),
            SamplingParams { scale: 4.0, octaves: 6, persistence: 0.5 },
            vec![IslandCenter::new(0.5, 0.5, 1.0, 1.0)],
            TerrainThresholds::new(0.5, 0.03, 0.61, 0.70).unwrap(),
        )
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (noise, sampling, centers, thresholds) = scenario();
        let config = IslandConfig {
            width: 64,
            height: 64,
            seed: 1,
            sampling,
            thresholds,
            centers,
            policy: ColorPolicy::Discrete,
            ..IslandConfig::default()
        };
        let island = generate_island(&noise, &config).unwrap();

        // The centre samples fbm only on lattice points, so its elevation is
        // exactly 0.5: at sea level, which lands in the beach band.
        let center = *island.categories.get(32, 32);
        assert_eq!(center, TerrainCategory::Beach);
        assert!(center.is_land());
        assert_eq!(*island.heightfield.get(32, 32), 0.5);

        for &(x, y) in &[(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert_eq!(*island.categories.get(x, y), TerrainCategory::DeepWater);
            assert_eq!(island.pixels.at(x, y), TerrainCategory::DeepWater.color());
        }
    }

    #[test]
    fn test_high_persistence_warns_once_per_generation() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct WarnCounter(Arc<AtomicUsize>);

        impl<S: Subscriber> Layer<S> for WarnCounter {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let (noise, _, centers, thresholds) = scenario();
        let sampling = SamplingParams { scale: 4.0, octaves: 3, persistence: 1.5 };

        let result = tracing::subscriber::with_default(subscriber, || {
            synthesize(16, 16, &noise, &sampling, &centers, &thresholds, ColorPolicy::Discrete)
        });
        assert!(result.is_ok());
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_thresholds_center_is_grass() {
        let noise = NoiseGenerator::new(1);
        let config = IslandConfig {
            width: 64,
            height: 64,
            policy: ColorPolicy::Discrete,
            ..IslandConfig::default()
        };
        let island = generate_island(&noise, &config).unwrap();
        assert_eq!(*island.categories.get(32, 32), TerrainCategory::Grass);
        assert_eq!(island.pixels.at(32, 32), TerrainCategory::Grass.color());
    }

    #[test]
    fn test_resynthesis_is_identical() {
        let (noise, sampling, centers, thresholds) = scenario();
        for &policy in ColorPolicy::all() {
            let a = synthesize(40, 30, &noise, &sampling, &centers, &thresholds, policy).unwrap();
            let b = synthesize(40, 30, &noise, &sampling, &centers, &thresholds, policy).unwrap();
            assert_eq!(a, b);

            let fresh = NoiseGenerator::new(1);
            let c = synthesize(40, 30, &fresh, &sampling, &centers, &thresholds, policy).unwrap();
            assert_eq!(a, c);
        }
    }

    #[test]
    fn test_invalid_thresholds_fail_fast() {
        let (noise, sampling, centers, _) = scenario();
        let bad = TerrainThresholds {
            sea_level: 0.5,
            beach_size: 0.1,
            mountain_level: 0.6,
            snow_level: 0.9,
        };
        let result = synthesize(16, 16, &noise, &sampling, &centers, &bad, ColorPolicy::Discrete);
        assert!(matches!(result, Err(IslandError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_stats_account_for_every_pixel() {
        let generator = IslandGenerator::new(IslandConfig {
            width: 50,
            height: 40,
            ..IslandConfig::default()
        })
        .unwrap();
        let island = generator.generate().unwrap();

        let sum: usize = TerrainCategory::all().iter().map(|&c| island.stats.count(c)).sum();
        assert_eq!(sum, 50 * 40);
        assert_eq!(island.stats.total, 50 * 40);
        assert!(island.stats.land_fraction() > 0.0 && island.stats.land_fraction() < 1.0);
        assert!(island.stats.min_height >= 0.0 && island.stats.max_height <= 1.0);
    }

    #[test]
    fn test_generator_setters_validate() {
        let mut generator = IslandGenerator::new(IslandConfig::default()).unwrap();
        assert!(generator.set_centers(Vec::new()).is_err());
        assert!(generator
            .set_thresholds(TerrainThresholds { snow_level: 0.1, ..TerrainThresholds::default() })
            .is_err());
        assert!(generator.set_sampling(SamplingParams { octaves: 0, ..SamplingParams::default() }).is_err());
        // Rejected updates leave the configuration alone
        assert_eq!(generator.config(), &IslandConfig::default());

        generator.reseed(5);
        assert_eq!(generator.config().seed, 5);
        assert_eq!(generator.noise(), &NoiseSource::Permutation(NoiseGenerator::new(5)));
    }
}
