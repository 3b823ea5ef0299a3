use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use island_generator::ascii::{legend, render_ascii};
use island_generator::export::{export_heightfield, export_noise_preview, export_to_directory, save_png};
use island_generator::{
    ColorPolicy, IslandConfig, IslandGenerator, IslandPreset, NoiseKind, Result,
};

#[derive(Parser, Debug)]
#[command(name = "island_generator")]
#[command(about = "Generate procedural island maps from seeded Perlin noise")]
struct Args {
    /// Base configuration (JSON); flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the map in pixels
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the map in pixels
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Noise seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pick a random seed (ignored when --seed is given)
    #[arg(long)]
    random_seed: bool,

    /// Island layout: single, twin or archipelago
    #[arg(short, long)]
    preset: Option<IslandPreset>,

    /// Number of islands for the archipelago preset
    #[arg(long, default_value = "5")]
    islands: usize,

    /// Noise source: permutation or hash
    #[arg(long)]
    noise: Option<NoiseKind>,

    /// Spatial frequency of the noise
    #[arg(long)]
    scale: Option<f64>,

    /// Number of fbm octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Amplitude decay per octave
    #[arg(long)]
    persistence: Option<f64>,

    #[arg(long)]
    sea_level: Option<f32>,

    #[arg(long)]
    beach_size: Option<f32>,

    #[arg(long)]
    mountain_level: Option<f32>,

    #[arg(long)]
    snow_level: Option<f32>,

    /// Colouring: discrete or continuous
    #[arg(long)]
    policy: Option<ColorPolicy>,

    /// Flatten everything below sea level to the plain island height
    #[arg(long)]
    no_depth_variation: bool,

    /// Output PNG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export into this directory as island_seed<seed>_<timestamp>.png
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Also export the height field as grayscale PNG
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Also export the raw fbm noise as grayscale PNG
    #[arg(long)]
    noise_preview: Option<PathBuf>,

    /// Write the effective configuration as JSON
    #[arg(long)]
    dump_config: Option<PathBuf>,

    /// Print an ASCII preview to the terminal
    #[arg(long)]
    ascii: bool,

    /// Columns of the ASCII preview
    #[arg(long, default_value = "80")]
    ascii_width: usize,
}

/// Merge the config file, preset and individual flags.
fn build_config(args: &Args) -> Result<IslandConfig> {
    let mut config = match &args.config {
        Some(path) => IslandConfig::load(path)?,
        None => IslandConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    } else if args.random_seed {
        config.seed = rand::random();
    }
    if let Some(preset) = args.preset {
        println!("Preset: {}", preset.description());
        config.centers = preset.centers(config.seed, args.islands);
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(noise) = args.noise {
        config.noise = noise;
    }
    if let Some(scale) = args.scale {
        config.sampling.scale = scale;
    }
    if let Some(octaves) = args.octaves {
        config.sampling.octaves = octaves;
    }
    if let Some(persistence) = args.persistence {
        config.sampling.persistence = persistence;
    }
    if let Some(v) = args.sea_level {
        config.thresholds.sea_level = v;
    }
    if let Some(v) = args.beach_size {
        config.thresholds.beach_size = v;
    }
    if let Some(v) = args.mountain_level {
        config.thresholds.mountain_level = v;
    }
    if let Some(v) = args.snow_level {
        config.thresholds.snow_level = v;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if args.no_depth_variation {
        config.water_depth_variation = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    println!("Generating island with seed: {}", config.seed);
    println!("Map size: {}x{}", config.width, config.height);
    println!(
        "Noise: {} (scale {}, {} octaves, persistence {})",
        config.noise, config.sampling.scale, config.sampling.octaves, config.sampling.persistence
    );
    println!("Islands: {}", config.centers.len());

    if let Some(path) = &args.dump_config {
        config.save(path)?;
        println!("Configuration written to {}", path.display());
    }

    let generator = IslandGenerator::new(config)?;
    let island = generator.generate()?;
    print!("{}", island.stats);

    // The generated island is kept even if one of the exports below fails.
    let mut export_failed = false;

    let output = match (&args.output, &args.export_dir) {
        (None, None) => Some(PathBuf::from("island.png")),
        (out, _) => out.clone(),
    };
    if let Some(path) = output {
        match save_png(&island.pixels, &path) {
            Ok(()) => println!("Island exported to {}", path.display()),
            Err(e) => {
                error!("Failed to export island: {}", e);
                export_failed = true;
            }
        }
    }
    if let Some(dir) = &args.export_dir {
        match export_to_directory(&island.pixels, dir, generator.config().seed) {
            Ok(path) => println!("Island exported to {}", path.display()),
            Err(e) => {
                error!("Failed to export island: {}", e);
                export_failed = true;
            }
        }
    }
    if let Some(path) = &args.heightmap {
        if let Err(e) = export_heightfield(&island.heightfield, path) {
            error!("Failed to export height field: {}", e);
            export_failed = true;
        }
    }
    if let Some(path) = &args.noise_preview {
        let config = generator.config();
        if let Err(e) = export_noise_preview(generator.noise(), config.width, config.height, &config.sampling, path) {
            error!("Failed to export noise preview: {}", e);
            export_failed = true;
        }
    }

    if args.ascii {
        println!();
        print!("{}", render_ascii(&island.categories, args.ascii_width));
        println!("{}", legend());
    }

    if export_failed {
        return Err(std::io::Error::other("one or more exports failed").into());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if e.is_configuration() {
                eprintln!("Run with --help to see the accepted options.");
            }
            ExitCode::FAILURE
        }
    }
}
