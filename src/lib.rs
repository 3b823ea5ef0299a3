//! Procedural island generation library
//!
//! Seeded Perlin noise, fractal height fields shaped by island falloff masks,
//! and elevation-to-terrain colouring. Re-exports modules for the binaries.

pub mod ascii;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod heightfield;
pub mod icon;
pub mod perlin;
pub mod pixels;
pub mod terrain;
pub mod tilemap;

pub use config::{IslandConfig, IslandPreset};
pub use error::{IslandError, Result};
pub use generator::{generate_island, synthesize, GeneratedIsland, IslandGenerator, TerrainStats};
pub use heightfield::{IslandCenter, SamplingParams};
pub use perlin::{fbm, NoiseGenerator, NoiseKind};
pub use pixels::{Color, PixelBuffer};
pub use terrain::{ColorPolicy, TerrainCategory, TerrainThresholds};
