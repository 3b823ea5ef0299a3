//! ASCII rendering of classified islands for terminal inspection.

use crate::terrain::TerrainCategory;
use crate::tilemap::Tilemap;

/// Get ASCII character for a terrain band
pub fn category_char(category: TerrainCategory) -> char {
    match category {
        TerrainCategory::DeepWater => '~',
        TerrainCategory::ShallowWater => '-',
        TerrainCategory::Beach => '.',
        TerrainCategory::Grass => ',',
        TerrainCategory::Forest => '"',
        TerrainCategory::Mountain => '^',
        TerrainCategory::Snow => '*',
    }
}

/// Down-sample a category grid to `cols` characters per line.
///
/// Terminal cells are roughly twice as tall as wide, so rows are halved to
/// keep the island's proportions.
pub fn render_ascii(categories: &Tilemap<TerrainCategory>, cols: usize) -> String {
    if categories.width == 0 || categories.height == 0 || cols == 0 {
        return String::new();
    }
    let cols = cols.min(categories.width);
    let rows = ((categories.height * cols) / (categories.width * 2)).max(1);

    let mut out = String::with_capacity((cols + 1) * rows);
    for row in 0..rows {
        // Sample the middle of each character cell
        let y = ((2 * row + 1) * categories.height) / (2 * rows);
        for col in 0..cols {
            let x = ((2 * col + 1) * categories.width) / (2 * cols);
            out.push(category_char(*categories.get(x, y)));
        }
        out.push('\n');
    }
    out
}

/// Legend lines matching [`category_char`].
pub fn legend() -> String {
    TerrainCategory::all()
        .iter()
        .map(|&c| format!("  {} = {}", category_char(c), c.name()))
        .collect::<Vec<_>>()
        .join("\n")
}
