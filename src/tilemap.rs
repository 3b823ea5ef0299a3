use rayon::prelude::*;

/// A 2D row-major grid. Unlike a planet map the island canvas does not wrap,
/// so out-of-range coordinates are a caller bug and panic on access.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn checked_index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        match self.checked_index(x, y) {
            Some(idx) => idx,
            None => panic!("({x}, {y}) outside {}x{} tilemap", self.width, self.height),
        }
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    /// Like [`Tilemap::get`] but `None` outside the grid.
    pub fn try_get(&self, x: usize, y: usize) -> Option<&T> {
        self.checked_index(x, y).map(|idx| &self.data[idx])
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            (idx % width, idx / width, val)
        })
    }

    /// Raw row-major cell slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

}

impl<T: Clone + Send + Sync> Tilemap<T> {
    /// Build a map by evaluating `f(x, y)` for every cell.
    ///
    /// Rows are filled in parallel; each cell is computed exactly once and
    /// written to its own slot, so the result does not depend on scheduling.
    pub fn par_from_fn<F>(width: usize, height: usize, fill: T, f: F) -> Self
    where
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        let mut data = vec![fill; width * height];
        if width > 0 {
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, cell) in row.iter_mut().enumerate() {
                        *cell = f(x, y);
                    }
                });
        }
        Self { width, height, data }
    }

    /// Parallel cell-wise transform.
    pub fn par_map<U, F>(&self, f: F) -> Tilemap<U>
    where
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.par_iter().map(f).collect(),
        }
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum cell value, or `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
        Some((min_h, max_h))
    }
}
