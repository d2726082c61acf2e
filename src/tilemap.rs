use serde::{Deserialize, Serialize};

/// A grid cell coordinate. Signed so that positions computed off-map
/// (perimeter points, offsets from the center) can be represented and rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another cell.
    pub fn distance(&self, other: TilePos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A dense 2D tilemap grid. Unlike a planet map it does not wrap: the
/// battlefield has hard edges on every side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a map from row-major data. Returns None if the length does not match.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether a signed position lies on the map.
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Bounds-checked lookup for signed positions.
    pub fn get_at(&self, pos: TilePos) -> Option<&T> {
        if self.contains(pos) {
            Some(self.get(pos.x as usize, pos.y as usize))
        } else {
            None
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Center cell, rounded down on even sizes (256 -> 128).
    pub fn center(&self) -> TilePos {
        TilePos::new((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Row-major view of the cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Build a new map by transforming every cell.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Tilemap<f32> {
    /// Smallest and largest value on the map.
    pub fn value_range(&self) -> (f32, f32) {
        let mut min_v = f32::MAX;
        let mut max_v = f32::MIN;
        for &v in &self.data {
            if v < min_v { min_v = v; }
            if v > max_v { max_v = v; }
        }
        (min_v, max_v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_do_not_wrap() {
        let map = Tilemap::new_with(4, 3, 1u8);
        assert!(map.contains(TilePos::new(3, 2)));
        assert!(!map.contains(TilePos::new(4, 0)));
        assert!(!map.contains(TilePos::new(-1, 0)));
        assert!(map.get_at(TilePos::new(0, 3)).is_none());
    }

    #[test]
    fn test_iter_is_row_major() {
        let mut map = Tilemap::new_with(3, 2, 0usize);
        map.set(2, 1, 7);
        let (x, y, v) = map.iter().last().unwrap();
        assert_eq!((x, y, *v), (2, 1, 7));
    }

    #[test]
    fn test_center_and_distance() {
        let map: Tilemap<u8> = Tilemap::new(256, 256);
        assert_eq!(map.center(), TilePos::new(128, 128));
        assert_eq!(TilePos::new(0, 0).distance(TilePos::new(3, 4)), 5.0);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Tilemap::from_vec(2, 2, vec![0u8; 3]).is_none());
        assert!(Tilemap::from_vec(2, 2, vec![0u8; 4]).is_some());
    }
}
