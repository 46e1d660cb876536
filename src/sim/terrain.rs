//! Destructible terrain
//!
//! The coverage grid is the single collision authority. Physics only ever
//! sees it through `is_solid`, `surface_normal` and `carve`.

use glam::Vec2;
use thiserror::Error;

use crate::consts::{FLOOR_MARGIN, SOLID_THRESHOLD};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerrainError {
    #[error("terrain dimensions must be non-zero (got {width}x{height})")]
    EmptyWorld { width: u32, height: u32 },
    #[error("coverage buffer has {actual} cells, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Per-cell opacity mask, 0 = empty sky, 255 = fully solid
#[derive(Debug, Clone)]
pub struct TerrainField {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl TerrainField {
    /// All-empty world
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// Build a world by asking `solid` about every integer cell
    pub fn from_fn(width: u32, height: u32, mut solid: impl FnMut(u32, u32) -> bool) -> Self {
        let mut field = Self::empty(width, height);
        for y in 0..height {
            for x in 0..width {
                if solid(x, y) {
                    field.coverage[(y * width + x) as usize] = u8::MAX;
                }
            }
        }
        field
    }

    /// Wrap a row-major alpha mask produced by a terrain generator
    pub fn from_coverage(width: u32, height: u32, coverage: Vec<u8>) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyWorld { width, height });
        }
        let expected = width as usize * height as usize;
        if coverage.len() != expected {
            return Err(TerrainError::SizeMismatch {
                expected,
                actual: coverage.len(),
            });
        }
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The water line; anything below it is out of the world
    #[inline]
    pub fn floor_line(&self) -> f32 {
        self.height as f32 - FLOOR_MARGIN
    }

    /// Raw coverage, row-major (for renderers)
    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Is the cell containing (x, y) solid? Out-of-bounds is always empty.
    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        if !(x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32) {
            return false;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.coverage[idx] > SOLID_THRESHOLD
    }

    #[inline]
    pub fn is_solid_at(&self, p: Vec2) -> bool {
        self.is_solid(p.x, p.y)
    }

    /// Approximate outward surface normal at (x, y)
    ///
    /// Sums the offsets of every solid cell in the square neighborhood,
    /// negated so the result points away from the material. Falls back to
    /// straight up when the neighborhood is fully open or perfectly balanced.
    pub fn surface_normal(&self, x: f32, y: f32, radius: i32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if self.is_solid(x + dx as f32, y + dy as f32) {
                    sum -= Vec2::new(dx as f32, dy as f32);
                }
            }
        }
        if sum.length_squared() == 0.0 {
            return Vec2::NEG_Y;
        }
        sum.normalize()
    }

    /// Clear a filled disc of the given radius
    pub fn carve(&mut self, cx: f32, cy: f32, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + radius).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            // Sample at the cell center
            let dy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.coverage[row + x as usize] = 0;
                }
            }
        }
    }

    /// Number of solid cells
    pub fn solid_count(&self) -> usize {
        self.coverage.iter().filter(|&&c| c > SOLID_THRESHOLD).count()
    }
}

/// Find a resting spot for a worm near `preferred_x`
///
/// Scans down from `start_y` for the first solid cell with ~20 units of
/// clear air above it, sliding right in steps of 20 when a column has none.
pub fn find_safe_spawn(terrain: &TerrainField, preferred_x: f32, start_y: f32) -> Vec2 {
    let width = terrain.width() as f32;
    let height = terrain.height() as f32;

    let mut x = preferred_x;
    loop {
        let mut y = start_y;
        while y < height - 20.0 {
            if terrain.is_solid(x, y) {
                let mut clear = true;
                let mut check_y = y - 1.0;
                while check_y > y - 20.0 {
                    if terrain.is_solid(x, check_y) {
                        clear = false;
                        break;
                    }
                    check_y -= 2.0;
                }
                if clear {
                    return Vec2::new(x, y - 2.0);
                }
            }
            y += 4.0;
        }
        if x >= width - 50.0 {
            return Vec2::new(x, 100.0);
        }
        x += 20.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat(ground_y: u32) -> TerrainField {
        TerrainField::from_fn(200, 100, |_, y| y >= ground_y)
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let t = TerrainField::from_fn(10, 10, |_, _| true);
        assert!(t.is_solid(0.0, 0.0));
        assert!(!t.is_solid(-0.5, 3.0));
        assert!(!t.is_solid(3.0, 10.0));
        assert!(!t.is_solid(10.0, 3.0));
        assert!(!t.is_solid(f32::NAN, 3.0));
    }

    #[test]
    fn test_threshold() {
        let t = TerrainField::from_coverage(3, 1, vec![128, 129, 255]).unwrap();
        assert!(!t.is_solid(0.5, 0.5));
        assert!(t.is_solid(1.5, 0.5));
        assert!(t.is_solid(2.0, 0.0));
    }

    #[test]
    fn test_from_coverage_size_mismatch() {
        assert_eq!(
            TerrainField::from_coverage(4, 4, vec![0; 15]).unwrap_err(),
            TerrainError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(matches!(
            TerrainField::from_coverage(0, 4, vec![]),
            Err(TerrainError::EmptyWorld { .. })
        ));
    }

    #[test]
    fn test_normal_on_flat_ground_points_up() {
        let t = flat(50);
        let n = t.surface_normal(100.0, 50.0, 2);
        assert!(n.x.abs() < 1e-5);
        assert!((n.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normal_on_wall_points_away() {
        // Solid to the right of x = 100
        let t = TerrainField::from_fn(200, 100, |x, _| x >= 100);
        let n = t.surface_normal(100.0, 50.0, 2);
        assert!(n.x < -0.99);
    }

    #[test]
    fn test_normal_degenerate_defaults_up() {
        let open = TerrainField::empty(50, 50);
        assert_eq!(open.surface_normal(25.0, 25.0, 2), Vec2::NEG_Y);

        let buried = TerrainField::from_fn(50, 50, |_, _| true);
        assert_eq!(buried.surface_normal(25.0, 25.0, 2), Vec2::NEG_Y);
    }

    #[test]
    fn test_carve_clears_disc() {
        let mut t = flat(0);
        t.carve(100.0, 50.0, 10.0);
        assert!(!t.is_solid(100.0, 50.0));
        assert!(!t.is_solid(107.0, 50.0));
        assert!(t.is_solid(112.0, 50.0));
        assert!(t.is_solid(100.0, 62.0));
    }

    #[test]
    fn test_carve_idempotent() {
        let mut t = flat(40);
        t.carve(60.0, 45.0, 12.0);
        let once = t.coverage().to_vec();
        t.carve(60.0, 45.0, 12.0);
        assert_eq!(t.coverage(), &once[..]);
    }

    #[test]
    fn test_carve_off_map_is_harmless() {
        let mut t = flat(40);
        let before = t.solid_count();
        t.carve(-500.0, -500.0, 30.0);
        t.carve(10_000.0, 50.0, 30.0);
        assert_eq!(t.solid_count(), before);
    }

    #[test]
    fn test_spawn_lands_on_surface() {
        let t = TerrainField::from_fn(400, 200, |_, y| y >= 148);
        let p = find_safe_spawn(&t, 100.0, 0.0);
        assert_eq!(p, Vec2::new(100.0, 146.0));
        assert!(!t.is_solid_at(p));
    }

    #[test]
    fn test_spawn_skips_columns_without_ground() {
        // Ground only from x = 140 onward
        let t = TerrainField::from_fn(400, 200, |x, y| x >= 140 && y >= 150);
        let p = find_safe_spawn(&t, 100.0, 0.0);
        assert_eq!(p.x, 140.0);
    }

    #[test]
    fn test_spawn_fallback() {
        let t = TerrainField::empty(400, 200);
        assert_eq!(find_safe_spawn(&t, 100.0, 0.0), Vec2::new(360.0, 100.0));
    }

    proptest! {
        #[test]
        fn prop_carving_never_adds_solid(
            carves in prop::collection::vec((-20.0f32..220.0, -20.0f32..120.0, 0.0f32..40.0), 1..12)
        ) {
            let mut t = TerrainField::from_fn(200, 100, |x, y| (x * 7 + y * 3) % 5 != 0);
            let mut last = t.solid_count();
            for (cx, cy, r) in carves {
                let before = t.coverage().to_vec();
                t.carve(cx, cy, r);
                let now = t.solid_count();
                prop_assert!(now <= last);
                for (b, a) in before.iter().zip(t.coverage()) {
                    prop_assert!(*a <= *b);
                }
                last = now;
            }
        }
    }
}
