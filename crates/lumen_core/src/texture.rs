//! Procedural surface patterns.

use lumen_math::Color;
use serde::{Deserialize, Serialize};

/// Two-color checkerboard over a fixed linear projection of world space.
///
/// A hit point is mapped to
/// `u = (x + offset_u) / span_u`, `v = (z + offset_v) / span_v`
/// and the tile indices are the truncated products with the tile counts.
/// Tiles whose indices share parity get `even`, the rest get `odd`.
///
/// The defaults fit the floor of the demo scene (x in [-15, 7],
/// z in [-100, 0]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checker {
    pub offset_u: f32,
    pub span_u: f32,
    pub offset_v: f32,
    pub span_v: f32,
    pub tiles_u: u32,
    pub tiles_v: u32,
    pub even: Color,
    pub odd: Color,
}

impl Default for Checker {
    fn default() -> Self {
        Self {
            offset_u: 15.0,
            span_u: 22.0,
            offset_v: 100.0,
            span_v: 100.0,
            tiles_u: 11,
            tiles_v: 50,
            even: Color::new(1.0, 0.0, 0.0),
            odd: Color::new(1.0, 1.0, 0.0),
        }
    }
}

impl Checker {
    /// Project a world-space point into (u, v).
    pub fn project(&self, [x, _, z]: [f32; 3]) -> (f32, f32) {
        ((x + self.offset_u) / self.span_u, (z + self.offset_v) / self.span_v)
    }

    /// Tile color at a world-space point.
    pub fn color_at(&self, point: [f32; 3]) -> Color {
        let (u, v) = self.project(point);
        // Truncates toward zero: the tiles either side of u = 0 share an index.
        let tile_u = (self.tiles_u as f32 * u) as i32;
        let tile_v = (self.tiles_v as f32 * v) as i32;

        if tile_u % 2 == tile_v % 2 {
            self.even
        } else {
            self.odd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project() {
        let checker = Checker::default();
        assert_eq!(checker.project([-15.0, 0.0, -100.0]), (0.0, 0.0));
        assert_eq!(checker.project([7.0, 3.0, 0.0]), (1.0, 1.0));
    }

    #[test]
    fn test_adjacent_tiles_alternate() {
        let checker = Checker::default();
        let tile_width = 22.0 / 11.0;

        // Start in tile (0, 0)
        let origin = [-15.0 + 0.5 * tile_width, 0.0, -99.0];
        let right = [origin[0] + tile_width, 0.0, origin[2]];
        let diagonal = [origin[0] + tile_width, 0.0, origin[2] + 2.0];

        assert_eq!(checker.color_at(origin), checker.even);
        assert_eq!(checker.color_at(right), checker.odd);
        assert_eq!(checker.color_at(diagonal), checker.even);
    }
}
