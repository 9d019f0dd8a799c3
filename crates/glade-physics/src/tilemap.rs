use glam::Vec2;

use crate::grid::Aabb;

/// Errors constructing tile solidity data.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TileSolidityError {
    #[error("solidity grid has {actual} cells, expected {width} x {height} = {expected}")]
    SizeMismatch {
        width: i32,
        height: i32,
        expected: usize,
        actual: usize,
    },

    #[error("tile grid dimensions must be positive, got {width} x {height}")]
    NonPositiveDimensions { width: i32, height: i32 },
}

/// Row-major boolean solidity grid for static tile geometry, stored as a
/// world resource and consumed by the collision system.
///
/// One cell is exactly one world unit. `origin` is the world position of the
/// grid's top-left corner, so cell `(row, col)` occupies the world box
/// `[origin.x + col, origin.x + col + 1) x [origin.y + row, origin.y + row + 1)`.
#[derive(Debug, Clone)]
pub struct TileSolidity {
    origin: Vec2,
    width: i32,
    height: i32,
    solid: Vec<bool>,
}

impl TileSolidity {
    pub fn new(
        origin: Vec2,
        width: i32,
        height: i32,
        solid: Vec<bool>,
    ) -> Result<Self, TileSolidityError> {
        if width <= 0 || height <= 0 {
            return Err(TileSolidityError::NonPositiveDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if solid.len() != expected {
            return Err(TileSolidityError::SizeMismatch {
                width,
                height,
                expected,
                actual: solid.len(),
            });
        }
        Ok(Self {
            origin,
            width,
            height,
            solid,
        })
    }

    /// An all-open grid of the given size.
    pub fn open(origin: Vec2, width: i32, height: i32) -> Result<Self, TileSolidityError> {
        let cells = (width.max(0) as usize) * (height.max(0) as usize);
        Self::new(origin, width, height, vec![false; cells])
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether the cell at (row, col) is solid. Out-of-range cells are open.
    pub fn is_solid(&self, row: i32, col: i32) -> bool {
        if row < 0 || row >= self.height || col < 0 || col >= self.width {
            return false;
        }
        self.solid[(row * self.width + col) as usize]
    }

    /// Mark a cell solid or open. Out-of-range coordinates are ignored.
    pub fn set_solid(&mut self, row: i32, col: i32, solid: bool) {
        if row < 0 || row >= self.height || col < 0 || col >= self.width {
            return;
        }
        self.solid[(row * self.width + col) as usize] = solid;
    }

    /// World-space box of the cell at (row, col).
    pub fn tile_box(&self, row: i32, col: i32) -> Aabb {
        let left = self.origin.x + col as f32;
        let top = self.origin.y + row as f32;
        Aabb {
            left,
            top,
            right: left + 1.0,
            bottom: top + 1.0,
        }
    }
}
