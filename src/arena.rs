use rand::Rng;

use crate::difficulty::DifficultyProfile;

/// Top-left corner of the target in arena-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured play-surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSize {
    pub width: u32,
    pub height: u32,
}

impl ArenaSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether a square target of `size` px fits on both axes
    pub fn fits(&self, size: u32) -> bool {
        self.width > 0 && self.height > 0 && self.width >= size && self.height >= size
    }
}

/// Source of the current arena dimensions.
///
/// Returns `None` until the presentation layer has laid the arena out.
pub trait ArenaGeometry {
    fn dimensions(&self) -> Option<ArenaSize>;
}

/// Arena whose size is pushed in by whoever measures the play surface
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasuredArena {
    size: Option<ArenaSize>,
}

impl MeasuredArena {
    pub fn new() -> Self {
        Self { size: None }
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            size: Some(ArenaSize::new(width, height)),
        }
    }

    pub fn measure(&mut self, width: u32, height: u32) {
        self.size = Some(ArenaSize::new(width, height));
    }

    pub fn clear(&mut self) {
        self.size = None;
    }
}

impl ArenaGeometry for MeasuredArena {
    fn dimensions(&self) -> Option<ArenaSize> {
        self.size
    }
}

/// Draw a uniformly random position that keeps the whole target inside the arena.
///
/// Returns `None` when the arena is unmeasured, empty, or smaller than the target.
pub fn place_target<R: Rng + ?Sized>(
    rng: &mut R,
    arena: Option<ArenaSize>,
    profile: &DifficultyProfile,
) -> Option<Position> {
    let arena = arena?;
    let size = profile.target_size_px;
    if !arena.fits(size) {
        return None;
    }

    let max_x = (arena.width - size) as f64;
    let max_y = (arena.height - size) as f64;

    Some(Position {
        x: rng.gen_range(0.0..=max_x),
        y: rng.gen_range(0.0..=max_y),
    })
}
