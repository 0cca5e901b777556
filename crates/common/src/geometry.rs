use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning `size` from its minimum corner.
    pub fn from_corner(corner: Vec3, size: Vec3) -> Self {
        Self {
            min: corner,
            max: corner + size,
        }
    }

    /// The unit cube occupied by the block whose minimum corner is `corner`.
    pub fn unit(corner: Vec3) -> Self {
        Self::from_corner(corner, Vec3::ONE)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn centre(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Euclidean distance from `p` to the closest point of the box (zero inside).
    pub fn distance_to(&self, p: Vec3) -> f32 {
        let closest = p.clamp(self.min, self.max);
        p.distance(closest)
    }
}

/// Linear RGB colour used by particle payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Furnace sparks.
    pub const EMBER: Color = Color::rgb(1.0, 0.45, 0.1);
    /// Generic crafting dust.
    pub const SAWDUST: Color = Color::rgb(0.8, 0.7, 0.5);
    /// Enchanting glyphs.
    pub const ARCANE: Color = Color::rgb(0.6, 0.3, 1.0);
    pub const FLAME: Color = Color::rgb(1.0, 0.8, 0.2);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}
