//! Rendering module
//!
//! The core draws through a tiny primitive surface (`RenderTarget`) and
//! treats textures as opaque handles resolved by logical id. Any handle that
//! is missing or not loaded yet falls back to a colored primitive.

pub mod scene;

use glam::Vec2;

pub use scene::draw_scene;

/// RGBA, components in `[0, 1]`
pub type Color = [f32; 4];

/// Opaque texture handle issued by an `AssetResolver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// One image blit. `pos` is the screen-space center; negative scale flips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    pub texture: TextureHandle,
    pub pos: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub opacity: f32,
}

impl Blit {
    pub fn new(texture: TextureHandle, pos: Vec2, size: Vec2) -> Self {
        Self {
            texture,
            pos,
            size,
            rotation: 0.0,
            scale: Vec2::ONE,
            opacity: 1.0,
        }
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Screen-space 2D drawing surface
pub trait RenderTarget {
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// `min` is the top-left corner
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn draw_image(&mut self, blit: &Blit);
    /// `pos` is the left end of the text baseline
    fn draw_text(&mut self, text: &str, pos: Vec2, size: f32, color: Color);
}

/// Texture lookup by logical id
pub trait AssetResolver {
    fn texture(&self, id: &str) -> Option<TextureHandle>;
}

/// Resolver with nothing loaded; everything renders as primitives
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetResolver for NoAssets {
    fn texture(&self, _id: &str) -> Option<TextureHandle> {
        None
    }
}

/// Fallback colors for game elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.06, 0.07, 0.05, 1.0];
    pub const GROUND: [Color; 4] = [
        [0.16, 0.20, 0.12, 1.0],
        [0.18, 0.22, 0.13, 1.0],
        [0.14, 0.18, 0.11, 1.0],
        [0.17, 0.19, 0.14, 1.0],
    ];
    pub const WALL: Color = [0.35, 0.30, 0.28, 1.0];
    pub const PLAYER_HEAD: Color = [0.35, 0.9, 0.45, 1.0];
    pub const PLAYER_BODY: Color = [0.2, 0.7, 0.3, 1.0];
    pub const ENEMY_HEADS: [Color; 4] = [
        [0.9, 0.3, 0.25, 1.0],
        [0.85, 0.55, 0.2, 1.0],
        [0.65, 0.3, 0.8, 1.0],
        [0.3, 0.55, 0.9, 1.0],
    ];
    pub const FOOD: Color = [0.95, 0.85, 0.3, 1.0];
    pub const POWER_UP: Color = [0.3, 0.85, 0.95, 1.0];
    pub const MALUS: Color = [0.75, 0.15, 0.45, 1.0];
    pub const DEBRIS: Color = [0.8, 0.75, 0.6, 1.0];
    pub const FOG: Color = [0.0, 0.0, 0.0, 0.92];
    pub const REVEAL: Color = [1.0, 0.2, 0.2, 0.8];
    pub const TEXT: Color = [1.0, 1.0, 1.0, 1.0];
    pub const TEXT_HARMFUL: Color = [1.0, 0.45, 0.45, 1.0];

    /// Same hue, alpha replaced
    pub fn with_alpha(color: Color, alpha: f32) -> Color {
        [color[0], color[1], color[2], alpha]
    }

    /// Scale RGB, keep alpha
    pub fn shade(color: Color, factor: f32) -> Color {
        [
            (color[0] * factor).clamp(0.0, 1.0),
            (color[1] * factor).clamp(0.0, 1.0),
            (color[2] * factor).clamp(0.0, 1.0),
            color[3],
        ]
    }
}
