//! Smoothed follow camera
//!
//! `pos` is the world coordinate of the viewport's top-left corner.

use glam::Vec2;

use crate::Rect;
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Camera {
    pub pos: Vec2,
    viewport: Vec2,
    /// Fraction of the remaining distance closed per reference frame
    smoothing: f32,
    target: Option<Vec2>,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32, smoothing: f32) -> Result<Self, ConfigError> {
        if !(viewport_width > 0.0 && viewport_height > 0.0) {
            return Err(ConfigError::InvalidViewport {
                width: viewport_width,
                height: viewport_height,
            });
        }
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(smoothing));
        }
        Ok(Self {
            pos: Vec2::ZERO,
            viewport: Vec2::new(viewport_width, viewport_height),
            smoothing,
            target: None,
        })
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
        }
    }

    /// Track a world point (usually the player's head)
    pub fn set_target(&mut self, target: Vec2) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Where `pos` settles when centered on the target
    fn desired(&self, target: Vec2) -> Vec2 {
        target - self.viewport * 0.5
    }

    /// Ease toward the target; `frames` is elapsed time in reference frames
    pub fn update(&mut self, frames: f32) {
        let Some(target) = self.target else {
            return;
        };
        let t = 1.0 - (1.0 - self.smoothing).powf(frames.max(0.0));
        self.pos = self.pos.lerp(self.desired(target), t);
    }

    /// Jump straight to the target (used on reset/respawn)
    pub fn snap_to_target(&mut self) {
        if let Some(target) = self.target {
            self.pos = self.desired(target);
        }
    }

    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.pos
    }

    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.pos
    }

    /// Visible world rectangle
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.pos, self.viewport)
    }

    pub fn is_visible(&self, world: Vec2, margin: f32) -> bool {
        self.bounds().contains(world, margin)
    }
}
