//! Floating property panel geometry
//!
//! The panel is plain state updated by pure reducers; it never touches the
//! document. Every reducer returns a panel that fits inside the viewport.

use serde::{Deserialize, Serialize};

pub const MIN_PANEL_WIDTH: f64 = 280.0;
pub const MIN_PANEL_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatingPanel {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FloatingPanel {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Default placement: right edge of the viewport
    pub fn docked_right(viewport: Viewport) -> Self {
        let width = 360.0;
        Self::new(viewport.width - width - 16.0, 16.0, width, viewport.height - 32.0)
            .clamped(viewport)
    }

    /// Panel dragged by `(dx, dy)`
    pub fn moved(&self, dx: f64, dy: f64, viewport: Viewport) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
        .clamped(viewport)
    }

    /// Panel resized from its bottom-right corner by `(dw, dh)`
    pub fn resized(&self, dw: f64, dh: f64, viewport: Viewport) -> Self {
        Self {
            width: self.width + dw,
            height: self.height + dh,
            ..*self
        }
        .clamped(viewport)
    }

    /// Enforce the minimum size, then keep the panel on screen
    ///
    /// A viewport smaller than the minimum size wins over the minimum.
    pub fn clamped(&self, viewport: Viewport) -> Self {
        let width = self
            .width
            .max(MIN_PANEL_WIDTH)
            .min(viewport.width.max(0.0));
        let height = self
            .height
            .max(MIN_PANEL_HEIGHT)
            .min(viewport.height.max(0.0));

        Self {
            x: self.x.clamp(0.0, (viewport.width - width).max(0.0)),
            y: self.y.clamp(0.0, (viewport.height - height).max(0.0)),
            width,
            height,
        }
    }
}
