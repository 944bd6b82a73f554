//! Caret geometry, injected into the typing engine for the wrap guard.
//!
//! The engine has to know whether one more character would push the caret
//! past the right edge of the text container. That is a layout question
//! only the UI can answer, so the UI answers it through [`CaretGeometry`]
//! and the engine stays headless.

use serde::{Deserialize, Serialize};

/// Layout measurements the wrap guard needs, in any consistent unit.
pub trait CaretGeometry {
    /// Caret position measured from the container's left edge.
    fn caret_x(&self) -> f32;

    /// Usable width of the container holding the words.
    fn container_width(&self) -> f32;

    /// Width of one character in the (monospace) race font.
    fn char_width(&self) -> f32;

    /// `true` if typing one more character would reach the right edge.
    fn would_wrap(&self) -> bool {
        self.caret_x() + self.char_width() >= self.container_width()
    }
}

/// A container with no right edge. Nothing ever wraps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl CaretGeometry for Unbounded {
    fn caret_x(&self) -> f32 {
        0.0
    }

    fn container_width(&self) -> f32 {
        f32::INFINITY
    }

    fn char_width(&self) -> f32 {
        0.0
    }
}

/// Measurements taken by the UI at the moment of a keystroke.
///
/// Serializable so a UI running in another task (or across an FFI/wasm
/// boundary) can ship the numbers alongside the input value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredLine {
    pub caret_x: f32,
    pub container_width: f32,
    pub char_width: f32,
}

impl CaretGeometry for MeasuredLine {
    fn caret_x(&self) -> f32 {
        self.caret_x
    }

    fn container_width(&self) -> f32 {
        self.container_width
    }

    fn char_width(&self) -> f32 {
        self.char_width
    }
}
