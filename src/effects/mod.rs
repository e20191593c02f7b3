mod blueprint;
mod datamosh;

pub use blueprint::{paint, Blueprint};
pub use datamosh::Datamosh;

use crate::display::PixelBuffer;

/// Trait for backdrop effects driven by the main frame loop
pub trait Effect {
    /// Update effect state (called each frame)
    /// - dt: delta time in seconds
    /// - width/height: current output dimensions in device pixels
    fn update(&mut self, dt: f32, width: u32, height: u32);

    /// Render effect to the pixel buffer
    fn render(&self, buffer: &mut PixelBuffer);

    /// Effect name for UI/debugging
    fn name(&self) -> &str;
}
