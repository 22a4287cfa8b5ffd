use core::ops::Range;

use crate::*;
pub use random::*;
pub use scripted::*;

mod random;
mod scripted;

/// Randomness consumed by the engine when it spawns preview balls.
pub trait BallSource {
    /// Uniform integer in `range`, which is never empty when called by the engine.
    fn uniform_int(&mut self, range: Range<usize>) -> usize;

    /// Uniform color out of the first `palette` colors.
    fn uniform_color(&mut self, palette: u8) -> Color;
}

impl<S: BallSource + ?Sized> BallSource for &mut S {
    fn uniform_int(&mut self, range: Range<usize>) -> usize {
        (**self).uniform_int(range)
    }

    fn uniform_color(&mut self, palette: u8) -> Color {
        (**self).uniform_color(palette)
    }
}
