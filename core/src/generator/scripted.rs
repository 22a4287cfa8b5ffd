use alloc::collections::VecDeque;
use alloc::vec::Vec;

use super::*;

/// Replays a fixed list of draws, for reproducing an exact sequence of spawns.
///
/// Integer draws are clamped into the requested range. Once a script runs out the
/// source walks the range in order (and hands out the first color), so repeated
/// draws still reach every value.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBallSource {
    ints: VecDeque<usize>,
    colors: VecDeque<Color>,
    fallback: usize,
}

impl ScriptedBallSource {
    pub fn new(ints: impl IntoIterator<Item = usize>, colors: impl IntoIterator<Item = Color>) -> Self {
        Self {
            ints: ints.into_iter().collect(),
            colors: colors.into_iter().collect(),
            fallback: 0,
        }
    }

    pub fn remaining(&self) -> (Vec<usize>, Vec<Color>) {
        (
            self.ints.iter().copied().collect(),
            self.colors.iter().copied().collect(),
        )
    }
}

impl BallSource for ScriptedBallSource {
    fn uniform_int(&mut self, range: Range<usize>) -> usize {
        if range.is_empty() {
            return range.start;
        }

        match self.ints.pop_front() {
            Some(value) => value.clamp(range.start, range.end - 1),
            None => {
                let value = range.start + self.fallback % range.len();
                self.fallback = self.fallback.wrapping_add(1);
                value
            }
        }
    }

    fn uniform_color(&mut self, palette: u8) -> Color {
        self.colors
            .pop_front()
            .filter(|color| color.get() <= palette)
            .unwrap_or(Color::FIRST)
    }
}
