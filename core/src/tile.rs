use core::fmt;
use serde::{Deserialize, Serialize};

/// Largest palette a game can be configured with.
pub const MAX_COLORS: u8 = 8;

/// Ball color, numbered `1..=MAX_COLORS`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Color(u8);

impl Color {
    pub const FIRST: Color = Color(1);

    pub const fn new(index: u8) -> Option<Self> {
        if index >= 1 && index <= MAX_COLORS {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every color of a palette with `count` colors.
    pub fn palette(count: u8) -> impl Iterator<Item = Color> {
        (1..=count.min(MAX_COLORS)).map(Self)
    }
}

impl TryFrom<u8> for Color {
    type Error = crate::GameError;

    fn try_from(index: u8) -> crate::Result<Self> {
        Self::new(index).ok_or(crate::GameError::InvalidColor)
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Lifecycle phase of a ball on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Live ball, can be selected.
    Normal,
    /// Hint for the next turn, passable.
    Preview,
    /// The ball the player picked.
    Selected,
}

/// Content of a single board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Ball(Color, Phase),
}

impl Tile {
    pub const fn normal(color: Color) -> Self {
        Self::Ball(color, Phase::Normal)
    }

    pub const fn preview(color: Color) -> Self {
        Self::Ball(color, Phase::Preview)
    }

    pub const fn selected(color: Color) -> Self {
        Self::Ball(color, Phase::Selected)
    }

    pub const fn color(self) -> Option<Color> {
        match self {
            Self::Empty => None,
            Self::Ball(color, _) => Some(color),
        }
    }

    pub const fn phase(self) -> Option<Phase> {
        match self {
            Self::Empty => None,
            Self::Ball(_, phase) => Some(phase),
        }
    }

    /// Same ball in another phase, `None` for an empty cell.
    pub const fn with_phase(self, phase: Phase) -> Option<Self> {
        match self {
            Self::Empty => None,
            Self::Ball(color, _) => Some(Self::Ball(color, phase)),
        }
    }

    pub const fn to_normal(self) -> Option<Self> {
        self.with_phase(Phase::Normal)
    }

    pub const fn to_preview(self) -> Option<Self> {
        self.with_phase(Phase::Preview)
    }

    pub const fn to_selected(self) -> Option<Self> {
        self.with_phase(Phase::Selected)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Live ball that can be picked up.
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::Ball(_, Phase::Normal))
    }

    pub const fn is_preview(self) -> bool {
        matches!(self, Self::Ball(_, Phase::Preview))
    }

    pub const fn is_selected(self) -> bool {
        matches!(self, Self::Ball(_, Phase::Selected))
    }

    /// Whether a moving ball may cross or land on this cell.
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Empty | Self::Ball(_, Phase::Preview))
    }

    /// Numeric code used by diagnostic dumps: `0` empty, `1..=8` normal, `10..=17` preview,
    /// `19..=26` selected. Each phase block is followed by one unused end marker.
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Ball(color, Phase::Normal) => color.0,
            Self::Ball(color, Phase::Preview) => 9 + color.0,
            Self::Ball(color, Phase::Selected) => 18 + color.0,
        }
    }

    /// Parses the text notation used by `Display`: `.` empty, `1`-`8` normal, `a`-`h` preview, `A`-`H` selected.
    pub fn from_char(ch: char) -> Option<Self> {
        let offset = |base: u8| Color::new((ch as u32).checked_sub(base.into())? as u8 + 1);
        match ch {
            '.' => Some(Self::Empty),
            '1'..='8' => offset(b'1').map(Self::normal),
            'a'..='h' => offset(b'a').map(Self::preview),
            'A'..='H' => offset(b'A').map(Self::selected),
            _ => None,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Empty
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = match *self {
            Self::Empty => '.',
            Self::Ball(color, Phase::Normal) => (b'0' + color.0) as char,
            Self::Ball(color, Phase::Preview) => (b'a' + color.0 - 1) as char,
            Self::Ball(color, Phase::Selected) => (b'A' + color.0 - 1) as char,
        };
        write!(f, "{ch}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn phase_changes_round_trip_for_every_color() {
        for color in Color::palette(MAX_COLORS) {
            let normal = Tile::normal(color);
            let preview = normal.to_preview().unwrap();
            let selected = preview.to_selected().unwrap();

            assert_eq!(preview.color(), Some(color));
            assert_eq!(selected.to_normal(), Some(normal));
            assert_eq!(preview.to_normal(), Some(normal));
            assert_eq!(selected.to_preview(), Some(preview));
            assert_ne!(preview, Tile::Empty);
            assert_ne!(selected, normal);
        }
    }

    #[test]
    fn empty_has_no_phase() {
        assert_eq!(Tile::Empty.to_normal(), None);
        assert_eq!(Tile::Empty.to_preview(), None);
        assert_eq!(Tile::Empty.to_selected(), None);
        assert_eq!(Tile::Empty.phase(), None);
    }

    #[test]
    fn color_range_is_checked() {
        assert_eq!(Color::new(0), None);
        assert_eq!(Color::new(MAX_COLORS + 1), None);
        assert_eq!(Color::new(3).map(Color::get), Some(3));
        assert_eq!(Color::palette(3).count(), 3);
        assert_eq!(Color::palette(20).count(), MAX_COLORS as usize);
    }

    #[test]
    fn passability_follows_phase() {
        let color = Color::new(1).unwrap();
        assert!(Tile::Empty.is_passable());
        assert!(Tile::preview(color).is_passable());
        assert!(!Tile::normal(color).is_passable());
        assert!(!Tile::selected(color).is_passable());
    }

    #[test]
    fn text_notation_round_trips() {
        for ch in ".12345678abcdefghABCDEFGH".chars() {
            let tile = Tile::from_char(ch).unwrap();
            assert_eq!(tile.to_string(), ch.to_string());
        }
        assert_eq!(Tile::from_char('9'), None);
        assert_eq!(Tile::from_char('i'), None);
        assert_eq!(Tile::from_char('#'), None);
    }

    #[test]
    fn codes_follow_phase_blocks() {
        let first = Color::FIRST;
        let last = Color::new(MAX_COLORS).unwrap();

        assert_eq!(Tile::Empty.code(), 0);
        assert_eq!(Tile::normal(first).code(), 1);
        assert_eq!(Tile::normal(last).code(), 8);
        assert_eq!(Tile::preview(first).code(), 10);
        assert_eq!(Tile::preview(last).code(), 17);
        assert_eq!(Tile::selected(first).code(), 19);
        assert_eq!(Tile::selected(last).code(), 26);
    }

    #[test]
    fn codes_do_not_alias() {
        let mut seen = alloc::vec![Tile::Empty.code()];
        for color in Color::palette(MAX_COLORS) {
            for tile in [Tile::normal(color), Tile::preview(color), Tile::selected(color)] {
                assert!(!seen.contains(&tile.code()));
                seen.push(tile.code());
            }
        }
    }
}
