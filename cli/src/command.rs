use std::str::FromStr;

use anyhow::{Context, bail};
use lines_core::{Coord, Coord2};

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `<row> <column>`, zero based
    Pick(Coord2),
    /// Restart with the same board settings
    NewGame,
    /// Draw the board again
    Show,
    /// Print the current state as JSON
    Json,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(Self::Show);
        };

        let command = match first.to_ascii_lowercase().as_str() {
            "new" | "n" => Self::NewGame,
            "show" | "s" => Self::Show,
            "json" => Self::Json,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            row => {
                let column = words.next().context("expected `<row> <column>`")?;
                Self::Pick((parse_coord(row)?, parse_coord(column)?))
            }
        };

        if let Some(extra) = words.next() {
            bail!("unexpected `{extra}`");
        }
        Ok(command)
    }
}

/// Out-of-range values saturate so the engine, not the parser, rejects them.
fn parse_coord(word: &str) -> anyhow::Result<Coord> {
    let value: u64 = word
        .parse()
        .with_context(|| format!("`{word}` is not a command or a cell number"))?;
    Ok(Coord::try_from(value).unwrap_or(Coord::MAX))
}

pub const HELP: &str = "\
Commands:
  <row> <column>  pick a cell (zero based, top left is 0 0)
  new             start a new game
  show            draw the board
  json            print the game state as JSON
  help            show this text
  quit            leave the game

Board: . empty, 1-8 balls, a-h next balls, A-H selected ball";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_picks() {
        assert_eq!("3 4".parse::<Command>().unwrap(), Command::Pick((3, 4)));
        assert_eq!("  0\t8 ".parse::<Command>().unwrap(), Command::Pick((0, 8)));
        assert_eq!("300 2".parse::<Command>().unwrap(), Command::Pick((Coord::MAX, 2)));
    }

    #[test]
    fn parses_keywords() {
        assert_eq!("new".parse::<Command>().unwrap(), Command::NewGame);
        assert_eq!("Q".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("json".parse::<Command>().unwrap(), Command::Json);
        assert_eq!("?".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("".parse::<Command>().unwrap(), Command::Show);
    }

    #[test]
    fn rejects_garbage() {
        assert!("3".parse::<Command>().is_err());
        assert!("a b".parse::<Command>().is_err());
        assert!("-1 2".parse::<Command>().is_err());
        assert!("1 2 3".parse::<Command>().is_err());
        assert!("quit now".parse::<Command>().is_err());
    }
}
