use alloc::vec::Vec;
use core::mem;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - FirstPick -> SecondPick (ball selected)
/// - SecondPick -> SecondPick (another ball selected)
/// - SecondPick -> FirstPick (deselected, or ball moved)
/// - SecondPick -> GameOver (ball moved and the board filled up)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// Nothing selected, picking a ball selects it
    #[default]
    FirstPick,
    /// A ball is selected and waits for a target
    SecondPick,
    /// No room left for new balls, picks are rejected
    GameOver,
}

impl TurnState {
    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// Grid state machine driving one game from start to game over.
#[derive(Clone, Debug)]
pub struct BoardEngine<S = RandomBallSource> {
    config: GameConfig,
    board: Array2<Tile>,
    selection: Option<Coord2>,
    state: TurnState,
    score: u32,
    elapsed_secs: u32,
    extra_move: bool,
    source: S,
}

impl<S: BallSource> BoardEngine<S> {
    /// Creates an engine and immediately starts a game with `config`.
    pub fn new(config: GameConfig, source: S) -> Self {
        let mut engine = Self::blank(config, source);
        engine.start_new_game(config);
        engine
    }

    /// Creates an engine around a preset board, taking over any selected ball.
    pub fn from_board(config: GameConfig, tiles: Array2<Tile>, source: S) -> Result<Self> {
        if tiles.board_size() != config.size {
            return Err(GameError::InvalidBoardShape);
        }

        if tiles
            .iter()
            .filter_map(|tile| tile.color())
            .any(|color| color.get() > config.colors)
        {
            return Err(GameError::InvalidColor);
        }

        let mut selected = tiles
            .indexed_iter()
            .filter(|(_, tile)| tile.is_selected())
            .map(|((row, column), _)| (row as Coord, column as Coord));
        let selection = selected.next();
        if selected.next().is_some() {
            return Err(GameError::MultipleSelections);
        }

        let mut engine = Self::blank(config, source);
        engine.board = tiles;
        engine.selection = selection;
        engine.state = if selection.is_some() {
            TurnState::SecondPick
        } else {
            TurnState::FirstPick
        };
        Ok(engine)
    }

    fn blank(config: GameConfig, source: S) -> Self {
        Self {
            config,
            board: Array2::default(config.size.to_nd_index()),
            selection: None,
            state: Default::default(),
            score: 0,
            elapsed_secs: 0,
            extra_move: false,
            source,
        }
    }

    /// Clears the board and seeds it with the opening balls and previews.
    ///
    /// Streaks formed by the opening balls are removed but not scored.
    pub fn start_new_game(&mut self, config: GameConfig) {
        self.config = config;
        self.board = Array2::default(config.size.to_nd_index());
        self.selection = None;
        self.state = TurnState::FirstPick;
        self.score = 0;
        self.elapsed_secs = 0;
        self.extra_move = false;

        self.add_preview_balls(config.preview_count);
        let opening = self.transform_preview_balls();
        if !opening.is_empty() {
            log::debug!("Opening streaks removed {} balls", opening.cleared);
        }
        self.score = 0;
        self.spawn_next_previews();

        log::debug!(
            "New game {}x{}, {} colors, streak length {}",
            config.height(),
            config.width(),
            config.colors,
            config.min_streak
        );
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Array2<Tile> {
        &self.board
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<Tile> {
        self.board.get(coords.to_nd_index()).copied()
    }

    /// Board size as `(height, width)`.
    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn width(&self) -> Coord {
        self.config.width()
    }

    pub fn height(&self) -> Coord {
        self.config.height()
    }

    pub fn colors(&self) -> u8 {
        self.config.colors
    }

    pub fn min_streak(&self) -> u8 {
        self.config.min_streak
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn selection(&self) -> Option<Coord2> {
        self.selection
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Advances the clock by one second; stopped once the game is over.
    pub fn increase_timer(&mut self) {
        if !self.state.is_game_over() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.board.in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Whether a ball at `from` could travel to `to` on the current board.
    pub fn is_reachable(&self, from: Coord2, to: Coord2) -> bool {
        crate::rules::is_reachable(&self.board, from, to)
    }

    /// Single entry point for player input.
    ///
    /// Errors are returned for picks outside the board or after the game is over,
    /// in both cases nothing changes.
    pub fn process_pick(&mut self, coords: Coord2) -> Result<PickOutcome> {
        let coords = self.validate_coords(coords)?;

        match self.state {
            TurnState::FirstPick => Ok(self.select(coords)),
            TurnState::SecondPick => {
                let Some(selection) = self.selection else {
                    self.state = TurnState::FirstPick;
                    return Ok(self.select(coords));
                };

                let target = self.board[coords.to_nd_index()];
                if coords == selection {
                    self.deselect();
                    Ok(PickOutcome::Deselected)
                } else if target.is_passable() {
                    Ok(self.move_selected_to(selection, coords))
                } else if target.is_normal() {
                    self.deselect();
                    self.select(coords);
                    Ok(PickOutcome::Reselected)
                } else {
                    Ok(PickOutcome::NoChange)
                }
            }
            TurnState::GameOver => Err(GameError::AlreadyEnded),
        }
    }

    fn select(&mut self, coords: Coord2) -> PickOutcome {
        if self.state != TurnState::FirstPick {
            return PickOutcome::NoChange;
        }

        let tile = self.board[coords.to_nd_index()];
        let Some(selected) = tile.to_selected().filter(|_| tile.is_normal()) else {
            return PickOutcome::NoChange;
        };

        self.board[coords.to_nd_index()] = selected;
        self.selection = Some(coords);
        self.state = TurnState::SecondPick;
        log::trace!("Selected {:?}", coords);
        PickOutcome::Selected
    }

    fn deselect(&mut self) {
        if let Some(coords) = self.selection.take() {
            let tile = &mut self.board[coords.to_nd_index()];
            if let Some(normal) = tile.to_normal() {
                *tile = normal;
            }
            log::trace!("Deselected {:?}", coords);
        }
        self.state = TurnState::FirstPick;
    }

    fn move_selected_to(&mut self, from: Coord2, to: Coord2) -> PickOutcome {
        if !self.is_reachable(from, to) {
            log::debug!("No path from {:?} to {:?}", from, to);
            return PickOutcome::Unreachable;
        }

        let Some(ball) = self.board[from.to_nd_index()].to_normal() else {
            return PickOutcome::NoChange;
        };

        let previous = mem::replace(&mut self.board[to.to_nd_index()], ball);
        self.board[from.to_nd_index()] = previous;
        self.selection = None;
        self.state = TurnState::FirstPick;
        log::debug!("Moved {:?} -> {:?}", from, to);

        self.extra_move = false;
        let mut tally = self.resolve_streaks_at(to, true);
        if self.extra_move {
            return PickOutcome::Moved {
                cleared: tally.cleared,
                score_gained: tally.score,
            };
        }

        tally = tally | self.transform_preview_balls();
        if self.spawn_next_previews() {
            PickOutcome::GameOver {
                score_gained: tally.score,
            }
        } else {
            PickOutcome::Moved {
                cleared: tally.cleared,
                score_gained: tally.score,
            }
        }
    }

    /// Spawns the next batch of previews, ending the game when the board has no room left.
    fn spawn_next_previews(&mut self) -> bool {
        let placed = self.add_preview_balls(self.config.preview_count);
        if placed == 0 && !self.board.iter().any(|tile| tile.is_empty()) {
            self.state = TurnState::GameOver;
            log::info!("Game over, score {} after {}s", self.score, self.elapsed_secs);
            true
        } else {
            false
        }
    }

    /// Clears the streaks through `coords`, adding their score to the total.
    ///
    /// A clear caused by the player grants another move before the next spawn.
    pub fn resolve_streaks_at(&mut self, coords: Coord2, player_acted: bool) -> ClearTally {
        match clear_streaks(&mut self.board, coords, self.config.min_streak) {
            Some(clear) => {
                self.score = self.score.saturating_add(clear.score);
                if player_acted {
                    self.extra_move = true;
                }
                clear.into()
            }
            None => ClearTally::default(),
        }
    }

    /// Places up to `max_count` preview balls on random empty cells, returning how many were placed.
    pub fn add_preview_balls(&mut self, max_count: CellCount) -> CellCount {
        let empty: Vec<Coord2> = self
            .board
            .indexed_iter()
            .filter(|(_, tile)| tile.is_empty())
            .map(|((row, column), _)| (row as Coord, column as Coord))
            .collect();

        if empty.len() < usize::from(max_count) {
            log::warn!("Only {} empty cells for {} previews", empty.len(), max_count);
            for &coords in &empty {
                let color = self.source.uniform_color(self.config.colors);
                self.board[coords.to_nd_index()] = Tile::preview(color);
            }
            return empty.len() as CellCount;
        }

        let mut placed: CellCount = 0;
        while placed < max_count {
            let index = self.source.uniform_int(0..empty.len()).min(empty.len() - 1);
            let coords = empty[index];
            if !self.board[coords.to_nd_index()].is_empty() {
                continue;
            }

            let color = self.source.uniform_color(self.config.colors);
            self.board[coords.to_nd_index()] = Tile::preview(color);
            log::trace!("Preview {:?} at {:?}", color, coords);
            placed += 1;
        }
        placed
    }

    /// Turns every preview ball into a live one, resolving each as it lands.
    pub fn transform_preview_balls(&mut self) -> ClearTally {
        let previews: Vec<Coord2> = self
            .board
            .indexed_iter()
            .filter(|(_, tile)| tile.is_preview())
            .map(|((row, column), _)| (row as Coord, column as Coord))
            .collect();

        let mut tally = ClearTally::default();
        for coords in previews {
            let tile = &mut self.board[coords.to_nd_index()];
            let Some(normal) = tile.to_normal().filter(|_| tile.is_preview()) else {
                continue;
            };
            *tile = normal;
            tally = tally | self.resolve_streaks_at(coords, false);
        }
        tally
    }
}

impl BoardEngine<RandomBallSource> {
    /// Starts a game drawing its balls from a generator seeded with `seed`.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(config, RandomBallSource::new(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn color(index: u8) -> Color {
        Color::new(index).unwrap()
    }

    fn engine(config: GameConfig, rows: &[&str], source: ScriptedBallSource) -> BoardEngine<ScriptedBallSource> {
        BoardEngine::from_board(config, parse_board(rows).unwrap(), source).unwrap()
    }

    fn assert_board<S: BallSource>(engine: &BoardEngine<S>, rows: &[&str]) {
        assert_eq!(
            engine.board(),
            &parse_board(rows).unwrap(),
            "\n{}",
            BoardView(engine.board())
        );
    }

    fn count(engine: &BoardEngine<impl BallSource>, predicate: impl Fn(Tile) -> bool) -> usize {
        engine.board().iter().filter(|&&tile| predicate(tile)).count()
    }

    #[test]
    fn new_game_places_opening_balls_and_previews() {
        for seed in 0..20 {
            let engine = BoardEngine::with_seed(GameConfig::classic(), seed);

            assert_eq!(count(&engine, Tile::is_normal), 3);
            assert_eq!(count(&engine, Tile::is_preview), 3);
            assert_eq!(engine.score(), 0);
            assert_eq!(engine.elapsed_secs(), 0);
            assert_eq!(engine.state(), TurnState::FirstPick);
            assert_eq!(engine.selection(), None);
            assert_eq!(engine.min_streak(), 5);
        }
    }

    #[test]
    fn same_seed_same_opening() {
        let a = BoardEngine::with_seed(GameConfig::classic(), 99);
        let b = BoardEngine::with_seed(GameConfig::classic(), 99);
        assert_eq!(a.board(), b.board());
        assert_eq!(a.source().seed(), 99);
    }

    #[test]
    fn opening_streaks_are_removed_without_score() {
        let config = GameConfig::new_unchecked((1, 3), 1, 3);
        let engine = BoardEngine::new(config, ScriptedBallSource::default());

        // three single-color balls fill the row and clear, then three new previews fill it again
        assert_eq!(engine.score(), 0);
        assert_board(&engine, &["aaa"]);
        assert_eq!(engine.state(), TurnState::FirstPick);
    }

    #[test]
    fn single_cell_board_ends_at_start() {
        let engine = BoardEngine::with_seed(GameConfig::new((1, 1), 2), 3);

        assert_eq!(count(&engine, Tile::is_normal), 1);
        assert!(engine.is_game_over());
    }

    #[test]
    fn select_deselect_reselect() {
        let config = GameConfig::new_unchecked((1, 3), 3, 3);
        let mut engine = engine(config, &["1.2"], ScriptedBallSource::default());

        assert_eq!(engine.process_pick((0, 0)), Ok(PickOutcome::Selected));
        assert_eq!(engine.selection(), Some((0, 0)));
        assert_eq!(engine.state(), TurnState::SecondPick);
        assert_board(&engine, &["A.2"]);

        assert_eq!(engine.process_pick((0, 0)), Ok(PickOutcome::Deselected));
        assert_eq!(engine.selection(), None);
        assert_eq!(engine.state(), TurnState::FirstPick);
        assert_board(&engine, &["1.2"]);

        assert_eq!(engine.process_pick((0, 0)), Ok(PickOutcome::Selected));
        assert_eq!(engine.process_pick((0, 2)), Ok(PickOutcome::Reselected));
        assert_eq!(engine.selection(), Some((0, 2)));
        assert_eq!(engine.state(), TurnState::SecondPick);
        assert_board(&engine, &["1.B"]);
    }

    #[test]
    fn first_pick_ignores_empty_and_preview_cells() {
        let config = GameConfig::new_unchecked((1, 3), 3, 3);
        let mut engine = engine(config, &["1.a"], ScriptedBallSource::default());

        assert_eq!(engine.process_pick((0, 1)), Ok(PickOutcome::NoChange));
        assert_eq!(engine.process_pick((0, 2)), Ok(PickOutcome::NoChange));
        assert_eq!(engine.state(), TurnState::FirstPick);
        assert_board(&engine, &["1.a"]);
    }

    #[test]
    fn out_of_bounds_picks_change_nothing() {
        let config = GameConfig::new_unchecked((2, 2), 3, 3);
        let mut engine = engine(config, &["A.", ".."], ScriptedBallSource::default());

        assert_eq!(engine.process_pick((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.process_pick((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(engine.process_pick((255, 255)), Err(GameError::InvalidCoords));
        assert_eq!(engine.selection(), Some((0, 0)));
        assert_board(&engine, &["A.", ".."]);
    }

    #[test]
    fn unreachable_target_keeps_selection() {
        let config = GameConfig::new_unchecked((2, 3), 3, 3);
        let mut engine = engine(config, &["A2.", "2.."], ScriptedBallSource::default());

        assert_eq!(engine.process_pick((1, 1)), Ok(PickOutcome::Unreachable));
        assert_eq!(engine.selection(), Some((0, 0)));
        assert_eq!(engine.state(), TurnState::SecondPick);
        assert_board(&engine, &["A2.", "2.."]);
    }

    #[test]
    fn plain_move_spawns_next_previews() {
        let config = GameConfig::new_unchecked((3, 3), 3, 3);
        let source = ScriptedBallSource::new([0, 0, 6, 3], [color(1), color(2), color(3)]);
        let mut engine = engine(config, &["1..", "...", "..b"], source);

        assert_eq!(engine.process_pick((0, 0)), Ok(PickOutcome::Selected));
        let outcome = engine.process_pick((0, 2));

        assert_eq!(
            outcome,
            Ok(PickOutcome::Moved {
                cleared: 0,
                score_gained: 0
            })
        );
        assert_board(&engine, &["a.1", ".c.", ".b2"]);
        assert_eq!(engine.state(), TurnState::FirstPick);
        assert_eq!(engine.selection(), None);
        assert_eq!(engine.source().remaining(), (vec![], vec![]));
    }

    #[test]
    fn moving_onto_preview_swaps_it_back() {
        let config = GameConfig::new_unchecked((1, 3), 3, 3);
        let source = ScriptedBallSource::new([], [color(3)]);
        let mut engine = engine(config, &["Aa."], source);

        let outcome = engine.process_pick((0, 1));

        assert_eq!(
            outcome,
            Ok(PickOutcome::Moved {
                cleared: 0,
                score_gained: 0
            })
        );
        assert_board(&engine, &["11c"]);
        assert_eq!(engine.state(), TurnState::FirstPick);
    }

    #[test]
    fn completing_a_row_clears_it_and_skips_spawn() {
        let mut engine = engine(
            GameConfig::classic(),
            &[
                "11111....",
                ".........",
                ".........",
                ".........",
                "....a....",
                ".........",
                ".........",
                ".........",
                "........1",
            ],
            ScriptedBallSource::default(),
        );

        assert_eq!(engine.process_pick((8, 8)), Ok(PickOutcome::Selected));
        let outcome = engine.process_pick((0, 5));

        assert_eq!(
            outcome,
            Ok(PickOutcome::Moved {
                cleared: 6,
                score_gained: 12
            })
        );
        assert_eq!(engine.score(), 12);
        assert_eq!(count(&engine, Tile::is_normal), 0);
        assert_eq!(engine.tile_at((4, 4)), Some(Tile::preview(color(1))));
        assert_eq!(count(&engine, Tile::is_preview), 1);
    }

    #[test]
    fn streaks_completed_by_previews_score_and_spawn_continues() {
        let config = GameConfig::new_unchecked((2, 7), 3, 5);
        let mut engine = engine(config, &["B......", "1111a.."], ScriptedBallSource::default());

        let outcome = engine.process_pick((0, 1));

        assert_eq!(
            outcome,
            Ok(PickOutcome::Moved {
                cleared: 5,
                score_gained: 5
            })
        );
        assert_eq!(engine.score(), 5);
        assert_board(&engine, &["a2aa...", "......."]);
    }

    #[test]
    fn full_board_ends_the_game() {
        let config = GameConfig::new_unchecked((2, 2), 3, 5);
        let mut engine = engine(config, &["Aa", "23"], ScriptedBallSource::default());

        let outcome = engine.process_pick((0, 1));

        assert_eq!(outcome, Ok(PickOutcome::GameOver { score_gained: 0 }));
        assert!(engine.is_game_over());
        assert_board(&engine, &["11", "23"]);

        assert_eq!(engine.process_pick((0, 0)), Err(GameError::AlreadyEnded));
        engine.increase_timer();
        assert_eq!(engine.elapsed_secs(), 0);

        engine.start_new_game(GameConfig::classic());
        assert_eq!(engine.state(), TurnState::FirstPick);
        assert_eq!(engine.size(), (9, 9));
    }

    #[test]
    fn timer_counts_ticks() {
        let mut engine = BoardEngine::with_seed(GameConfig::classic(), 5);
        for _ in 0..3 {
            engine.increase_timer();
        }
        assert_eq!(engine.elapsed_secs(), 3);

        engine.start_new_game(GameConfig::classic());
        assert_eq!(engine.elapsed_secs(), 0);
    }

    #[test]
    fn add_preview_balls_saturates_on_small_boards() {
        let config = GameConfig::new_unchecked((1, 4), 3, 3);
        let mut engine = engine(config, &["1.2."], ScriptedBallSource::default());

        assert_eq!(engine.add_preview_balls(3), 2);
        assert_board(&engine, &["1a2a"]);
        assert_eq!(engine.add_preview_balls(3), 0);
    }

    #[test]
    fn add_preview_balls_redraws_taken_cells() {
        let config = GameConfig::new_unchecked((1, 5), 3, 3);
        let source = ScriptedBallSource::new([2, 2, 2, 0], [color(2), color(3)]);
        let mut engine = engine(config, &["....."], source);

        assert_eq!(engine.add_preview_balls(2), 2);
        assert_board(&engine, &["c.b.."]);
    }

    #[test]
    fn from_board_rejects_invalid_presets() {
        let config = GameConfig::new_unchecked((1, 3), 2, 3);
        let source = ScriptedBallSource::default;

        let err = BoardEngine::from_board(config, parse_board(&["..."; 2]).unwrap(), source());
        assert_eq!(err.map(|_| ()), Err(GameError::InvalidBoardShape));

        let err = BoardEngine::from_board(config, parse_board(&["3.."]).unwrap(), source());
        assert_eq!(err.map(|_| ()), Err(GameError::InvalidColor));

        let err = BoardEngine::from_board(config, parse_board(&["A.B"]).unwrap(), source());
        assert_eq!(err.map(|_| ()), Err(GameError::MultipleSelections));
    }

    #[test]
    fn random_play_keeps_invariants() {
        let config = GameConfig::classic();
        let mut engine = BoardEngine::with_seed(config, 2024);
        let mut picks = RandomBallSource::new(7);
        let mut last_score = 0;
        let mut games = 0;

        for _ in 0..20_000 {
            let coords = (
                picks.uniform_int(0..10) as Coord,
                picks.uniform_int(0..10) as Coord,
            );
            match engine.process_pick(coords) {
                Err(GameError::AlreadyEnded) => {
                    games += 1;
                    last_score = 0;
                    engine.start_new_game(config);
                    continue;
                }
                Err(err) => assert_eq!(err, GameError::InvalidCoords),
                Ok(_) => {}
            }

            let selected: Vec<_> = engine
                .board()
                .indexed_iter()
                .filter(|(_, tile)| tile.is_selected())
                .map(|((row, column), _)| (row as Coord, column as Coord))
                .collect();
            assert!(selected.len() <= 1);
            assert_eq!(selected.first().copied(), engine.selection());
            if !engine.is_game_over() {
                assert_eq!(engine.state() == TurnState::SecondPick, engine.selection().is_some());
            }
            assert!(engine
                .board()
                .iter()
                .filter_map(|tile| tile.color())
                .all(|color| color.get() <= config.colors));
            assert!(engine.score() >= last_score);
            last_score = engine.score();
        }

        log::debug!("played through {} games", games);
    }
}
