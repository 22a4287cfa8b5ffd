use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::Context;
use lines_core::*;
use web_time::Instant;

use crate::command::{Command, HELP};

/// Terminal front end: feeds commands to the engine and keeps its clock running.
pub struct Session {
    config: GameConfig,
    engine: BoardEngine,
    last_tick: Instant,
    moves: u32,
}

impl Session {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            engine: BoardEngine::with_seed(config, seed),
            last_tick: Instant::now(),
            moves: 0,
        }
    }

    pub fn engine(&self) -> &BoardEngine {
        &self.engine
    }

    /// Balls moved since the current game started.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
        self.render(&mut output)?;

        for line in input.lines() {
            let line = line.context("Could not read command")?;
            self.tick();

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    writeln!(output, "{err:#}, type `help` for commands")?;
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }
            self.apply(command, &mut output)?;
        }

        output.flush()?;
        log::debug!("Session ended after {} moves with score {}", self.moves, self.engine.score());
        Ok(())
    }

    fn apply(&mut self, command: Command, output: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Pick(coords) => match self.engine.process_pick(coords) {
                Ok(outcome) => {
                    log::debug!("Pick {:?}: {:?}", coords, outcome);
                    if outcome.is_move() {
                        self.moves += 1;
                    }
                    if outcome == PickOutcome::Unreachable {
                        writeln!(output, "No free path to {} {}", coords.0, coords.1)?;
                    }
                    if outcome.has_update() {
                        self.render(output)?;
                    }
                }
                Err(GameError::AlreadyEnded) => {
                    writeln!(output, "Game over, type `new` to play again")?;
                }
                Err(err) => {
                    log::debug!("Pick {:?} rejected: {}", coords, err);
                    writeln!(output, "{err}")?;
                }
            },
            Command::NewGame => {
                self.engine.start_new_game(self.config);
                self.last_tick = Instant::now();
                self.moves = 0;
                self.render(output)?;
            }
            Command::Show => self.render(output)?,
            Command::Json => {
                let snapshot = Snapshot::from_engine(&self.engine);
                serde_json::to_writer(&mut *output, &snapshot).context("Could not encode state")?;
                writeln!(output)?;
            }
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    /// Hands every whole second since the last tick to the engine.
    fn tick(&mut self) {
        let whole_secs = self.last_tick.elapsed().as_secs();
        if whole_secs == 0 {
            return;
        }
        self.last_tick += Duration::from_secs(whole_secs);

        if self.engine.is_game_over() {
            return;
        }
        for _ in 0..whole_secs {
            self.engine.increase_timer();
        }
    }

    fn render(&self, output: &mut impl Write) -> anyhow::Result<()> {
        write!(output, "{}", Snapshot::from_engine(&self.engine))?;
        if self.engine.is_game_over() {
            writeln!(output, "Game over! Final score: {}", self.engine.score())?;
        }
        Ok(())
    }
}
