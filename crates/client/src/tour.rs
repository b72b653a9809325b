//! Scripted player input for headless runs.
//!
//! A tour is written as `;`-separated steps:
//!
//! ```text
//! walk 2 5; walk 5 3; face up; press a
//! ```

use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use monster_core::event::Button;
use monster_core::{Direction, Position};
use monster_runtime::{GameHost, Session};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TourStep {
    /// Pathfind the player to a tile.
    Walk(Position),
    Face(Direction),
    Press(Button),
}

impl TourStep {
    pub fn apply<H: GameHost>(&self, session: &mut Session, host: &mut H) -> Result<()> {
        match *self {
            Self::Walk(tile) => {
                session.walk_player_to(tile);
            }
            Self::Face(direction) => {
                let player = session
                    .world_mut()
                    .player_mut()
                    .ok_or_else(|| anyhow!("no player to turn"))?;
                player.mover.set_facing(direction);
            }
            Self::Press(button) => {
                if !session.press(button, host) {
                    tracing::info!(%button, "nothing happened");
                }
            }
        }
        Ok(())
    }
}

impl FromStr for TourStep {
    type Err = anyhow::Error;

    fn from_str(step: &str) -> Result<Self> {
        let words: Vec<&str> = step.split_whitespace().collect();
        match words.as_slice() {
            ["walk", x, y] => {
                let x = x.parse().with_context(|| format!("bad x in '{step}'"))?;
                let y = y.parse().with_context(|| format!("bad y in '{step}'"))?;
                Ok(Self::Walk(Position::new(x, y)))
            }
            ["face", direction] => direction
                .parse()
                .map(Self::Face)
                .map_err(|_| anyhow!("unknown direction in '{step}'")),
            ["press", button] => button
                .parse()
                .map(Self::Press)
                .map_err(|_| anyhow!("unknown button in '{step}'")),
            _ => bail!("unrecognised tour step '{step}'"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tour {
    steps: Vec<TourStep>,
}

impl Tour {
    /// Through the tall grass of `route_1`, then a word with the rival.
    pub const DEFAULT: &'static str = "walk 2 5; walk 5 3; face up; press a";

    pub fn parse(script: &str) -> Result<Self> {
        let steps = script
            .split(';')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(TourStep::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[TourStep] {
        &self.steps
    }
}
