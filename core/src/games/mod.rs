use serde::{Deserialize, Serialize};

use crate::{Frame, Tick};

pub use caro::*;
pub use caro_ai::*;
pub use line::*;
pub use memory::*;
pub use paint::*;
pub use snake::*;
pub use tictactoe::*;

mod caro;
mod caro_ai;
mod line;
mod memory;
mod paint;
mod snake;
mod tictactoe;

/// Final result of a two-sided game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome<M> {
    Won(M),
    Draw,
}

impl<M: Copy> Outcome<M> {
    pub fn winner(self) -> Option<M> {
        match self {
            Outcome::Won(mark) => Some(mark),
            Outcome::Draw => None,
        }
    }
}

/// Rule engine state that can draw itself onto a fresh frame.
pub trait Render {
    fn render(&self, tick: Tick) -> Frame;
}

/// `true` on the first half of every `2 * period` ticks.
pub const fn blink(tick: Tick, period: Tick) -> bool {
    period == 0 || (tick / period) % 2 == 0
}
