//! Engine of the PixelDeck retro console: a 20×20 dot-matrix frame buffer,
//! the rule engines of its games, the adapters that plug them into the
//! console, and the console state machine itself.
//!
//! Everything here is synchronous and driven by a 100ms tick supplied by the
//! host. Hosts feed [`Console`] with button presses, dot clicks and ticks and
//! read back its [`Frame`] and status line.
//!
//! The crate is `no_std` with `alloc`; the default `std` feature adds the
//! wall-clock [`SystemClock`].

#![no_std]

extern crate alloc;

pub use adapters::*;
pub use clock::*;
pub use color::*;
pub use console::*;
pub use error::*;
pub use font::*;
pub use frame::*;
pub use games::*;
pub use types::*;

mod adapters;
mod clock;
mod color;
mod console;
mod error;
mod font;
mod frame;
mod games;
mod types;
