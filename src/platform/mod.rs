//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Input (logical actions, keyboard bindings)
//! - Time (frame clock with delta clamping)
//! - Score reporting (sink notified on change)
//! - Browser front end (wasm only)

pub mod input;
pub mod score;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Action, InputSource, KeyboardState, NoInput, read_tick_input};
pub use score::{NullSink, ScoreSink, ScoreSnapshot};
pub use time::FrameClock;
