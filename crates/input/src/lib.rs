//! Input: raw per-frame input state mapped to explicit actions.
//!
//! # Invariants
//! - Input polling never mutates the camera; it only produces actions.
//! - `Quit` is always the first action of a frame that carries it.

pub mod action;
pub mod state;

pub use action::{Action, map_actions};
pub use state::{InputState, Key};
