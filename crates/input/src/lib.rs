//! Orbit interaction: raw pointer/scroll events mapped to camera actions.
//!
//! # Invariants
//! - Windowing code never touches the camera directly; it feeds `InputEvent`s
//!   and forwards the resulting `Action`s.
//! - Scroll zoom is only honored while no drag is in progress.

pub mod action;
pub mod interaction;

pub use action::{Action, InputEvent, PointerButton};
pub use interaction::{InteractionController, InteractionModes, InteractionState};
