//! Two-board falling-block duel: a human board against a heuristic autoplayer,
//! coupled by gifts, row exchanges and shared slowdowns.
//!
//! Rendering, input devices and timers live outside the crate. They drive a
//! [`Duel`] through `tick` / `apply_input` / `end_slowdown` and listen through
//! [`MatchObserver`].

use wasm_bindgen::prelude::*;

pub mod autoplayer;
pub mod board;
pub mod duel;
pub mod events;
pub mod pieces;
pub mod session;
pub mod settings;
pub mod transform;
pub mod view;
pub mod wasm;

pub use autoplayer::{Placement, find_best_placement, make_ai_move};
pub use board::Board;
pub use duel::{Command, Duel};
pub use events::{EventLog, MatchEvent, MatchObserver, NullObserver};
pub use pieces::{PieceKind, Shape};
pub use session::{ActivePiece, ClearReport, Session, Side, TickOutcome};
pub use settings::{Controller, MatchSettings};
pub use view::{DuelView, SessionView};

pub const WIDTH: usize = 12;
pub const HEIGHT: usize = 20;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn log(msg: &str) {
    tracing::info!("{msg}");
}
