//! The application core: categories, notes, timer and the controller tying them together.
//! Nothing here touches storage or the terminal; [state::AppState::dispatch] reports which
//! [state::Section]s changed and the caller persists them.

pub mod categories;
pub mod commands;
pub mod graph;
pub mod keyboard;
pub mod notes;
pub mod state;
pub mod timer;
