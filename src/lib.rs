//! Calculator whose display doubles as a password prompt.
//!
//! [`calc_engine`] evaluates keystroke-built expressions in a single forward
//! scan. [`session`] sits on top of it and decides whether `=` evaluates,
//! unlocks or opens the settings screen.

pub mod calc_engine;
pub mod display;
pub mod history;
pub mod session;
pub mod settings;
pub mod store;
