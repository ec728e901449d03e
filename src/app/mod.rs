//! The single-screen application: state, view and task runner.
//!
//! ```text
//!  user action ──▶ Message ──▶ update(state) ──▶ Command ──▶ task
//!                     ▲                                      │
//!                     └──────────── Message ◀────────────────┘
//! ```
//!
//! * [`state`]: [`AppState`] and the pure [`update`] transition
//! * [`view`]: [`render`] the state as text
//! * [`controller`]: owns the state and runs commands as tokio tasks

pub mod controller;
pub mod state;
pub mod view;

pub use controller::Controller;
pub use state::{update, AppState, Command, Message};
pub use view::{render, Screen};
