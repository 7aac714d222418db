//! Ratatui front end split across logical submodules: the central `App` state
//! machine, form and screen state, small rendering helpers, and the terminal
//! event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
