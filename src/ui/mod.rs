//! Ratatui front-end: the roster view, its forms and the terminal loop.

mod app;
mod forms;
mod helpers;
mod remote;
mod terminal;

pub use app::App;
pub use terminal::run_app;
