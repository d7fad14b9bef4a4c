//! Core library surface for the Student Marks Manager TUI.
//!
//! The binary only wires configuration, logging and the tokio runtime
//! together; everything it drives lives here so integration tests can reach
//! the same pieces.
pub mod api;
pub mod config;
pub mod logging;
pub mod marks;
pub mod models;
pub mod roster;
pub mod summary;
pub mod ui;

/// HTTP access to the roster backend.
pub use api::{ApiError, RosterClient};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
pub use logging::init_logging;

/// Domain types and the state container the view mutates.
pub use models::{Mark, MarksUpdate, Student, StudentDraft};
pub use roster::{Roster, RosterError};
pub use summary::{class_average, student_average, top_student, ClassSummary, TopStudent};

/// The interactive roster view and its event loop.
pub use ui::{run_app, App};
