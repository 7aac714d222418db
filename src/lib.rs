//! Core library surface for the Pitch Tracker TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces. Keeping the glue logic documented makes it easy to recall why each
//! re-export exists when revisiting the project.
pub mod db;
pub mod export;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store.
pub use db::{default_db_path, open_store};

/// The CSV exporter and its default destination directory.
pub use export::{default_export_dir, export_to_csv};

/// The domain types that other layers manipulate.
pub use models::{PitchFlags, PitchRecord};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
