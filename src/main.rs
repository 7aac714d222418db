//! Binary entry point that glues the SQLite-backed pitch store to the TUI.
//! Summarizing the bootstrapping pipeline here keeps the intent obvious when
//! revisiting the code: we bring up the database, resolve the export
//! destination, and drive the Ratatui event loop until the user exits.
use pitch_tracker::{default_db_path, default_export_dir, open_store, run_app, App};

/// Initialize persistence and launch the Ratatui event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing silently.
fn main() -> anyhow::Result<()> {
    let db_path = default_db_path()?;
    let conn = open_store(&db_path)?;
    let export_dir = default_export_dir()?;

    let mut app = App::new(conn, export_dir);
    run_app(&mut app)
}
