//! Persistence module split across logical submodules.

mod connection;
mod pitches;

pub use connection::{default_db_path, open_store};
pub use pitches::{delete_all_pitches, fetch_pitches, record_pitch, PitchValidation};
