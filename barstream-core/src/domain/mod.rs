//! Domain types shared by every stage of the replay.

pub mod bar;

pub use bar::{Bar, BarField};

/// Symbol type alias
pub type Symbol = String;
