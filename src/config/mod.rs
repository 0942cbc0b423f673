//! Project configuration (`.pwvault.toml`).

pub mod settings;

pub use settings::{KdfChoice, Settings};
