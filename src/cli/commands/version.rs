//! `pwvault version`: display version and crypto defaults.

use console::style;

use crate::crypto::KdfParams;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("pwvault {}", env!("CARGO_PKG_VERSION"));
    println!(
        "{}",
        style(format!("AES-256-GCM, default KDF {}", KdfParams::default())).dim()
    );
    Ok(())
}
