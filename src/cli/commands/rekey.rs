//! `pwvault rekey`: re-encrypt every item.
//!
//! Decrypts all of the owner's items with the current master password,
//! then encrypts each one again with a fresh salt and the KDF settings
//! from `.pwvault.toml`, optionally under a new master password.  Nothing
//! is written unless every item decrypts, and the new envelopes replace
//! the old ones in a single store write.

use crate::cli::output;
use crate::cli::{prompt_master_password, prompt_new_master_password, Cli, Context};
use crate::errors::Result;
use crate::store::EnvelopeStore;

/// Execute the `rekey` command.
pub fn execute(cli: &Cli, new_password: bool) -> Result<()> {
    let ctx = Context::load(cli)?;
    let store = ctx.open_store()?;
    let items = store.list(&ctx.owner)?;

    if items.is_empty() {
        output::info("No items to re-encrypt.");
        return Ok(());
    }

    // 1. Decrypt everything first with the current password.
    output::info("Enter your current master password.");
    let old_master = prompt_master_password()?;
    let records = items
        .iter()
        .map(|item| ctx.codec.decrypt(&item.envelope, &old_master))
        .collect::<Result<Vec<_>>>()?;

    // 2. Pick the password for the new envelopes.
    let new_master = if new_password {
        output::info("Choose your new master password.");
        prompt_new_master_password()?
    } else {
        old_master.clone()
    };

    // 3. Encrypt everything before writing anything.
    let envelopes = records
        .iter()
        .map(|record| ctx.codec.encrypt(record, &new_master))
        .collect::<Result<Vec<_>>>()?;

    let upgraded = items
        .iter()
        .filter(|item| ctx.codec.needs_upgrade(&item.envelope).unwrap_or(true))
        .count();

    // 4. One write for the whole batch.
    let updates = items.iter().map(|item| item.id).zip(envelopes).collect();
    store.update_many(&ctx.owner, updates)?;

    let details = format!(
        "{} items re-encrypted, {} moved to {}",
        items.len(),
        upgraded,
        ctx.codec.params()
    );
    tracing::info!(count = items.len(), upgraded, "rekey complete");
    ctx.audit("rekey", None, Some(&details));

    output::success(&format!(
        "{} items re-encrypted with {}",
        items.len(),
        ctx.codec.params()
    ));

    Ok(())
}
