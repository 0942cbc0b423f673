//! `pwvault delete`: remove an item from the store.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{Result, VaultError};
use crate::store::{EnvelopeStore, ItemId};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let ctx = Context::load(cli)?;
    let id: ItemId = id.parse()?;

    let store = ctx.open_store()?;
    // Fail before prompting if the item is not there.
    store.get(&ctx.owner, &id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete item {id}?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    store.delete(&ctx.owner, &id)?;

    ctx.audit("delete", Some(&id.to_string()), None);
    output::success(&format!("Deleted item {id}"));

    Ok(())
}
