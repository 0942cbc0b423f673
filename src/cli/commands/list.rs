//! `pwvault list`: show the caller's items, newest first.

use crate::cli::output;
use crate::cli::{prompt_master_password, Cli, Context};
use crate::errors::Result;
use crate::store::EnvelopeStore;

/// Execute the `list` command.
pub fn execute(cli: &Cli, search: Option<&str>) -> Result<()> {
    let ctx = Context::load(cli)?;
    let store = ctx.open_store()?;
    let items = store.list(&ctx.owner)?;

    if items.is_empty() {
        output::print_items_table(&[]);
        return Ok(());
    }

    let master = prompt_master_password()?;

    // An item that fails to decrypt is still listed, flagged as unreadable.
    let mut unreadable = 0usize;
    let listed: Vec<output::ListedItem<'_>> = items
        .iter()
        .map(|item| match ctx.codec.decrypt(&item.envelope, &master) {
            Ok(record) => (item, Some(record)),
            Err(e) => {
                tracing::debug!(id = %item.id, error = %e, "item not readable");
                unreadable += 1;
                (item, None)
            }
        })
        .filter(|(_, record)| match (search, record) {
            (None, _) => true,
            (Some(q), Some(r)) => r.matches(q),
            (Some(_), None) => false,
        })
        .collect();

    output::print_items_table(&listed);
    if unreadable > 0 {
        output::warning(&format!(
            "{unreadable} item(s) could not be decrypted with this master password"
        ));
    }

    Ok(())
}
