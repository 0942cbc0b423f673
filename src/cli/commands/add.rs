//! `pwvault add`: encrypt a new item and put it in the store.

use crate::cli::output;
use crate::cli::{
    non_empty, prompt_master_password, prompt_text, read_item_password, Cli, Context, FieldArgs,
};
use crate::errors::Result;
use crate::generator::{generate_password, GeneratorOptions};
use crate::store::{EnvelopeStore, FileStore};
use crate::vault::SecretRecord;

/// Execute the `add` command.
pub fn execute(cli: &Cli, fields: &FieldArgs, generate: bool) -> Result<()> {
    let ctx = Context::load(cli)?;

    // Title is required, the rest may be left blank.
    let title = match &fields.title {
        Some(t) => t.clone(),
        None => prompt_text("Title", None, true)?,
    };
    // A blank prompt answer means "not set"; a flag is stored as given.
    let (username, url, notes) = if fields.is_empty() {
        (
            non_empty(prompt_text("Username", None, false)?),
            non_empty(prompt_text("Url", None, false)?),
            non_empty(prompt_text("Notes", None, false)?),
        )
    } else {
        (
            fields.username.clone(),
            fields.url.clone(),
            fields.notes.clone(),
        )
    };

    let password = if generate {
        generate_password(&GeneratorOptions::default())?
    } else {
        read_item_password(&format!("Password for {title}"))?
    };

    let record = SecretRecord {
        title,
        username,
        password: password.to_string(),
        url,
        notes,
    };
    record.validate()?;

    let master = prompt_master_password()?;
    let envelope = ctx.codec.encrypt(&record, &master)?;

    let store = FileStore::open_or_create(&ctx.store_path)?;
    let item = store.insert(&ctx.owner, envelope)?;

    ctx.audit("add", Some(&item.id.to_string()), None);
    output::success(&format!("Added '{}' ({})", record.title, item.id));
    if generate {
        output::tip("Run `pwvault get <id>` to see the generated password.");
    }

    Ok(())
}
