//! `pwvault edit`: change an item's fields.
//!
//! The item is decrypted, updated, and encrypted again with a fresh salt.
//! Fields not given on the command line are prompted for, with the
//! current value pre-filled.  A flag value is stored exactly as given, so
//! `--notes ""` records an empty note.  An empty prompt answer clears an
//! optional field, except that a field which was already an empty string
//! stays one.

use crate::cli::output;
use crate::cli::{non_empty, prompt_master_password, prompt_text, Cli, Context, FieldArgs};
use crate::errors::Result;
use crate::generator::{generate_password, GeneratorOptions};
use crate::store::{EnvelopeStore, ItemId};
use crate::vault::SecretRecord;

/// Execute the `edit` command.
pub fn execute(cli: &Cli, id: &str, fields: &FieldArgs, generate: bool) -> Result<()> {
    let ctx = Context::load(cli)?;
    let id: ItemId = id.parse()?;

    let store = ctx.open_store()?;
    let item = store.get(&ctx.owner, &id)?;

    let master = prompt_master_password()?;
    let current = ctx.codec.decrypt(&item.envelope, &master)?;

    let mut updated = if fields.is_empty() && !generate {
        prompt_changes(&current)?
    } else {
        apply_fields(&current, fields)
    };
    if generate {
        updated.password = generate_password(&GeneratorOptions::default())?.to_string();
    }

    if updated == current {
        output::info("Nothing changed.");
        return Ok(());
    }

    let envelope = ctx.codec.encrypt(&updated, &master)?;
    store.update(&ctx.owner, &id, envelope)?;

    ctx.audit("edit", Some(&id.to_string()), None);
    output::success(&format!("Updated '{}'", updated.title));

    Ok(())
}

/// Overlay command-line fields on the current record.
fn apply_fields(current: &SecretRecord, fields: &FieldArgs) -> SecretRecord {
    let pick = |flag: &Option<String>, old: &Option<String>| flag.clone().or_else(|| old.clone());

    SecretRecord {
        title: fields.title.clone().unwrap_or_else(|| current.title.clone()),
        username: pick(&fields.username, &current.username),
        password: current.password.clone(),
        url: pick(&fields.url, &current.url),
        notes: pick(&fields.notes, &current.notes),
    }
}

fn prompt_changes(current: &SecretRecord) -> Result<SecretRecord> {
    let title = prompt_text("Title", Some(&current.title), true)?;
    let username = prompt_text("Username", current.username.as_deref(), false)?;
    let url = prompt_text("Url", current.url.as_deref(), false)?;
    let notes = prompt_text("Notes", current.notes.as_deref(), false)?;

    let change_password = dialoguer::Confirm::new()
        .with_prompt("Change password?")
        .default(false)
        .interact()
        .map_err(|e| crate::errors::VaultError::CommandFailed(format!("confirm prompt: {e}")))?;
    let password = if change_password {
        crate::cli::read_item_password("New password")?.to_string()
    } else {
        current.password.clone()
    };

    Ok(SecretRecord {
        title,
        username: prompted_field(username, &current.username),
        password,
        url: prompted_field(url, &current.url),
        notes: prompted_field(notes, &current.notes),
    })
}

/// Map a prompt answer to a field value.  Blank means absent, unless the
/// field already held an empty string.
fn prompted_field(answer: String, old: &Option<String>) -> Option<String> {
    if answer.is_empty() && old.as_deref() == Some("") {
        return Some(answer);
    }
    non_empty(answer)
}
