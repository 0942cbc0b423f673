//! `pwvault get`: decrypt and print a single item.

use std::thread;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{prompt_master_password, Cli, Context};
use crate::errors::{Result, VaultError};
use crate::store::{EnvelopeStore, ItemId};

/// How long a copied password stays on the clipboard.
pub const CLIPBOARD_CLEAR_SECS: u64 = 15;

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str, copy: bool) -> Result<()> {
    let ctx = Context::load(cli)?;
    let id: ItemId = id.parse()?;

    let store = ctx.open_store()?;
    let item = store.get(&ctx.owner, &id)?;

    let master = prompt_master_password()?;
    let record = ctx.codec.decrypt(&item.envelope, &master)?;

    if copy {
        let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
        clipboard
            .set_text(record.password.as_str())
            .map_err(clipboard_error)?;
        output::success(&format!(
            "Password for '{}' copied to clipboard (will clear in {CLIPBOARD_CLEAR_SECS} seconds)",
            record.title
        ));

        // The clipboard owner must stay alive for the copy to be served on X11/Wayland.
        thread::sleep(Duration::from_secs(CLIPBOARD_CLEAR_SECS));
        if clear_if_unchanged(&mut clipboard, &record.password)? {
            tracing::debug!(item = %item.id, "clipboard cleared");
        }
    } else {
        output::print_record(&item, &record);
    }

    Ok(())
}

fn clipboard_error(e: arboard::Error) -> VaultError {
    VaultError::CommandFailed(format!("clipboard: {e}"))
}

/// The clipboard operations `get --copy` needs once the timer runs out.
pub(crate) trait ClipboardSlot {
    fn read(&mut self) -> Option<Zeroizing<String>>;
    fn clear(&mut self) -> Result<()>;
}

impl ClipboardSlot for arboard::Clipboard {
    fn read(&mut self) -> Option<Zeroizing<String>> {
        self.get_text().ok().map(Zeroizing::new)
    }

    fn clear(&mut self) -> Result<()> {
        arboard::Clipboard::clear(self).map_err(clipboard_error)
    }
}

/// Clear the clipboard if it still holds `password`.
///
/// Returns `false` when the user has copied something else in the meantime;
/// that content is left alone.
pub(crate) fn clear_if_unchanged(slot: &mut impl ClipboardSlot, password: &str) -> Result<bool> {
    match slot.read() {
        Some(current) if current.as_str() == password => {
            slot.clear()?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeClipboard {
        text: Option<String>,
        clears: usize,
    }

    impl ClipboardSlot for FakeClipboard {
        fn read(&mut self) -> Option<Zeroizing<String>> {
            self.text.clone().map(Zeroizing::new)
        }

        fn clear(&mut self) -> Result<()> {
            self.text = None;
            self.clears += 1;
            Ok(())
        }
    }

    #[test]
    fn clears_when_password_still_copied() {
        let mut clip = FakeClipboard {
            text: Some("Tr0ub4dor&3".into()),
            ..Default::default()
        };
        assert!(clear_if_unchanged(&mut clip, "Tr0ub4dor&3").unwrap());
        assert_eq!(clip.text, None);
        assert_eq!(clip.clears, 1);
    }

    #[test]
    fn leaves_newer_content_alone() {
        let mut clip = FakeClipboard {
            text: Some("something the user copied later".into()),
            ..Default::default()
        };
        assert!(!clear_if_unchanged(&mut clip, "Tr0ub4dor&3").unwrap());
        assert_eq!(clip.text.as_deref(), Some("something the user copied later"));
        assert_eq!(clip.clears, 0);
    }

    #[test]
    fn empty_clipboard_is_not_touched() {
        let mut clip = FakeClipboard::default();
        assert!(!clear_if_unchanged(&mut clip, "Tr0ub4dor&3").unwrap());
        assert_eq!(clip.clears, 0);
    }
}
