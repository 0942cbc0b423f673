//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::StoredItem;
use crate::vault::SecretRecord;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// A stored item paired with its decrypted record, or `None` when the
/// record could not be opened with the given master password.
pub type ListedItem<'a> = (&'a StoredItem, Option<SecretRecord>);

/// Print a table of items (Id, Title, Username, Url, Updated).
pub fn print_items_table(items: &[ListedItem<'_>]) {
    if items.is_empty() {
        info("No items yet.");
        tip("Run `pwvault add` to store your first password.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Title", "Username", "Url", "Updated"]);

    for (item, record) in items {
        let (title, username, url) = match record {
            Some(r) => (
                r.title.clone(),
                r.username.clone().unwrap_or_else(|| "-".into()),
                r.url.clone().unwrap_or_else(|| "-".into()),
            ),
            None => (
                style("<unreadable>").red().to_string(),
                "-".into(),
                "-".into(),
            ),
        };
        table.add_row(vec![
            item.id.to_string(),
            title,
            username,
            url,
            item.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print one decrypted record as `field: value` lines.
pub fn print_record(item: &StoredItem, record: &SecretRecord) {
    let field = |name: &str, value: &str| println!("{} {value}", style(format!("{name}:")).bold());

    field("Title", &record.title);
    if let Some(username) = &record.username {
        field("Username", username);
    }
    field("Password", &record.password);
    if let Some(url) = &record.url {
        field("Url", url);
    }
    if let Some(notes) = &record.notes {
        field("Notes", notes);
    }
    println!(
        "{}",
        style(format!(
            "id {} · updated {}",
            item.id,
            item.updated_at.format("%Y-%m-%d %H:%M:%S")
        ))
        .dim()
    );
}
