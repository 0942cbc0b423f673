//! `pwvault audit`: display the audit log.
//!
//! Usage:
//!   pwvault audit               # show last 50 entries
//!   pwvault audit --last 20     # show last 20
//!   pwvault audit --since 7d    # entries from last 7 days

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{parse_since, AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{Result, VaultError};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let ctx = Context::load(cli)?;

    let audit = AuditLog::open(ctx.store_dir())
        .ok_or_else(|| VaultError::AuditError("failed to open audit database".into()))?;

    let since_dt = since.map(parse_since).transpose()?;
    let entries = audit.query(ctx.owner.as_str(), last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Item", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.item_id.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    match op {
        "add" => style(op).green().to_string(),
        "edit" => style(op).blue().to_string(),
        "delete" => style(op).red().to_string(),
        "rekey" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorize_operation_keeps_name() {
        console::set_colors_enabled(false);
        assert_eq!(colorize_operation("add"), "add");
        assert_eq!(colorize_operation("rekey"), "rekey");
        assert_eq!(colorize_operation("unknown"), "unknown");
    }
}
