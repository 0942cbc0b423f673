//! One module per subcommand.  Each exposes an `execute` function.

pub mod add;
#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod generate;
pub mod get;
pub mod list;
pub mod rekey;
pub mod token;
pub mod version;
