//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::auth::TokenAuthority;
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::store::{FileStore, OwnerId};
use crate::vault::{validate_master_password, VaultCodec};

/// Environment variable holding the master password for scripted use.
pub const MASTER_PASSWORD_ENV: &str = "PWVAULT_MASTER_PASSWORD";

/// pwvault CLI: password vault with client-side encryption.
#[derive(Parser)]
#[command(
    name = "pwvault",
    about = "Password vault with client-side encryption",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Owner the items belong to (ignored when a token is given)
    #[arg(long, default_value = "local", global = true)]
    pub owner: String,

    /// Bearer token identifying the owner
    #[arg(long, env = "PWVAULT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Store file (default: store_path from .pwvault.toml)
    #[arg(long, global = true)]
    pub store: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Add a new item
    Add {
        #[command(flatten)]
        fields: FieldArgs,

        /// Generate a random password instead of prompting for one
        #[arg(short, long)]
        generate: bool,
    },

    /// Decrypt and show one item
    Get {
        /// Item id (from `pwvault list`)
        id: String,

        /// Copy the password to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// List all items
    List {
        /// Only show items whose title, username or url contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Change an item (re-encrypted with a fresh salt)
    Edit {
        /// Item id
        id: String,

        #[command(flatten)]
        fields: FieldArgs,

        /// Replace the password with a generated one
        #[arg(short, long)]
        generate: bool,
    },

    /// Delete an item
    Delete {
        /// Item id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password
    Generate {
        #[command(flatten)]
        options: GenerateArgs,
    },

    /// Re-encrypt every item with the current KDF settings
    Rekey {
        /// Also change the master password
        #[arg(long)]
        new_password: bool,
    },

    /// Issue or check bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Record fields given on the command line.  Anything left out is prompted
/// for interactively (`add`) or kept as is (`edit`).
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Item title
    #[arg(long)]
    pub title: Option<String>,

    /// Login name
    #[arg(long)]
    pub username: Option<String>,

    /// Site address
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl FieldArgs {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.username.is_none() && self.url.is_none() && self.notes.is_none()
    }
}

/// Password generator switches.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Password length (8-128)
    #[arg(short, long, default_value = "16")]
    pub length: usize,

    /// Leave out uppercase letters
    #[arg(long)]
    pub no_upper: bool,

    /// Leave out lowercase letters
    #[arg(long)]
    pub no_lower: bool,

    /// Leave out digits
    #[arg(long)]
    pub no_digits: bool,

    /// Leave out symbols
    #[arg(long)]
    pub no_symbols: bool,

    /// Allow easily confused characters (0/O, 1/l/I)
    #[arg(long)]
    pub allow_lookalikes: bool,
}

impl From<&GenerateArgs> for crate::generator::GeneratorOptions {
    fn from(args: &GenerateArgs) -> Self {
        Self {
            length: args.length,
            uppercase: !args.no_upper,
            lowercase: !args.no_lower,
            digits: !args.no_digits,
            symbols: !args.no_symbols,
            exclude_lookalikes: !args.allow_lookalikes,
        }
    }
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            length: 16,
            no_upper: false,
            no_lower: false,
            no_digits: false,
            no_symbols: false,
            allow_lookalikes: false,
        }
    }
}

/// Token subcommands.
#[derive(clap::Subcommand)]
pub enum TokenAction {
    /// Issue a token for an owner
    Issue {
        /// Owner id to embed in the token
        subject: String,
        /// Optional email to embed
        #[arg(long)]
        email: Option<String>,
    },

    /// Verify a token and print the owner it maps to
    Verify {
        /// The token to check
        #[arg(value_name = "TOKEN")]
        bearer: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Everything a command needs to reach the store.
pub struct Context {
    pub settings: Settings,
    pub store_path: PathBuf,
    pub owner: OwnerId,
    pub codec: VaultCodec,
}

impl Context {
    /// Load settings from the working directory and resolve store, owner
    /// and codec from them and the CLI flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let settings = Settings::load(&cwd)?;

        let store_path = match &cli.store {
            Some(p) => cwd.join(p),
            None => settings.store_path(&cwd),
        };
        let owner = resolve_owner(cli, &settings)?;
        let codec = VaultCodec::new(settings.kdf_params())?;

        tracing::debug!(
            store = %store_path.display(),
            owner = %owner,
            kdf = %codec.params(),
            "context loaded"
        );

        Ok(Self {
            settings,
            store_path,
            owner,
            codec,
        })
    }

    /// Open the store file, which must already exist.
    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(&self.store_path)
    }

    /// Directory that holds the store file (and the audit database).
    pub fn store_dir(&self) -> &Path {
        self.store_path.parent().unwrap_or(Path::new("."))
    }

    /// Record an audit event next to the store.  Never fails the command.
    pub fn audit(&self, op: &str, item: Option<&str>, details: Option<&str>) {
        #[cfg(feature = "audit-log")]
        {
            if let Some(log) = crate::audit::AuditLog::open(self.store_dir()) {
                log.log(op, self.owner.as_str(), item, details);
            }
        }

        #[cfg(not(feature = "audit-log"))]
        let _ = (op, item, details);
    }
}

/// Build the token authority from settings.
pub fn token_authority(settings: &Settings) -> Result<TokenAuthority> {
    authority_with_secret(settings, settings.token_secret())
}

fn authority_with_secret(settings: &Settings, secret: Option<String>) -> Result<TokenAuthority> {
    let secret = secret.ok_or_else(|| {
        VaultError::ConfigError(format!(
            "no token secret: set token_secret in {} or {}",
            Settings::FILE_NAME,
            Settings::TOKEN_SECRET_ENV
        ))
    })?;
    Ok(TokenAuthority::new(secret.as_bytes())?.with_lifetime(settings.token_lifetime()?))
}

/// The owner for this invocation: a verified token wins over `--owner`.
pub fn resolve_owner(cli: &Cli, settings: &Settings) -> Result<OwnerId> {
    owner_for(&cli.owner, cli.token.as_deref(), || token_authority(settings))
}

fn owner_for(
    owner_flag: &str,
    token: Option<&str>,
    authority: impl FnOnce() -> Result<TokenAuthority>,
) -> Result<OwnerId> {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => Ok(authority()?.verify(token)?.owner),
        None => OwnerId::new(owner_flag),
    }
}

/// Get the master password, trying in order:
/// 1. `PWVAULT_MASTER_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_master_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(MASTER_PASSWORD_ENV) {
        if !pw.is_empty() {
            let pw = Zeroizing::new(pw);
            validate_master_password(&pw)?;
            return Ok(pw);
        }
    }

    let pw = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Master password")
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
    );
    validate_master_password(&pw)?;
    Ok(pw)
}

/// Prompt for a new master password with confirmation (used by `rekey`).
///
/// Keeps asking until the password is long enough.
pub fn prompt_new_master_password() -> Result<Zeroizing<String>> {
    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("New master password")
                .with_confirmation(
                    "Confirm new master password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        match validate_master_password(&password) {
            Ok(()) => return Ok(password),
            Err(e) => output::warning(&format!("{e}. Try again.")),
        }
    }
}

/// Read an item password: piped stdin when not a terminal, otherwise a
/// hidden interactive prompt.
pub fn read_item_password(prompt: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        return Ok(trimmed);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a line of text; empty input is allowed when `required` is false.
pub fn prompt_text(prompt: &str, initial: Option<&str>, required: bool) -> Result<String> {
    let mut input = dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(!required);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input
        .interact_text()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))
}

/// Empty text means "no value".
pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
