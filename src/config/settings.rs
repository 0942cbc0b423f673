use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{KdfParams, DEFAULT_PBKDF2_ITERATIONS};
use crate::errors::{Result, VaultError};

/// Which KDF new envelopes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfChoice {
    Pbkdf2,
    Argon2id,
}

/// Project-level configuration, loaded from `.pwvault.toml`.
///
/// Every field has a sensible default so pwvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Store file path (relative to the project root).
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// KDF for new envelopes (default: pbkdf2).
    #[serde(default = "default_kdf")]
    pub kdf: KdfChoice,

    /// PBKDF2 iteration count (default: 600 000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Secret used to sign bearer tokens.  `PWVAULT_TOKEN_SECRET` wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,

    /// How long issued tokens stay valid, in hours (default: 7 days).
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store_path() -> String {
    ".pwvault/items.pwv".to_string()
}

fn default_kdf() -> KdfChoice {
    KdfChoice::Pbkdf2
}

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_PBKDF2_ITERATIONS
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_token_lifetime_hours() -> i64 {
    7 * 24
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            kdf: default_kdf(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            token_secret: None,
            token_lifetime_hours: default_token_lifetime_hours(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".pwvault.toml";

    /// Environment variable that overrides `token_secret`.
    pub const TOKEN_SECRET_ENV: &'static str = "PWVAULT_TOKEN_SECRET";

    /// Load settings from `<project_dir>/.pwvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the store file.
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.store_path)
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        match self.kdf {
            KdfChoice::Pbkdf2 => KdfParams::pbkdf2(self.pbkdf2_iterations),
            KdfChoice::Argon2id => KdfParams::Argon2id {
                memory_kib: self.argon2_memory_kib,
                iterations: self.argon2_iterations,
                parallelism: self.argon2_parallelism,
            },
        }
    }

    /// The token signing secret: `PWVAULT_TOKEN_SECRET` first, then the file.
    pub fn token_secret(&self) -> Option<String> {
        self.token_secret_with(std::env::var(Self::TOKEN_SECRET_ENV).ok())
    }

    /// Like [`Settings::token_secret`], with the environment value passed in.
    pub fn token_secret_with(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|s| !s.is_empty())
            .or_else(|| self.token_secret.clone())
    }

    /// Token lifetime as a duration.
    pub fn token_lifetime(&self) -> Result<chrono::Duration> {
        if self.token_lifetime_hours < 1 {
            return Err(VaultError::ConfigError(
                "token_lifetime_hours must be at least 1".into(),
            ));
        }
        chrono::Duration::try_hours(self.token_lifetime_hours).ok_or_else(|| {
            VaultError::ConfigError("token_lifetime_hours is too large".into())
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────
