//! Random password generation.
//!
//! Characters are drawn uniformly from the selected classes with a
//! CSPRNG.  Every selected class is guaranteed to appear at least once.

use rand::seq::SliceRandom;
use rand::Rng;
use zeroize::Zeroizing;

use crate::crypto::random::seeded_rng;
use crate::errors::{Result, VaultError};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters that are easy to confuse with each other.
const LOOKALIKES: &str = "0O1lI";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;

/// Which characters a generated password may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
    pub exclude_lookalikes: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
            exclude_lookalikes: true,
        }
    }
}

impl GeneratorOptions {
    /// The enabled character classes, lookalikes removed if requested.
    fn classes(&self) -> Vec<Vec<char>> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, set)| {
            set.chars()
                .filter(|c| !(self.exclude_lookalikes && LOOKALIKES.contains(*c)))
                .collect()
        })
        .collect()
    }
}

/// Generate a password according to `options`.
pub fn generate_password(options: &GeneratorOptions) -> Result<Zeroizing<String>> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&options.length) {
        return Err(VaultError::Validation(format!(
            "length must be between {MIN_LENGTH} and {MAX_LENGTH}"
        )));
    }

    let classes = options.classes();
    if classes.is_empty() {
        return Err(VaultError::Validation(
            "select at least one character type".into(),
        ));
    }

    let pool: Vec<char> = classes.iter().flatten().copied().collect();
    let mut rng = seeded_rng()?;

    // Buffers are sized up front so no reallocation leaves a copy behind.
    let mut chars: Zeroizing<Vec<char>> =
        Zeroizing::new(Vec::with_capacity(options.length.max(classes.len())));

    // One guaranteed pick per class, the rest from the full pool.
    chars.extend(
        classes
            .iter()
            .map(|class| class[rng.random_range(0..class.len())]),
    );
    while chars.len() < options.length {
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    let mut password = Zeroizing::new(String::with_capacity(chars.len() * 4));
    password.extend(chars.iter());
    Ok(password)
}
