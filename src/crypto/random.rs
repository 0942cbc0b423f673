//! Access to the operating-system CSPRNG.
//!
//! Every random byte pwvault uses (salts, nonces, item ids, generated
//! passwords) comes through here.  Reads are fallible: if the OS source
//! cannot be read we return `RandomnessUnavailable` instead of falling
//! back to anything weaker.

use rand::rngs::{OsRng, StdRng};
use rand::{SeedableRng, TryRngCore};

use crate::errors::{Result, VaultError};

/// Fill `buf` with bytes from the OS random source.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| VaultError::RandomnessUnavailable(e.to_string()))
}

/// Return `N` fresh random bytes.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill_random(&mut out)?;
    Ok(out)
}

/// A ChaCha-based CSPRNG seeded from the OS source.
///
/// Used where we need `Rng` helpers like unbiased `random_range`.
pub fn seeded_rng() -> Result<StdRng> {
    StdRng::try_from_os_rng().map_err(|e| VaultError::RandomnessUnavailable(e.to_string()))
}
