//! Bearer tokens that map a session to a stable owner id.
//!
//! A token is three dot-separated parts:
//!
//! ```text
//! pwv1.<base64url(claims JSON)>.<base64url(HMAC-SHA256(secret, "pwv1." + claims))>
//! ```
//!
//! The signing secret is handed to `TokenAuthority::new` by whoever builds
//! it (the CLI reads it from settings); nothing in here reads process-wide
//! state.  The crypto core trusts the resulting `OwnerId` at face value.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::store::OwnerId;

/// Token format tag, also the first signed bytes.
const TOKEN_PREFIX: &str = "pwv1";

/// Shortest signing secret we accept, in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// Default token lifetime.
pub const DEFAULT_LIFETIME_DAYS: i64 = 7;

/// Who a verified token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub owner: OwnerId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner, email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens with an injected HMAC secret.
pub struct TokenAuthority {
    secret: Zeroizing<Vec<u8>>,
    lifetime: Duration,
}

impl TokenAuthority {
    /// Build an authority around `secret`.
    ///
    /// A missing or short secret is a configuration error.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(VaultError::ConfigError(format!(
                "token secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            lifetime: Duration::days(DEFAULT_LIFETIME_DAYS),
        })
    }

    /// Override how long issued tokens stay valid.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Issue a token for `identity`, valid from now.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: identity.owner.as_str().to_string(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|e| VaultError::SerializationError(format!("claims: {e}")))?;

        let signed = format!("{TOKEN_PREFIX}.{}", B64URL.encode(json));
        let tag = self.mac(signed.as_bytes())?.finalize().into_bytes();
        Ok(format!("{signed}.{}", B64URL.encode(tag)))
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Identity> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    ///
    /// Every failure (bad shape, bad signature, expired) is `Unauthorized`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity> {
        let (signed, tag_b64) = token.rsplit_once('.').ok_or(VaultError::Unauthorized)?;
        let (prefix, claims_b64) = signed.split_once('.').ok_or(VaultError::Unauthorized)?;
        if prefix != TOKEN_PREFIX {
            return Err(VaultError::Unauthorized);
        }

        let tag = B64URL
            .decode(tag_b64)
            .map_err(|_| VaultError::Unauthorized)?;
        self.mac(signed.as_bytes())?
            .verify_slice(&tag)
            .map_err(|_| VaultError::Unauthorized)?;

        let json = B64URL
            .decode(claims_b64)
            .map_err(|_| VaultError::Unauthorized)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(|_| VaultError::Unauthorized)?;

        if claims.exp <= now.timestamp() {
            tracing::debug!(owner = %claims.sub, "token expired");
            return Err(VaultError::Unauthorized);
        }

        let owner = OwnerId::new(claims.sub).map_err(|_| VaultError::Unauthorized)?;
        Ok(Identity {
            owner,
            email: claims.email,
        })
    }

    /// Resolve an `Authorization` header value of the form `Bearer <token>`.
    pub fn identity_from_header(&self, header: Option<&str>) -> Result<Identity> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(VaultError::Unauthorized)?;
        self.verify(token.trim())
    }

    fn mac(&self, data: &[u8]) -> Result<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| VaultError::ConfigError(format!("invalid token secret: {e}")))?;
        mac.update(data);
        Ok(mac)
    }
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
