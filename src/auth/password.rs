//! Password hashing with bcrypt.
//!
//! Digests embed their own salt and cost, so verification only needs the
//! stored string. The cost used for new digests is fixed at construction.

use std::fmt;
use thiserror::Error;

/// Work factor for newly created digests.
pub const DEFAULT_COST: u32 = 14;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

// Verified against when an account lookup misses, so both paths pay for one
// full bcrypt comparison.
const TIMING_PLACEHOLDER: &str = "vestibule-timing-placeholder";

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt cost {0} is outside {MIN_COST}..={MAX_COST}")]
    InvalidCost(u32),
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// A stored bcrypt digest.
///
/// Deliberately not `Serialize`; `Debug` never prints the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest read back from storage.
    #[must_use]
    pub fn from_stored(digest: String) -> Self {
        Self(digest)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(***)")
    }
}

#[derive(Clone)]
pub struct CredentialHasher {
    cost: u32,
    placeholder: PasswordDigest,
}

impl CredentialHasher {
    /// Build a hasher producing digests at `cost`.
    ///
    /// # Errors
    /// Returns an error if `cost` is out of range or the placeholder digest
    /// cannot be computed.
    pub fn new(cost: u32) -> Result<Self, HashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(HashError::InvalidCost(cost));
        }

        let placeholder = PasswordDigest(bcrypt::hash(TIMING_PLACEHOLDER, cost)?);

        Ok(Self { cost, placeholder })
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error only if bcrypt itself fails (e.g. no entropy source).
    pub fn hash(&self, plaintext: &str) -> Result<PasswordDigest, HashError> {
        Ok(PasswordDigest(bcrypt::hash(plaintext, self.cost)?))
    }

    /// Check `plaintext` against `digest`. Malformed digests never match.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &PasswordDigest) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(plaintext, digest.as_str()).unwrap_or(false)
    }

    /// Burn one verification against the placeholder digest. Always false.
    #[must_use]
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.placeholder);
        false
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
