//! Salted one-way password hashing.
//!
//! Stored form: `blake3$<salt hex>$<digest hex>`. The digest is BLAKE3 in
//! derive-key mode over `salt || password`, so the same password never
//! produces the same stored string twice.

use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::constants::{KDF_CONTEXT_PASSWORD, PASSWORD_HASH_SCHEME, SALT_SIZE};
use crate::error::CryptoError;

pub type Salt = [u8; SALT_SIZE];

/// Outcome of checking a password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    /// Matched a salted hash.
    Valid,
    /// Matched a credential still stored in plaintext; callers should rehash.
    ValidLegacy,
    Invalid,
}

/// A parsed `scheme$salt$digest` credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: Salt,
    digest: [u8; 32],
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        Self::with_salt(password, generate_salt())
    }

    pub fn with_salt(password: &str, salt: Salt) -> Self {
        Self {
            salt,
            digest: derive_digest(password.as_bytes(), &salt),
        }
    }

    pub fn parse(encoded: &str) -> Result<Self, CryptoError> {
        let mut parts = encoded.split('$');
        let scheme = parts.next().ok_or(CryptoError::MalformedHash("empty"))?;
        if scheme != PASSWORD_HASH_SCHEME {
            return Err(CryptoError::UnsupportedScheme(scheme.to_string()));
        }
        let salt_hex = parts.next().ok_or(CryptoError::MalformedHash("missing salt"))?;
        let digest_hex = parts
            .next()
            .ok_or(CryptoError::MalformedHash("missing digest"))?;
        if parts.next().is_some() {
            return Err(CryptoError::MalformedHash("trailing fields"));
        }

        let salt_bytes = hex::decode(salt_hex)?;
        if salt_bytes.len() != SALT_SIZE {
            return Err(CryptoError::InvalidSaltLength {
                expected: SALT_SIZE,
                actual: salt_bytes.len(),
            });
        }
        let digest_bytes = hex::decode(digest_hex)?;
        if digest_bytes.len() != 32 {
            return Err(CryptoError::MalformedHash("digest must be 32 bytes"));
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&salt_bytes);
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&digest_bytes);
        Ok(Self { salt, digest })
    }

    pub fn encode(&self) -> String {
        format!(
            "{}${}${}",
            PASSWORD_HASH_SCHEME,
            hex::encode(self.salt),
            hex::encode(self.digest)
        )
    }

    pub fn matches(&self, password: &str) -> bool {
        let candidate = derive_digest(password.as_bytes(), &self.salt);
        candidate.ct_eq(&self.digest).into()
    }
}

pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

// BLAKE3 KDF with domain separation
fn derive_digest(password: &[u8], salt: &Salt) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_PASSWORD);
    hasher.update(salt);
    hasher.update(password);
    *hasher.finalize().as_bytes()
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> String {
    PasswordHash::new(password).encode()
}

/// Returns true when `stored` looks like one of our hashes rather than a
/// legacy plaintext credential.
pub fn is_password_hash(stored: &str) -> bool {
    stored.starts_with(PASSWORD_HASH_SCHEME) && stored.matches('$').count() == 2
}

/// Check `password` against a stored credential.
///
/// Stored values that do not parse as a hash are compared as plaintext (in
/// constant time) and reported as [`PasswordCheck::ValidLegacy`] on match.
/// That includes legacy passwords which merely look like `blake3$..$..`.
pub fn verify_password(password: &str, stored: &str) -> PasswordCheck {
    if is_password_hash(stored) {
        if let Ok(hash) = PasswordHash::parse(stored) {
            return if hash.matches(password) {
                PasswordCheck::Valid
            } else {
                PasswordCheck::Invalid
            };
        }
    }

    if bool::from(password.as_bytes().ct_eq(stored.as_bytes())) {
        PasswordCheck::ValidLegacy
    } else {
        PasswordCheck::Invalid
    }
}
