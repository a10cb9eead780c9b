//! Journal encryption at rest.
//!
//! Journal text is sealed with AES-256-GCM under a key that callers pass in
//! explicitly. Every call to [`encrypt`] draws a fresh random 96-bit nonce, so
//! encrypting the same text twice never yields the same ciphertext.
//!
//! Stored format: `v1:` followed by lowercase hex of `nonce || ciphertext || tag`.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

const FORMAT_PREFIX: &str = "v1:";
const TAG_LEN: usize = 16;
const MIN_SECRET_LEN: usize = 16;

/// Errors never carry key material or the underlying ring error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption key must be 64 hex characters or a secret of at least 16 characters")]
    InvalidKey,

    #[error("failed to encrypt journal entry")]
    Encryption,

    #[error("failed to decrypt journal entry")]
    Decryption,
}

/// 256-bit key used to seal journal entries. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct JournalKey([u8; 32]);

impl JournalKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a key from the configured secret.
    ///
    /// 64 hex characters are taken as the raw key. Any other secret of at
    /// least 16 characters is stretched with SHA-256.
    pub fn from_secret(secret: &str) -> Result<Self, CryptoError> {
        let secret = secret.trim();

        if secret.len() == 64 {
            if let Ok(raw) = hex::decode(secret) {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&raw);
                return Ok(Self(bytes));
            }
        }

        if secret.chars().count() < MIN_SECRET_LEN {
            return Err(CryptoError::InvalidKey);
        }

        let digest = Sha256::digest(secret.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Ok(Self(bytes))
    }

    /// Fresh random key, mostly useful for tests and key generation tooling.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; 32];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self(bytes))
    }

    fn aead_key(&self) -> Result<LessSafeKey, CryptoError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.0).map_err(|_| CryptoError::InvalidKey)?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl std::fmt::Debug for JournalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JournalKey(<redacted>)")
    }
}

pub fn encrypt(plaintext: &str, key: &JournalKey) -> Result<String, CryptoError> {
    let aead = key.aead_key().map_err(|_| CryptoError::Encryption)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| CryptoError::Encryption)?;

    let mut in_out = plaintext.as_bytes().to_vec();
    aead.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| CryptoError::Encryption)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);

    Ok(format!("{FORMAT_PREFIX}{}", hex::encode(blob)))
}

/// Fails on a wrong key, a tampered or truncated blob, or anything that is
/// not in the `v1:` format.
pub fn decrypt(ciphertext: &str, key: &JournalKey) -> Result<String, CryptoError> {
    let encoded = ciphertext
        .strip_prefix(FORMAT_PREFIX)
        .ok_or(CryptoError::Decryption)?;
    let blob = hex::decode(encoded).map_err(|_| CryptoError::Decryption)?;

    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Decryption);
    }

    let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CryptoError::Decryption)?;

    let aead = key.aead_key().map_err(|_| CryptoError::Decryption)?;
    let mut in_out = sealed.to_vec();
    let plaintext = aead
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Decryption)?;

    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::Decryption)
}
