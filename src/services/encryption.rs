use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key length (expected 32 bytes)")]
    InvalidKeyLength,

    #[error("Invalid encrypted data format")]
    InvalidFormat,
}

impl From<Unspecified> for EncryptionError {
    fn from(_: Unspecified) -> Self {
        EncryptionError::EncryptionFailed("Cryptographic operation failed".to_string())
    }
}

/// AES-256-GCM sealing of store values.
///
/// Sealed values are text: base64 of `[nonce (12 bytes)][ciphertext + auth tag]`.
/// The item key is bound as associated data, so a blob copied under a
/// different key fails to open.
pub struct BlobCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl BlobCipher {
    pub fn new(key: &[u8]) -> Result<Self, EncryptionError> {
        if key.len() != 32 {
            return Err(EncryptionError::InvalidKeyLength);
        }

        let unbound_key = UnboundKey::new(&AES_256_GCM, key)?;
        Ok(Self {
            key: LessSafeKey::new(unbound_key),
            rng: SystemRandom::new(),
        })
    }

    /// Builds a cipher keyed from a configured secret string.
    pub fn from_secret(secret: &str) -> Result<Self, EncryptionError> {
        Self::new(&derive_key(secret))
    }

    pub fn seal(&self, plaintext: &str, aad: &[u8]) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| EncryptionError::EncryptionFailed("Failed to generate nonce".to_string()))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(aad),
                &mut in_out,
            )
            .map_err(|_| EncryptionError::EncryptionFailed("Sealing failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);

        Ok(STANDARD.encode(sealed))
    }

    pub fn open(&self, sealed: &str, aad: &[u8]) -> Result<String, EncryptionError> {
        let bytes = STANDARD
            .decode(sealed.trim())
            .map_err(|_| EncryptionError::InvalidFormat)?;

        if bytes.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(EncryptionError::InvalidFormat);
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| EncryptionError::InvalidFormat)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(aad), &mut in_out)
            .map_err(|_| EncryptionError::DecryptionFailed("Opening failed".to_string()))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| EncryptionError::DecryptionFailed("Invalid UTF-8".to_string()))
    }
}

impl fmt::Debug for BlobCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobCipher")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}

/// Derives a 32-byte key from a configured secret using SHA-256.
pub fn derive_key(key_string: &str) -> [u8; 32] {
    use ring::digest;

    let hash = digest::digest(&digest::SHA256, key_string.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(hash.as_ref());
    key
}
