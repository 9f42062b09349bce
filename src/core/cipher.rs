//! Password-based sealing shared by the encryption app and the access token.
//!
//! Armoured format: `VIX1:` followed by base64 of `salt ‖ nonce ‖ ciphertext`,
//! where the key is PBKDF2-HMAC-SHA256(password, salt) and the cipher is
//! AES-256-GCM.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

const MAGIC: &str = "VIX1:";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
pub const PBKDF2_ROUNDS: u32 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("not a Vixen-encrypted payload")]
    BadFormat,
    #[error("wrong password or corrupted data")]
    Decrypt,
    #[error("encryption failed")]
    Encrypt,
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

pub fn seal(password: &str, plaintext: &[u8]) -> Result<String, CipherError> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CipherError::Encrypt)?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(format!("{MAGIC}{}", STANDARD.encode(blob)))
}

pub fn open(password: &str, armoured: &str) -> Result<Vec<u8>, CipherError> {
    let body = armoured
        .trim()
        .strip_prefix(MAGIC)
        .ok_or(CipherError::BadFormat)?;
    let blob = STANDARD.decode(body).map_err(|_| CipherError::BadFormat)?;
    if blob.len() < SALT_LEN + NONCE_LEN {
        return Err(CipherError::BadFormat);
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::Decrypt)
}
