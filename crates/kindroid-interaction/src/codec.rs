//! Decrypt-on-read codec for stored chat fields.
//!
//! Encrypted values carry the `!enc:` marker followed by base64 of an OpenSSL
//! "salted" blob: `Salted__` + 8-byte salt + AES-256-CBC ciphertext. Key and
//! IV come from EVP_BytesToKey with MD5 and a single iteration, using the
//! user id as password. This must stay byte-compatible with the producer.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use kindroid_core::chat::ChatMessage;
use kindroid_core::{KindroidError, Result};
use md5::{Digest, Md5};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Prefix marking an encrypted field.
pub const ENCRYPTION_MARKER: &str = "!enc:";
/// Replaces a field whose ciphertext could not be decrypted.
pub const DECRYPTION_FAILED_PLACEHOLDER: &str = "[DECRYPTION FAILED]";

const SALT_HEADER: &[u8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTION_MARKER)
}

/// OpenSSL EVP_BytesToKey(MD5, count = 1).
fn bytes_to_key_md5(password: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut derived = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut previous: Vec<u8> = Vec::new();

    while derived.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&previous);
        hasher.update(password);
        hasher.update(salt);
        previous = hasher.finalize().to_vec();
        derived.extend_from_slice(&previous);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    iv.copy_from_slice(&derived[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

/// Decrypts a field value.
///
/// Values without the marker are returned unchanged.
pub fn decrypt_field(value: &str, password: &str) -> Result<String> {
    let Some(encoded) = value.strip_prefix(ENCRYPTION_MARKER) else {
        return Ok(value.to_string());
    };

    // Producers may wrap the base64 (openssl wraps at 64 columns)
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let blob = BASE64_STANDARD
        .decode(compact)
        .map_err(|e| KindroidError::decryption(format!("invalid base64: {}", e)))?;

    if blob.len() < SALT_HEADER.len() + SALT_LEN || !blob.starts_with(SALT_HEADER) {
        return Err(KindroidError::decryption("missing OpenSSL salt header"));
    }
    let (salt, ciphertext) = blob[SALT_HEADER.len()..].split_at(SALT_LEN);
    if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
        return Err(KindroidError::decryption(
            "ciphertext is not a whole number of blocks",
        ));
    }

    let (key, iv) = bytes_to_key_md5(password.as_bytes(), salt);
    let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| KindroidError::decryption("bad padding (wrong key?)"))?;

    String::from_utf8(plaintext)
        .map_err(|_| KindroidError::decryption("plaintext is not valid UTF-8"))
}

/// Encrypts a value the way the service stores it, marker included.
pub fn encrypt_field(plaintext: &str, password: &str, salt: [u8; SALT_LEN]) -> String {
    let (key, iv) = bytes_to_key_md5(password.as_bytes(), &salt);
    let ciphertext = Aes256CbcEnc::new(&key.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut blob = Vec::with_capacity(SALT_HEADER.len() + SALT_LEN + ciphertext.len());
    blob.extend_from_slice(SALT_HEADER);
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&ciphertext);

    format!("{}{}", ENCRYPTION_MARKER, BASE64_STANDARD.encode(blob))
}

/// Same as [`encrypt_field`] with a random salt.
pub fn encrypt_field_random_salt(plaintext: &str, password: &str) -> String {
    encrypt_field(plaintext, password, rand::random())
}

/// Decrypts a field, substituting the placeholder on failure.
pub fn decrypt_or_placeholder(value: &str, password: &str, field: &str, doc_id: &str) -> String {
    match decrypt_field(value, password) {
        Ok(plain) => plain,
        Err(e) => {
            tracing::warn!("Failed to decrypt {} for doc {}: {}", field, doc_id, e);
            DECRYPTION_FAILED_PLACEHOLDER.to_string()
        }
    }
}

/// Decrypts `message` and `audio_url` of a record in place.
///
/// Each field fails independently; the record itself is always kept.
pub fn decrypt_message(message: &mut ChatMessage, password: &str) {
    message.message = decrypt_or_placeholder(&message.message, password, "message", &message.id);
    if let Some(audio_url) = message.audio_url.take() {
        message.audio_url = Some(decrypt_or_placeholder(
            &audio_url,
            password,
            "audio_url",
            &message.id,
        ));
    }
}
