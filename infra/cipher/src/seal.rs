use aead::inout::InOutBuf;
use aead::{AeadInOut, Key, KeyInit, Nonce, Tag};
use aes_gcm::Aes256Gcm;
use getrandom::fill;
use zeroize::Zeroizing;

use crate::error::CipherError;
use crate::key::KEY_LEN;

/// AEAD nonce length (96-bit).
pub const NONCE_LEN: usize = 12;

/// AEAD tag length (128-bit).
pub const TAG_LEN: usize = 16;

/// Encrypts `plaintext` with AES-256-GCM under a fresh random nonce.
///
/// # Results
/// Returns `nonce || ciphertext || tag`.
///
/// # Errors
/// * [`CipherError::InvalidKeyLength`] If `key` is not 32 bytes long.
/// * [`CipherError::Rng`] If no nonce could be drawn.
/// * [`CipherError::Encryption`] If the AEAD encryption fails.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = init_cipher(key)?;
    let nonce = next_nonce()?;

    let mut buf = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
    buf.extend_from_slice(&nonce);
    buf.extend_from_slice(plaintext);

    let (_nonce_part, data_part) = buf.split_at_mut(NONCE_LEN);
    let tag = cipher.encrypt_inout_detached(&nonce, &[], InOutBuf::from(data_part)).map_err(
        |_| CipherError::Encryption {
            message: "Encryption failed".into(),
            context: Some("AEAD encryption failed".into()),
        },
    )?;

    buf.extend_from_slice(tag.as_slice());
    Ok(buf)
}

/// Decrypts a blob produced by [`encrypt`].
///
/// # Results
/// Returns the plaintext in a buffer that is wiped on drop.
///
/// # Errors
/// * [`CipherError::InvalidKeyLength`] If `key` is not 32 bytes long.
/// * [`CipherError::MalformedData`] If `blob` is shorter than a nonce.
/// * [`CipherError::InvalidKey`] If authentication fails for any reason.
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    let cipher = init_cipher(key)?;

    if blob.len() < NONCE_LEN {
        return Err(CipherError::MalformedData {
            message: format!(
                "Payload too short ({} bytes). Expected at least {NONCE_LEN} bytes",
                blob.len()
            )
            .into(),
            context: None,
        });
    }

    let (nonce_slice, rest) = blob.split_at(NONCE_LEN);
    // A payload without room for a tag cannot authenticate; report it like any other failure.
    if rest.len() < TAG_LEN {
        return Err(CipherError::InvalidKey { context: None });
    }
    let (ciphertext, tag_slice) = rest.split_at(rest.len() - TAG_LEN);

    let nonce = Nonce::<Aes256Gcm>::try_from(nonce_slice)
        .map_err(|_| CipherError::Internal { message: "Invalid nonce length".into(), context: None })?;
    let tag = Tag::<Aes256Gcm>::try_from(tag_slice)
        .map_err(|_| CipherError::Internal { message: "Invalid tag length".into(), context: None })?;

    let mut buf = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_inout_detached(&nonce, &[], InOutBuf::from(&mut buf[..]), &tag)
        .map_err(|_| CipherError::InvalidKey { context: None })?;

    Ok(buf)
}

/// Checks that `key` can be used with [`encrypt`] and [`decrypt`].
///
/// # Errors
/// Returns [`CipherError::InvalidKeyLength`] unless `key` is exactly
/// [`KEY_LEN`] bytes long.
pub fn check_key(key: &[u8]) -> Result<(), CipherError> {
    if key.len() == KEY_LEN {
        return Ok(());
    }
    Err(invalid_length(key.len()))
}

fn init_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    check_key(key)?;
    let key = Key::<Aes256Gcm>::try_from(key).map_err(|_| invalid_length(key.len()))?;
    Ok(Aes256Gcm::new(&key))
}

fn invalid_length(len: usize) -> CipherError {
    CipherError::InvalidKeyLength {
        message: format!("Invalid key length {len}, must be {KEY_LEN} bytes").into(),
        context: None,
    }
}

#[inline]
fn next_nonce() -> Result<Nonce<Aes256Gcm>, CipherError> {
    let mut nonce = Nonce::<Aes256Gcm>::default();
    fill(&mut nonce).map_err(CipherError::rng)?;
    Ok(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [7u8; KEY_LEN];

    #[test]
    fn test_nonce_sequence() {
        let n1 = next_nonce().unwrap();
        let n2 = next_nonce().unwrap();

        assert_ne!(n1, n2);
    }

    #[test]
    fn test_layout_is_nonce_ciphertext_tag() {
        let sealed = encrypt(b"hello", &KEY).unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn test_same_plaintext_seals_differently() {
        let a = encrypt(b"hello", &KEY).unwrap();
        let b = encrypt(b"hello", &KEY).unwrap();
        assert_ne!(a, b, "nonces must never repeat between calls");
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let sealed = encrypt(b"", &KEY).unwrap();
        assert!(decrypt(&sealed, &KEY).unwrap().is_empty());
    }

    #[test]
    fn test_short_key_rejected_before_any_work() {
        assert!(matches!(encrypt(b"x", &[0u8; 16]), Err(CipherError::InvalidKeyLength { .. })));
        assert!(matches!(decrypt(&[0u8; 64], &[0u8; 33]), Err(CipherError::InvalidKeyLength { .. })));
    }

    #[test]
    fn test_check_key() {
        assert!(check_key(&KEY).is_ok());
        assert!(matches!(check_key(&[]), Err(CipherError::InvalidKeyLength { .. })));
        assert!(matches!(check_key(&[0u8; KEY_LEN + 1]), Err(CipherError::InvalidKeyLength { .. })));
    }

    #[test]
    fn test_truncated_payloads() {
        assert!(matches!(decrypt(&[0u8; NONCE_LEN - 1], &KEY), Err(CipherError::MalformedData { .. })));
        assert!(matches!(decrypt(&[0u8; NONCE_LEN + 3], &KEY), Err(CipherError::InvalidKey { .. })));
    }

    #[test]
    fn test_tampered_ciphertext_is_invalid_key() {
        let mut sealed = encrypt(b"payload", &KEY).unwrap();
        sealed[NONCE_LEN] ^= 0x01;
        assert!(matches!(decrypt(&sealed, &KEY), Err(CipherError::InvalidKey { .. })));
    }
}
