use getrandom::fill;

use crate::error::CipherError;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SPECIAL_CHARSET: &[u8] = b"_-!?=()&%";

/// Generates a random string of `length` characters for use as a secret value.
///
/// Letters only, plus `_-!?=()&%` when `special` is set. Characters are drawn from
/// the OS RNG with rejection sampling, so every character is equally likely.
///
/// # Errors
/// Returns [`CipherError::Rng`] if the OS RNG is unavailable.
pub fn generate(length: usize, special: bool) -> Result<String, CipherError> {
    let charset: Vec<u8> = if special {
        [CHARSET, SPECIAL_CHARSET].concat()
    } else {
        CHARSET.to_vec()
    };
    // Largest multiple of the charset size that fits into a byte.
    let limit = 256 - (256 % charset.len());

    let mut out = String::with_capacity(length);
    let mut pool = [0u8; 64];
    while out.len() < length {
        fill(&mut pool).map_err(CipherError::rng)?;
        for &byte in &pool {
            if usize::from(byte) >= limit {
                continue;
            }
            out.push(char::from(charset[usize::from(byte) % charset.len()]));
            if out.len() == length {
                break;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_alphabet() {
        let plain = generate(128, false).unwrap();
        assert_eq!(plain.len(), 128);
        assert!(plain.bytes().all(|b| CHARSET.contains(&b)));

        let special = generate(256, true).unwrap();
        assert_eq!(special.len(), 256);
        assert!(special.bytes().all(|b| CHARSET.contains(&b) || SPECIAL_CHARSET.contains(&b)));
    }

    #[test]
    fn test_zero_length() {
        assert!(generate(0, true).unwrap().is_empty());
    }
}
