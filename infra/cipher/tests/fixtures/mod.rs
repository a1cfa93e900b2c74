use secman_cipher::{KEY_LEN, Key, SALT_LEN};

/// A fixed key that skips Argon2, for tests that only exercise sealing.
#[must_use]
pub fn fixed_key(byte: u8) -> Key {
    Key::from_parts(vec![byte; KEY_LEN], vec![byte; SALT_LEN])
}
