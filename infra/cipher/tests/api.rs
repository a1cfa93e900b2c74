pub mod fixtures;

use fixtures::fixed_key;
use secman_cipher::{CipherError, KEY_LEN, Key, SALT_LEN, compare_password_to_key, decrypt, encrypt};

#[test]
fn seal_open_roundtrip() {
    let key = fixed_key(1);
    let sealed = encrypt(b"db-pass", key.value()).expect("encrypt failed");
    let opened = decrypt(&sealed, key.value()).expect("decrypt failed");

    assert_eq!(opened.as_slice(), b"db-pass");
}

#[test]
fn wrong_key_is_reported_as_invalid_key() {
    let sealed = encrypt(b"db-pass", fixed_key(1).value()).unwrap();
    let result = decrypt(&sealed, fixed_key(2).value());

    assert!(
        matches!(result, Err(CipherError::InvalidKey { .. })),
        "a wrong key must never yield plaintext"
    );
}

#[test]
fn password_key_has_expected_shape() {
    let key = Key::from_password("hunter2").expect("derivation failed");

    assert_eq!(key.value().len(), KEY_LEN);
    assert_eq!(key.salt().len(), SALT_LEN);
    assert!(key.is_valid());
}

#[test]
fn same_password_derives_distinct_but_verifiable_keys() {
    let first = Key::from_password("hunter2").unwrap();
    let second = Key::from_password("hunter2").unwrap();

    assert_ne!(first.value(), second.value(), "independent salts must give independent keys");
    assert!(compare_password_to_key("hunter2", &first));
    assert!(second.verify_password("hunter2"));
    assert!(!first.verify_password("hunter3"));
}

#[test]
fn random_keys_are_unique() {
    let a = Key::random().unwrap();
    let b = Key::random().unwrap();

    assert_eq!(a.value().len(), KEY_LEN);
    assert_ne!(a, b);
}

#[test]
fn persisted_key_survives_encoding() {
    let key = Key::from_password("correct horse").unwrap();
    let restored: Key = key.to_string().parse().expect("decode failed");

    assert_eq!(restored, key);
    assert!(restored.verify_password("correct horse"));
}

#[test]
fn verification_against_garbage_key_is_false() {
    let broken = Key::from_parts(vec![1, 2, 3], Vec::new());
    assert!(!broken.verify_password("anything"));
}
