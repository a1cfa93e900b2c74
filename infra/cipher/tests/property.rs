use proptest::prelude::*;
use secman_cipher::{CipherError, KEY_LEN, decrypt, encrypt};

proptest! {
    #[test]
    fn roundtrip_arbitrary_bytes(
        key in proptest::array::uniform32(any::<u8>()),
        data in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let sealed = encrypt(&data, &key).unwrap();
        let opened = decrypt(&sealed, &key).unwrap();
        prop_assert_eq!(opened.as_slice(), data.as_slice());
    }

    #[test]
    fn mismatched_keys_never_open(
        k1 in proptest::array::uniform32(any::<u8>()),
        k2 in proptest::array::uniform32(any::<u8>()),
        data in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        prop_assume!(k1 != k2);
        let sealed = encrypt(&data, &k1).unwrap();
        let is_invalid_key = matches!(decrypt(&sealed, &k2), Err(CipherError::InvalidKey { .. }));
        prop_assert!(is_invalid_key);
    }

    #[test]
    fn wrong_key_lengths_are_rejected(len in (0usize..64).prop_filter("valid length", |l| *l != KEY_LEN)) {
        let key = vec![0u8; len];
        let is_length_error = matches!(encrypt(b"x", &key), Err(CipherError::InvalidKeyLength { .. }));
        prop_assert!(is_length_error);
    }
}
