use super::*;

const MD5_EMPTY: &str = "d41d8cd98f00b204e9800998ecf8427e";

#[test]
fn set_text_accepts_correct_lengths() {
    let hash = HashRecord::new()
        .with_text(HashKind::Crc, "0000ABCD")
        .unwrap()
        .with_text(HashKind::Md5, MD5_EMPTY)
        .unwrap();
    assert_eq!(hash.text(HashKind::Crc).as_deref(), Some("0000abcd"));
    assert_eq!(hash.text(HashKind::Md5).as_deref(), Some(MD5_EMPTY));
    assert!(!hash.has(HashKind::Sha1));
}

#[test]
fn set_rejects_wrong_length() {
    let mut hash = HashRecord::new();
    let err = hash.set_text(HashKind::Sha1, "abcd").unwrap_err();
    assert_eq!(
        err,
        CoreError::DigestLength {
            kind: HashKind::Sha1,
            expected: 20,
            actual: 2,
        }
    );
    assert!(!hash.has(HashKind::Sha1));
}

#[test]
fn set_text_decodes_prefixed_and_mixed_case_hex() {
    let hash = HashRecord::new()
        .with_text(HashKind::Crc, "0xDEADbeef")
        .unwrap();
    assert_eq!(hash.get(HashKind::Crc), Some(&[0xde, 0xad, 0xbe, 0xef][..]));
    assert_eq!(hash.text(HashKind::Crc).as_deref(), Some("deadbeef"));
}

#[test]
fn set_text_rejects_malformed_hex() {
    let mut hash = HashRecord::new();
    for bad in ["abc", "zzzzzzzz", "0x12g45678"] {
        assert_eq!(
            hash.set_text(HashKind::Crc, bad),
            Err(CoreError::InvalidHex(bad.to_string()))
        );
    }
    assert!(!hash.has(HashKind::Crc));
}

#[test]
fn empty_text_clears_digest() {
    let mut hash = HashRecord::new().with_text(HashKind::Crc, "00000001").unwrap();
    hash.set_text(HashKind::Crc, "  ").unwrap();
    assert!(!hash.has(HashKind::Crc));
    assert!(!hash.has_any_digest());
}

#[test]
fn spamsum_is_stored_verbatim() {
    let hash = HashRecord::new()
        .with_text(HashKind::SpamSum, "3:AXGBicFlgVNhBGcL6wCrFQEv:AXGHsNhxLsr2C")
        .unwrap();
    assert_eq!(
        hash.text(HashKind::SpamSum).as_deref(),
        Some("3:AXGBicFlgVNhBGcL6wCrFQEv:AXGHsNhxLsr2C")
    );
}

#[test]
fn conditional_equals_treats_absent_as_match() {
    let x = [1u8, 2, 3, 4];
    let y = [1u8, 2, 3, 5];
    assert!(conditional_hash_equals(None, Some(&x)));
    assert!(conditional_hash_equals(Some(&x), None));
    assert!(conditional_hash_equals(None, None));
    assert!(conditional_hash_equals(Some(&x), Some(&x)));
    assert!(!conditional_hash_equals(Some(&x), Some(&y)));
}

#[test]
fn fill_missing_never_overwrites() {
    let mut a = HashRecord::new()
        .with_size(16)
        .with_text(HashKind::Crc, "00000001")
        .unwrap();
    let b = HashRecord::new()
        .with_size(32)
        .with_text(HashKind::Crc, "ffffffff")
        .unwrap()
        .with_text(HashKind::Md5, MD5_EMPTY)
        .unwrap();

    assert!(a.fill_missing_from(&b));
    assert_eq!(a.size, Some(16));
    assert_eq!(a.text(HashKind::Crc).as_deref(), Some("00000001"));
    assert_eq!(a.text(HashKind::Md5).as_deref(), Some(MD5_EMPTY));

    // Second fill has nothing left to copy
    assert!(!a.fill_missing_from(&b));
}

#[test]
fn common_kinds_is_intersection() {
    let a = HashRecord::new()
        .with_text(HashKind::Crc, "00000001")
        .unwrap()
        .with_text(HashKind::Md5, MD5_EMPTY)
        .unwrap();
    let b = HashRecord::new().with_text(HashKind::Md5, MD5_EMPTY).unwrap();
    let common: Vec<_> = a.common_kinds(&b).collect();
    assert_eq!(common, vec![HashKind::Md5]);
}

#[test]
fn retain_kinds_drops_others() {
    let mut hash = HashRecord::new()
        .with_text(HashKind::Crc, "00000001")
        .unwrap()
        .with_text(HashKind::Md5, MD5_EMPTY)
        .unwrap();
    hash.retain_kinds(&[HashKind::Md5, HashKind::Sha1]);
    assert!(!hash.has(HashKind::Crc));
    assert!(hash.has(HashKind::Md5));
}

#[test]
fn hash_kind_parses_aliases() {
    assert_eq!("CRC32".parse::<HashKind>().unwrap(), HashKind::Crc);
    assert_eq!("sha256".parse::<HashKind>().unwrap(), HashKind::Sha256);
    assert!("whirlpool".parse::<HashKind>().is_err());
}
