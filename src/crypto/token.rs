use subtle::ConstantTimeEq;

/// Signs a message with a 32-byte BLAKE3 key, returning the hex MAC.
///
/// # Arguments
///
/// * `key` - The 32-byte signing key.
/// * `message` - The message to authenticate.
pub fn sign(key: &[u8; 32], message: &[u8]) -> String {
    hex::encode(blake3::keyed_hash(key, message).as_bytes())
}

/// Verifies a hex MAC over a message in constant time.
///
/// Returns `false` for malformed hex or any mismatch; never errors.
pub fn verify(key: &[u8; 32], message: &[u8], mac_hex: &str) -> bool {
    let Ok(provided) = hex::decode(mac_hex) else {
        return false;
    };
    let expected = blake3::keyed_hash(key, message);
    expected.as_bytes().ct_eq(provided.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn sign_verify_roundtrip() {
        let mac = sign(&KEY, b"1700000000000");
        assert!(verify(&KEY, b"1700000000000", &mac));
    }

    #[test]
    fn rejects_tampered_message() {
        let mac = sign(&KEY, b"1700000000000");
        assert!(!verify(&KEY, b"1700000000001", &mac));
    }

    #[test]
    fn rejects_wrong_key() {
        let mac = sign(&KEY, b"1700000000000");
        assert!(!verify(&[8u8; 32], b"1700000000000", &mac));
    }

    #[test]
    fn rejects_malformed_mac() {
        assert!(!verify(&KEY, b"1700000000000", "not-hex"));
        assert!(!verify(&KEY, b"1700000000000", "deadbeef"));
    }
}
