use crate::error::{DigestError, DigestResult};

/// Upper-case hex representation of a digest.
pub fn to_hex(digest: &[u8]) -> String {
    hex::encode_upper(digest)
}

/// Parse a hex digest; either case is accepted.
pub fn from_hex(digest: &str) -> DigestResult<Vec<u8>> {
    hex::decode(digest).map_err(|e| DigestError::InvalidHex {
        input: digest.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_upper_case() {
        assert_eq!(to_hex(&[0x0f, 0xa0, 0xff]), "0FA0FF");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn decodes_either_case() {
        assert_eq!(from_hex("0fA0Ff").unwrap(), vec![0x0f, 0xa0, 0xff]);
    }

    #[test]
    fn rejects_odd_length() {
        let err = from_hex("ABC").unwrap_err();
        assert!(matches!(err, DigestError::InvalidHex { ref input, .. } if input == "ABC"));
    }

    #[test]
    fn rejects_non_hex() {
        assert!(from_hex("zz").is_err());
    }

    proptest! {
        #[test]
        fn hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(from_hex(&to_hex(&bytes)).unwrap(), bytes);
        }
    }
}
