//! sha256 helpers shared by the snapshot model, the edit engine and the fs adapters.

use sha2::{Digest, Sha256};

/// Lowercase hex sha256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Lowercase hex sha256 of a UTF-8 string.
pub fn sha256_str(s: &str) -> String {
    sha256_hex(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn str_and_bytes_agree() {
        assert_eq!(sha256_str("using Foo;"), sha256_hex(b"using Foo;"));
        assert_eq!(sha256_str("a").len(), 64);
    }
}
