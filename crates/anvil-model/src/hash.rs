//! Blake3 digest behind one-off literal class names

use std::fmt::{self, Display, Formatter};

/// 32-byte Blake3 digest, displayed as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash `data`
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_hash() {
        assert_eq!(ContentHash::compute(b"@com.acme.Q"), ContentHash::compute(b"@com.acme.Q"));
        assert_ne!(ContentHash::compute(b"@com.acme.Q"), ContentHash::compute(b"@com.acme.R"));
    }

    #[test]
    fn displays_as_identifier_safe_hex() {
        let rendered = ContentHash::compute(b"@com.acme.Q").to_string();
        assert_eq!(rendered.len(), 64);
        assert!(rendered.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
