//! Content hashing for cache-busting filenames.

use blake3::Hasher;

/// Hex characters kept from a BLAKE3 digest.
pub const HASH_LEN: usize = 20;

/// BLAKE3 over `bytes`, truncated to [`HASH_LEN`] hex characters.
pub fn content_hash(bytes: &[u8]) -> String {
    truncate(blake3::hash(bytes))
}

/// Hash over a sequence of hashes, in order. Used for `[fullhash]`.
pub fn combined_hash<'a, I>(hashes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    for hash in hashes {
        hasher.update(hash.as_bytes());
        hasher.update(b"\0");
    }
    truncate(hasher.finalize())
}

fn truncate(hash: blake3::Hash) -> String {
    let hex = hash.to_hex();
    hex.as_str()[..HASH_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_sensitive() {
        let a = content_hash(b"console.log(1);");
        assert_eq!(a.len(), HASH_LEN);
        assert_eq!(a, content_hash(b"console.log(1);"));
        assert_ne!(a, content_hash(b"console.log(2);"));
    }

    #[test]
    fn test_combined_hash_depends_on_order() {
        assert_ne!(combined_hash(["ab", "c"]), combined_hash(["c", "ab"]));
        assert_ne!(combined_hash(["ab", "c"]), combined_hash(["a", "bc"]));
    }
}
