//! Key hashing for home-index computation.

/// Maps a record key to a 64-bit hash; the registry reduces it modulo the
/// capacity to get the key's home index.
///
/// The hash function is a free parameter of the registry. Implementations
/// must be deterministic for the lifetime of a table, and across processes
/// if they are paired with persisted files (they are not, today: loading
/// rehashes every record).
pub trait KeyHasher: Send + Sync {
    /// Hash a record key.
    fn hash_key(&self, key: &str) -> u64;
}

/// Domain-separated BLAKE3 key hasher.
///
/// Hashes `domain || ":" || key` and takes the first eight digest bytes as
/// a little-endian `u64`.
#[derive(Clone, Copy, Debug)]
pub struct Blake3KeyHasher {
    domain: &'static str,
}

impl Blake3KeyHasher {
    /// Hasher used by registries unless another one is supplied.
    pub const REGISTRY: Self = Self {
        domain: "evplan-registry-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

impl Default for Blake3KeyHasher {
    fn default() -> Self {
        Self::REGISTRY
    }
}

impl KeyHasher for Blake3KeyHasher {
    fn hash_key(&self, key: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(word)
    }
}

impl<F> KeyHasher for F
where
    F: Fn(&str) -> u64 + Send + Sync,
{
    fn hash_key(&self, key: &str) -> u64 {
        self(key)
    }
}
