use blake3::Hasher;

/// Content fingerprint of a (normalized) text under a given model identity.
///
/// The model id is part of the key so that vectors produced by two different
/// encoders can never be confused with each other. A zero byte separates the
/// two fields; model ids never contain NUL.
#[inline]
pub fn text_fingerprint(model_id: &str, text: &str) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(model_id.as_bytes());
    hasher.update(&[0u8]);
    hasher.update(text.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for seeding the stub encoder. For cache keys use the full
/// [`text_fingerprint`].
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Filesystem-safe hex name for an opaque document id.
#[inline]
pub fn hash_document_id(id: &str) -> String {
    blake3::hash(id.as_bytes()).to_hex().to_string()
}
