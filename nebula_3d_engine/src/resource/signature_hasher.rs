/// Deterministic 64-bit hashing of resource configurations
///
/// Values are serialized into fixed-width little-endian fields and hashed in
/// one go, so tuples of different shape or order never share an encoding.

use std::hash::Hasher;
use rustc_hash::FxHasher;

#[derive(Default)]
pub(crate) struct SignatureHasher {
    bytes: Vec<u8>,
}

impl SignatureHasher {
    pub(crate) fn new() -> Self {
        Self { bytes: Vec::with_capacity(64) }
    }

    pub(crate) fn write_u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub(crate) fn write_u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn write_f32(&mut self, value: f32) -> &mut Self {
        self.write_u32(value.to_bits())
    }

    pub(crate) fn finish(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(&self.bytes);
        hasher.finish()
    }
}
