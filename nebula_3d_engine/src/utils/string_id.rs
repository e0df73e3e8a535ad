/// Hashed string identifiers.
///
/// Assets, material properties and compositor pass types are referred to by
/// human readable names in authoring data but compared as 32-bit integers at
/// runtime. The hash is deterministic and stable across runs and platforms.

use std::fmt;
use std::hash::Hasher;
use rustc_hash::FxHasher;

/// 32-bit identifier computed from a name
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

/// Identifies an asset (texture, compositor node, mesh, ...)
pub type AssetId = StringId;

/// Identifies a global material property
pub type MaterialPropertyId = StringId;

/// Identifies a compositor pass type in the pass factory registry
pub type CompositorPassTypeId = StringId;

impl StringId {
    /// Reserved value meaning "no id"
    pub const INVALID: StringId = StringId(u32::MAX);

    /// Hash a name into an identifier
    ///
    /// The reserved `INVALID` value is never produced.
    pub fn new(name: &str) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(name.as_bytes());
        let hash = hasher.finish();
        let folded = (hash ^ (hash >> 32)) as u32;
        if folded == u32::MAX {
            StringId(folded - 1)
        } else {
            StringId(folded)
        }
    }

    /// Wrap an already computed identifier
    pub const fn from_raw(id: u32) -> Self {
        StringId(id)
    }

    /// Raw integer value
    pub fn id(&self) -> u32 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for StringId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<&str> for StringId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringId({:#010x})", self.0)
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        assert_eq!(StringId::new("Example/Texture/Compositor/ColorTexture0"),
                   StringId::new("Example/Texture/Compositor/ColorTexture0"));
        assert_eq!(StringId::from("Scene"), StringId::new("Scene"));
    }

    #[test]
    fn test_different_names_differ() {
        assert_ne!(StringId::new("Scene"), StringId::new("ShadowMap"));
        assert_ne!(StringId::new("ab"), StringId::new("ba"));
    }

    #[test]
    fn test_invalid_and_default() {
        assert!(!StringId::INVALID.is_valid());
        assert!(!StringId::default().is_valid());
        assert!(StringId::new("").is_valid());
        assert_eq!(StringId::from_raw(42).id(), 42);
    }
}
