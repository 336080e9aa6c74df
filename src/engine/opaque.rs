//! Protected text and the bridge that duplicates and compares it
//!
//! [`SecretText`] keeps its content sealed under a random mask. Nothing in the
//! engine can read it through member access; the only way in is
//! [`SecretText::reveal`], which the [`OpaqueBridge`] uses to reseal content
//! into an independent instance or to compare two instances by content.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::kind::{Capabilities, TypeInfo};
use super::reflect::{Reflect, Typed};

const REDACTED: &str = "********";

/// Type-specific primitives for `LeafOpaque` nodes
pub trait OpaqueBridge {
    /// Content-identical, independently stored duplicate
    fn duplicate(&self) -> Box<dyn Reflect>;

    /// Content comparison; false for a different concrete type
    fn equals(&self, other: &dyn Reflect) -> bool;

    /// Takes over `source`'s content when it differs, returning true on change
    fn merge_if_different(&mut self, source: &dyn Reflect) -> bool;
}

/// Text whose content is sealed in memory and wiped on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretText {
    sealed: Vec<u8>,
    mask: Vec<u8>,
}

impl SecretText {
    /// Seals the given plaintext
    pub fn new(plain: &str) -> Self {
        Self::seal(plain.as_bytes())
    }

    fn seal(plain: &[u8]) -> Self {
        let mut rng = rand::rng();
        let mask: Vec<u8> = (0..plain.len()).map(|_| rng.random::<u8>()).collect();
        let sealed = plain.iter().zip(&mask).map(|(p, m)| p ^ m).collect();
        Self { sealed, mask }
    }

    fn unseal(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(
            self.sealed
                .iter()
                .zip(&self.mask)
                .map(|(s, m)| s ^ m)
                .collect(),
        )
    }

    /// Discloses the plaintext to `f` for the duration of the call
    ///
    /// The temporary plaintext buffer is wiped before returning.
    pub fn reveal<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let plain = self.unseal();
        // sealed content always originates from a &str
        f(std::str::from_utf8(&plain[..]).unwrap_or_default())
    }

    /// Length of the content in bytes
    pub fn len(&self) -> usize {
        self.sealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sealed.is_empty()
    }

    fn digest(&self) -> blake3::Hash {
        let plain = self.unseal();
        blake3::hash(&plain[..])
    }

    /// Reseal-based duplicate: same content, fresh storage and mask
    fn reseal(&self) -> Self {
        let plain = self.unseal();
        Self::seal(&plain[..])
    }
}

impl Default for SecretText {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for SecretText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretText({})", REDACTED)
    }
}

impl PartialEq for SecretText {
    fn eq(&self, other: &Self) -> bool {
        // blake3::Hash equality is constant time
        self.digest() == other.digest()
    }
}

impl Eq for SecretText {}

impl From<&str> for SecretText {
    fn from(plain: &str) -> Self {
        Self::new(plain)
    }
}

impl Serialize for SecretText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.reveal(|plain| serializer.serialize_str(plain))
    }
}

impl<'de> Deserialize<'de> for SecretText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let plain = Zeroizing::new(String::deserialize(deserializer)?);
        Ok(Self::new(&plain))
    }
}

impl OpaqueBridge for SecretText {
    fn duplicate(&self) -> Box<dyn Reflect> {
        Box::new(self.reseal())
    }

    fn equals(&self, other: &dyn Reflect) -> bool {
        other
            .as_any()
            .downcast_ref::<SecretText>()
            .is_some_and(|other| self == other)
    }

    fn merge_if_different(&mut self, source: &dyn Reflect) -> bool {
        match source.as_any().downcast_ref::<SecretText>() {
            Some(source) if self != source => {
                *self = source.reseal();
                true
            }
            _ => false,
        }
    }
}

impl Reflect for SecretText {
    crate::__reflect_any!();

    fn as_opaque(&self) -> Option<&dyn OpaqueBridge> {
        Some(self)
    }

    fn as_opaque_mut(&mut self) -> Option<&mut dyn OpaqueBridge> {
        Some(self)
    }
}

impl Typed for SecretText {
    fn static_info() -> TypeInfo {
        TypeInfo::of::<SecretText>(Capabilities::OPAQUE)
    }
}
