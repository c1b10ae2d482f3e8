//! Typed entity ids.
//!
//! Every entity in a [`PolyMesh`](crate::PolyMesh) is addressed by the slot it
//! was allocated in. Slots are never reused, so an id stays attached to the
//! same entity until that entity is removed or the mesh is explicitly
//! compacted.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel for a reference that no longer resolves to anything.
            pub const INVALID: Self = Self(u32::MAX);

            /// Slot index as `usize`.
            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Build an id from a slot index.
            ///
            /// Indices beyond `u32::MAX` map to [`Self::INVALID`].
            #[inline]
            #[must_use]
            pub fn from_index(index: usize) -> Self {
                u32::try_from(index).map_or(Self::INVALID, Self)
            }

            /// Whether this is the [`Self::INVALID`] sentinel.
            #[inline]
            #[must_use]
            pub const fn is_invalid(self) -> bool {
                self.0 == u32::MAX
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifies a vertex slot.
    VertexId,
    "v"
);
entity_id!(
    /// Identifies an edge slot.
    EdgeId,
    "e"
);
entity_id!(
    /// Identifies a face slot.
    FaceId,
    "f"
);

/// Normalized, direction-free key for the edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub VertexId, pub VertexId);

impl EdgeKey {
    /// Build a key with the smaller id first.
    #[inline]
    #[must_use]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// Whether the key contains `v`.
    #[inline]
    #[must_use]
    pub fn contains(self, v: VertexId) -> bool {
        self.0 == v || self.1 == v
    }
}
