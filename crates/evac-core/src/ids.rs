//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are dense `u32` indices, `Copy + Ord + Hash`, and print with a
//! one-letter tag (`n12`, `a3`) to keep log lines short.  Ordering by id is the
//! canonical deterministic tie-break wherever one is needed.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) = $tag:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Build from a `Vec` index.  `None` if the index does not fit or
            /// collides with the `INVALID` sentinel.
            #[inline]
            pub fn from_index(index: usize) -> Option<Self> {
                <$inner>::try_from(index).ok().map($name).filter(|id| id.is_valid())
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}{}", $tag, self.0)
                } else {
                    write!(f, "{}-", $tag)
                }
            }
        }
    };
}

typed_id! {
    /// Index of an evacuee in the scheduler's agent collection.
    pub struct AgentId(u32) = "a";
}

typed_id! {
    /// Index of a road-network node (junction, building entry, or target).
    pub struct NodeId(u32) = "n";
}

typed_id! {
    /// Index of a directed half-edge in the network's CSR adjacency.
    pub struct EdgeId(u32) = "e";
}
