//! Key types for mesh entities.
//!
//! Vertices and elements are addressed by type-safe integer keys. Keys are
//! assigned by the caller on import or handed out by a [`KeyAllocator`] owned
//! by the store, and are never reused while the store is alive.

use std::fmt::{self, Debug, Display};

/// A type-safe vertex key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexKey(u32);

/// A type-safe element key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ElementKey(u32);

macro_rules! impl_key_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a key from its raw value.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw key value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(key: $name) -> u32 {
                key.0
            }
        }
    };
}

impl_key_type!(VertexKey, "V");
impl_key_type!(ElementKey, "E");

/// A half-facet: the `local`-th boundary facet of `element`.
///
/// Half-facets are not stored objects; this is the logical address used by
/// sibling links and visit tables.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HalfFacetId {
    /// The owning element.
    pub element: ElementKey,
    /// Local index of the facet within the element (0-based).
    pub local: u16,
}

impl HalfFacetId {
    /// Create a half-facet id.
    #[inline]
    pub const fn new(element: ElementKey, local: u16) -> Self {
        Self { element, local }
    }

    /// The local index as `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.local as usize
    }
}

impl Debug for HalfFacetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HF({:?}:{})", self.element, self.local)
    }
}

/// Hands out fresh keys for one store.
///
/// The allocator observes every key inserted by the caller, so the next fresh
/// key is always greater than any key the store has ever held. Once key
/// `u32::MAX` is in use the allocator is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyAllocator {
    next: u64,
}

impl KeyAllocator {
    /// Create an allocator starting at key 0.
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// The key the next call to [`allocate`](Self::allocate) will return.
    #[inline]
    pub fn peek(&self) -> Option<u32> {
        u32::try_from(self.next).ok()
    }

    /// Reserve and return a fresh key, or `None` if every key is taken.
    #[inline]
    pub fn allocate(&mut self) -> Option<u32> {
        let key = self.peek()?;
        self.next += 1;
        Some(key)
    }

    /// Record that `key` is in use.
    #[inline]
    pub fn observe(&mut self, key: u32) {
        self.next = self.next.max(u64::from(key) + 1);
    }
}

/// Revision stamp of a vertex/element store pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Revision {
    /// Revision of the vertex store.
    pub vertices: u64,
    /// Revision of the element store.
    pub elements: u64,
}

impl Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}.{}", self.vertices, self.elements)
    }
}
