//! Error types for halfacet.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

use crate::mesh::{ElementKey, HalfFacetId, Revision, VertexKey};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A vertex key is not present in the vertex store.
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexKey),

    /// An element key is not present in the element store.
    #[error("unknown element {0:?}")]
    UnknownElement(ElementKey),

    /// A vertex key is already taken.
    #[error("vertex {0:?} already exists")]
    DuplicateVertex(VertexKey),

    /// An element key is already taken.
    #[error("element {0:?} already exists")]
    DuplicateElement(ElementKey),

    /// The dimension and vertex count do not describe a supported cell shape.
    #[error("no {dimension}-dimensional element has {vertices} vertices")]
    InvalidElement {
        /// Topological dimension tag.
        dimension: u8,
        /// Number of vertices supplied.
        vertices: usize,
    },

    /// An element lists the same vertex more than once.
    #[error("element lists vertex {vertex:?} more than once")]
    DuplicateElementVertex {
        /// The repeated vertex.
        vertex: VertexKey,
    },

    /// More than two half-facets share the same vertex set.
    #[error("non-manifold half-facet {vertices:?} is shared by {count} elements")]
    NonManifold {
        /// Sorted vertex keys of the shared half-facet.
        vertices: Vec<VertexKey>,
        /// Number of half-facets sharing them.
        count: usize,
    },

    /// Every key of a store is taken, so no fresh key can be allocated.
    #[error("no fresh {store} key left")]
    KeysExhausted {
        /// Which store ran out: `"vertex"` or `"element"`.
        store: &'static str,
    },

    /// An average was requested over no vertices.
    #[error("cannot average an empty vertex list")]
    EmptyVertexList,

    /// The topology index was never built.
    #[error("topology has not been built")]
    TopologyNotBuilt,

    /// The stores changed after the topology index was built.
    #[error("topology built at {built} is stale (mesh is at {current})")]
    StaleTopology {
        /// Revision the index was built from.
        built: Revision,
        /// Current revision of the stores.
        current: Revision,
    },

    /// A vertex rule would divide by zero.
    #[error("vertex {vertex:?} is degenerate: {reason}")]
    DegenerateVertex {
        /// The offending vertex.
        vertex: VertexKey,
        /// Why its position cannot be computed.
        reason: &'static str,
    },

    /// An algorithm received an element it cannot process.
    #[error("element {element:?} has unsupported dimension {dimension}")]
    UnsupportedElement {
        /// The offending element.
        element: ElementKey,
        /// Its topological dimension.
        dimension: u8,
    },

    /// Sibling links are not symmetric.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

impl MeshError {
    /// Create an asymmetric-sibling error for `half_facet`.
    pub fn asymmetric_sibling(half_facet: HalfFacetId, sibling: HalfFacetId) -> Self {
        MeshError::InvalidTopology(format!(
            "{:?} points to {:?}, which does not point back",
            half_facet, sibling
        ))
    }
}
