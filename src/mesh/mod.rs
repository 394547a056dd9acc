//! Core mesh data structures.
//!
//! This module provides the half-facet mesh representation and related types
//! for representing meshes whose cells may be points, lines, polygons or
//! volumes.
//!
//! # Overview
//!
//! The primary type is [`HalfFacetMesh`]. It owns a [`VertexStore`] and an
//! [`ElementStore`], both keyed arenas, and a cached [`TopologyIndex`].
//! Connectivity is expressed through **half-facets**: the boundary
//! sub-entities of a cell (an endpoint of a line, an edge of a polygon, a face
//! of a volume). Two half-facets with the same vertex set are **siblings**; a
//! half-facet without a sibling is **naked** and lies on the mesh boundary.
//!
//! # Keys
//!
//! Mesh entities are identified by type-safe keys:
//! - [`VertexKey`] - Identifies a vertex
//! - [`ElementKey`] - Identifies an element
//! - [`HalfFacetId`] - Identifies a half-facet as (element, local index)
//!
//! # Construction
//!
//! Meshes are typically constructed from interchange records or from
//! face-vertex lists:
//!
//! ```
//! use halfacet::mesh::{build_from_polygons, VertexKey};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = build_from_polygons(&vertices, &faces).unwrap();
//! assert_eq!(mesh.adjacent_vertices(VertexKey::new(0)).unwrap().len(), 2);
//! ```

mod builder;
mod element;
mod halffacet;
mod index;
mod store;
mod topology;
mod visit;

pub use builder::{build_from_polygons, to_face_vertex, ElementRecord, VertexRecord};
pub use element::{Element, ElementKind, FacetVertices, HalfFacetRecord, MAX_POLYGON_VERTICES};
pub use halffacet::HalfFacetMesh;
pub use index::{ElementKey, HalfFacetId, KeyAllocator, Revision, VertexKey};
pub use store::{ElementStore, Vertex, VertexStore};
pub use topology::{edge_key, link_siblings, EdgeKey, TopologyIndex};
pub use visit::VisitSet;
