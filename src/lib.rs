//! # Halfacet
//!
//! A half-facet mesh topology kernel with Catmull-Clark subdivision.
//!
//! Halfacet stores meshes whose cells may be points, line segments, polygons
//! or volumes in keyed vertex and element arenas. Every cell exposes its
//! boundary sub-entities as half-facets; sibling links between half-facets
//! that share a vertex set give neighbourhood and boundary queries without a
//! dimension-specific data structure.
//!
//! ## Features
//!
//! - **Mixed-dimension elements**: points, lines, polygons, tetrahedra,
//!   pyramids, prisms and hexahedra in one mesh
//! - **Stable keys**: vertex and element keys survive bulk import and export
//! - **Explicit topology**: sibling links and incidence sets are rebuilt on
//!   demand, and queries against outdated topology are reported as errors
//! - **Cheap copies**: shallow copies share storage until one side is edited
//! - **Catmull-Clark subdivision** for arbitrary polygon meshes
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use halfacet::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
//!
//! let mesh = build_from_polygons(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 6);
//! assert_eq!(mesh.num_elements(), 2);
//! assert_eq!(mesh.num_edges().unwrap(), 7);
//! ```
//!
//! ## Topology Queries
//!
//! ```
//! use halfacet::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! #     Point3::new(2.0, 0.0, 0.0),
//! #     Point3::new(2.0, 1.0, 0.0),
//! # ];
//! # let faces = vec![[0, 1, 2, 3], [1, 4, 5, 2]];
//! # let mut mesh = build_from_polygons(&vertices, &faces).unwrap();
//! let v1 = VertexKey::new(1);
//! let v2 = VertexKey::new(2);
//!
//! // The shared edge is interior, the outline is naked
//! assert!(!mesh.is_naked_edge(v1, v2).unwrap());
//! assert_eq!(mesh.edge_incident_elements(v1, v2).unwrap().len(), 2);
//! assert_eq!(mesh.adjacent_vertices(v1).unwrap(), &[VertexKey::new(0), v2, VertexKey::new(4)]);
//!
//! // Editing outdates the topology until it is rebuilt
//! mesh.set_position(v1, Point3::new(1.0, -0.5, 0.0)).unwrap();
//! assert!(mesh.adjacent_vertices(v1).is_err());
//! mesh.build_topology().unwrap();
//! assert!(mesh.adjacent_vertices(v1).is_ok());
//! ```
//!
//! ## Subdivision
//!
//! ```
//! use halfacet::prelude::*;
//! use halfacet::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_polygons(&vertices, &[[0, 1, 2]]).unwrap();
//!
//! let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
//! assert!(refined.is_quad_mesh());
//! assert_eq!(refined.num_elements(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use halfacet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, to_face_vertex, Element, ElementKey, ElementKind, ElementRecord,
        HalfFacetId, HalfFacetMesh, HalfFacetRecord, Vertex, VertexKey, VertexRecord,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron_surface() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_elements(), 4);
        // 4 triangles * 3 half-facets, all paired
        assert_eq!(mesh.num_half_facets(), 12);
        assert_eq!(mesh.num_edges().unwrap(), 6);
        mesh.check_siblings().unwrap();

        // Closed surface: no naked vertices
        for v in mesh.vertex_keys() {
            assert!(!mesh.is_naked_vertex(v).unwrap(), "vertex {:?} should not be naked", v);
        }
    }

    #[test]
    fn test_tetrahedron_volume() {
        let vertices = [
            (0, Point3::new(0.0, 0.0, 0.0)),
            (1, Point3::new(1.0, 0.0, 0.0)),
            (2, Point3::new(0.0, 1.0, 0.0)),
            (3, Point3::new(0.0, 0.0, 1.0)),
        ]
        .map(|(k, position)| VertexRecord {
            key: VertexKey::new(k),
            position,
        });
        let elements = [ElementRecord {
            key: ElementKey::new(0),
            vertices: (0..4).map(VertexKey::new).collect(),
            dimension: 3,
        }];

        let mesh = HalfFacetMesh::from_records(vertices, elements).unwrap();
        let tet = mesh.element(ElementKey::new(0)).unwrap();

        assert_eq!(tet.kind(), ElementKind::Tetrahedron);
        assert_eq!(tet.num_half_facets(), 4);
        assert_eq!(mesh.num_edges().unwrap(), 6);

        // A lone cell has all of its faces on the boundary
        assert!(tet.half_facets().all(HalfFacetRecord::is_naked));
        assert_eq!(mesh.topology().unwrap().naked_vertices().len(), 4);
    }
}
