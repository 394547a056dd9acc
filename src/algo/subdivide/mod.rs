//! Mesh subdivision algorithms.
//!
//! # Catmull-Clark Subdivision (Polygon Meshes)
//!
//! Catmull-Clark subdivision (Catmull & Clark, 1978) is an approximating
//! subdivision scheme for polygon meshes of any face size. Each iteration:
//!
//! 1. Moves every original vertex by the Catmull-Clark vertex rule
//! 2. Creates a face point at each face centroid
//! 3. Creates one edge point per topological edge
//! 4. Places edge points from the edge ends and adjacent face points
//! 5. Splits every n-gon into n quads meeting at its face point
//!
//! After one iteration every face is a quad. The result converges to a C²
//! continuous surface (C¹ at extraordinary vertices).
//!
//! # Example
//!
//! ```
//! use halfacet::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
//! use halfacet::mesh::build_from_polygons;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap();
//!
//! let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
//! assert_eq!(refined.num_elements(), 16);
//! assert!(refined.has_current_topology());
//! ```
//!
//! # References
//!
//! - Catmull, E. & Clark, J. (1978). "Recursively generated B-spline surfaces
//!   on arbitrary topological meshes." Computer-Aided Design, 10(6), 350-355.

mod catmull_clark;

pub use catmull_clark::{catmull_clark, catmull_clark_subdivide, catmull_clark_subdivide_with_progress};

/// Options for subdivision algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdivideOptions {
    /// Number of subdivision iterations.
    pub iterations: usize,
}

impl SubdivideOptions {
    /// Create options with the specified number of iterations.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}
