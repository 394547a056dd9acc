//! Mesh processing algorithms.
//!
//! Algorithms consume a [`HalfFacetMesh`](crate::mesh::HalfFacetMesh) whose
//! topology is current and produce a new mesh with its topology already
//! built, so results can be fed straight into the next algorithm.
//!
//! - **Subdivision**: Catmull-Clark subdivision of polygon meshes

pub mod progress;
pub mod subdivide;

pub use progress::Progress;
