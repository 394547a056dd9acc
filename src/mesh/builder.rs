//! Mesh construction and interchange.
//!
//! Collaborators (importers, renderers, editors) exchange meshes with the
//! core in a plain record form: a vertex is a key plus a position, an element
//! is a key plus an ordered vertex-key list plus a dimension tag. This module
//! converts between that form and [`HalfFacetMesh`], and also provides
//! index-based builders for face-vertex lists.

use nalgebra::Point3;

use super::element::Element;
use super::halffacet::HalfFacetMesh;
use super::index::{ElementKey, VertexKey};
use crate::error::{MeshError, Result};

/// Plain vertex record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexRecord {
    /// Vertex key.
    pub key: VertexKey,
    /// Vertex position.
    pub position: Point3<f64>,
}

/// Plain element record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRecord {
    /// Element key.
    pub key: ElementKey,
    /// Ordered vertex keys.
    pub vertices: Vec<VertexKey>,
    /// Topological dimension tag.
    pub dimension: u8,
}

impl HalfFacetMesh {
    /// Bulk import from interchange records, then build topology.
    ///
    /// Only structural well-formedness is checked: unique keys, known vertex
    /// references, and element shapes. Geometry is taken as given.
    ///
    /// # Example
    /// ```
    /// use halfacet::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let vertices = [(10, 0.0, 0.0), (11, 1.0, 0.0), (12, 0.0, 1.0)].map(|(k, x, y)| VertexRecord {
    ///     key: VertexKey::new(k),
    ///     position: Point3::new(x, y, 0.0),
    /// });
    /// let elements = [ElementRecord {
    ///     key: ElementKey::new(3),
    ///     vertices: vec![VertexKey::new(10), VertexKey::new(11), VertexKey::new(12)],
    ///     dimension: 2,
    /// }];
    ///
    /// let mesh = HalfFacetMesh::from_records(vertices, elements).unwrap();
    /// assert_eq!(mesh.num_edges().unwrap(), 3);
    /// assert!(mesh.is_naked_vertex(VertexKey::new(11)).unwrap());
    /// ```
    pub fn from_records<V, E>(vertices: V, elements: E) -> Result<Self>
    where
        V: IntoIterator<Item = VertexRecord>,
        E: IntoIterator<Item = ElementRecord>,
    {
        let mut mesh = HalfFacetMesh::new();

        for record in vertices {
            mesh.insert_vertex(record.key, record.position)?;
        }
        for record in elements {
            let element = Element::new(record.dimension, record.vertices)?;
            mesh.insert_element(record.key, element)?;
        }

        mesh.build_topology()?;
        Ok(mesh)
    }

    /// Export vertices in insertion order.
    pub fn vertex_records(&self) -> impl Iterator<Item = VertexRecord> + '_ {
        self.vertices().iter().map(|(key, v)| VertexRecord {
            key,
            position: v.position,
        })
    }

    /// Export elements in insertion order.
    pub fn element_records(&self) -> impl Iterator<Item = ElementRecord> + '_ {
        self.elements().iter().map(|(key, e)| ElementRecord {
            key,
            vertices: e.vertices().to_vec(),
            dimension: e.dimension(),
        })
    }
}

fn index_key(index: usize) -> VertexKey {
    VertexKey::new(u32::try_from(index).unwrap_or(u32::MAX))
}

/// Build a polygon mesh from vertex positions and index-based faces.
///
/// Vertex `i` gets key `i` and face `j` gets element key `j`. Topology is
/// built before returning.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of polygons, each an ordered list of at least 3 indices
///
/// # Example
/// ```
/// use halfacet::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_elements(), 2);
/// assert_eq!(mesh.num_edges().unwrap(), 6);
/// ```
pub fn build_from_polygons<F>(vertices: &[Point3<f64>], faces: &[F]) -> Result<HalfFacetMesh>
where
    F: AsRef<[usize]>,
{
    // Validate vertex indices
    for face in faces {
        if let Some(&vi) = face.as_ref().iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::UnknownVertex(index_key(vi)));
        }
    }

    let mut mesh = HalfFacetMesh::with_capacity(vertices.len(), faces.len());
    for &position in vertices {
        mesh.add_vertex(position)?;
    }
    for face in faces {
        let element = Element::polygon(face.as_ref().iter().map(|&vi| index_key(vi)))?;
        mesh.add_element(element)?;
    }

    mesh.build_topology()?;
    Ok(mesh)
}

/// Convert a mesh back to a face-vertex representation.
///
/// Vertices are numbered by insertion order. Returns (vertices, elements)
/// where each element is its list of vertex indices.
pub fn to_face_vertex(mesh: &HalfFacetMesh) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let mut slot = std::collections::HashMap::with_capacity(mesh.num_vertices());
    let vertices: Vec<Point3<f64>> = mesh
        .vertices()
        .iter()
        .enumerate()
        .map(|(i, (key, v))| {
            slot.insert(key, i);
            v.position
        })
        .collect();

    let elements: Vec<Vec<usize>> = mesh
        .elements()
        .iter()
        .map(|(_, e)| e.vertices().iter().map(|key| slot[key]).collect())
        .collect();

    (vertices, elements)
}
