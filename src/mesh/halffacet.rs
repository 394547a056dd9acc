//! Half-facet mesh data structure.
//!
//! [`HalfFacetMesh`] owns a [`VertexStore`], an [`ElementStore`] and a cached
//! [`TopologyIndex`]. Elements of any dimension from 0 to 3 may be mixed.
//!
//! # Topology lifecycle
//!
//! Any mutation of either store moves its revision forward. The topology index
//! remembers the revision it was built from, and every topology query checks
//! it: a query against an index that was never built or that predates a
//! mutation fails with [`MeshError::TopologyNotBuilt`] or
//! [`MeshError::StaleTopology`]. Call [`HalfFacetMesh::build_topology`] after
//! mutating.
//!
//! # Copies
//!
//! Stores are shared behind [`Arc`] and cloned on write, so
//! [`shallow_copy`](HalfFacetMesh::shallow_copy) (and `Clone`) is O(1). A
//! shallow copy is `Send + Sync` and becomes independent of the original as
//! soon as either side mutates.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};

use super::element::{Element, HalfFacetRecord};
use super::index::{ElementKey, HalfFacetId, Revision, VertexKey};
use super::store::{ElementStore, Vertex, VertexStore};
use super::topology::{link_siblings, TopologyIndex};
use crate::error::{MeshError, Result};

/// A mixed-dimension mesh with half-facet sibling topology.
#[derive(Debug, Clone, Default)]
pub struct HalfFacetMesh {
    vertices: Arc<VertexStore>,
    elements: Arc<ElementStore>,
    topology: Option<Arc<TopologyIndex>>,
}

impl HalfFacetMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_elements: usize) -> Self {
        Self {
            vertices: Arc::new(VertexStore::with_capacity(num_vertices)),
            elements: Arc::new(ElementStore::with_capacity(num_elements)),
            topology: None,
        }
    }

    /// Assemble a mesh from existing stores. Topology is not built.
    pub fn from_stores(vertices: VertexStore, elements: ElementStore) -> Self {
        Self {
            vertices: Arc::new(vertices),
            elements: Arc::new(elements),
            topology: None,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of elements.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Get the total number of half-facets.
    #[inline]
    pub fn num_half_facets(&self) -> usize {
        self.elements.num_half_facets()
    }

    /// The vertex store.
    #[inline]
    pub fn vertices(&self) -> &VertexStore {
        &self.vertices
    }

    /// The element store.
    #[inline]
    pub fn elements(&self) -> &ElementStore {
        &self.elements
    }

    /// Get a vertex by key.
    #[inline]
    pub fn vertex(&self, key: VertexKey) -> Result<&Vertex> {
        self.vertices.get(key)
    }

    /// Get an element by key.
    #[inline]
    pub fn element(&self, key: ElementKey) -> Result<&Element> {
        self.elements.get(key)
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, key: VertexKey) -> Result<Point3<f64>> {
        self.vertices.position(key)
    }

    /// Iterate over all vertex keys in insertion order.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys()
    }

    /// Iterate over all element keys in insertion order.
    pub fn element_keys(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.elements.keys()
    }

    /// Current revision of the stores.
    #[inline]
    pub fn revision(&self) -> Revision {
        Revision {
            vertices: self.vertices.revision(),
            elements: self.elements.revision(),
        }
    }

    // ==================== Construction ====================

    /// Add a new vertex under a fresh key and return the key.
    ///
    /// # Errors
    ///
    /// [`MeshError::KeysExhausted`] if key `u32::MAX` is already in use.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<VertexKey> {
        if self.vertices.next_key().is_none() {
            return Err(MeshError::KeysExhausted { store: "vertex" });
        }
        Arc::make_mut(&mut self.vertices).push(position)
    }

    /// Add a vertex under a caller-chosen key.
    pub fn insert_vertex(&mut self, key: VertexKey, position: Point3<f64>) -> Result<()> {
        if self.vertices.contains(key) {
            return Err(MeshError::DuplicateVertex(key));
        }
        Arc::make_mut(&mut self.vertices).insert(key, position)
    }

    /// Set the position of an existing vertex, returning the old position.
    pub fn set_position(&mut self, key: VertexKey, position: Point3<f64>) -> Result<Point3<f64>> {
        if !self.vertices.contains(key) {
            return Err(MeshError::UnknownVertex(key));
        }
        Arc::make_mut(&mut self.vertices).replace(key, position)
    }

    /// Add a new element under a fresh key and return the key.
    ///
    /// # Errors
    ///
    /// [`MeshError::KeysExhausted`] if key `u32::MAX` is already in use.
    pub fn add_element(&mut self, element: Element) -> Result<ElementKey> {
        if self.elements.next_key().is_none() {
            return Err(MeshError::KeysExhausted { store: "element" });
        }
        Arc::make_mut(&mut self.elements).push(element)
    }

    /// Add an element under a caller-chosen key.
    pub fn insert_element(&mut self, key: ElementKey, element: Element) -> Result<()> {
        if self.elements.contains(key) {
            return Err(MeshError::DuplicateElement(key));
        }
        Arc::make_mut(&mut self.elements).insert(key, element)
    }

    /// Swap an existing element for a new one, returning the old element.
    pub fn replace_element(&mut self, key: ElementKey, element: Element) -> Result<Element> {
        if !self.elements.contains(key) {
            return Err(MeshError::UnknownElement(key));
        }
        Arc::make_mut(&mut self.elements).replace(key, element)
    }

    // ==================== Topology ====================

    /// Link half-facet siblings and rebuild the topology index.
    ///
    /// On error the previous sibling graph and index are left untouched.
    ///
    /// # Errors
    ///
    /// - [`MeshError::UnknownVertex`] if an element references a missing vertex.
    /// - [`MeshError::NonManifold`] if more than two half-facets share a
    ///   vertex set.
    pub fn build_topology(&mut self) -> Result<()> {
        let pairs = link_siblings(&self.vertices, &self.elements)?;
        let revision = self.revision();

        let elements = Arc::make_mut(&mut self.elements);
        elements.clear_siblings();
        for &(a, b) in &pairs {
            elements.set_sibling(a, HalfFacetRecord::Sibling(b));
            elements.set_sibling(b, HalfFacetRecord::Sibling(a));
        }

        let index = TopologyIndex::build(&self.vertices, &self.elements, revision);
        log::debug!(
            "built topology at {}: {} vertices, {} elements, {} sibling pairs, {} edges",
            revision,
            self.num_vertices(),
            self.num_elements(),
            pairs.len(),
            index.num_edges()
        );
        self.topology = Some(Arc::new(index));
        Ok(())
    }

    /// Check if the topology index describes the current stores.
    pub fn has_current_topology(&self) -> bool {
        self.topology().is_ok()
    }

    /// The topology index, if it is current.
    ///
    /// # Errors
    ///
    /// [`MeshError::TopologyNotBuilt`] or [`MeshError::StaleTopology`].
    pub fn topology(&self) -> Result<&TopologyIndex> {
        let index = self.topology.as_deref().ok_or(MeshError::TopologyNotBuilt)?;
        let current = self.revision();
        if index.revision() != current {
            return Err(MeshError::StaleTopology {
                built: index.revision(),
                current,
            });
        }
        Ok(index)
    }

    /// Sibling of a half-facet, or `None` if it is naked.
    pub fn sibling(&self, hf: HalfFacetId) -> Result<Option<HalfFacetId>> {
        self.topology()?;
        Ok(self.elements.sibling(hf)?.sibling())
    }

    /// Check if a half-facet has no sibling.
    pub fn is_naked_half_facet(&self, hf: HalfFacetId) -> Result<bool> {
        Ok(self.sibling(hf)?.is_none())
    }

    /// Vertices sharing an edge with `v`.
    pub fn adjacent_vertices(&self, v: VertexKey) -> Result<&[VertexKey]> {
        self.topology()?.adjacent_vertices(v)
    }

    /// Elements referencing `v`.
    pub fn incident_elements(&self, v: VertexKey) -> Result<&[ElementKey]> {
        self.topology()?.incident_elements(v)
    }

    /// Elements sharing the undirected edge `{v0, v1}`.
    pub fn edge_incident_elements(&self, v0: VertexKey, v1: VertexKey) -> Result<&[ElementKey]> {
        self.topology()?.edge_incident_elements(v0, v1)
    }

    /// Check if `v` bounds a naked half-facet.
    pub fn is_naked_vertex(&self, v: VertexKey) -> Result<bool> {
        self.topology()?.is_naked_vertex(v)
    }

    /// Check if `{v0, v1}` has exactly one incident element.
    pub fn is_naked_edge(&self, v0: VertexKey, v1: VertexKey) -> Result<bool> {
        self.topology()?.is_naked_edge(v0, v1)
    }

    /// Number of distinct undirected edges.
    pub fn num_edges(&self) -> Result<usize> {
        Ok(self.topology()?.num_edges())
    }

    /// Compute the valence (number of adjacent vertices) of a vertex.
    pub fn valence(&self, v: VertexKey) -> Result<usize> {
        self.topology()?.valence(v)
    }

    /// Check that every sibling link points back at its source.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidTopology`] naming the first asymmetric half-facet.
    pub fn check_siblings(&self) -> Result<()> {
        for hf in self.elements.half_facet_ids() {
            if let HalfFacetRecord::Sibling(sibling) = self.elements.sibling(hf)? {
                let back = self
                    .elements
                    .sibling(sibling)
                    .map_err(|_| MeshError::asymmetric_sibling(hf, sibling))?;
                if back != HalfFacetRecord::Sibling(hf) {
                    return Err(MeshError::asymmetric_sibling(hf, sibling));
                }
            }
        }
        Ok(())
    }

    // ==================== Copies ====================

    /// O(1) copy sharing storage with `self` until either side mutates.
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }

    /// Copy duplicating all stores and the topology index.
    pub fn deep_copy(&self) -> Self {
        Self {
            vertices: Arc::new(VertexStore::clone(&self.vertices)),
            elements: Arc::new(ElementStore::clone(&self.elements)),
            topology: self
                .topology
                .as_deref()
                .map(|index| Arc::new(index.clone())),
        }
    }

    /// Copy of vertices and elements only, without sibling links or topology.
    ///
    /// Key allocators and revisions carry over; the copy needs
    /// [`build_topology`](Self::build_topology) before it can be queried.
    pub fn clean_copy(&self) -> Self {
        let mut elements = ElementStore::clone(&self.elements);
        elements.clear_siblings();
        Self {
            vertices: Arc::new(VertexStore::clone(&self.vertices)),
            elements: Arc::new(elements),
            topology: None,
        }
    }

    // ==================== Geometry ====================

    /// Average position of a set of vertices.
    ///
    /// # Errors
    ///
    /// [`MeshError::EmptyVertexList`] if `keys` is empty, or
    /// [`MeshError::UnknownVertex`] for a missing key.
    pub fn average_position(&self, keys: &[VertexKey]) -> Result<Point3<f64>> {
        if keys.is_empty() {
            return Err(MeshError::EmptyVertexList);
        }
        let mut sum = Vector3::zeros();
        for &key in keys {
            sum += self.position(key)?.coords;
        }
        Ok(Point3::from(sum / keys.len() as f64))
    }

    /// Centroid of an element's vertices.
    pub fn element_centroid(&self, key: ElementKey) -> Result<Point3<f64>> {
        self.average_position(self.element(key)?.vertices())
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.vertices.iter().map(|(_, v)| v.position);
        let first = positions.next()?;

        let (mut min, mut max) = (first, first);
        for p in positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Some((min, max))
    }

    /// Check if every element is a polygon.
    pub fn is_polygon_mesh(&self) -> bool {
        self.elements.iter().all(|(_, e)| e.dimension() == 2)
    }

    /// Check if every element is a quadrilateral.
    pub fn is_quad_mesh(&self) -> bool {
        self.elements
            .iter()
            .all(|(_, e)| e.dimension() == 2 && e.vertices().len() == 4)
    }
}
