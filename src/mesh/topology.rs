//! Half-facet sibling linking and the derived topology index.
//!
//! Building topology is a two-step process:
//!
//! 1. [`link_siblings`] groups every half-facet of every element by its
//!    canonical key (sorted vertex keys). A key shared by exactly two
//!    half-facets makes them siblings, a key held by one half-facet leaves it
//!    naked, and a key shared by more than two is a non-manifold condition.
//! 2. [`TopologyIndex::build`] consumes the linked elements and derives the
//!    incidence sets used by queries: vertex → adjacent vertices, vertex →
//!    incident elements, edge → incident elements, and naked vertices.
//!
//! Both steps are a single pass over the half-facets with hashing on the
//! canonical key.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use super::element::FacetVertices;
use super::index::{ElementKey, HalfFacetId, Revision, VertexKey};
use super::store::{ElementStore, VertexStore};
use crate::error::{MeshError, Result};

/// An undirected edge, smaller key first.
pub type EdgeKey = (VertexKey, VertexKey);

/// Canonical form of the undirected edge `{a, b}`.
#[inline]
pub fn edge_key(a: VertexKey, b: VertexKey) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Compute the sibling pairs of all half-facets in `elements`.
///
/// Returns each pair once, in element order. Half-facets that appear in no
/// pair are naked. Nothing is written to the stores, so a failure leaves the
/// previous sibling graph in place.
///
/// # Errors
///
/// - [`MeshError::UnknownVertex`] if an element references a vertex missing
///   from `vertices`.
/// - [`MeshError::NonManifold`] if more than two half-facets share a key.
pub fn link_siblings(
    vertices: &VertexStore,
    elements: &ElementStore,
) -> Result<Vec<(HalfFacetId, HalfFacetId)>> {
    let mut groups: HashMap<FacetVertices, SmallVec<[HalfFacetId; 2]>> =
        HashMap::with_capacity(elements.num_half_facets());

    for (key, element) in elements.iter() {
        if let Some(&missing) = element.vertices().iter().find(|&&v| !vertices.contains(v)) {
            return Err(MeshError::UnknownVertex(missing));
        }
        for hf in element.half_facet_ids(key) {
            groups
                .entry(element.canonical_key(hf.index()))
                .or_default()
                .push(hf);
        }
    }

    // Second pass in element order keeps error reporting and pair order stable.
    let mut pairs = Vec::with_capacity(elements.num_half_facets() / 2);
    for (key, element) in elements.iter() {
        for hf in element.half_facet_ids(key) {
            let canonical = element.canonical_key(hf.index());
            let group = &groups[&canonical];
            match group.len() {
                1 => {}
                2 => {
                    if group[0] == hf {
                        pairs.push((group[0], group[1]));
                    }
                }
                count => {
                    log::warn!(
                        "half-facet {:?} of {:?} is shared by {} elements",
                        canonical.as_slice(),
                        key,
                        count
                    );
                    return Err(MeshError::NonManifold {
                        vertices: canonical.to_vec(),
                        count,
                    });
                }
            }
        }
    }

    Ok(pairs)
}

/// Incidence sets derived from linked vertex and element stores.
///
/// The index is a pure function of the stores at the revision it was built
/// from. Query results are sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyIndex {
    revision: Revision,
    adjacent: HashMap<VertexKey, Vec<VertexKey>>,
    incident: HashMap<VertexKey, Vec<ElementKey>>,
    edges: HashMap<EdgeKey, Vec<ElementKey>>,
    naked: HashSet<VertexKey>,
}

impl TopologyIndex {
    /// Build the index from stores whose sibling records are current.
    pub fn build(vertices: &VertexStore, elements: &ElementStore, revision: Revision) -> Self {
        let mut adjacent: HashMap<VertexKey, Vec<VertexKey>> = HashMap::with_capacity(vertices.len());
        let mut incident: HashMap<VertexKey, Vec<ElementKey>> = HashMap::with_capacity(vertices.len());
        for v in vertices.keys() {
            adjacent.insert(v, Vec::new());
            incident.insert(v, Vec::new());
        }

        let mut edges: HashMap<EdgeKey, Vec<ElementKey>> = HashMap::new();
        let mut naked = HashSet::new();

        for (key, element) in elements.iter() {
            for &v in element.vertices() {
                incident.entry(v).or_default().push(key);
            }
            for (a, b) in element.edges() {
                adjacent.entry(a).or_default().push(b);
                adjacent.entry(b).or_default().push(a);
                edges.entry(edge_key(a, b)).or_default().push(key);
            }
            for local in 0..element.num_half_facets() {
                if element.is_naked(local) {
                    naked.extend(element.half_facet_vertices(local));
                }
            }
        }

        for list in adjacent.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        for list in incident.values_mut().chain(edges.values_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            revision,
            adjacent,
            incident,
            edges,
            naked,
        }
    }

    /// Revision of the stores this index describes.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Number of known vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.adjacent.len()
    }

    /// Number of distinct undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Vertices sharing an edge with `v`.
    pub fn adjacent_vertices(&self, v: VertexKey) -> Result<&[VertexKey]> {
        self.adjacent
            .get(&v)
            .map(Vec::as_slice)
            .ok_or(MeshError::UnknownVertex(v))
    }

    /// Number of vertices sharing an edge with `v`.
    pub fn valence(&self, v: VertexKey) -> Result<usize> {
        self.adjacent_vertices(v).map(<[VertexKey]>::len)
    }

    /// Elements referencing `v`.
    pub fn incident_elements(&self, v: VertexKey) -> Result<&[ElementKey]> {
        self.incident
            .get(&v)
            .map(Vec::as_slice)
            .ok_or(MeshError::UnknownVertex(v))
    }

    /// Elements sharing the undirected edge `{v0, v1}`.
    ///
    /// Empty if the pair is not an edge of the mesh.
    pub fn edge_incident_elements(&self, v0: VertexKey, v1: VertexKey) -> Result<&[ElementKey]> {
        self.check_vertex(v0)?;
        self.check_vertex(v1)?;
        Ok(self
            .edges
            .get(&edge_key(v0, v1))
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// Check if `v` bounds at least one naked half-facet.
    pub fn is_naked_vertex(&self, v: VertexKey) -> Result<bool> {
        self.check_vertex(v)?;
        Ok(self.naked.contains(&v))
    }

    /// Check if `{v0, v1}` is an edge with exactly one incident element.
    pub fn is_naked_edge(&self, v0: VertexKey, v1: VertexKey) -> Result<bool> {
        Ok(self.edge_incident_elements(v0, v1)?.len() == 1)
    }

    /// All naked vertices, sorted.
    pub fn naked_vertices(&self) -> Vec<VertexKey> {
        let mut naked: Vec<VertexKey> = self.naked.iter().copied().collect();
        naked.sort_unstable();
        naked
    }

    /// All edges with exactly one incident element, sorted.
    pub fn naked_edges(&self) -> Vec<EdgeKey> {
        let mut naked: Vec<EdgeKey> = self
            .edges
            .iter()
            .filter(|(_, elements)| elements.len() == 1)
            .map(|(&edge, _)| edge)
            .collect();
        naked.sort_unstable();
        naked
    }

    /// All distinct edges, sorted.
    pub fn edges(&self) -> Vec<EdgeKey> {
        let mut edges: Vec<EdgeKey> = self.edges.keys().copied().collect();
        edges.sort_unstable();
        edges
    }

    fn check_vertex(&self, v: VertexKey) -> Result<()> {
        if self.adjacent.contains_key(&v) {
            Ok(())
        } else {
            Err(MeshError::UnknownVertex(v))
        }
    }
}
