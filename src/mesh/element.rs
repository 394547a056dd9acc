//! Elements (cells) and their half-facets.
//!
//! An element is an ordered list of vertex keys plus a shape. The shape
//! decides how many half-facets the element has and which vertices bound
//! each of them:
//!
//! - **Point** (dimension 0): no half-facets
//! - **Line** (dimension 1): one half-facet per endpoint
//! - **Polygon** (dimension 2): one half-facet per edge, edge `i` is
//!   `(v[i], v[i + 1 mod n])`
//! - **Tetrahedron, Pyramid, Prism, Hexahedron** (dimension 3): one
//!   half-facet per face, from fixed face tables
//!
//! Each half-facet carries a [`HalfFacetRecord`] naming its sibling on the
//! neighbouring element, or marking it naked.

use smallvec::SmallVec;

use super::index::{ElementKey, HalfFacetId, VertexKey};
use crate::error::{MeshError, Result};

/// Vertex view of a single half-facet.
pub type FacetVertices = SmallVec<[VertexKey; 4]>;

/// Largest supported polygon: every edge needs a `u16` half-facet index.
pub const MAX_POLYGON_VERTICES: usize = u16::MAX as usize + 1;

const TETRAHEDRON_FACES: &[&[usize]] = &[&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]];

const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

const PRISM_FACES: &[&[usize]] = &[
    &[0, 2, 1],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[2, 0, 3, 5],
];

const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];

const TETRAHEDRON_EDGES: &[[usize; 2]] = &[[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

const PYRAMID_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [0, 4],
    [1, 4],
    [2, 4],
    [3, 4],
];

const PRISM_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 0],
    [3, 4],
    [4, 5],
    [5, 3],
    [0, 3],
    [1, 4],
    [2, 5],
];

const HEXAHEDRON_EDGES: &[[usize; 2]] = &[
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// The shape of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A single vertex.
    Point,
    /// A segment between two vertices.
    Line,
    /// A polygon with the given number of vertices (at least 3).
    Polygon(usize),
    /// Four vertices, four triangular faces.
    Tetrahedron,
    /// Quad base `0..4` and apex `4`.
    Pyramid,
    /// Triangles `0..3` and `3..6` joined by three quads.
    Prism,
    /// Quads `0..4` and `4..8` joined by four quads.
    Hexahedron,
}

impl ElementKind {
    /// Classify an element from its dimension tag and vertex count.
    pub fn classify(dimension: u8, vertices: usize) -> Result<Self> {
        let kind = match (dimension, vertices) {
            (0, 1) => ElementKind::Point,
            (1, 2) => ElementKind::Line,
            (2, n) if (3..=MAX_POLYGON_VERTICES).contains(&n) => ElementKind::Polygon(n),
            (3, 4) => ElementKind::Tetrahedron,
            (3, 5) => ElementKind::Pyramid,
            (3, 6) => ElementKind::Prism,
            (3, 8) => ElementKind::Hexahedron,
            _ => return Err(MeshError::InvalidElement { dimension, vertices }),
        };
        Ok(kind)
    }

    /// Topological dimension of the shape.
    pub fn dimension(self) -> u8 {
        match self {
            ElementKind::Point => 0,
            ElementKind::Line => 1,
            ElementKind::Polygon(_) => 2,
            ElementKind::Tetrahedron
            | ElementKind::Pyramid
            | ElementKind::Prism
            | ElementKind::Hexahedron => 3,
        }
    }

    /// Number of vertices the shape has.
    pub fn num_vertices(self) -> usize {
        match self {
            ElementKind::Point => 1,
            ElementKind::Line => 2,
            ElementKind::Polygon(n) => n,
            ElementKind::Tetrahedron => 4,
            ElementKind::Pyramid => 5,
            ElementKind::Prism => 6,
            ElementKind::Hexahedron => 8,
        }
    }

    /// Number of half-facets bounding the shape.
    pub fn num_half_facets(self) -> usize {
        match self {
            ElementKind::Point => 0,
            ElementKind::Line => 2,
            ElementKind::Polygon(n) => n,
            ElementKind::Tetrahedron => TETRAHEDRON_FACES.len(),
            ElementKind::Pyramid => PYRAMID_FACES.len(),
            ElementKind::Prism => PRISM_FACES.len(),
            ElementKind::Hexahedron => HEXAHEDRON_FACES.len(),
        }
    }

    fn face_table(self) -> Option<&'static [&'static [usize]]> {
        match self {
            ElementKind::Tetrahedron => Some(TETRAHEDRON_FACES),
            ElementKind::Pyramid => Some(PYRAMID_FACES),
            ElementKind::Prism => Some(PRISM_FACES),
            ElementKind::Hexahedron => Some(HEXAHEDRON_FACES),
            _ => None,
        }
    }

    fn edge_table(self) -> Option<&'static [[usize; 2]]> {
        match self {
            ElementKind::Tetrahedron => Some(TETRAHEDRON_EDGES),
            ElementKind::Pyramid => Some(PYRAMID_EDGES),
            ElementKind::Prism => Some(PRISM_EDGES),
            ElementKind::Hexahedron => Some(HEXAHEDRON_EDGES),
            _ => None,
        }
    }
}

/// Sibling state of one half-facet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HalfFacetRecord {
    /// No other half-facet shares this one's vertex set.
    #[default]
    Naked,
    /// The half-facet on the neighbouring element with the same vertex set.
    Sibling(HalfFacetId),
}

impl HalfFacetRecord {
    /// Check if this half-facet lies on the boundary.
    #[inline]
    pub fn is_naked(self) -> bool {
        matches!(self, HalfFacetRecord::Naked)
    }

    /// The sibling, if any.
    #[inline]
    pub fn sibling(self) -> Option<HalfFacetId> {
        match self {
            HalfFacetRecord::Naked => None,
            HalfFacetRecord::Sibling(hf) => Some(hf),
        }
    }
}

/// A cell of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    vertices: SmallVec<[VertexKey; 8]>,
    kind: ElementKind,
    half_facets: SmallVec<[HalfFacetRecord; 6]>,
}

impl Element {
    /// Create an element of the given dimension.
    ///
    /// All half-facets start out naked until the mesh topology is built.
    pub fn new<V>(dimension: u8, vertices: V) -> Result<Self>
    where
        V: IntoIterator<Item = VertexKey>,
    {
        let vertices: SmallVec<[VertexKey; 8]> = vertices.into_iter().collect();
        let kind = ElementKind::classify(dimension, vertices.len())?;

        let mut sorted = vertices.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(MeshError::DuplicateElementVertex { vertex: pair[0] });
        }

        Ok(Self {
            half_facets: SmallVec::from_elem(HalfFacetRecord::Naked, kind.num_half_facets()),
            vertices,
            kind,
        })
    }

    /// Create a polygonal (2D) element.
    pub fn polygon<V>(vertices: V) -> Result<Self>
    where
        V: IntoIterator<Item = VertexKey>,
    {
        Self::new(2, vertices)
    }

    /// The element's shape.
    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Topological dimension.
    #[inline]
    pub fn dimension(&self) -> u8 {
        self.kind.dimension()
    }

    /// Ordered vertex keys.
    #[inline]
    pub fn vertices(&self) -> &[VertexKey] {
        &self.vertices
    }

    /// Number of half-facets.
    #[inline]
    pub fn num_half_facets(&self) -> usize {
        self.half_facets.len()
    }

    /// Ids of this element's half-facets, given the element's key.
    pub fn half_facet_ids(&self, key: ElementKey) -> impl Iterator<Item = HalfFacetId> {
        (0..=u16::MAX)
            .take(self.num_half_facets())
            .map(move |local| HalfFacetId::new(key, local))
    }

    /// Ordered vertices bounding half-facet `local`.
    ///
    /// # Panics
    /// Panics if `local` is out of range.
    pub fn half_facet_vertices(&self, local: usize) -> FacetVertices {
        match self.kind {
            ElementKind::Point => panic!("points have no half-facets"),
            ElementKind::Line => SmallVec::from_slice(&[self.vertices[local]]),
            ElementKind::Polygon(n) => {
                assert!(local < n, "half-facet {} out of range for {}-gon", local, n);
                SmallVec::from_slice(&[self.vertices[local], self.vertices[(local + 1) % n]])
            }
            kind => kind
                .face_table()
                .map(|faces| faces[local].iter().map(|&i| self.vertices[i]).collect())
                .unwrap_or_default(),
        }
    }

    /// Order-independent key of half-facet `local`: its sorted vertex keys.
    pub fn canonical_key(&self, local: usize) -> FacetVertices {
        let mut key = self.half_facet_vertices(local);
        key.sort_unstable();
        key
    }

    /// Sibling record of half-facet `local`.
    #[inline]
    pub fn sibling(&self, local: usize) -> HalfFacetRecord {
        self.half_facets[local]
    }

    /// Check if half-facet `local` is naked.
    #[inline]
    pub fn is_naked(&self, local: usize) -> bool {
        self.half_facets[local].is_naked()
    }

    /// Iterate over the sibling records of all half-facets.
    pub fn half_facets(&self) -> impl Iterator<Item = HalfFacetRecord> + '_ {
        self.half_facets.iter().copied()
    }

    /// Iterate over the element's undirected edges, as stored vertex pairs.
    pub fn edges(&self) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
        let v = &self.vertices;
        let pairs: SmallVec<[(VertexKey, VertexKey); 12]> = match self.kind {
            ElementKind::Point => SmallVec::new(),
            ElementKind::Line => SmallVec::from_slice(&[(v[0], v[1])]),
            ElementKind::Polygon(n) => (0..n).map(|i| (v[i], v[(i + 1) % n])).collect(),
            kind => kind
                .edge_table()
                .map(|edges| edges.iter().map(|&[a, b]| (v[a], v[b])).collect())
                .unwrap_or_default(),
        };
        pairs.into_iter()
    }

    pub(crate) fn set_sibling(&mut self, local: usize, record: HalfFacetRecord) {
        self.half_facets[local] = record;
    }

    pub(crate) fn clear_siblings(&mut self) {
        self.half_facets.fill(HalfFacetRecord::Naked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[u32]) -> Vec<VertexKey> {
        raw.iter().map(|&k| VertexKey::new(k)).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(ElementKind::classify(2, 5).unwrap(), ElementKind::Polygon(5));
        assert_eq!(ElementKind::classify(3, 8).unwrap(), ElementKind::Hexahedron);
        assert!(matches!(
            ElementKind::classify(2, 2),
            Err(MeshError::InvalidElement { dimension: 2, vertices: 2 })
        ));
        assert!(ElementKind::classify(3, 7).is_err());
        assert!(ElementKind::classify(4, 4).is_err());
        assert!(ElementKind::classify(2, MAX_POLYGON_VERTICES).is_ok());
        assert_eq!(
            ElementKind::classify(2, MAX_POLYGON_VERTICES + 1),
            Err(MeshError::InvalidElement {
                dimension: 2,
                vertices: MAX_POLYGON_VERTICES + 1
            })
        );
    }

    #[test]
    fn test_largest_polygon_has_distinct_half_facet_ids() {
        let n = MAX_POLYGON_VERTICES as u32;
        let e = Element::polygon((0..n).map(VertexKey::new)).unwrap();
        let key = ElementKey::new(3);

        let ids: Vec<HalfFacetId> = e.half_facet_ids(key).collect();
        assert_eq!(ids.len(), MAX_POLYGON_VERTICES);
        assert_eq!(ids[0], HalfFacetId::new(key, 0));
        assert_eq!(ids[ids.len() - 1], HalfFacetId::new(key, u16::MAX));
        assert_eq!(e.half_facet_vertices(ids[ids.len() - 1].index()).as_slice(), keys(&[n - 1, 0]).as_slice());

        assert!(Element::polygon((0..n + 4).map(VertexKey::new)).is_err());
    }

    #[test]
    fn test_polygon_half_facets() {
        let e = Element::polygon(keys(&[3, 7, 5, 1])).unwrap();
        assert_eq!(e.num_half_facets(), 4);
        assert_eq!(e.half_facet_vertices(0).as_slice(), keys(&[3, 7]).as_slice());
        assert_eq!(e.half_facet_vertices(3).as_slice(), keys(&[1, 3]).as_slice());
        assert_eq!(e.canonical_key(3).as_slice(), keys(&[1, 3]).as_slice());
        assert!(e.half_facets().all(HalfFacetRecord::is_naked));
    }

    #[test]
    fn test_line_half_facets_are_endpoints() {
        let e = Element::new(1, keys(&[4, 9])).unwrap();
        assert_eq!(e.num_half_facets(), 2);
        assert_eq!(e.half_facet_vertices(1).as_slice(), keys(&[9]).as_slice());
        assert_eq!(e.edges().count(), 1);
    }

    #[test]
    fn test_point_has_no_half_facets() {
        let e = Element::new(0, keys(&[4])).unwrap();
        assert_eq!(e.num_half_facets(), 0);
        assert_eq!(e.edges().count(), 0);
    }

    #[test]
    fn test_volume_tables() {
        let tet = Element::new(3, keys(&[0, 1, 2, 3])).unwrap();
        assert_eq!(tet.num_half_facets(), 4);
        assert_eq!(tet.edges().count(), 6);

        let hex = Element::new(3, keys(&[0, 1, 2, 3, 4, 5, 6, 7])).unwrap();
        assert_eq!(hex.num_half_facets(), 6);
        assert_eq!(hex.edges().count(), 12);
        assert_eq!(hex.canonical_key(1).as_slice(), keys(&[4, 5, 6, 7]).as_slice());

        let prism = Element::new(3, keys(&[0, 1, 2, 3, 4, 5])).unwrap();
        assert_eq!(prism.half_facet_vertices(2).len(), 4);
        assert_eq!(prism.edges().count(), 9);

        let pyramid = Element::new(3, keys(&[0, 1, 2, 3, 4])).unwrap();
        assert_eq!(pyramid.half_facet_vertices(0).len(), 4);
        assert_eq!(pyramid.half_facet_vertices(1).len(), 3);
        assert_eq!(pyramid.edges().count(), 8);
    }

    #[test]
    fn test_volume_faces_follow_shape_edges() {
        let shapes: [&[u32]; 4] = [
            &[0, 1, 2, 3],
            &[0, 1, 2, 3, 4],
            &[0, 1, 2, 3, 4, 5],
            &[0, 1, 2, 3, 4, 5, 6, 7],
        ];
        for raw in shapes {
            let e = Element::new(3, keys(raw)).unwrap();
            let edges: Vec<_> = e
                .edges()
                .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
                .collect();
            for local in 0..e.num_half_facets() {
                let face = e.half_facet_vertices(local);
                for i in 0..face.len() {
                    let (a, b) = (face[i], face[(i + 1) % face.len()]);
                    let key = if a < b { (a, b) } else { (b, a) };
                    assert!(edges.contains(&key), "{:?} missing edge {:?}", e.kind(), key);
                }
            }
        }
    }

    #[test]
    fn test_duplicate_vertex_rejected() {
        assert!(matches!(
            Element::polygon(keys(&[0, 1, 0])),
            Err(MeshError::DuplicateElementVertex { .. })
        ));
        assert_eq!(
            Element::new(3, keys(&[0, 1, 2, 3, 4, 5, 6, 2])),
            Err(MeshError::DuplicateElementVertex { vertex: VertexKey::new(2) })
        );
    }
}
