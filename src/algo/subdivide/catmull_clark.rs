//! Catmull-Clark subdivision for polygon meshes.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{
    Element, ElementKey, ElementStore, HalfFacetId, HalfFacetMesh, TopologyIndex, VertexKey,
    VertexStore, VisitSet,
};

use super::SubdivideOptions;

/// Performs `options.iterations` rounds of Catmull-Clark subdivision.
///
/// Zero iterations returns a shallow copy of `mesh`.
///
/// # Errors
///
/// Fails with the first error of any round; see [`catmull_clark`].
pub fn catmull_clark_subdivide(
    mesh: &HalfFacetMesh,
    options: &SubdivideOptions,
) -> Result<HalfFacetMesh> {
    catmull_clark_subdivide_with_progress(mesh, options, &Progress::none())
}

/// Catmull-Clark subdivision with progress reporting.
pub fn catmull_clark_subdivide_with_progress(
    mesh: &HalfFacetMesh,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<HalfFacetMesh> {
    let mut current = mesh.shallow_copy();

    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Catmull-Clark subdivision");
        current = catmull_clark(&current)?;
    }
    progress.report(options.iterations, options.iterations, "Catmull-Clark subdivision");

    Ok(current)
}

/// Performs one round of Catmull-Clark subdivision.
///
/// Every n-gon of `mesh` becomes n quads meeting at a new face point. The
/// input is only read; the refined mesh is assembled separately and has its
/// topology built before it is returned.
///
/// # Vertex Rules
///
/// - **Face point**: centroid of the face's vertices
/// - **Edge point**: for an interior edge, the average of both end points and
///   the centroids of all faces sharing the edge; for a naked edge, its
///   midpoint
/// - **Vertex point** (interior): (F + 2R + (n-3)P) / n where:
///   - F = average of incident face centroids
///   - R = average of the midpoints of incident edges
///   - P = original position
///   - n = number of adjacent vertices
/// - **Vertex point** (naked): average of the midpoints of the edges leading
///   to naked neighbours
///
/// # Keys
///
/// Original vertices keep their keys. Face points are keyed next, in element
/// order, followed by edge points in traversal order. Output element keys
/// start at 0.
///
/// # Errors
///
/// - [`MeshError::TopologyNotBuilt`] / [`MeshError::StaleTopology`] if the
///   input topology is not current.
/// - [`MeshError::UnsupportedElement`] if an element is not a polygon.
/// - [`MeshError::DegenerateVertex`] if a vertex rule has a zero denominator.
pub fn catmull_clark(mesh: &HalfFacetMesh) -> Result<HalfFacetMesh> {
    let topology = mesh.topology()?;

    if let Some((key, element)) = mesh.elements().iter().find(|(_, e)| e.dimension() != 2) {
        return Err(MeshError::UnsupportedElement {
            element: key,
            dimension: element.dimension(),
        });
    }

    let centroids: HashMap<ElementKey, Point3<f64>> = mesh
        .elements()
        .iter()
        .map(|(key, e)| mesh.average_position(e.vertices()).map(|c| (key, c)))
        .collect::<Result<_>>()?;

    let num_corners: usize = mesh.elements().iter().map(|(_, e)| e.vertices().len()).sum();
    let mut vertices = VertexStore::with_capacity(
        mesh.num_vertices() + topology.num_edges() + mesh.num_elements(),
    );

    // Step 1: Reposition original vertices under their own keys
    for key in mesh.vertex_keys() {
        vertices.insert(key, vertex_point(mesh, topology, &centroids, key)?)?;
    }

    // Step 2: Face points
    let mut face_points: HashMap<ElementKey, VertexKey> =
        HashMap::with_capacity(mesh.num_elements());
    for key in mesh.element_keys() {
        face_points.insert(key, vertices.push(centroids[&key])?);
    }

    // Step 3: One edge point per topological edge, shared by all its half-facets
    let (edge_points, edges) = allocate_edge_points(mesh, &mut vertices)?;
    log::debug!(
        "Catmull-Clark: {} vertex points, {} face points, {} edge points",
        mesh.num_vertices(),
        face_points.len(),
        edges.len()
    );

    // Step 4: Place edge points using the original mesh's topology
    for &(key, hf) in &edges {
        let ends = mesh.element(hf.element)?.half_facet_vertices(hf.index());
        let position = edge_point(mesh, topology, &centroids, ends[0], ends[1])?;
        vertices.replace(key, position)?;
    }

    // Step 5: Split every n-gon into n quads
    let mut elements = ElementStore::with_capacity(num_corners);
    for (key, element) in mesh.elements().iter() {
        let face_point = face_points[&key];
        // Edge i runs from corner i to corner i + 1
        let ring: Vec<VertexKey> = element
            .half_facet_ids(key)
            .map(|hf| edge_points[&hf])
            .collect();
        let k = ring.len();

        for (i, &corner) in element.vertices().iter().enumerate() {
            let quad = [corner, ring[(i + k - 1) % k], face_point, ring[i]];
            elements.push(Element::polygon(quad)?)?;
        }
    }

    let mut refined = HalfFacetMesh::from_stores(vertices, elements);
    refined.build_topology()?;
    log::debug!(
        "Catmull-Clark: {} elements -> {} quads",
        mesh.num_elements(),
        refined.num_elements()
    );
    Ok(refined)
}

/// Allocate edge points in a single traversal of the sibling graph.
///
/// Returns the edge point of every half-facet, plus each edge point paired
/// with the first half-facet that produced it.
fn allocate_edge_points(
    mesh: &HalfFacetMesh,
    vertices: &mut VertexStore,
) -> Result<(HashMap<HalfFacetId, VertexKey>, Vec<(VertexKey, HalfFacetId)>)> {
    let elements = mesh.elements();
    let mut edge_points = HashMap::with_capacity(elements.num_half_facets());
    let mut edges = Vec::new();
    let mut visits = VisitSet::with_capacity(elements.num_half_facets());

    for hf in elements.half_facet_ids() {
        if !visits.visit(hf) {
            continue;
        }

        // Positioned in step 4
        let key = vertices.push(Point3::origin())?;
        edge_points.insert(hf, key);
        edges.push((key, hf));

        let mut current = hf;
        while let Some(sibling) = elements.sibling(current)?.sibling() {
            if !visits.visit(sibling) {
                break;
            }
            edge_points.insert(sibling, key);
            current = sibling;
        }
    }

    debug_assert_eq!(visits.len(), elements.num_half_facets());
    visits.clear();

    Ok((edge_points, edges))
}

/// New position of an original vertex.
fn vertex_point(
    mesh: &HalfFacetMesh,
    topology: &TopologyIndex,
    centroids: &HashMap<ElementKey, Point3<f64>>,
    v: VertexKey,
) -> Result<Point3<f64>> {
    let p = mesh.position(v)?.coords;
    let neighbors = topology.adjacent_vertices(v)?;

    if topology.is_naked_vertex(v)? {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for &u in neighbors {
            if topology.is_naked_vertex(u)? {
                sum += (p + mesh.position(u)?.coords) * 0.5;
                count += 1;
            }
        }
        if count == 0 {
            return Err(MeshError::DegenerateVertex {
                vertex: v,
                reason: "naked vertex has no naked neighbours",
            });
        }
        return Ok(Point3::from(sum / count as f64));
    }

    let incident = topology.incident_elements(v)?;
    if neighbors.is_empty() || incident.is_empty() {
        return Err(MeshError::DegenerateVertex {
            vertex: v,
            reason: "vertex has no neighbours",
        });
    }

    // F = average of adjacent face points
    let f: Vector3<f64> = incident
        .iter()
        .map(|e| centroids[e].coords)
        .sum::<Vector3<f64>>()
        / incident.len() as f64;

    // R = average of adjacent edge midpoints
    let mut r = Vector3::zeros();
    for &u in neighbors {
        r += (p + mesh.position(u)?.coords) * 0.5;
    }
    r /= neighbors.len() as f64;

    let n = neighbors.len() as f64;
    Ok(Point3::from((f + r * 2.0 + p * (n - 3.0)) / n))
}

/// Position of the edge point on `{a, b}`.
fn edge_point(
    mesh: &HalfFacetMesh,
    topology: &TopologyIndex,
    centroids: &HashMap<ElementKey, Point3<f64>>,
    a: VertexKey,
    b: VertexKey,
) -> Result<Point3<f64>> {
    let pa = mesh.position(a)?.coords;
    let pb = mesh.position(b)?.coords;

    if topology.is_naked_edge(a, b)? {
        return Ok(Point3::from((pa + pb) * 0.5));
    }

    let incident = topology.edge_incident_elements(a, b)?;
    let sum = incident
        .iter()
        .fold(pa + pb, |sum, e| sum + centroids[e].coords);
    Ok(Point3::from(sum / (incident.len() + 2) as f64))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::mesh::build_from_polygons;

    fn v(raw: u32) -> VertexKey {
        VertexKey::new(raw)
    }

    fn create_single_quad() -> HalfFacetMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    fn create_two_quads() -> HalfFacetMesh {
        // Two quads sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[[0, 1, 2, 3], [1, 4, 5, 2]]).unwrap()
    }

    fn create_quad_cube() -> HalfFacetMesh {
        let vertices = vec![
            // Bottom face (z = 0)
            Point3::new(0.0, 0.0, 0.0), // 0
            Point3::new(1.0, 0.0, 0.0), // 1
            Point3::new(1.0, 1.0, 0.0), // 2
            Point3::new(0.0, 1.0, 0.0), // 3
            // Top face (z = 1)
            Point3::new(0.0, 0.0, 1.0), // 4
            Point3::new(1.0, 0.0, 1.0), // 5
            Point3::new(1.0, 1.0, 1.0), // 6
            Point3::new(0.0, 1.0, 1.0), // 7
        ];
        let faces = [
            [0, 3, 2, 1], // Bottom
            [4, 5, 6, 7], // Top
            [0, 1, 5, 4], // Front
            [2, 3, 7, 6], // Back
            [0, 4, 7, 3], // Left
            [1, 2, 6, 5], // Right
        ];
        build_from_polygons(&vertices, &faces).unwrap()
    }

    /// 2x2 quads around a raised center vertex 4.
    fn create_bumped_grid() -> HalfFacetMesh {
        let mut vertices = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                vertices.push(Point3::new(i as f64, j as f64, 0.1 * (i * j) as f64));
            }
        }
        vertices[4].z = 0.7;
        let faces = [[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
        build_from_polygons(&vertices, &faces).unwrap()
    }

    fn euler_characteristic(mesh: &HalfFacetMesh) -> i64 {
        mesh.num_vertices() as i64 - mesh.num_edges().unwrap() as i64 + mesh.num_elements() as i64
    }

    #[test]
    fn test_catmull_clark_single_quad() {
        let mesh = create_single_quad();
        let refined = catmull_clark(&mesh).unwrap();

        // 4 original + 1 face point + 4 edge points = 9
        assert_eq!(refined.num_vertices(), 9);
        // 1 quad -> 4 quads
        assert_eq!(refined.num_elements(), 4);
        assert!(refined.is_quad_mesh());
        refined.check_siblings().unwrap();

        // Keys: originals 0..4, face point 4, edge points 5..9 in half-facet order
        assert_eq!(refined.position(v(4)).unwrap(), Point3::new(0.5, 0.5, 0.0));
        let quad = refined.element(ElementKey::new(0)).unwrap();
        assert_eq!(quad.vertices(), &[v(0), v(8), v(4), v(5)]);

        // Each quad holds one corner of the original square
        for (i, key) in refined.element_keys().enumerate() {
            let corners: Vec<_> = refined
                .element(key)
                .unwrap()
                .vertices()
                .iter()
                .filter(|k| k.raw() < 4)
                .copied()
                .collect();
            assert_eq!(corners, vec![v(i as u32)]);
        }

        // The outer boundary is split into 8 naked edges; the 4 inner ones are shared
        let topology = refined.topology().unwrap();
        assert_eq!(topology.num_edges(), 12);
        assert_eq!(topology.naked_edges().len(), 8);
        assert!(!refined.is_naked_vertex(v(4)).unwrap());
    }

    #[test]
    fn test_catmull_clark_single_quad_positions() {
        let refined = catmull_clark(&create_single_quad()).unwrap();

        // Naked edges keep their midpoints
        let expected_edges = [(0.5, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 0.5)];
        for (i, (x, y)) in expected_edges.into_iter().enumerate() {
            let p = refined.position(v(5 + i as u32)).unwrap();
            assert!((p - Point3::new(x, y, 0.0)).norm() < 1e-10);
        }

        // Corners average the midpoints towards their naked neighbours
        let corner = refined.position(v(0)).unwrap();
        assert!((corner - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_catmull_clark_two_quads() {
        let mesh = create_two_quads();
        let refined = catmull_clark(&mesh).unwrap();

        // 6 original + 2 face points + 7 edge points = 15
        assert_eq!(refined.num_vertices(), 15);
        // 2 quads -> 8 quads
        assert_eq!(refined.num_elements(), 8);
        assert!(refined.is_quad_mesh());
        refined.check_siblings().unwrap();
    }

    #[test]
    fn test_catmull_clark_mixed_polygons() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let mesh = build_from_polygons(&vertices, &faces).unwrap();
        let refined = catmull_clark(&mesh).unwrap();

        // V + E + F = 5 + 6 + 2
        assert_eq!(refined.num_vertices(), 13);
        // 4 + 3 corners
        assert_eq!(refined.num_elements(), 7);
        assert!(refined.is_quad_mesh());
    }

    #[test]
    fn test_catmull_clark_counts_on_cube() {
        let mesh = create_quad_cube();
        let refined = catmull_clark(&mesh).unwrap();

        // V + E + F = 8 + 12 + 6
        assert_eq!(refined.num_vertices(), 26);
        assert_eq!(refined.num_elements(), 24);
        assert!(refined.topology().unwrap().naked_edges().is_empty());
    }

    #[test]
    fn test_catmull_clark_preserves_euler() {
        let mesh = create_quad_cube();
        let refined = catmull_clark(&mesh).unwrap();
        assert_eq!(euler_characteristic(&mesh), 2);
        assert_eq!(euler_characteristic(&refined), 2);

        let open = create_two_quads();
        assert_eq!(
            euler_characteristic(&catmull_clark(&open).unwrap()),
            euler_characteristic(&open)
        );
    }

    #[test]
    fn test_catmull_clark_boundary_preservation() {
        let mesh = create_two_quads();
        let refined = catmull_clark(&mesh).unwrap();
        let original = mesh.topology().unwrap();

        for (a, b) in original.naked_edges() {
            // The edge point is the one vertex shared by a and b in the output
            let from_a = refined.adjacent_vertices(a).unwrap();
            let from_b = refined.adjacent_vertices(b).unwrap();
            let shared: Vec<_> = from_a.iter().filter(|k| from_b.contains(k)).collect();
            assert_eq!(shared.len(), 1, "edge ({:?}, {:?})", a, b);

            let e = *shared[0];
            assert!(refined.is_naked_edge(a, e).unwrap());
            assert!(refined.is_naked_edge(e, b).unwrap());
        }

        // The shared edge stays interior
        let inner: Vec<_> = refined
            .adjacent_vertices(v(1))
            .unwrap()
            .iter()
            .filter(|k| refined.adjacent_vertices(v(2)).unwrap().contains(k))
            .copied()
            .collect();
        assert_eq!(inner.len(), 1);
        assert!(!refined.is_naked_edge(v(1), inner[0]).unwrap());
    }

    #[test]
    fn test_catmull_clark_interior_vertex_formula() {
        let mesh = create_bumped_grid();
        let center = v(4);
        assert!(!mesh.is_naked_vertex(center).unwrap());

        let p = mesh.position(center).unwrap().coords;
        let neighbors = mesh.adjacent_vertices(center).unwrap();
        let incident = mesh.incident_elements(center).unwrap();
        let n = neighbors.len() as f64;
        assert_eq!(neighbors.len(), 4);
        assert_eq!(incident.len(), 4);

        let f = incident
            .iter()
            .map(|&e| mesh.element_centroid(e).unwrap().coords)
            .sum::<Vector3<f64>>()
            / incident.len() as f64;
        let r = neighbors
            .iter()
            .map(|&u| (p + mesh.position(u).unwrap().coords) / 2.0)
            .sum::<Vector3<f64>>()
            / n;
        let expected = (f + 2.0 * r + (n - 3.0) * p) / n;

        let refined = catmull_clark(&mesh).unwrap();
        let actual = refined.position(center).unwrap().coords;
        assert!((actual - expected).norm() < 1e-12);
    }

    #[test]
    fn test_catmull_clark_interior_edge_point() {
        let mesh = create_two_quads();
        let refined = catmull_clark(&mesh).unwrap();

        // Shared edge {1, 2}: ends (1,0,0), (1,1,0), face points (0.5,0.5,0), (1.5,0.5,0)
        let inner = refined
            .adjacent_vertices(v(1))
            .unwrap()
            .iter()
            .copied()
            .find(|k| refined.adjacent_vertices(v(2)).unwrap().contains(k))
            .unwrap();
        let p = refined.position(inner).unwrap();
        assert!((p - Point3::new(1.0, 0.5, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_catmull_clark_shrinks_closed_mesh() {
        // Catmull-Clark is approximating, so closed meshes shrink toward their center
        let mesh = create_quad_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();

        let center = Point3::new(0.5, 0.5, 0.5);
        for key in refined.vertex_keys() {
            let d = (refined.position(key).unwrap() - center).norm();
            assert!(d < 0.75f64.sqrt() + 1e-10);
        }
    }

    #[test]
    fn test_catmull_clark_two_iterations() {
        let mesh = create_quad_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();

        // Each iteration quadruples a quad mesh: 6 * 4 * 4
        assert_eq!(refined.num_elements(), 96);
        assert!(refined.is_quad_mesh());
        refined.check_siblings().unwrap();
    }

    #[test]
    fn test_catmull_clark_zero_iterations() {
        let mesh = create_quad_cube();
        let same = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(0)).unwrap();

        assert_eq!(same.num_elements(), mesh.num_elements());
        assert_eq!(same.num_vertices(), mesh.num_vertices());
    }

    #[test]
    fn test_catmull_clark_leaves_input_untouched() {
        let mesh = create_two_quads();
        let before = mesh.deep_copy();
        catmull_clark(&mesh).unwrap();

        assert_eq!(mesh.vertices(), before.vertices());
        assert_eq!(mesh.elements(), before.elements());
        assert!(mesh.has_current_topology());
    }

    #[test]
    fn test_catmull_clark_requires_current_topology() {
        let mut mesh = create_single_quad();
        mesh.set_position(v(0), Point3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(matches!(
            catmull_clark(&mesh),
            Err(MeshError::StaleTopology { .. })
        ));

        let clean = create_single_quad().clean_copy();
        assert_eq!(catmull_clark(&clean).unwrap_err(), MeshError::TopologyNotBuilt);
    }

    fn assert_unchanged(mesh: &HalfFacetMesh, before: &HalfFacetMesh) {
        assert_eq!(mesh.vertices(), before.vertices());
        assert_eq!(mesh.elements(), before.elements());
        assert!(mesh.has_current_topology());
        assert_eq!(mesh.topology().unwrap(), before.topology().unwrap());
    }

    #[test]
    fn test_catmull_clark_rejects_non_polygons() {
        let mut mesh = create_single_quad();
        let line = mesh.add_element(Element::new(1, [v(0), v(2)]).unwrap()).unwrap();
        mesh.build_topology().unwrap();
        let before = mesh.deep_copy();

        assert_eq!(
            catmull_clark(&mesh).unwrap_err(),
            MeshError::UnsupportedElement {
                element: line,
                dimension: 1
            }
        );
        assert_unchanged(&mesh, &before);
    }

    #[test]
    fn test_catmull_clark_rejects_isolated_vertex() {
        let mut mesh = create_single_quad();
        let lonely = mesh.add_vertex(Point3::new(3.0, 3.0, 3.0)).unwrap();
        mesh.build_topology().unwrap();
        let before = mesh.deep_copy();

        assert!(matches!(
            catmull_clark(&mesh),
            Err(MeshError::DegenerateVertex { vertex, .. }) if vertex == lonely
        ));
        assert_unchanged(&mesh, &before);
    }

    #[test]
    fn test_catmull_clark_reports_exhausted_keys() {
        let vertices = [(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 1.0, 1.0), (u32::MAX, 0.0, 1.0)]
            .map(|(k, x, y)| crate::mesh::VertexRecord {
                key: v(k),
                position: Point3::new(x, y, 0.0),
            });
        let elements = [crate::mesh::ElementRecord {
            key: ElementKey::new(0),
            vertices: [0, 1, 2, u32::MAX].map(v).to_vec(),
            dimension: 2,
        }];
        let mesh = HalfFacetMesh::from_records(vertices, elements).unwrap();
        let before = mesh.deep_copy();

        assert_eq!(
            catmull_clark(&mesh).unwrap_err(),
            MeshError::KeysExhausted { store: "vertex" }
        );
        assert_unchanged(&mesh, &before);
    }

    #[test]
    fn test_catmull_clark_empty_mesh() {
        let mut mesh = HalfFacetMesh::new();
        mesh.build_topology().unwrap();
        let refined = catmull_clark(&mesh).unwrap();
        assert_eq!(refined.num_vertices(), 0);
        assert!(refined.has_current_topology());
    }

    #[test]
    fn test_catmull_clark_reports_progress() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let mesh = create_single_quad();
        catmull_clark_subdivide_with_progress(&mesh, &SubdivideOptions::new(3), &progress).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }
}
