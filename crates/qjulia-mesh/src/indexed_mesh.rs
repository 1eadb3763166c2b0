//! Shared-vertex triangle mesh with adjacency and topological diagnostics.

#![allow(clippy::cast_possible_truncation)]

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use qjulia_core::error::{QjuliaError, Result};

/// An ephemeral triangle as produced by the polygoniser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

/// A triangle referencing the mesh's vertex table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedTriangle {
    pub vertex_indices: [u32; 3],
}

/// An unordered vertex-index pair, canonicalised so the smaller index
/// comes first; equality and ordering derive from the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderedEdge {
    indices: [u32; 2],
}

impl OrderedEdge {
    /// Canonicalises an index pair.
    #[must_use]
    pub fn new(a: u32, b: u32) -> Self {
        if a < b {
            Self { indices: [a, b] }
        } else {
            Self { indices: [b, a] }
        }
    }

    /// The canonical `(smaller, larger)` pair.
    #[must_use]
    pub fn indices(&self) -> [u32; 2] {
        self.indices
    }
}

/// Total lexicographic order on `(x, y, z)`, used wherever a stable
/// ordering of positions is required (endpoint sorting, dedup keys).
#[must_use]
pub fn lex_cmp(a: Vec3, b: Vec3) -> Ordering {
    a.x.total_cmp(&b.x)
        .then_with(|| a.y.total_cmp(&b.y))
        .then_with(|| a.z.total_cmp(&b.z))
}

/// Exact-coordinate dedup key; `-0.0` is folded onto `0.0` so the two
/// zero encodings cannot split a shared vertex.
fn position_key(v: Vec3) -> [u32; 3] {
    let canon = |f: f32| (if f == 0.0 { 0.0_f32 } else { f }).to_bits();
    [canon(v.x), canon(v.y), canon(v.z)]
}

/// Lifecycle of an [`IndexedMesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No triangles and not accepting any.
    Empty,
    /// Accepting triangles; the dedup map is alive.
    Open,
    /// Adjacency built, dedup map dropped; writable and queryable.
    Finalized,
}

/// A shared-vertex triangle mesh.
///
/// Triangles are inserted between [`IndexedMesh::init_insertion`] and
/// [`IndexedMesh::finalize`]; duplicate corner positions are merged
/// through an exact-coordinate lookup. Finalisation builds the
/// vertex-to-vertex adjacency (sorted, unique, no self-loops) and drops
/// the lookup. Adjacency is kept as plain index tables rather than
/// cross-references, so there are no ownership cycles to manage.
#[derive(Debug, Default)]
pub struct IndexedMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<IndexedTriangle>,
    vertex_to_triangles: Vec<Vec<u32>>,
    vertex_to_vertices: Vec<Vec<u32>>,
    vertex_lookup: HashMap<[u32; 3], u32>,
    phase: Phase,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Empty
    }
}

impl IndexedMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the mesh and opens it for triangle insertion.
    pub fn init_insertion(&mut self) {
        self.clear();
        self.phase = Phase::Open;
    }

    /// Returns the mesh to the empty pre-open state.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.vertex_to_triangles.clear();
        self.vertex_to_vertices.clear();
        self.vertex_lookup.clear();
        self.phase = Phase::Empty;
    }

    /// Appends one triangle, merging corners with previously seen
    /// positions and recording the triangle in each corner's incidence
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`QjuliaError::MeshNotOpen`] unless the mesh is between
    /// `init_insertion` and `finalize`.
    pub fn insert_triangle(&mut self, triangle: &Triangle) -> Result<()> {
        if self.phase != Phase::Open {
            return Err(QjuliaError::MeshNotOpen);
        }

        let triangle_index = self.triangles.len() as u32;
        let mut vertex_indices = [0_u32; 3];

        for (corner, &position) in triangle.vertices.iter().enumerate() {
            let next_index = self.vertices.len() as u32;
            let index = *self
                .vertex_lookup
                .entry(position_key(position))
                .or_insert(next_index);

            if index == next_index {
                self.vertices.push(position);
                self.vertex_to_triangles.push(Vec::new());
            }
            self.vertex_to_triangles[index as usize].push(triangle_index);
            vertex_indices[corner] = index;
        }

        self.triangles.push(IndexedTriangle { vertex_indices });
        Ok(())
    }

    /// Builds the vertex-to-vertex adjacency and seals the mesh.
    ///
    /// For each vertex, the neighbour list is the union of the other
    /// corners of its incident triangles: sorted, unique, and free of the
    /// vertex itself. Idempotent on an already finalised mesh; an empty
    /// mesh finalises to an empty queryable state.
    pub fn finalize(&mut self) {
        if self.phase == Phase::Finalized {
            return;
        }

        if !self.triangles.is_empty() {
            self.vertex_to_vertices = self
                .vertex_to_triangles
                .iter()
                .enumerate()
                .map(|(vertex, incident)| {
                    let mut neighbors = BTreeSet::new();
                    for &triangle in incident {
                        for &other in &self.triangles[triangle as usize].vertex_indices {
                            if other != vertex as u32 {
                                neighbors.insert(other);
                            }
                        }
                    }
                    neighbors.into_iter().collect()
                })
                .collect();
        }

        self.vertex_lookup = HashMap::new();
        self.phase = Phase::Finalized;
    }

    /// True once [`IndexedMesh::finalize`] has run.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// The deduplicated vertex table.
    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// The indexed triangles.
    #[must_use]
    pub fn triangles(&self) -> &[IndexedTriangle] {
        &self.triangles
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of unique vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Neighbour vertex indices of `vertex` (valid after finalisation).
    #[must_use]
    pub fn vertex_neighbors(&self, vertex: usize) -> &[u32] {
        &self.vertex_to_vertices[vertex]
    }

    fn corner(&self, triangle: usize, corner: usize) -> Vec3 {
        self.vertices[self.triangles[triangle].vertex_indices[corner] as usize]
    }

    /// Area of one triangle; out-of-range indices yield `0`.
    #[must_use]
    pub fn triangle_area(&self, triangle: usize) -> f32 {
        if triangle >= self.triangles.len() {
            return 0.0;
        }
        let a = self.corner(triangle, 1) - self.corner(triangle, 0);
        let b = self.corner(triangle, 2) - self.corner(triangle, 0);
        0.5 * a.cross(b).length()
    }

    /// Total surface area.
    #[must_use]
    pub fn area(&self) -> f32 {
        (0..self.triangles.len())
            .map(|i| self.triangle_area(i))
            .sum()
    }

    /// Signed volume contribution of one triangle (`v₀·(v₁×v₂)/6`);
    /// out-of-range indices yield `0`.
    #[must_use]
    pub fn triangle_volume(&self, triangle: usize) -> f32 {
        if triangle >= self.triangles.len() {
            return 0.0;
        }
        let a = self.corner(triangle, 0);
        let b = self.corner(triangle, 1);
        let c = self.corner(triangle, 2);
        a.dot(b.cross(c)) / 6.0
    }

    /// Enclosed volume, assuming consistent outward winding.
    #[must_use]
    pub fn volume(&self) -> f32 {
        (0..self.triangles.len())
            .map(|i| self.triangle_volume(i))
            .sum()
    }

    fn extent(&self, axis: usize) -> f32 {
        if self.vertices.is_empty() {
            return 0.0;
        }
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for v in &self.vertices {
            min = min.min(v[axis]);
            max = max.max(v[axis]);
        }
        (max - min).abs()
    }

    /// Extent of the vertex cloud along x.
    #[must_use]
    pub fn x_extent(&self) -> f32 {
        self.extent(0)
    }

    /// Extent of the vertex cloud along y.
    #[must_use]
    pub fn y_extent(&self) -> f32 {
        self.extent(1)
    }

    /// Extent of the vertex cloud along z.
    #[must_use]
    pub fn z_extent(&self) -> f32 {
        self.extent(2)
    }

    /// Number of triangles with two or more coincident corner positions.
    #[must_use]
    pub fn degenerate_triangle_count(&self) -> usize {
        self.triangles
            .iter()
            .filter(|t| {
                let [a, b, c] = t.vertex_indices.map(|i| self.vertices[i as usize]);
                a == b || a == c || b == c
            })
            .count()
    }

    /// Number of triangles shared by the vertex pair `(a, b)`.
    fn triangles_shared_by_pair(&self, a: u32, b: u32) -> usize {
        self.vertex_to_triangles[a as usize]
            .iter()
            .filter(|t| self.vertex_to_triangles[b as usize].contains(t))
            .count()
    }

    /// Counts unordered edges whose incident-triangle set does not have
    /// cardinality exactly 2: boundary or non-manifold junctions.
    ///
    /// Valid after finalisation (edges are discovered by walking each
    /// vertex's neighbour list).
    #[must_use]
    pub fn problem_edge_count(&self) -> usize {
        let mut problem_edges = BTreeSet::new();

        for vertex in 0..self.vertex_to_vertices.len() {
            for &neighbor in &self.vertex_to_vertices[vertex] {
                if self.triangles_shared_by_pair(vertex as u32, neighbor) != 2 {
                    problem_edges.insert(OrderedEdge::new(vertex as u32, neighbor));
                }
            }
        }

        problem_edges.len()
    }
}

impl PartialEq for IndexedMesh {
    /// Finalised meshes compare by their index tables; the transient
    /// lookup map and phase are not part of mesh identity.
    fn eq(&self, other: &Self) -> bool {
        self.triangles == other.triangles
            && self.vertices == other.vertices
            && self.vertex_to_triangles == other.vertex_to_triangles
            && self.vertex_to_vertices == other.vertex_to_vertices
    }
}
