//! Meshing stage for qjulia.
//!
//! Converts a sculpted occupancy grid into a closed, shared-vertex
//! triangle mesh and writes it as binary STL:
//! - [`tables`] — the Marching Cubes lookup tables and cube topology
//! - [`polygonize`] — the cube walk with batched bisection refinement
//! - [`IndexedMesh`] — deduplicated vertices, adjacency, diagnostics
//! - [`write_binary_stl`] — buffered little-endian STL emission

pub mod indexed_mesh;
pub mod polygonize;
pub mod stl;
pub mod tables;

pub use indexed_mesh::{lex_cmp, IndexedMesh, IndexedTriangle, OrderedEdge, Triangle};
pub use polygonize::{polygonize, PolygonizerParams};
pub use stl::{write_binary_stl, write_binary_stl_with, DEFAULT_BUFFER_WIDTH};
