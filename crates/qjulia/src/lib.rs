//! qjulia: a quaternion-Julia-set isosurface extractor.
//!
//! The pipeline samples a user-supplied iterated equation `Z = f(Z, C)`
//! over a dense 3-D grid of 4-D sample points, sculpts the resulting
//! boolean volume (hollowing and CSG-style blocks), polygonises it with
//! Marching Cubes plus bisection vertex refinement, and writes a closed
//! shared-vertex mesh to a binary STL file for 3D printing.
//!
//! # Quick start
//!
//! ```no_run
//! use qjulia::config::RunConfig;
//! use qjulia::pipeline::generate_stl;
//!
//! # fn main() -> qjulia::Result<()> {
//! let config = RunConfig::from_file(std::path::Path::new("config.txt"))?;
//! if let Some(report) = generate_stl(&config, std::path::Path::new("fractal.stl"), true)? {
//!     println!("{} triangles written", report.triangles);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod pipeline;

pub use config::RunConfig;
pub use pipeline::{generate_stl, MeshReport};

// Re-export the component crates' surfaces for library consumers.
pub use qjulia_core::{Equation, EquationField, QjuliaError, Quaternion, Result, ScalarField};
pub use qjulia_grid::{sample_occupancy, sculpt, Block, OccupancyGrid, SamplerParams};
pub use qjulia_mesh::{
    polygonize, write_binary_stl, IndexedMesh, IndexedTriangle, OrderedEdge, PolygonizerParams,
    Triangle,
};
