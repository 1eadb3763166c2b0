//! The generation pipeline: sample → sculpt → polygonise → write.
//!
//! Stages run synchronously in order; no stage observes a partial result
//! of the next. The scalar field is injected as a [`ScalarField`] so the
//! sampler and the polygoniser never know which back-end evaluates them;
//! this build ships the reference evaluator only, and requests for an
//! accelerated one fall back to it with a status message.

use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use qjulia_core::error::Result;
use qjulia_core::EquationField;
use qjulia_grid::{sample_occupancy, sculpt, SamplerParams};
use qjulia_mesh::{polygonize, write_binary_stl, IndexedMesh, PolygonizerParams};

use crate::config::RunConfig;

/// Geometry and topology summary of a generated mesh.
#[derive(Debug, Clone, Copy)]
pub struct MeshReport {
    pub triangles: usize,
    pub vertices: usize,
    pub x_extent: f32,
    pub y_extent: f32,
    pub z_extent: f32,
    pub area: f32,
    pub volume: f32,
    pub problem_edges: usize,
    pub degenerate_triangles: usize,
}

impl MeshReport {
    fn from_mesh(mesh: &IndexedMesh, problem_edges: usize, degenerate_triangles: usize) -> Self {
        Self {
            triangles: mesh.triangle_count(),
            vertices: mesh.vertex_count(),
            x_extent: mesh.x_extent(),
            y_extent: mesh.y_extent(),
            z_extent: mesh.z_extent(),
            area: mesh.area(),
            volume: mesh.volume(),
            problem_edges,
            degenerate_triangles,
        }
    }
}

fn log_configuration(config: &RunConfig) {
    info!("Configuration:");
    info!("==========================================================");
    info!("Grid resolution: {}", config.resolution);
    info!("Vertex refinement steps: {}", config.refinement_steps);
    info!("Shell thickness: {}", config.shell_thickness);
    info!("Grid minimum extent: {}", config.grid_min);
    info!("Grid maximum extent: {}", config.grid_max);
    info!("Maximum iterations: {}", config.max_iterations);
    info!("Threshold: {}", config.threshold);
    info!("Z.w: {}", config.z_w);
    info!("C.x: {}", config.c.x);
    info!("C.y: {}", config.c.y);
    info!("C.z: {}", config.c.z);
    info!("C.w: {}", config.c.w);
    info!("Equation: {}", config.equation.text());
    info!("Add / subtract blocks:\n{}", config.blocks_string());
    info!("==========================================================");
}

/// Runs the whole pipeline and writes the mesh to `output`.
///
/// Returns `Ok(None)` when polygonisation produces no triangles: that is
/// a successful run (nothing to print), and no file is created.
/// Topological defects are reported but never fail the run.
///
/// # Errors
///
/// Propagates allocation failures from the volume stage and I/O failures
/// from the STL writer.
pub fn generate_stl(
    config: &RunConfig,
    output: &Path,
    force_cpu: bool,
) -> Result<Option<MeshReport>> {
    if force_cpu {
        info!("Forcing CPU-only mode.");
    } else {
        info!("No accelerated evaluator in this build -- falling back to the reference evaluator.");
    }

    log_configuration(config);

    let field = EquationField::new(
        config.equation.clone(),
        config.c,
        config.max_iterations,
        config.threshold,
    );

    let start = Instant::now();

    let sampler = SamplerParams {
        resolution: config.resolution,
        grid_min: config.grid_min,
        grid_max: config.grid_max,
        z_w: config.z_w,
        threshold: config.threshold,
    };
    let mut grid = sample_occupancy(&field, &sampler)?;
    info!("Sampled the set; elapsed time so far: {} seconds", start.elapsed().as_secs());

    sculpt(&mut grid, config.shell_thickness, &config.blocks)?;
    info!("Sculpted the set; elapsed time so far: {} seconds", start.elapsed().as_secs());

    info!("Converting set to isosurface");
    let polygonizer = PolygonizerParams {
        grid_min: config.grid_min,
        step_size: sampler.step_size(),
        z_w: config.z_w,
        threshold: config.threshold,
        refinement_steps: config.refinement_steps,
    };
    let mesh = polygonize(&grid, &field, &polygonizer)?;
    info!("Polygonised the set; elapsed time so far: {} seconds", start.elapsed().as_secs());

    if mesh.triangle_count() == 0 {
        info!("No triangles generated -- aborting early.");
        return Ok(None);
    }

    info!("Analyzing mesh for problem edges (cracks, holes) and degenerate triangles");
    let problem_edges = mesh.problem_edge_count();
    let degenerate_triangles = mesh.degenerate_triangle_count();
    if problem_edges == 0 && degenerate_triangles == 0 {
        info!("No problems detected.");
    } else {
        warn!("{problem_edges} problem edges found");
        warn!("{degenerate_triangles} degenerate triangles found");
        warn!("Did you go a little too hardcore on the vertex refinement steps / grid resolution options?");
        warn!("If not, try using a mesh repair tool to fix the output.");
    }

    let report = MeshReport::from_mesh(&mesh, problem_edges, degenerate_triangles);
    info!("Mesh information:");
    info!("Mesh x extent:     {} units", report.x_extent);
    info!("Mesh y extent:     {} units", report.y_extent);
    info!("Mesh z extent:     {} units", report.z_extent);
    info!("Mesh surface area: {} units^2", report.area);
    info!("Mesh volume:       {} units^3", report.volume);
    info!("File name:         {}", output.display());
    info!("Triangles:         {}", report.triangles);
    info!(
        "Vertices:          {} (of which {} are unique)",
        report.triangles * 3,
        report.vertices
    );

    write_binary_stl(&mesh, output)?;
    info!("Total elapsed time: {} seconds", start.elapsed().as_secs());

    Ok(Some(report))
}
