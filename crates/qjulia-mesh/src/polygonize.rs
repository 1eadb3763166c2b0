//! Marching-Cubes polygonisation of a sculpted occupancy grid.
//!
//! Walks every unit cube of the grid, looks the corner configuration up
//! in the tables, and emits triangles whose vertices lie on cube edges.
//! Edge vertices start at the edge midpoint and are optionally refined by
//! bisection against the true scalar field, which places them on the
//! actual isosurface instead of the voxel lattice.

#![allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]

use std::cmp::Ordering;

use glam::Vec3;
use log::debug;

use qjulia_core::error::Result;
use qjulia_core::field::ScalarField;
use qjulia_core::quaternion::Quaternion;
use qjulia_grid::OccupancyGrid;

use crate::indexed_mesh::{lex_cmp, IndexedMesh, Triangle};
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// Parameters of one polygonisation pass.
#[derive(Debug, Clone, Copy)]
pub struct PolygonizerParams {
    /// World coordinate of voxel index 0 on every axis.
    pub grid_min: f32,
    /// Spacing between adjacent voxel centres.
    pub step_size: f32,
    /// The fixed fourth coordinate of every refinement probe.
    pub z_w: f32,
    /// Escape threshold of the field.
    pub threshold: f32,
    /// Number of bisection steps per edge vertex (0 keeps midpoints).
    pub refinement_steps: u32,
}

/// One cube of the grid: corner positions and labels.
///
/// A label of `true` marks the corner as outside the surface (its voxel
/// is unset); the usual Marching Cubes small-inside / large-outside
/// convention after lifting to `{0.0, 1.0}`.
struct GridCell {
    positions: [Vec3; 8],
    outside: [bool; 8],
}

impl GridCell {
    fn new(
        grid: &OccupancyGrid,
        cube: [usize; 3],
        grid_min: f32,
        step_size: f32,
    ) -> Self {
        let mut positions = [Vec3::ZERO; 8];
        let mut outside = [false; 8];
        for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
            let x = cube[0] + offset[0];
            let y = cube[1] + offset[1];
            let z = cube[2] + offset[2];
            positions[corner] = Vec3::new(
                grid_min + x as f32 * step_size,
                grid_min + y as f32 * step_size,
                grid_min + z as f32 * step_size,
            );
            outside[corner] = !grid.get(x, y, z);
        }
        Self { positions, outside }
    }

    /// The 8-bit table index: bit `c` set when corner `c` is inside.
    fn case_index(&self) -> usize {
        let mut case = 0;
        for (corner, &outside) in self.outside.iter().enumerate() {
            if !outside {
                case |= 1 << corner;
            }
        }
        case
    }
}

/// Bisection state for one intersected edge.
///
/// Endpoints are sorted by the total position order before anything else,
/// so the same unordered edge refines to bitwise-identical coordinates no
/// matter which neighbouring cube surfaced it. The bisection bracket
/// stays anchored to the cube corners; only the estimate moves.
struct EdgeRefinement {
    estimate: Vec3,
    /// The outside endpoint; the estimate moves toward it while the probe
    /// is inside the set.
    forward: Vec3,
    /// The inside endpoint.
    backward: Vec3,
}

impl EdgeRefinement {
    /// `outside0`/`outside1` are the endpoint labels; an intersected edge
    /// always has exactly one outside endpoint.
    fn new(p0: Vec3, outside0: bool, p1: Vec3, outside1: bool) -> Self {
        let ((a, a_outside), (b, _)) = if lex_cmp(p0, p1) == Ordering::Greater {
            ((p1, outside1), (p0, outside0))
        } else {
            ((p0, outside0), (p1, outside1))
        };

        let estimate = (a + b) * 0.5;
        let (forward, backward) = if a_outside { (a, b) } else { (b, a) };

        Self {
            estimate,
            forward,
            backward,
        }
    }

    /// Advances one bisection step given whether the probe at the current
    /// estimate landed inside the set.
    fn step(&mut self, probe_inside: bool) {
        if probe_inside {
            self.backward = self.estimate;
            self.estimate += (self.forward - self.estimate) * 0.5;
        } else {
            self.forward = self.estimate;
            self.estimate += (self.backward - self.estimate) * 0.5;
        }
    }
}

/// Refines all edges of one slab in lock step: one batched field
/// evaluation per bisection step, every edge advancing together. Results
/// are identical to refining each edge on its own, since the probes are
/// independent.
fn refine_edges<F: ScalarField + ?Sized>(
    edges: &mut [EdgeRefinement],
    field: &F,
    params: &PolygonizerParams,
) {
    if params.refinement_steps == 0 || edges.is_empty() {
        return;
    }

    let mut probes = Vec::with_capacity(edges.len());
    for _ in 0..params.refinement_steps {
        probes.clear();
        probes.extend(edges.iter().map(|edge| {
            Quaternion::new(
                edge.estimate.x,
                edge.estimate.y,
                edge.estimate.z,
                params.z_w,
            )
        }));

        let values = field.evaluate(&probes);
        for (edge, &value) in edges.iter_mut().zip(values.iter()) {
            edge.step(value < params.threshold);
        }
    }
}

/// Polygonises the grid into a finalised indexed mesh.
///
/// Cubes are processed one z-slab at a time: a first pass over the slab
/// collects every intersected edge, the whole slab's vertices are refined
/// in batched lock step, and a second pass emits the triangles.
///
/// # Errors
///
/// Propagates mesh insertion failures (none occur under this driver,
/// which opens the mesh itself).
pub fn polygonize<F: ScalarField + ?Sized>(
    grid: &OccupancyGrid,
    field: &F,
    params: &PolygonizerParams,
) -> Result<IndexedMesh> {
    let r = grid.resolution();
    let mut mesh = IndexedMesh::new();
    mesh.init_insertion();

    let slabs = r.saturating_sub(1);
    for cube_z in 0..slabs {
        debug!("Tessellating grid cube slab {} of {}", cube_z + 1, slabs);

        // Pass 1: collect the slab's intersected edges.
        let mut edges = Vec::new();
        for cube_x in 0..slabs {
            for cube_y in 0..slabs {
                let cell = GridCell::new(
                    grid,
                    [cube_x, cube_y, cube_z],
                    params.grid_min,
                    params.step_size,
                );
                let mask = EDGE_TABLE[cell.case_index()];
                for (e, corners) in EDGE_CORNERS.iter().enumerate() {
                    if mask & (1_u16 << e) != 0 {
                        edges.push(EdgeRefinement::new(
                            cell.positions[corners[0]],
                            cell.outside[corners[0]],
                            cell.positions[corners[1]],
                            cell.outside[corners[1]],
                        ));
                    }
                }
            }
        }

        if edges.is_empty() {
            continue;
        }

        refine_edges(&mut edges, field, params);

        // Pass 2: re-walk the slab and emit triangles from the refined
        // vertices, consuming them in the same order they were collected.
        let mut cursor = 0;
        for cube_x in 0..slabs {
            for cube_y in 0..slabs {
                let cell = GridCell::new(
                    grid,
                    [cube_x, cube_y, cube_z],
                    params.grid_min,
                    params.step_size,
                );
                let case = cell.case_index();
                let mask = EDGE_TABLE[case];
                if mask == 0 {
                    continue;
                }

                let mut edge_vertices = [Vec3::ZERO; 12];
                for e in 0..12 {
                    if mask & (1_u16 << e) != 0 {
                        edge_vertices[e] = edges[cursor].estimate;
                        cursor += 1;
                    }
                }

                let row = &TRI_TABLE[case];
                let mut i = 0;
                while row[i] != -1 {
                    mesh.insert_triangle(&Triangle {
                        vertices: [
                            edge_vertices[row[i] as usize],
                            edge_vertices[row[i + 1] as usize],
                            edge_vertices[row[i + 2] as usize],
                        ],
                    })?;
                    i += 3;
                }
            }
        }
    }

    debug!("Generating mesh adjacency data");
    mesh.finalize();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qjulia_grid::{sample_occupancy, SamplerParams};

    /// Escape value equal to the squared spatial distance from the origin.
    struct RadialField;

    impl ScalarField for RadialField {
        fn evaluate(&self, samples: &[Quaternion]) -> Vec<f32> {
            samples
                .iter()
                .map(|q| q.x * q.x + q.y * q.y + q.z * q.z)
                .collect()
        }
    }

    /// Escape value linear along x.
    struct PlaneField;

    impl ScalarField for PlaneField {
        fn evaluate(&self, samples: &[Quaternion]) -> Vec<f32> {
            samples.iter().map(|q| q.x).collect()
        }
    }

    fn unrefined(grid_min: f32, step_size: f32) -> PolygonizerParams {
        PolygonizerParams {
            grid_min,
            step_size,
            z_w: 0.0,
            threshold: 1.0,
            refinement_steps: 0,
        }
    }

    #[test]
    fn test_empty_grid_yields_empty_mesh() {
        let grid = OccupancyGrid::new(8).unwrap();
        let mesh = polygonize(&grid, &RadialField, &unrefined(-1.5, 3.0 / 7.0)).unwrap();
        assert!(mesh.is_finalized());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_single_voxel_marches_to_closed_octahedron() {
        let mut grid = OccupancyGrid::new(4).unwrap();
        grid.set(1, 1, 1, true);

        let mesh = polygonize(&grid, &RadialField, &unrefined(0.0, 1.0)).unwrap();
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.problem_edge_count(), 0);
        assert_eq!(mesh.degenerate_triangle_count(), 0);
        assert!(mesh.volume() > 0.0);
    }

    #[test]
    fn test_full_interior_marches_to_hollow_cube() {
        // Everything except the forced-false boundary is set: the mesh is
        // the closed surface of the interior 6x6x6 voxel block.
        let mut grid = OccupancyGrid::new(8).unwrap();
        for x in 1..7 {
            for y in 1..7 {
                for z in 1..7 {
                    grid.set(x, y, z, true);
                }
            }
        }

        let mesh = polygonize(&grid, &RadialField, &unrefined(-1.5, 3.0 / 7.0)).unwrap();
        assert_eq!(mesh.triangle_count(), 428);
        assert_eq!(mesh.vertex_count(), 216);
        assert_eq!(mesh.problem_edge_count(), 0);
        assert_eq!(mesh.degenerate_triangle_count(), 0);
        assert!(mesh.volume() > 0.0);
    }

    #[test]
    fn test_refined_vertices_land_on_isosurface() {
        // Sample and polygonise the same radial field; with enough
        // bisection steps every vertex must sit on the unit sphere.
        let sampler = SamplerParams {
            resolution: 16,
            grid_min: -1.5,
            grid_max: 1.5,
            z_w: 0.0,
            threshold: 1.0,
        };
        let grid = sample_occupancy(&RadialField, &sampler).unwrap();

        let params = PolygonizerParams {
            grid_min: sampler.grid_min,
            step_size: sampler.step_size(),
            z_w: 0.0,
            threshold: 1.0,
            refinement_steps: 16,
        };
        let mesh = polygonize(&grid, &RadialField, &params).unwrap();

        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.problem_edge_count(), 0);
        assert_eq!(mesh.degenerate_triangle_count(), 0);
        for v in mesh.vertices() {
            assert!(
                (v.length() - 1.0).abs() < 1e-3,
                "vertex {v:?} is off the isosurface"
            );
        }
    }

    #[test]
    fn test_plane_field_refines_crossing_edges_to_plane() {
        let sampler = SamplerParams {
            resolution: 6,
            grid_min: 0.0,
            grid_max: 5.0,
            z_w: 0.0,
            threshold: 2.3,
        };
        let grid = sample_occupancy(&PlaneField, &sampler).unwrap();

        let params = PolygonizerParams {
            grid_min: 0.0,
            step_size: 1.0,
            z_w: 0.0,
            threshold: 2.3,
            refinement_steps: 20,
        };
        let mesh = polygonize(&grid, &PlaneField, &params).unwrap();

        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.problem_edge_count(), 0);
        assert_eq!(mesh.degenerate_triangle_count(), 0);

        // Edges crossing the x = 2.3 plane refine onto it; every vertex
        // stays on its grid edge, so fractional x only occurs there.
        let mut crossing = 0;
        for v in mesh.vertices() {
            if (v.x - v.x.round()).abs() > 1e-4 {
                assert!((v.x - 2.3).abs() < 1e-4, "vertex {v:?} missed the plane");
                crossing += 1;
            }
        }
        assert!(crossing > 0);
    }

    #[test]
    fn test_refinement_is_symmetric_in_endpoint_order() {
        let p0 = Vec3::new(0.125, 0.25, 0.5);
        let p1 = Vec3::new(1.125, 0.25, 0.5);
        let params = PolygonizerParams {
            grid_min: 0.0,
            step_size: 1.0,
            z_w: 0.0,
            threshold: 1.0,
            refinement_steps: 9,
        };

        let mut ab = [EdgeRefinement::new(p0, false, p1, true)];
        let mut ba = [EdgeRefinement::new(p1, true, p0, false)];
        refine_edges(&mut ab, &RadialField, &params);
        refine_edges(&mut ba, &RadialField, &params);

        assert_eq!(ab[0].estimate.to_array().map(f32::to_bits),
                   ba[0].estimate.to_array().map(f32::to_bits));
    }

    proptest! {
        #[test]
        fn prop_refinement_symmetry(
            x0 in -2.0_f32..2.0, y0 in -2.0_f32..2.0, z0 in -2.0_f32..2.0,
            axis in 0_usize..3, flip in proptest::bool::ANY,
            steps in 0_u32..12,
        ) {
            let p0 = Vec3::new(x0, y0, z0);
            let mut p1 = p0;
            p1[axis] += 1.0;
            let params = PolygonizerParams {
                grid_min: 0.0,
                step_size: 1.0,
                z_w: 0.0,
                threshold: 1.0,
                refinement_steps: steps,
            };

            let mut ab = [EdgeRefinement::new(p0, flip, p1, !flip)];
            let mut ba = [EdgeRefinement::new(p1, !flip, p0, flip)];
            refine_edges(&mut ab, &RadialField, &params);
            refine_edges(&mut ba, &RadialField, &params);

            prop_assert_eq!(ab[0].estimate.to_array().map(f32::to_bits),
                            ba[0].estimate.to_array().map(f32::to_bits));
        }
    }
}
