//! Fills an occupancy grid by sampling the scalar field at voxel centres.

#![allow(clippy::cast_precision_loss)]

use log::debug;

use qjulia_core::error::Result;
use qjulia_core::field::ScalarField;
use qjulia_core::quaternion::Quaternion;

use crate::occupancy::OccupancyGrid;

/// Parameters of one sampling pass.
#[derive(Debug, Clone, Copy)]
pub struct SamplerParams {
    /// Grid resolution `R` (voxels per axis).
    pub resolution: usize,
    /// Lower bound of the sampled cube on every axis.
    pub grid_min: f32,
    /// Upper bound of the sampled cube on every axis.
    pub grid_max: f32,
    /// The fixed fourth coordinate of every sample.
    pub z_w: f32,
    /// Escape threshold; a voxel is inside iff its escape value is below.
    pub threshold: f32,
}

impl SamplerParams {
    /// Spacing between adjacent voxel centres.
    #[must_use]
    pub fn step_size(&self) -> f32 {
        if self.resolution > 1 {
            (self.grid_max - self.grid_min) / (self.resolution - 1) as f32
        } else {
            0.0
        }
    }
}

/// Samples the field at every voxel centre and classifies occupancy.
///
/// Voxel `(i, j, k)` samples the point
/// `(gmin + i·h, gmin + j·h, gmin + k·h, z_w)` and is set iff the escape
/// value is below the threshold. Evaluation is issued as one batch per
/// xy-plane, so an accelerated field back-end sees the same dispatch
/// granularity the reference one does. The outer faces are forced false
/// afterwards.
///
/// # Errors
///
/// Returns [`qjulia_core::QjuliaError::OutOfMemory`] when the grid buffer
/// cannot be allocated.
pub fn sample_occupancy<F: ScalarField + ?Sized>(
    field: &F,
    params: &SamplerParams,
) -> Result<OccupancyGrid> {
    let r = params.resolution;
    let h = params.step_size();
    let mut grid = OccupancyGrid::new(r)?;

    let mut plane = Vec::with_capacity(r * r);

    for z in 0..r {
        debug!("Calculating xy-plane {} of {}", z + 1, r);

        plane.clear();
        for x in 0..r {
            for y in 0..r {
                plane.push(Quaternion::new(
                    params.grid_min + x as f32 * h,
                    params.grid_min + y as f32 * h,
                    params.grid_min + z as f32 * h,
                    params.z_w,
                ));
            }
        }

        let values = field.evaluate(&plane);
        for x in 0..r {
            for y in 0..r {
                grid.set(x, y, z, values[x * r + y] < params.threshold);
            }
        }
    }

    grid.clear_boundary();
    Ok(grid)
}
