//! In-place sculpting of a sampled occupancy grid.
//!
//! Three operators apply in a fixed order: optional shell extraction,
//! shell dilation (hollowing), then CSG-style axis-aligned block
//! additions and subtractions. Reordering them changes the observable
//! result, so the order is part of the contract.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use std::fmt;

use log::debug;

use qjulia_core::error::Result;

use crate::occupancy::OccupancyGrid;

/// An axis-aligned box in normalised `[0,1]³` coordinates that is either
/// added to or subtracted from the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    /// True for an add-block, false for a sub-block.
    pub additive: bool,
    /// Per-axis lower corner, each in `[0, 1]`.
    pub start: [f32; 3],
    /// Per-axis upper corner, each in `[0, 1]`, `start[i] <= end[i]`.
    pub end: [f32; 3],
}

impl Block {
    /// Builds a block, clamping each coordinate into `[0, 1]` and swapping
    /// any reversed axis pair.
    #[must_use]
    pub fn new(additive: bool, start: [f32; 3], end: [f32; 3]) -> Self {
        let mut block = Self {
            additive,
            start: start.map(|v| v.clamp(0.0, 1.0)),
            end: end.map(|v| v.clamp(0.0, 1.0)),
        };
        for axis in 0..3 {
            if block.start[axis] > block.end[axis] {
                std::mem::swap(&mut block.start[axis], &mut block.end[axis]);
            }
        }
        block
    }

    /// The inclusive voxel range this block covers on one axis.
    fn voxel_range(&self, axis: usize, resolution: usize) -> (usize, usize) {
        let scale = (resolution - 1) as f32;
        let lo = (scale * self.start[axis]).round() as usize;
        let hi = (scale * self.end[axis]).round() as usize;
        (lo, hi)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.additive { "addblock" } else { "subblock" };
        write!(
            f,
            "{op}, {}, {}, {}, {}, {}, {}",
            self.start[0], self.end[0], self.start[1], self.end[1], self.start[2], self.end[2]
        )
    }
}

/// True when any of the 26 neighbours of interior voxel `(x, y, z)`
/// matches `value`.
fn has_neighbor(grid: &OccupancyGrid, x: usize, y: usize, z: usize, value: bool) -> bool {
    for dx in -1_isize..=1 {
        for dy in -1_isize..=1 {
            for dz in -1_isize..=1 {
                if dx == 0 && dy == 0 && dz == 0 {
                    continue;
                }
                let nx = (x as isize + dx) as usize;
                let ny = (y as isize + dy) as usize;
                let nz = (z as isize + dz) as usize;
                if grid.get(nx, ny, nz) == value {
                    return true;
                }
            }
        }
    }
    false
}

/// Extracts the one-voxel-thick surface of the set: voxels that are set
/// and have at least one unset 26-neighbour.
///
/// Outer-face voxels are skipped; they are never set.
///
/// # Errors
///
/// Propagates allocation failure for the surface grid.
pub fn extract_surface(grid: &OccupancyGrid) -> Result<OccupancyGrid> {
    let r = grid.resolution();
    let mut surface = OccupancyGrid::new(r)?;

    for x in 1..r - 1 {
        for y in 1..r - 1 {
            for z in 1..r - 1 {
                if grid.get(x, y, z) && has_neighbor(grid, x, y, z, false) {
                    surface.set(x, y, z, true);
                }
            }
        }
    }

    Ok(surface)
}

/// Grows the shell by one voxel within the set.
///
/// The pass reads a snapshot of the shell taken at entry, so growth is
/// geometrically uniform: a voxel joins the shell iff it is in the set,
/// not yet in the shell, and 26-adjacent to the shell as it stood when
/// the pass began.
///
/// # Errors
///
/// Propagates allocation failure for the snapshot.
pub fn thicken_shell(set: &OccupancyGrid, shell: &mut OccupancyGrid) -> Result<()> {
    let snapshot = shell.try_clone()?;
    let r = set.resolution();

    for x in 1..r - 1 {
        for y in 1..r - 1 {
            for z in 1..r - 1 {
                if snapshot.get(x, y, z) || !set.get(x, y, z) {
                    continue;
                }
                if has_neighbor(&snapshot, x, y, z, true) {
                    shell.set(x, y, z, true);
                }
            }
        }
    }

    Ok(())
}

/// Applies one block to the grid.
///
/// Add-blocks set every covered voxel except those on the outer boundary
/// (all three axes are excluded symmetrically, which keeps the
/// boundary-faces invariant); sub-blocks clear unconditionally.
pub fn apply_block(grid: &mut OccupancyGrid, block: &Block) {
    let r = grid.resolution();
    let (x0, x1) = block.voxel_range(0, r);
    let (y0, y1) = block.voxel_range(1, r);
    let (z0, z1) = block.voxel_range(2, r);

    for x in x0..=x1 {
        for y in y0..=y1 {
            for z in z0..=z1 {
                if block.additive {
                    if !grid.is_boundary(x, y, z) {
                        grid.set(x, y, z, true);
                    }
                } else {
                    grid.set(x, y, z, false);
                }
            }
        }
    }
}

/// Runs the full sculpting sequence in place: shell extraction iff
/// `shell_thickness > 0`, dilation to the integer thickness
/// `max(2, round(R·shell_thickness))`, then the blocks in configured
/// order (later blocks override earlier ones in overlaps).
///
/// # Errors
///
/// Propagates allocation failure from the shell passes.
pub fn sculpt(grid: &mut OccupancyGrid, shell_thickness: f32, blocks: &[Block]) -> Result<()> {
    let r = grid.resolution();

    if shell_thickness > 0.0 {
        debug!("Finding surface");
        let mut shell = extract_surface(grid)?;

        // A 1-voxel shell cannot keep the inner and outer surfaces apart,
        // so the integer thickness is floored at 2.
        let thickness = ((r as f32 * shell_thickness).round() as usize).max(2);

        // The extracted surface is already 1 voxel thick.
        for pass in 1..thickness {
            debug!("Thickening shell (pass {} of {})", pass, thickness - 1);
            thicken_shell(grid, &mut shell)?;
        }

        *grid = shell;
    }

    for (i, block) in blocks.iter().enumerate() {
        if block.additive {
            debug!("Adding block {} of {}", i + 1, blocks.len());
        } else {
            debug!("Subtracting block {} of {}", i + 1, blocks.len());
        }
        apply_block(grid, block);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A 7³ grid whose interior 5³ block (1..=5 on each axis) is set.
    fn solid_block_grid() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(7).unwrap();
        for x in 1..6 {
            for y in 1..6 {
                for z in 1..6 {
                    grid.set(x, y, z, true);
                }
            }
        }
        grid
    }

    #[test]
    fn test_block_constructor_clamps_and_swaps() {
        let block = Block::new(true, [0.9, -0.5, 0.2], [0.1, 0.5, 1.5]);
        assert_eq!(block.start, [0.1, 0.0, 0.2]);
        assert_eq!(block.end, [0.9, 0.5, 1.0]);
    }

    #[test]
    fn test_extract_surface_of_solid_block() {
        let grid = solid_block_grid();
        let surface = extract_surface(&grid).unwrap();

        // 5³ block minus its strict 3³ interior.
        assert_eq!(surface.count_set(), 125 - 27);
        assert!(!surface.get(3, 3, 3));
        assert!(surface.get(1, 1, 1));
    }

    #[test]
    fn test_hollowing_keeps_two_layers() {
        let mut grid = solid_block_grid();
        // round(7 · 0.3) = 2 -> one dilation pass over the surface.
        sculpt(&mut grid, 0.3, &[]).unwrap();

        // Only the 1³ centre is carved out of the 5³ block.
        assert_eq!(grid.count_set(), 125 - 1);
        assert!(!grid.get(3, 3, 3));
        assert!(grid.get(2, 2, 2));
    }

    #[test]
    fn test_dilation_reads_pre_pass_snapshot() {
        // A single seed voxel inside a solid set grows by exactly one
        // voxel of 26-neighbourhood per pass; reading the in-progress
        // shell instead would smear it across the whole set in one pass.
        let mut set = OccupancyGrid::new(9).unwrap();
        for x in 1..8 {
            for y in 1..8 {
                for z in 1..8 {
                    set.set(x, y, z, true);
                }
            }
        }
        let mut shell = OccupancyGrid::new(9).unwrap();
        shell.set(4, 4, 4, true);

        thicken_shell(&set, &mut shell).unwrap();
        assert_eq!(shell.count_set(), 27);

        thicken_shell(&set, &mut shell).unwrap();
        assert_eq!(shell.count_set(), 125);
    }

    #[test]
    fn test_add_block_respects_all_boundary_faces() {
        let mut grid = OccupancyGrid::new(6).unwrap();
        apply_block(&mut grid, &Block::new(true, [0.0; 3], [1.0; 3]));

        for x in 0..6 {
            for y in 0..6 {
                for z in 0..6 {
                    assert_eq!(grid.get(x, y, z), !grid.is_boundary(x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_block_order_later_wins() {
        let mut grid = OccupancyGrid::new(8).unwrap();
        let add = Block::new(true, [0.0; 3], [1.0; 3]);
        let sub = Block::new(false, [0.0; 3], [1.0, 1.0, 0.5]);

        sculpt(&mut grid, 0.0, &[add, sub]).unwrap();
        assert!(!grid.get(3, 3, 2));
        assert!(grid.get(3, 3, 5));

        let mut grid = OccupancyGrid::new(8).unwrap();
        sculpt(&mut grid, 0.0, &[sub, add]).unwrap();
        assert!(grid.get(3, 3, 2));
    }

    #[test]
    fn test_shell_before_blocks_is_observable() {
        // Hollowing runs before block addition. A block buried in the
        // middle of the set re-fills the carved cavity; had the block
        // applied first it would have merged into the set (it is a
        // subset) and the centre would have been carved regardless.
        let mut grid = solid_block_grid();
        let plug = Block::new(true, [0.4, 0.4, 0.4], [0.6, 0.6, 0.6]);
        sculpt(&mut grid, 0.3, &[plug]).unwrap();
        assert!(grid.get(3, 3, 3));

        let mut grid = solid_block_grid();
        sculpt(&mut grid, 0.3, &[]).unwrap();
        assert!(!grid.get(3, 3, 3));
    }

    proptest! {
        #[test]
        fn prop_block_constructor_clamps_and_sorts(
            sx in -2.0_f32..2.0, ex in -2.0_f32..2.0,
            sy in -2.0_f32..2.0, ey in -2.0_f32..2.0,
            sz in -2.0_f32..2.0, ez in -2.0_f32..2.0,
            additive in proptest::bool::ANY,
        ) {
            let block = Block::new(additive, [sx, sy, sz], [ex, ey, ez]);
            for axis in 0..3 {
                prop_assert!((0.0..=1.0).contains(&block.start[axis]));
                prop_assert!((0.0..=1.0).contains(&block.end[axis]));
                prop_assert!(block.start[axis] <= block.end[axis]);
            }
        }

        #[test]
        fn prop_add_blocks_never_touch_the_boundary(
            sx in -2.0_f32..2.0, ex in -2.0_f32..2.0,
            sy in -2.0_f32..2.0, ey in -2.0_f32..2.0,
            sz in -2.0_f32..2.0, ez in -2.0_f32..2.0,
            resolution in 2_usize..9,
        ) {
            let mut grid = OccupancyGrid::new(resolution).unwrap();
            apply_block(
                &mut grid,
                &Block::new(true, [sx, sy, sz], [ex, ey, ez]),
            );
            for x in 0..resolution {
                for y in 0..resolution {
                    for z in 0..resolution {
                        if grid.is_boundary(x, y, z) {
                            prop_assert!(!grid.get(x, y, z));
                        }
                    }
                }
            }
        }
    }
}
