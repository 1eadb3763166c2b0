//! Volume stage for qjulia.
//!
//! Turns a compiled scalar field into a sculpted boolean occupancy grid:
//! - [`OccupancyGrid`] — the dense `R³` voxel volume
//! - [`sample_occupancy`] — batched per-plane field sampling
//! - [`sculpt`] — shell extraction, dilation, and block add/subtract

pub mod occupancy;
pub mod sampler;
pub mod sculpt;

pub use occupancy::OccupancyGrid;
pub use sampler::{sample_occupancy, SamplerParams};
pub use sculpt::{apply_block, extract_surface, sculpt, thicken_shell, Block};
