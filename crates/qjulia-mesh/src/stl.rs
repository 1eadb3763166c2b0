//! Binary stereolithography (STL) output.
//!
//! Layout: an 80-byte zero header, a little-endian `u32` triangle count,
//! then one 50-byte record per triangle (normal, three vertices, and a
//! zero attribute word, all little-endian). Records are staged in a
//! fixed-capacity buffer and flushed when it fills and once at the end.

#![allow(clippy::cast_possible_truncation)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use glam::Vec3;
use log::info;

use qjulia_core::error::{QjuliaError, Result};

use crate::indexed_mesh::IndexedMesh;

/// Bytes per triangle record: 12 `f32` plus one `u16` attribute word.
const TRIANGLE_RECORD_SIZE: usize = 12 * 4 + 2;

/// Size of the zeroed file header.
const HEADER_SIZE: usize = 80;

/// Default number of triangle records staged between flushes.
pub const DEFAULT_BUFFER_WIDTH: usize = 65536;

fn put_vec3(buffer: &mut Vec<u8>, v: Vec3) {
    buffer.extend_from_slice(&v.x.to_le_bytes());
    buffer.extend_from_slice(&v.y.to_le_bytes());
    buffer.extend_from_slice(&v.z.to_le_bytes());
}

/// Writes the mesh to `path` with the default buffer width.
///
/// # Errors
///
/// See [`write_binary_stl_with`].
pub fn write_binary_stl(mesh: &IndexedMesh, path: &Path) -> Result<()> {
    write_binary_stl_with(mesh, path, DEFAULT_BUFFER_WIDTH)
}

/// Writes the mesh to `path`, staging `buffer_width` triangles per flush.
///
/// Face normals are recomputed as `normalize((v₁−v₀)×(v₂−v₀))`; a
/// degenerate triangle keeps the zero normal.
///
/// # Errors
///
/// Returns [`QjuliaError::MeshNotFinalized`] for an un-finalised mesh,
/// [`QjuliaError::EmptyMesh`] for a mesh with no triangles, and
/// [`QjuliaError::IoError`] when the file cannot be created or written.
pub fn write_binary_stl_with(
    mesh: &IndexedMesh,
    path: &Path,
    buffer_width: usize,
) -> Result<()> {
    if !mesh.is_finalized() {
        return Err(QjuliaError::MeshNotFinalized);
    }
    if mesh.triangle_count() == 0 {
        return Err(QjuliaError::EmptyMesh);
    }

    let mut out = File::create(path)?;

    info!(
        "Writing {} MB of data to disk",
        TRIANGLE_RECORD_SIZE * mesh.triangle_count() / 1_048_576
    );

    out.write_all(&[0_u8; HEADER_SIZE])?;
    out.write_all(&(mesh.triangle_count() as u32).to_le_bytes())?;

    let vertices = mesh.vertices();
    let mut buffer = Vec::with_capacity(TRIANGLE_RECORD_SIZE * buffer_width.max(1));

    for triangle in mesh.triangles() {
        let [v0, v1, v2] = triangle.vertex_indices.map(|i| vertices[i as usize]);
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        put_vec3(&mut buffer, normal);
        put_vec3(&mut buffer, v0);
        put_vec3(&mut buffer, v1);
        put_vec3(&mut buffer, v2);
        buffer.extend_from_slice(&0_u16.to_le_bytes());

        if buffer.len() >= TRIANGLE_RECORD_SIZE * buffer_width.max(1) {
            out.write_all(&buffer)?;
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        out.write_all(&buffer)?;
    }

    out.flush()?;
    Ok(())
}
