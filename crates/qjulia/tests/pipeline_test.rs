//! End-to-end pipeline scenarios.

use std::path::PathBuf;

use qjulia::pipeline::generate_stl;
use qjulia::RunConfig;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("qjulia-pipeline-test-{name}-{}", std::process::id()))
}

/// Builds a configuration from the numeric header values, the equation,
/// and any block lines.
fn config_text(
    resolution: u32,
    refinement: u32,
    shell: f32,
    iterations: u32,
    threshold: f32,
    c: [f32; 4],
    equation: &str,
    blocks: &[&str],
) -> String {
    let mut text = format!(
        "{resolution}\n{refinement}\n{shell}\n-1.5\n1.5\n{iterations}\n{threshold}\n0\n{}\n{}\n{}\n{}\n{equation}",
        c[0], c[1], c[2], c[3]
    );
    for block in blocks {
        text.push('\n');
        text.push_str(block);
    }
    text
}

#[test]
fn test_empty_set_writes_nothing() {
    // With C far away and a tiny threshold, every sample escapes.
    let text = config_text(
        8,
        0,
        0.0,
        2,
        0.01,
        [10.0, 10.0, 10.0, 10.0],
        "Z = Z*Z + C",
        &[],
    );
    let config = RunConfig::parse(&text).unwrap();
    let out = scratch("empty.stl");

    let report = generate_stl(&config, &out, true).unwrap();
    assert!(report.is_none());
    assert!(!out.exists());
}

#[test]
fn test_full_interior_marches_to_closed_hollow_cube() {
    // `Z = Z` under a huge threshold keeps every sample inside; only the
    // forced-false boundary carves the surface: the closed box around the
    // 6x6x6 interior of an 8-grid.
    let text = config_text(8, 0, 0.0, 1, 1.0e9, [0.0; 4], "Z = Z", &[]);
    let config = RunConfig::parse(&text).unwrap();
    let out = scratch("full.stl");

    let report = generate_stl(&config, &out, true).unwrap().unwrap();
    assert_eq!(report.triangles, 428);
    assert_eq!(report.vertices, 216);
    assert_eq!(report.problem_edges, 0);
    assert_eq!(report.degenerate_triangles, 0);

    // Analytic values for the marched box at h = 3/7.
    assert!((report.volume - 16.3469).abs() < 0.01 * 16.3469);
    assert!((report.area - 35.6618).abs() < 0.01 * 35.6618);
    let extent = 6.0 * 3.0 / 7.0;
    assert!((report.x_extent - extent).abs() < 1e-4);
    assert!((report.y_extent - extent).abs() < 1e-4);
    assert!((report.z_extent - extent).abs() < 1e-4);

    // The emitted container: 80 zero bytes, LE count, 50-byte records.
    let bytes = std::fs::read(&out).unwrap();
    std::fs::remove_file(&out).unwrap();
    assert!(bytes[..80].iter().all(|&b| b == 0));
    let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap());
    assert_eq!(count, 428);
    assert_eq!(bytes.len(), 84 + 50 * 428);
}

#[test]
fn test_block_subtraction_removes_lower_half() {
    let text = config_text(
        8,
        0,
        0.0,
        1,
        1.0e9,
        [0.0; 4],
        "Z = Z",
        &["subblock, 0, 1, 0, 1, 0, 0.5"],
    );
    let config = RunConfig::parse(&text).unwrap();
    let out = scratch("subblock.stl");

    let report = generate_stl(&config, &out, true).unwrap().unwrap();
    std::fs::remove_file(&out).unwrap();

    assert_eq!(report.triangles, 236);
    assert_eq!(report.problem_edges, 0);
    assert_eq!(report.degenerate_triangles, 0);
    assert!((report.volume - 5.1691).abs() < 0.01 * 5.1691);
    assert!((report.area - 18.8899).abs() < 0.01 * 18.8899);
}

#[test]
fn test_shell_hollowing_nests_two_surfaces() {
    // `Z = Z` with threshold 1 keeps samples whose spatial distance from
    // the origin is below 1 (Z.w = 0): a solid unit ball.
    let solid_text = config_text(32, 0, 0.0, 1, 1.0, [0.0; 4], "Z = Z", &[]);
    let hollow_text = config_text(32, 0, 0.1, 1, 1.0, [0.0; 4], "Z = Z", &[]);

    let out_solid = scratch("ball-solid.stl");
    let out_hollow = scratch("ball-hollow.stl");

    let solid = generate_stl(&RunConfig::parse(&solid_text).unwrap(), &out_solid, true)
        .unwrap()
        .unwrap();
    let hollow = generate_stl(&RunConfig::parse(&hollow_text).unwrap(), &out_hollow, true)
        .unwrap()
        .unwrap();
    std::fs::remove_file(&out_solid).unwrap();
    std::fs::remove_file(&out_hollow).unwrap();

    assert_eq!(solid.problem_edges, 0);
    assert_eq!(hollow.problem_edges, 0);

    // The hollow ball adds an inner surface and loses the carved volume.
    assert!(hollow.triangles > solid.triangles);
    assert!(hollow.area > solid.area);
    assert!(hollow.volume < solid.volume);
    assert!(hollow.volume > 0.0);

    // The outer surface is unchanged.
    assert!((hollow.x_extent - solid.x_extent).abs() < 1e-4);
}

#[test]
fn test_refinement_changes_geometry_but_not_topology() {
    let coarse_text = config_text(8, 0, 0.0, 1, 1.0, [0.0; 4], "Z = Z", &[]);
    let refined_text = config_text(8, 8, 0.0, 1, 1.0, [0.0; 4], "Z = Z", &[]);

    let out_coarse = scratch("coarse.stl");
    let out_refined = scratch("refined.stl");

    let coarse = generate_stl(&RunConfig::parse(&coarse_text).unwrap(), &out_coarse, true)
        .unwrap()
        .unwrap();
    let refined = generate_stl(
        &RunConfig::parse(&refined_text).unwrap(),
        &out_refined,
        true,
    )
    .unwrap()
    .unwrap();
    std::fs::remove_file(&out_coarse).unwrap();
    std::fs::remove_file(&out_refined).unwrap();

    // Refinement only moves vertices along their edges: same triangle
    // count and still watertight, but different geometry.
    assert_eq!(coarse.triangles, refined.triangles);
    assert_eq!(refined.problem_edges, 0);
    assert_eq!(refined.degenerate_triangles, 0);
    assert!((refined.volume - coarse.volume).abs() > 1e-3);

    // With every vertex bisected onto the unit sphere the mesh is an
    // inscribed polyhedron, so its volume is below the ball's.
    let ball = 4.0 / 3.0 * std::f32::consts::PI;
    assert!(refined.volume > 0.0);
    assert!(refined.volume < ball);
}
