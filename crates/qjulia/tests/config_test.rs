//! Configuration-file parsing tests.

use proptest::prelude::*;
use qjulia::{QjuliaError, RunConfig};

const BASE: &str = "\
100     // Grid resolution (an unsigned integer)
8       // Vertex refinement steps (an unsigned integer)
0.25    // Shell thickness
-1.5    // Grid minimum extent
1.5     // Grid maximum extent
8       // Maximum iterations
4.0     // Threshold
0.125   // Z.w
0.3     // C.x
0.5     // C.y
0.4     // C.z
0.2     // C.w
Z = sin(Z) + C * sin(Z)  // Iterative equation
addblock, 0.93, 0.97, 0.01, 0.15, 0.2, 0.8 // Add a block
// a comment-only line is skipped down here

subblock, 1, 0.95, 0.3, 0.33, 0.3, 0.33";

/// Rewrites one 0-based header line of the base configuration.
fn with_line(index: usize, replacement: &str) -> String {
    let mut lines: Vec<&str> = BASE.lines().collect();
    lines[index] = replacement;
    lines.join("\n")
}

#[test]
fn test_parse_full_configuration() {
    let config = RunConfig::parse(BASE).unwrap();
    assert_eq!(config.resolution, 100);
    assert_eq!(config.refinement_steps, 8);
    assert!((config.shell_thickness - 0.25).abs() < 1e-6);
    assert!((config.grid_min + 1.5).abs() < 1e-6);
    assert!((config.grid_max - 1.5).abs() < 1e-6);
    assert_eq!(config.max_iterations, 8);
    assert!((config.threshold - 4.0).abs() < 1e-6);
    assert!((config.z_w - 0.125).abs() < 1e-6);
    assert!((config.c.x - 0.3).abs() < 1e-6);
    assert!((config.c.w - 0.2).abs() < 1e-6);
    assert_eq!(config.equation.text(), "Z = sin(Z) + C * sin(Z)");
    assert_eq!(config.blocks.len(), 2);
    assert!(config.blocks[0].additive);
    assert!(!config.blocks[1].additive);
    // Reversed x pair of the subblock is swapped into order.
    assert!((config.blocks[1].start[0] - 0.95).abs() < 1e-6);
    assert!((config.blocks[1].end[0] - 1.0).abs() < 1e-6);
}

#[test]
fn test_out_of_range_values_fall_back() {
    let config = RunConfig::parse(&with_line(0, "200000")).unwrap();
    assert_eq!(config.resolution, 100);

    let config = RunConfig::parse(&with_line(0, "0")).unwrap();
    assert_eq!(config.resolution, 100);

    let config = RunConfig::parse(&with_line(1, "5000")).unwrap();
    assert_eq!(config.refinement_steps, 0);

    let config = RunConfig::parse(&with_line(2, "1.5")).unwrap();
    assert!((config.shell_thickness - 1.0).abs() < 1e-6);

    let config = RunConfig::parse(&with_line(2, "-0.5")).unwrap();
    assert!(config.shell_thickness.abs() < 1e-6);
}

#[test]
fn test_grid_extents_swap_and_collapse() {
    let swapped = RunConfig::parse(&with_line(3, "2.0")).unwrap();
    assert!((swapped.grid_min - 1.5).abs() < 1e-6);
    assert!((swapped.grid_max - 2.0).abs() < 1e-6);

    let mut text = with_line(3, "0.75");
    text = {
        let mut lines: Vec<&str> = text.lines().collect();
        lines[4] = "0.75";
        lines.join("\n")
    };
    let collapsed = RunConfig::parse(&text).unwrap();
    assert!((collapsed.grid_min + 1.5).abs() < 1e-6);
    assert!((collapsed.grid_max - 1.5).abs() < 1e-6);
}

#[test]
fn test_blank_header_line_fails() {
    let error = RunConfig::parse(&with_line(5, "   ")).unwrap_err();
    assert!(matches!(error, QjuliaError::Config(_)));

    let error = RunConfig::parse(&with_line(5, "// only a comment")).unwrap_err();
    assert!(matches!(error, QjuliaError::Config(_)));
}

#[test]
fn test_truncated_header_fails() {
    let truncated: String = BASE.lines().take(7).collect::<Vec<_>>().join("\n");
    assert!(RunConfig::parse(&truncated).is_err());
}

#[test]
fn test_malformed_number_fails() {
    let error = RunConfig::parse(&with_line(6, "four")).unwrap_err();
    assert!(error.to_string().contains("malformed threshold"));
}

#[test]
fn test_malformed_equation_fails_with_formula_diagnostic() {
    let error = RunConfig::parse(&with_line(12, "Z = frob(Z)")).unwrap_err();
    assert!(error.to_string().starts_with("Error parsing formula"));
}

#[test]
fn test_block_errors() {
    let error = RunConfig::parse(&with_line(13, "addblock, 0, 1, 0, 1, 0")).unwrap_err();
    assert!(error.to_string().contains("addblock/subblock format error"));

    let error =
        RunConfig::parse(&with_line(13, "mulblock, 0, 1, 0, 1, 0, 1")).unwrap_err();
    assert!(error.to_string().contains("unrecognized block token: mulblock"));

    let error = RunConfig::parse(&with_line(13, "addblock, 0, x, 0, 1, 0, 1")).unwrap_err();
    assert!(error.to_string().contains("malformed block coordinate"));
}

#[test]
fn test_block_token_is_case_insensitive() {
    let config = RunConfig::parse(&with_line(13, "AddBlock, 0, 1, 0, 1, 0, 1")).unwrap();
    assert!(config.blocks[0].additive);
}

#[test]
fn test_blocks_string_round_trips_intent() {
    let config = RunConfig::parse(BASE).unwrap();
    let rendered = config.blocks_string();
    assert!(rendered.starts_with("addblock, "));
    assert!(rendered.contains("subblock, "));

    let no_blocks: String = BASE.lines().take(13).collect::<Vec<_>>().join("\n");
    let config = RunConfig::parse(&no_blocks).unwrap();
    assert_eq!(config.blocks_string(), "None");
}

proptest! {
    // Whatever numbers the header carries, the parsed values respect
    // their contracts: resolution and refinement fall back into range,
    // the shell thickness clamps, and the grid extents come out ordered.
    #[test]
    fn prop_parsed_header_values_respect_their_contracts(
        resolution in 0_u32..200_000,
        refinement in 0_u32..2000,
        shell in -1.0_f32..2.0,
        gmin in -10.0_f32..10.0,
        gmax in -10.0_f32..10.0,
    ) {
        let text = format!(
            "{resolution}\n{refinement}\n{shell}\n{gmin}\n{gmax}\n8\n4.0\n0\n0.3\n0.5\n0.4\n0.2\nZ = Z*Z + C"
        );
        let config = RunConfig::parse(&text).unwrap();

        prop_assert!((1..=100_000).contains(&config.resolution));
        prop_assert!(config.refinement_steps <= 1000);
        prop_assert!((0.0..=1.0).contains(&config.shell_thickness));
        prop_assert!(config.grid_min < config.grid_max);
    }
}
