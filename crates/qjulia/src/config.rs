//! The textual configuration file.
//!
//! A configuration is thirteen numbered header lines (resolution,
//! refinement steps, shell thickness, grid extents, iteration cap,
//! threshold, `Z.w`, the four components of `C`, then the equation),
//! followed by any number of `addblock`/`subblock` directives. A trailing
//! `//` starts a comment on any line; blank or comment-only lines are
//! errors in the header section and skipped in the block section.

use std::path::Path;

use qjulia_core::error::{QjuliaError, Result};
use qjulia_core::{Equation, Quaternion};
use qjulia_grid::Block;

/// Fallback grid resolution when the configured one is out of `[1, 100000]`.
const DEFAULT_RESOLUTION: usize = 100;

/// Parsed parameters of one generation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Grid resolution `R` (voxels per axis).
    pub resolution: usize,
    /// Bisection steps per isosurface vertex.
    pub refinement_steps: u32,
    /// Normalised shell thickness; `0` keeps the object solid.
    pub shell_thickness: f32,
    /// Lower bound of the sampled cube.
    pub grid_min: f32,
    /// Upper bound of the sampled cube.
    pub grid_max: f32,
    /// Iteration cap of the escape test.
    pub max_iterations: u32,
    /// Escape threshold.
    pub threshold: f32,
    /// Fixed fourth coordinate of every sample.
    pub z_w: f32,
    /// The constant `C` of the iterated equation.
    pub c: Quaternion,
    /// The compiled iterative equation.
    pub equation: Equation,
    /// Block directives, in file order.
    pub blocks: Vec<Block>,
}

impl RunConfig {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`QjuliaError::Config`] when the file cannot be read and
    /// any [`RunConfig::parse`] error otherwise.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            QjuliaError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    /// Parses configuration text.
    ///
    /// Out-of-range values fall back rather than fail:
    /// a resolution outside `[1, 100000]` falls back to 100, refinement
    /// steps above 1000 fall back to 0, and the shell thickness clamps
    /// into `[0, 1]`. Equal grid extents collapse to `[-1.5, 1.5]`;
    /// reversed extents are swapped.
    ///
    /// # Errors
    ///
    /// Returns [`QjuliaError::Config`] for structural problems and
    /// [`QjuliaError::Formula`] when the equation fails to compile.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cursor = Cursor {
            lines: text.lines(),
            line_number: 0,
        };

        let resolution: usize = parse_number(cursor.next_header_value()?, "grid resolution")?;
        let resolution = if (1..=100_000).contains(&resolution) {
            resolution
        } else {
            DEFAULT_RESOLUTION
        };

        let refinement_steps: u32 =
            parse_number(cursor.next_header_value()?, "vertex refinement steps")?;
        let refinement_steps = if refinement_steps > 1000 {
            0
        } else {
            refinement_steps
        };

        let shell_thickness: f32 =
            parse_number::<f32>(cursor.next_header_value()?, "shell thickness")?.clamp(0.0, 1.0);

        let mut grid_min: f32 = parse_number(cursor.next_header_value()?, "grid minimum extent")?;
        let mut grid_max: f32 = parse_number(cursor.next_header_value()?, "grid maximum extent")?;
        #[allow(clippy::float_cmp)]
        if grid_min == grid_max {
            grid_min = -1.5;
            grid_max = 1.5;
        } else if grid_min > grid_max {
            std::mem::swap(&mut grid_min, &mut grid_max);
        }

        let max_iterations: u32 =
            parse_number(cursor.next_header_value()?, "maximum iterations")?;
        let threshold: f32 = parse_number(cursor.next_header_value()?, "threshold")?;
        let z_w: f32 = parse_number(cursor.next_header_value()?, "Z.w")?;

        let c = Quaternion::new(
            parse_number(cursor.next_header_value()?, "C.x")?,
            parse_number(cursor.next_header_value()?, "C.y")?,
            parse_number(cursor.next_header_value()?, "C.z")?,
            parse_number(cursor.next_header_value()?, "C.w")?,
        );

        let equation = Equation::compile(cursor.next_header_value()?)?;

        let mut blocks = Vec::new();
        for line in cursor.lines {
            let value = strip_comment(line).trim();
            if value.is_empty() {
                continue;
            }
            blocks.push(parse_block(value)?);
        }

        Ok(Self {
            resolution,
            refinement_steps,
            shell_thickness,
            grid_min,
            grid_max,
            max_iterations,
            threshold,
            z_w,
            c,
            equation,
            blocks,
        })
    }

    /// The block list as configuration-file lines, or `"None"`.
    #[must_use]
    pub fn blocks_string(&self) -> String {
        if self.blocks.is_empty() {
            return "None".to_owned();
        }
        self.blocks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct Cursor<'a> {
    lines: std::str::Lines<'a>,
    line_number: usize,
}

impl<'a> Cursor<'a> {
    /// Returns the next header line's value: the text before any `//`
    /// comment, trimmed, which must be non-empty.
    fn next_header_value(&mut self) -> Result<&'a str> {
        let Some(line) = self.lines.next() else {
            return Err(QjuliaError::Config(format!(
                "configuration ended after line {}",
                self.line_number
            )));
        };
        self.line_number += 1;

        let value = strip_comment(line).trim();
        if value.is_empty() {
            return Err(QjuliaError::Config(format!(
                "line {} is blank or comment-only",
                self.line_number
            )));
        }
        Ok(value)
    }
}

fn strip_comment(line: &str) -> &str {
    line.find("//").map_or(line, |i| &line[..i])
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| QjuliaError::Config(format!("malformed {what} '{value}'")))
}

/// Parses one `addblock`/`subblock` directive:
/// `op, start_x, end_x, start_y, end_y, start_z, end_z`.
fn parse_block(value: &str) -> Result<Block> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    if fields.len() != 7 {
        return Err(QjuliaError::Config(
            "addblock/subblock format error".to_owned(),
        ));
    }

    let additive = match fields[0].to_ascii_lowercase().as_str() {
        "addblock" => true,
        "subblock" => false,
        other => {
            return Err(QjuliaError::Config(format!(
                "unrecognized block token: {other}"
            )))
        }
    };

    let mut coords = [0.0_f32; 6];
    for (i, field) in fields[1..].iter().enumerate() {
        coords[i] = parse_number(field, "block coordinate")?;
    }

    Ok(Block::new(
        additive,
        [coords[0], coords[2], coords[4]],
        [coords[1], coords[3], coords[5]],
    ))
}
