//! Depth file (`.dep`)
//!
//! One depth value per grid node, written as N+1 rows of M+1 values for a
//! grid with M nodes per row and N rows. The trailing row and column hold a
//! border value (normally `-999.0`) that carries no information: it is
//! dropped on parse and written back on export.
//!
//! Values are rendered as `%16.7E` and a row wraps after every twelfth value.
//! The file does not record its own shape, so parsing needs the grid it
//! belongs to.

use std::fmt::Write as _;
use std::path::Path;

use tracing::debug;

use crate::config::DepthOptions;
use crate::error::{Error, FormatError, Result};
use crate::grd::Grid;
use crate::matrix::Matrix;
use crate::numfmt;

/// Values per physical line in a depth row
const VALUES_PER_LINE: usize = 12;

/// Depth values aligned with the nodes of a grid
#[derive(Debug, Clone, PartialEq)]
pub struct DepthGrid {
    depth: Matrix,
    border_value: f64,
}

impl DepthGrid {
    /// Parse a depth file for `grid` with default options
    pub fn parse(text: &str, grid: &Grid) -> Result<Self> {
        Self::parse_with(text, grid, &DepthOptions::default())
    }

    /// Parse a depth file for `grid`
    pub fn parse_with(text: &str, grid: &Grid, options: &DepthOptions) -> Result<Self> {
        let (m, n) = grid.dimensions();
        if m == 0 {
            return Err(FormatError::DimensionMismatch {
                section: "depth file".to_string(),
                expected: "grid with at least one column".to_string(),
                actual: "0 columns".to_string(),
            });
        }

        let values = text
            .split_whitespace()
            .map(|token| {
                numfmt::parse_number(token).ok_or_else(|| FormatError::InvalidNumber {
                    section: "depth file".to_string(),
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let width = m + 1;
        if values.len() % width != 0 {
            return Err(FormatError::TokenCount {
                section: "depth file".to_string(),
                expected: values.len().div_ceil(width) * width,
                actual: values.len(),
            });
        }
        let rows = values.len() / width;
        if rows != n + 1 {
            return Err(FormatError::DimensionMismatch {
                section: "depth file".to_string(),
                expected: format!("{} rows of {width} values", n + 1),
                actual: format!("{rows} rows of {width} values"),
            });
        }

        let depth = Matrix::new(rows, width, values)?.without_border();
        debug!(
            "Parsed depth file with {}x{} interior values",
            depth.rows(),
            depth.cols()
        );

        Ok(Self {
            depth,
            border_value: options.border_value,
        })
    }

    /// Build a depth grid from interior values
    pub fn from_matrix(depth: Matrix, options: &DepthOptions) -> Self {
        Self {
            depth,
            border_value: options.border_value,
        }
    }

    /// Render the depth file, border row and column included
    pub fn export(&self) -> String {
        let bordered = self.depth.with_border(self.border_value);
        let mut output = String::new();
        for row in bordered.iter_rows() {
            for (count, value) in row.iter().enumerate() {
                let _ = write!(output, "{:>16}", numfmt::exp_upper(*value, 7));
                if count % VALUES_PER_LINE == VALUES_PER_LINE - 1 || count + 1 == row.len() {
                    output.push('\n');
                }
            }
        }
        output
    }

    /// Replace the interior values; the shape must not change
    pub fn set_depth(&mut self, depth: Matrix) -> Result<()> {
        if depth.shape() != self.depth.shape() {
            return Err(FormatError::DimensionMismatch {
                section: "depth values".to_string(),
                expected: format!("{}x{}", self.depth.rows(), self.depth.cols()),
                actual: format!("{}x{}", depth.rows(), depth.cols()),
            });
        }
        self.depth = depth;
        Ok(())
    }

    /// Interior depth values, N rows of M
    pub fn depth(&self) -> &Matrix {
        &self.depth
    }

    /// `(rows, cols)` of the interior
    pub fn shape(&self) -> (usize, usize) {
        self.depth.shape()
    }

    /// Depth at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.depth.get(row, col)
    }

    /// Value written in the border row and column
    pub fn border_value(&self) -> f64 {
        self.border_value
    }

    /// Read and parse a depth file from disk
    pub fn load(path: impl AsRef<Path>, grid: &Grid) -> std::result::Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text, grid)?)
    }

    /// Export and write to disk
    pub fn write(&self, path: impl AsRef<Path>) -> std::result::Result<(), Error> {
        std::fs::write(path, self.export())?;
        Ok(())
    }

    /// Check that `text` survives a parse/export cycle unchanged
    pub fn verify_round_trip(text: &str, grid: &Grid) -> Result<()> {
        let exported = Self::parse(text, grid)?.export();
        if let Some(line) = crate::first_difference(text, &exported) {
            return Err(FormatError::RoundTripMismatch { line });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn grid(m: usize, n: usize) -> Grid {
        let mut text = format!("Coordinate System = Cartesian\n{m:>8}{n:>8}\n 0 0 0\n");
        for _ in 0..2 {
            for row in 1..=n {
                let _ = write!(text, " ETA={row:>5}");
                for col in 0..m {
                    let _ = write!(text, "   {}.0", col + 1);
                }
                text.push('\n');
            }
        }
        Grid::parse(&text).expect("Test operation should succeed")
    }

    const SMALL: &str = "   1.0000000E+00   2.0000000E+00  -9.9900000E+02
   3.5000000E+00  -4.2500000E+00  -9.9900000E+02
  -9.9900000E+02  -9.9900000E+02  -9.9900000E+02
";

    #[test]
    fn test_parse_strips_border() {
        let depth = DepthGrid::parse(SMALL, &grid(2, 2)).expect("Test operation should succeed");
        assert_eq!(depth.shape(), (2, 2));
        assert_eq!(depth.get(1, 1), Some(-4.25));
        assert_eq!(depth.get(2, 0), None);
    }

    #[test]
    fn test_export_restores_border() {
        let depth = DepthGrid::parse(SMALL, &grid(2, 2)).expect("Test operation should succeed");
        assert_eq!(depth.export(), SMALL);
        assert!(DepthGrid::verify_round_trip(SMALL, &grid(2, 2)).is_ok());
    }

    #[test]
    fn test_verify_round_trip_reports_line() {
        let text = SMALL.replace("3.5000000E+00", "3.5E+00");
        let result = DepthGrid::verify_round_trip(&text, &grid(2, 2));
        assert_eq!(result, Err(FormatError::RoundTripMismatch { line: 2 }));
    }

    #[test]
    fn test_rows_wrap_after_twelve_values() {
        let interior = Matrix::filled(1, 12, 1.5);
        let depth = DepthGrid::from_matrix(interior, &DepthOptions::default());
        let text = depth.export();
        let lines: Vec<&str> = text.lines().collect();
        // 13 values per row: 12 on the first line, the border on the next
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].len(), 16 * 12);
        assert_eq!(lines[1], "  -9.9900000E+02");

        let reparsed =
            DepthGrid::parse(&text, &grid(12, 1)).expect("Test operation should succeed");
        assert_eq!(reparsed, depth);
    }

    #[test]
    fn test_custom_border_value() {
        let options = DepthOptions::new().with_border_value(0.0);
        let depth = DepthGrid::from_matrix(Matrix::filled(1, 1, 2.0), &options);
        assert_eq!(
            depth.export(),
            "   2.0000000E+00   0.0000000E+00\n   0.0000000E+00   0.0000000E+00\n"
        );
    }

    #[test]
    fn test_row_count_mismatch() {
        let err = DepthGrid::parse(SMALL, &grid(2, 3)).expect_err("Test operation should fail");
        assert!(matches!(err, FormatError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_token_count_not_divisible() {
        let err = DepthGrid::parse("1.0 2.0 3.0 4.0\n", &grid(2, 1))
            .expect_err("Test operation should fail");
        assert_eq!(
            err,
            FormatError::TokenCount {
                section: "depth file".to_string(),
                expected: 6,
                actual: 4,
            }
        );
    }

    #[test]
    fn test_invalid_token() {
        let err = DepthGrid::parse("1.0 abc\n", &grid(1, 1))
            .expect_err("Test operation should fail");
        assert!(matches!(err, FormatError::InvalidNumber { .. }));
    }

    #[test]
    fn test_set_depth_requires_same_shape() {
        let mut depth =
            DepthGrid::parse(SMALL, &grid(2, 2)).expect("Test operation should succeed");
        assert!(depth.set_depth(Matrix::filled(3, 2, 0.0)).is_err());
        assert_eq!(depth.get(0, 0), Some(1.0));

        depth
            .set_depth(Matrix::filled(2, 2, 7.0))
            .expect("Test operation should succeed");
        assert_eq!(depth.get(1, 0), Some(7.0));
        let text = depth.export();
        assert!(text.starts_with("   7.0000000E+00   7.0000000E+00  -9.9900000E+02\n"));
    }
}
