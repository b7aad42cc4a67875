//! Structured grid file (`.grd`)
//!
//! A curvilinear grid written by RGFGRID:
//!
//! ```text
//! * optional comment lines
//! Coordinate System = Cartesian
//! Missing Value = -9.9999900e+02
//!        7     245
//!  0 0 0
//!  ETA=    1   4.95658813698232244E+05   4.95703968187309732E+05 ...
//!              ...
//! ```
//!
//! The header is followed by N rows of M x-coordinates and then N rows of M
//! y-coordinates. Each row starts with an `ETA=` marker and wraps after five
//! values. Nodes equal to the missing value are masked: they keep their
//! value in the matrices but are skipped by queries and conversions.
//!
//! # Example
//!
//! ```
//! use delft3d_formats::grd::{CoordinateSystem, Grid};
//!
//! let text = "Coordinate System = Cartesian\n       2       1\n 0 0 0\n \
//! ETA=    1   1.00000000000000000E+00   2.00000000000000000E+00\n \
//! ETA=    1   5.00000000000000000E+00   5.00000000000000000E+00\n";
//! let grid = Grid::parse(text)?;
//! assert_eq!(grid.coordinate_system(), CoordinateSystem::Cartesian);
//! assert_eq!(grid.dimensions(), (2, 1));
//! assert_eq!(grid.export(), text);
//! # Ok::<(), delft3d_formats::error::FormatError>(())
//! ```

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::GridOptions;
use crate::error::{FormatError, ProjectionError, Result};
use crate::matrix::Matrix;
use crate::numfmt;
use crate::projection::{Epsg, ProjectionPair, Projector};

/// Values per physical line in a grid row
const VALUES_PER_LINE: usize = 5;
/// Indent of continuation lines, aligned under the first value
const CONTINUATION_GUTTER: &str = "             ";
/// Separator before values that do not start a line
const VALUE_GUTTER: &str = "   ";

/// Coordinate system tag of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystem {
    /// Longitude/latitude in degrees
    Spherical,
    /// Projected coordinates in metres
    Cartesian,
}

impl CoordinateSystem {
    /// Tag as written in the header
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spherical => "Spherical",
            Self::Cartesian => "Cartesian",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateSystem {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Spherical" => Ok(Self::Spherical),
            "Cartesian" => Ok(Self::Cartesian),
            other => Err(header_error(format!("unknown coordinate system '{other}'"))),
        }
    }
}

/// Parsed grid file
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    comments: Vec<String>,
    coordinate_system: CoordinateSystem,
    /// `Missing Value` as declared in the header
    missing_value: Option<f64>,
    /// Value that masks a node
    sentinel: Option<f64>,
    x: Matrix,
    y: Matrix,
}

impl Grid {
    /// Parse a grid file with default options
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, &GridOptions::default())
    }

    /// Parse a grid file.
    ///
    /// When the header declares no `Missing Value`,
    /// `options.default_missing_value` decides which value masks a node.
    pub fn parse_with(text: &str, options: &GridOptions) -> Result<Self> {
        let mut lines = text.lines().peekable();

        let mut comments = Vec::new();
        while let Some(line) = lines.next_if(|line| line.starts_with('*')) {
            comments.push(line.to_string());
        }

        let line = lines
            .next()
            .ok_or_else(|| header_error("missing 'Coordinate System' line".to_string()))?;
        let coordinate_system = header_value(line, "Coordinate System")
            .ok_or_else(|| header_error(format!("expected 'Coordinate System', found '{line}'")))?
            .parse::<CoordinateSystem>()?;

        let missing_line = lines.next_if(|line| line.trim_start().starts_with("Missing Value"));
        let missing_value = match missing_line {
            Some(line) => {
                let raw = header_value(line, "Missing Value")
                    .ok_or_else(|| header_error(format!("unreadable line '{line}'")))?;
                let value = numfmt::parse_number(raw).ok_or_else(|| FormatError::InvalidNumber {
                    section: "grid header".to_string(),
                    token: raw.to_string(),
                })?;
                Some(value)
            }
            None => None,
        };

        let line = lines
            .next()
            .ok_or_else(|| header_error("missing dimension line".to_string()))?;
        let (m, n) = parse_dimensions(line)?;

        let line = lines
            .next()
            .ok_or_else(|| header_error("missing ' 0 0 0' line".to_string()))?;
        if !line.split_whitespace().eq(["0", "0", "0"]) {
            return Err(header_error(format!("expected ' 0 0 0', found '{line}'")));
        }

        let tokens: Vec<&str> = lines.flat_map(str::split_whitespace).collect();
        let mut cursor = tokens.as_slice();
        let x = read_matrix(&mut cursor, "X", m, n)?;
        let y = read_matrix(&mut cursor, "Y", m, n)?;
        if !cursor.is_empty() {
            return Err(FormatError::TokenCount {
                section: "grid body".to_string(),
                expected: 0,
                actual: cursor.len(),
            });
        }

        debug!(
            "Parsed {} grid with M={}, N={}, missing value {:?}",
            coordinate_system, m, n, missing_value
        );

        Ok(Self {
            comments,
            coordinate_system,
            missing_value,
            sentinel: missing_value.or(options.default_missing_value),
            x,
            y,
        })
    }

    /// Render the grid file
    pub fn export(&self) -> String {
        let mut output = String::new();
        for comment in &self.comments {
            let _ = writeln!(output, "{comment}");
        }
        let _ = writeln!(output, "Coordinate System = {}", self.coordinate_system);
        if let Some(missing_value) = self.missing_value {
            let _ = writeln!(output, "Missing Value = {}", numfmt::exp(missing_value, 7));
        }
        let (m, n) = self.dimensions();
        let _ = writeln!(output, "{m:>8}{n:>8}");
        output.push_str(" 0 0 0\n");
        write_matrix(&mut output, &self.x);
        write_matrix(&mut output, &self.y);
        output
    }

    /// Replace both coordinate matrices and the coordinate system tag
    pub fn set_grid(
        &mut self,
        x: Matrix,
        y: Matrix,
        coordinate_system: CoordinateSystem,
    ) -> Result<()> {
        if x.shape() != y.shape() {
            return Err(FormatError::DimensionMismatch {
                section: "grid coordinates".to_string(),
                expected: format!("{}x{}", x.rows(), x.cols()),
                actual: format!("{}x{}", y.rows(), y.cols()),
            });
        }
        if x.is_empty() {
            return Err(FormatError::DimensionMismatch {
                section: "grid coordinates".to_string(),
                expected: "at least one node".to_string(),
                actual: "0x0".to_string(),
            });
        }
        self.x = x;
        self.y = y;
        self.coordinate_system = coordinate_system;
        Ok(())
    }

    /// Convert every unmasked node from the spherical to the cartesian system
    pub fn spherical_to_cartesian(
        &mut self,
        projector: &dyn Projector,
        pair: &ProjectionPair,
    ) -> std::result::Result<(), ProjectionError> {
        self.convert(
            projector,
            pair.spherical,
            pair.cartesian,
            CoordinateSystem::Cartesian,
        )
    }

    /// Convert every unmasked node from the cartesian to the spherical system
    pub fn cartesian_to_spherical(
        &mut self,
        projector: &dyn Projector,
        pair: &ProjectionPair,
    ) -> std::result::Result<(), ProjectionError> {
        self.convert(
            projector,
            pair.cartesian,
            pair.spherical,
            CoordinateSystem::Spherical,
        )
    }

    /// Find the unmasked node closest to `(x, y)`, returned as `(column, row)`.
    ///
    /// Spherical grids are projected to `pair.cartesian` first and the query
    /// point is taken to be in that system. Returns `None` when every node is
    /// masked.
    pub fn nearest_cell(
        &self,
        x: f64,
        y: f64,
        projector: &dyn Projector,
        pair: &ProjectionPair,
    ) -> std::result::Result<Option<(usize, usize)>, ProjectionError> {
        let (grid_x, grid_y) = match self.coordinate_system {
            CoordinateSystem::Spherical => {
                warn!(
                    "Spherical grid, projecting nodes from {} to {} for the nearest-cell search",
                    pair.spherical, pair.cartesian
                );
                let (px, py) = self.projected(projector, pair.spherical, pair.cartesian)?;
                (Cow::Owned(px), Cow::Owned(py))
            }
            CoordinateSystem::Cartesian => (Cow::Borrowed(&self.x), Cow::Borrowed(&self.y)),
        };

        let mut best: Option<(usize, f64)> = None;
        for (index, (gx, gy)) in grid_x
            .as_slice()
            .iter()
            .zip(grid_y.as_slice())
            .enumerate()
        {
            if self.is_masked_index(index) {
                continue;
            }
            let distance = (x - gx).hypot(y - gy);
            if distance.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, nearest)| distance < nearest) {
                best = Some((index, distance));
            }
        }

        let m = self.x.cols();
        Ok(best.map(|(index, _)| (index % m, index / m)))
    }

    /// Comment lines preceding the header, verbatim
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Coordinate system tag
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// `Missing Value` declared in the header
    pub fn missing_value(&self) -> Option<f64> {
        self.missing_value
    }

    /// Value that masks a node (header value or configured default)
    pub fn sentinel(&self) -> Option<f64> {
        self.sentinel
    }

    /// `(M, N)`: nodes per row and number of rows
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x.cols(), self.x.rows())
    }

    /// X coordinates, N rows of M values
    pub fn x(&self) -> &Matrix {
        &self.x
    }

    /// Y coordinates, N rows of M values
    pub fn y(&self) -> &Matrix {
        &self.y
    }

    /// Whether the node at `(row, col)` is masked
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        row < self.x.rows()
            && col < self.x.cols()
            && self.is_masked_index(row * self.x.cols() + col)
    }

    fn is_masked_index(&self, index: usize) -> bool {
        let Some(sentinel) = self.sentinel else {
            return false;
        };
        self.x.as_slice().get(index) == Some(&sentinel)
            || self.y.as_slice().get(index) == Some(&sentinel)
    }

    fn convert(
        &mut self,
        projector: &dyn Projector,
        from: Epsg,
        to: Epsg,
        target: CoordinateSystem,
    ) -> std::result::Result<(), ProjectionError> {
        let (x, y) = self.projected(projector, from, to)?;
        debug!("Converted grid from {} to {}", from, to);
        self.x = x;
        self.y = y;
        self.coordinate_system = target;
        Ok(())
    }

    /// Projected copies of the coordinate matrices; masked nodes keep their value
    fn projected(
        &self,
        projector: &dyn Projector,
        from: Epsg,
        to: Epsg,
    ) -> std::result::Result<(Matrix, Matrix), ProjectionError> {
        let active: Vec<usize> = (0..self.x.as_slice().len())
            .filter(|&index| !self.is_masked_index(index))
            .collect();
        let mut xs: Vec<f64> = active.iter().map(|&i| self.x.as_slice()[i]).collect();
        let mut ys: Vec<f64> = active.iter().map(|&i| self.y.as_slice()[i]).collect();
        projector.transform(from, to, &mut xs, &mut ys)?;

        let mut x = self.x.clone();
        let mut y = self.y.clone();
        for ((&index, nx), ny) in active.iter().zip(xs).zip(ys) {
            x.as_mut_slice()[index] = nx;
            y.as_mut_slice()[index] = ny;
        }
        Ok((x, y))
    }
}

impl crate::Delft3dFormat for Grid {
    fn parse(text: &str) -> Result<Self> {
        Self::parse(text)
    }

    fn export(&self) -> Result<String> {
        Ok(self.export())
    }
}

/// Value after `name =` on a header line
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.trim_start()
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('=')
        .map(str::trim)
}

fn parse_dimensions(line: &str) -> Result<(usize, usize)> {
    let values: Vec<usize> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| header_error(format!("expected two integers, found '{line}'")))?;
    match values[..] {
        [m, n] if m > 0 && n > 0 => Ok((m, n)),
        _ => Err(header_error(format!("expected positive M N, found '{line}'"))),
    }
}

/// Read N `ETA=` rows of M values from the token stream
fn read_matrix(tokens: &mut &[&str], label: &str, m: usize, n: usize) -> Result<Matrix> {
    let mut data = Vec::with_capacity(m * n);

    for row in 1..=n {
        let section = format!("{label} row {row}");
        let Some((&marker, rest)) = tokens.split_first() else {
            return Err(FormatError::TokenCount {
                section: format!("{label} coordinates"),
                expected: n,
                actual: row - 1,
            });
        };
        let Some(glued) = marker.strip_prefix("ETA=") else {
            return Err(FormatError::MalformedHeader {
                section,
                reason: format!("expected 'ETA=' marker, found '{marker}'"),
            });
        };
        let (index, rest) = if glued.is_empty() {
            match rest.split_first() {
                Some((&index, rest)) => (index, rest),
                None => ("", rest),
            }
        } else {
            (glued, rest)
        };
        if index.parse::<usize>().ok() != Some(row) {
            return Err(FormatError::MalformedHeader {
                section,
                reason: format!("expected row index {row}, found '{index}'"),
            });
        }

        let count = rest
            .iter()
            .position(|token| token.starts_with("ETA="))
            .unwrap_or(rest.len());
        if count != m {
            return Err(FormatError::TokenCount {
                section,
                expected: m,
                actual: count,
            });
        }
        for token in &rest[..count] {
            let value = numfmt::parse_number(token).ok_or_else(|| FormatError::InvalidNumber {
                section: section.clone(),
                token: (*token).to_string(),
            })?;
            data.push(value);
        }
        *tokens = &rest[count..];
    }

    Matrix::new(n, m, data)
}

fn write_matrix(output: &mut String, matrix: &Matrix) {
    for (index, row) in matrix.iter_rows().enumerate() {
        let _ = write!(output, " ETA={:>5}", index + 1);
        for (count, value) in row.iter().enumerate() {
            if count > 0 && count % VALUES_PER_LINE == 0 {
                output.push_str(CONTINUATION_GUTTER);
            } else {
                output.push_str(VALUE_GUTTER);
            }
            output.push_str(&numfmt::exp_upper(*value, 17));
            if count % VALUES_PER_LINE == VALUES_PER_LINE - 1 || count + 1 == row.len() {
                output.push('\n');
            }
        }
    }
}

fn header_error(reason: String) -> FormatError {
    FormatError::MalformedHeader {
        section: "grid header".to_string(),
        reason,
    }
}
