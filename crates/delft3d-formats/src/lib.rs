//! Format-preserving codecs for Delft3D model input files
//!
#![allow(clippy::cast_possible_truncation)] // printf %d truncates floats
#![allow(clippy::cast_precision_loss)] // Millisecond counts to minutes
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Delft3D field names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::float_cmp)] // Sentinel comparison is exact
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! This crate reads, edits and writes the text files that make up a Delft3D
//! hydrodynamic model so that an unmodified file is written back byte for
//! byte.
//!
//! # Supported Formats
//!
//! - **Grid** (`.grd`): curvilinear grid coordinates with masking
//! - **Depth** (`.dep`): bathymetry aligned with the grid nodes
//! - **Parameters** (`.mdf`): ordered `Name = value` model settings
//! - **Time series** (`.bct`, `.bcc`, `.dis`): boundary and discharge tables
//!
//! # Design Principles
//!
//! Every format implementation follows these principles:
//! - **Symmetric Operations**: Both parsing and exporting supported
//! - **Layout Preservation**: Padding, widths and number notation survive
//! - **Validated Mutation**: A failed edit leaves the document untouched
//! - **Round-Trip Guarantee**: export(parse(text)) == text

#![warn(missing_docs)]

use std::path::Path;

pub mod config;
pub mod dep;
pub mod error;
pub mod grd;
pub mod matrix;
pub mod mdf;
pub mod numfmt;
pub mod projection;
pub mod timeseries;
pub mod value;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use config::{DepthOptions, GridOptions};
pub use dep::DepthGrid;
pub use error::{Error, FormatError, ProjectionError};
pub use grd::{CoordinateSystem, Grid};
pub use matrix::Matrix;
pub use mdf::{ParameterInput, ParameterStore, ParameterValue};
pub use projection::{Epsg, ProjectionPair, Projector, WebMercator};
pub use timeseries::{HeaderEdit, ParameterTarget, TimeSeriesBlock, TimeSeriesDocument};
pub use value::{FieldValue, FormatValue, Notation, Width};

/// Common interface of the self-contained file formats
///
/// Depth files depend on their grid and are not covered; see
/// [`DepthGrid`].
pub trait Delft3dFormat: Sized {
    /// Parse from file content
    fn parse(text: &str) -> error::Result<Self>;

    /// Render to file content
    fn export(&self) -> error::Result<String>;

    /// Read and parse a file
    fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Export and write a file
    fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(path, self.export()?)?;
        Ok(())
    }

    /// Verify round-trip correctness
    fn verify_round_trip(text: &str) -> error::Result<()> {
        let exported = Self::parse(text)?.export()?;
        if let Some(line) = first_difference(text, &exported) {
            return Err(FormatError::RoundTripMismatch { line });
        }
        Ok(())
    }
}

/// 1-based number of the first line where two texts differ
pub(crate) fn first_difference(left: &str, right: &str) -> Option<usize> {
    if left == right {
        return None;
    }
    let mut a = left.split_inclusive('\n');
    let mut b = right.split_inclusive('\n');
    let mut line = 1;
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x == y => line += 1,
            _ => return Some(line),
        }
    }
}
