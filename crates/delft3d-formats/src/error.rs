//! Error types shared by all Delft3D format codecs

use thiserror::Error;

use crate::projection::Epsg;

/// Errors raised while parsing, mutating or exporting a Delft3D file
///
/// Codecs never recover from these silently. Mutators validate their input
/// before touching the document, so a returned error means the document is
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// A header line is missing, out of place or unreadable
    #[error("malformed {section}: {reason}")]
    MalformedHeader {
        /// Section of the file that failed
        section: String,
        /// What was wrong with it
        reason: String,
    },

    /// A mandatory header field is absent
    #[error("{section} is missing mandatory field '{field}'")]
    MissingField {
        /// Section (block) that lacks the field
        section: String,
        /// Name of the missing field
        field: String,
    },

    /// A section holds a different number of tokens than declared
    #[error("{section}: expected {expected} tokens, found {actual}")]
    TokenCount {
        /// Section that failed
        section: String,
        /// Number of tokens required
        expected: usize,
        /// Number of tokens found
        actual: usize,
    },

    /// Shapes of companion data do not agree
    #[error("dimension mismatch in {section}: expected {expected}, found {actual}")]
    DimensionMismatch {
        /// Section that failed
        section: String,
        /// Expected shape, rendered
        expected: String,
        /// Actual shape, rendered
        actual: String,
    },

    /// A token that must be numeric is not
    #[error("invalid number '{token}' in {section}")]
    InvalidNumber {
        /// Section holding the token
        section: String,
        /// Offending token
        token: String,
    },

    /// Stored content cannot be rendered back to the file format
    #[error("cannot encode '{key}': {reason}")]
    Unclassifiable {
        /// Key of the entry
        key: String,
        /// Why it cannot be encoded
        reason: String,
    },

    /// Exported text differs from the text that was parsed
    #[error("round trip differs at line {line}")]
    RoundTripMismatch {
        /// 1-based number of the first differing line
        line: usize,
    },

    /// Parameter name not present in the document
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter name already present in the document
    #[error("parameter '{0}' already exists")]
    DuplicateParameter(String),

    /// Header field (or parameter label) not present in the block
    #[error("unknown header field '{0}'")]
    UnknownHeaderField(String),

    /// Value has no unit clause to update
    #[error("field '{0}' has no unit")]
    MissingUnit(String),

    /// Two series passed to a table replacement do not share an index
    #[error("misaligned time series: {0}")]
    MisalignedSeries(String),

    /// Block index outside the document
    #[error("block index {index} out of range (document has {count} blocks)")]
    BlockOutOfRange {
        /// Requested index
        index: usize,
        /// Number of blocks
        count: usize,
    },
}

/// Errors raised by coordinate projections
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The projector does not know how to go between these systems
    #[error("unsupported projection from {from} to {to}")]
    Unsupported {
        /// Source reference system
        from: Epsg,
        /// Target reference system
        to: Epsg,
    },

    /// A coordinate lies outside the domain of the projection
    #[error("coordinate ({x}, {y}) outside the domain of {epsg}")]
    OutOfDomain {
        /// Easting or longitude
        x: f64,
        /// Northing or latitude
        y: f64,
        /// Reference system the coordinate was given in
        epsg: Epsg,
    },

    /// Coordinate arrays of different lengths
    #[error("coordinate arrays differ in length: {xs} x values, {ys} y values")]
    LengthMismatch {
        /// Number of x values
        xs: usize,
        /// Number of y values
        ys: usize,
    },
}

/// Crate-level error separating I/O failures from format failures
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content is malformed
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A coordinate conversion failed
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),
}

/// Result alias for codec operations
pub type Result<T> = std::result::Result<T, FormatError>;
