//! Codec options
//!
//! Values that Delft3D tooling hard-codes, such as the masking sentinel used
//! when a grid has no `Missing Value` header and the border value of depth
//! files, are explicit option structs here. The EPSG pair for conversions
//! and nearest-cell queries is a
//! [`ProjectionPair`](crate::projection::ProjectionPair) passed to each call.

use serde::{Deserialize, Serialize};

/// Value written around the interior of a depth file
pub const DEFAULT_DEPTH_BORDER: f64 = -999.0;

/// Grid parsing options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Masking sentinel for grids whose header has no `Missing Value`
    /// (`None` disables masking for such grids)
    pub default_missing_value: Option<f64>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            default_missing_value: Some(0.0),
        }
    }
}

impl GridOptions {
    /// Create grid options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sentinel used when the header declares none
    pub fn with_default_missing_value(mut self, value: Option<f64>) -> Self {
        self.default_missing_value = value;
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.default_missing_value.is_some_and(f64::is_nan) {
            return Err("default_missing_value must not be NaN".to_string());
        }
        Ok(())
    }
}

/// Depth file options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthOptions {
    /// Value of the trailing row and column appended on export
    pub border_value: f64,
}

impl Default for DepthOptions {
    fn default() -> Self {
        Self {
            border_value: DEFAULT_DEPTH_BORDER,
        }
    }
}

impl DepthOptions {
    /// Create depth options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the border value
    pub fn with_border_value(mut self, value: f64) -> Self {
        self.border_value = value;
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if !self.border_value.is_finite() {
            return Err("border_value must be finite".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_defaults() {
        let options = GridOptions::default();
        assert_eq!(options.default_missing_value, Some(0.0));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_grid_builder_and_validation() {
        let options = GridOptions::new().with_default_missing_value(None);
        assert_eq!(options.default_missing_value, None);
        assert!(options.validate().is_ok());

        let options = GridOptions::new().with_default_missing_value(Some(f64::NAN));
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_depth_options() {
        assert_eq!(DepthOptions::default().border_value, -999.0);
        let options = DepthOptions::new().with_border_value(f64::NAN);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: GridOptions =
            serde_json::from_str("{}").expect("Test operation should succeed");
        assert_eq!(options.default_missing_value, Some(0.0));

        let options: GridOptions = serde_json::from_str(r#"{"default_missing_value": null}"#)
            .expect("Test operation should succeed");
        assert_eq!(options.default_missing_value, None);

        let json = serde_json::to_string(&GridOptions::default())
            .expect("Test operation should succeed");
        assert_eq!(json, r#"{"default_missing_value":0.0}"#);

        let json = serde_json::to_string(&DepthOptions::default())
            .expect("Test operation should succeed");
        assert_eq!(json, r#"{"border_value":-999.0}"#);
    }
}
