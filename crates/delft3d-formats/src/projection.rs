//! Coordinate reference systems and the projection seam
//!
//! Grid files store coordinates either in a spherical (longitude/latitude)
//! or a cartesian (projected, metres) system. Conversions go through the
//! [`Projector`] trait so callers can plug in a full geodesy library. The
//! built-in [`WebMercator`] covers the default pair, WGS 84 (EPSG:4326) and
//! Web Mercator (EPSG:3857), in closed form.
//!
//! All coordinates are passed as `(x, y)`: longitude/easting first,
//! latitude/northing second.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// EPSG code identifying a coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epsg(pub u32);

impl Epsg {
    /// WGS 84 geographic coordinates
    pub const WGS84: Self = Self(4326);
    /// WGS 84 / Pseudo-Mercator
    pub const WEB_MERCATOR: Self = Self(3857);

    /// Numeric EPSG code
    pub const fn code(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Epsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// The spherical and cartesian systems a grid moves between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPair {
    /// System used when the grid is tagged `Spherical`
    pub spherical: Epsg,
    /// System used when the grid is tagged `Cartesian`
    pub cartesian: Epsg,
}

impl Default for ProjectionPair {
    fn default() -> Self {
        Self {
            spherical: Epsg::WGS84,
            cartesian: Epsg::WEB_MERCATOR,
        }
    }
}

impl ProjectionPair {
    /// Create a pair from explicit EPSG codes
    pub const fn new(spherical: Epsg, cartesian: Epsg) -> Self {
        Self {
            spherical,
            cartesian,
        }
    }
}

/// Coordinate transformation service
pub trait Projector {
    /// Transform coordinates in place from `from` to `to`.
    ///
    /// Implementations must either transform every coordinate or leave both
    /// slices untouched and return an error.
    fn transform(
        &self,
        from: Epsg,
        to: Epsg,
        xs: &mut [f64],
        ys: &mut [f64],
    ) -> Result<(), ProjectionError>;
}

/// Spherical Mercator projection between EPSG:4326 and EPSG:3857
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// WGS84 semi-major axis in metres
    const RADIUS: f64 = 6_378_137.0;
    /// Latitude where the projection is cut off (square world map)
    const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    fn forward(lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > Self::MAX_LATITUDE {
            return Err(ProjectionError::OutOfDomain {
                x: lon,
                y: lat,
                epsg: Epsg::WGS84,
            });
        }
        let x = Self::RADIUS * lon.to_radians();
        let y = Self::RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    fn inverse(x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::OutOfDomain {
                x,
                y,
                epsg: Epsg::WEB_MERCATOR,
            });
        }
        let lon = (x / Self::RADIUS).to_degrees();
        let lat = (2.0 * (y / Self::RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
        Ok((lon, lat))
    }
}

impl Projector for WebMercator {
    fn transform(
        &self,
        from: Epsg,
        to: Epsg,
        xs: &mut [f64],
        ys: &mut [f64],
    ) -> Result<(), ProjectionError> {
        if xs.len() != ys.len() {
            return Err(ProjectionError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }

        let convert: fn(f64, f64) -> Result<(f64, f64), ProjectionError> = match (from, to) {
            (a, b) if a == b => return Ok(()),
            (Epsg::WGS84, Epsg::WEB_MERCATOR) => Self::forward,
            (Epsg::WEB_MERCATOR, Epsg::WGS84) => Self::inverse,
            _ => return Err(ProjectionError::Unsupported { from, to }),
        };

        // Compute everything first so a failure leaves the inputs untouched
        let converted = xs
            .iter()
            .zip(ys.iter())
            .map(|(&x, &y)| convert(x, y))
            .collect::<Result<Vec<_>, _>>()?;

        for ((x, y), (nx, ny)) in xs.iter_mut().zip(ys.iter_mut()).zip(converted) {
            *x = nx;
            *y = ny;
        }
        Ok(())
    }
}
