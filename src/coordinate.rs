// Geographic coordinate pair in decimal degrees.
//
// The codec enforces no bounds: values outside +/-90 / +/-180 encode and
// decode like any other float.

use std::fmt;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True if both components are within `tolerance` of `other`'s.
    pub fn approx_eq(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() <= tolerance
            && (self.longitude - other.longitude).abs() <= tolerance
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.latitude, c.longitude)
    }
}

impl From<&(f64, f64)> for Coordinate {
    fn from(&(latitude, longitude): &(f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<&Coordinate> for Coordinate {
    fn from(c: &Coordinate) -> Self {
        *c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_conversions() {
        let c: Coordinate = (38.5, -120.2).into();
        assert_eq!(c, Coordinate::new(38.5, -120.2));
        let t: (f64, f64) = c.into();
        assert_eq!(t, (38.5, -120.2));
    }

    #[test]
    fn approx_eq_uses_both_axes() {
        let a = Coordinate::new(1.0, 2.0);
        assert!(a.approx_eq(&Coordinate::new(1.000001, 1.999999), 1e-5));
        assert!(!a.approx_eq(&Coordinate::new(1.0, 2.1), 1e-5));
        assert!(!a.approx_eq(&Coordinate::new(1.1, 2.0), 1e-5));
    }

    #[test]
    fn display_format() {
        assert_eq!(Coordinate::new(1.5, -2.25).to_string(), "(1.5, -2.25)");
    }
}
