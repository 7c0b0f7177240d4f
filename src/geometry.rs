// Geometry adapters.
//
// The codec only sees `Coordinate`s. Native point/line types plug in
// through two small capability traits: `PointSequence` (read side, for
// encoding) and `FromCoordinates` (build side, for decoding).

use crate::codec::{self, PolylineEncoder};
use crate::coordinate::Coordinate;
use crate::error::PolylineError;

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// An indexable run of points with a known length.
pub trait PointSequence {
    fn point_count(&self) -> usize;

    /// The `index`-th point. Called once per point, in order, by
    /// [`encode_geometry`]; `index < point_count()`.
    fn coordinate_at(&self, index: usize) -> Coordinate;
}

/// A geometry that can be built from decoded coordinates.
pub trait FromCoordinates: Sized {
    fn from_coordinates(coordinates: Vec<Coordinate>) -> Self;
}

impl PointSequence for [Coordinate] {
    fn point_count(&self) -> usize {
        self.len()
    }

    fn coordinate_at(&self, index: usize) -> Coordinate {
        self[index]
    }
}

impl PointSequence for Vec<Coordinate> {
    fn point_count(&self) -> usize {
        self.len()
    }

    fn coordinate_at(&self, index: usize) -> Coordinate {
        self[index]
    }
}

/// `(latitude, longitude)` tuples.
impl PointSequence for [(f64, f64)] {
    fn point_count(&self) -> usize {
        self.len()
    }

    fn coordinate_at(&self, index: usize) -> Coordinate {
        self[index].into()
    }
}

impl PointSequence for Vec<(f64, f64)> {
    fn point_count(&self) -> usize {
        self.len()
    }

    fn coordinate_at(&self, index: usize) -> Coordinate {
        self[index].into()
    }
}

impl FromCoordinates for Vec<Coordinate> {
    fn from_coordinates(coordinates: Vec<Coordinate>) -> Self {
        coordinates
    }
}

impl FromCoordinates for Vec<(f64, f64)> {
    fn from_coordinates(coordinates: Vec<Coordinate>) -> Self {
        coordinates.into_iter().map(Into::into).collect()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Encode every point of `geometry`.
pub fn encode_geometry<G: PointSequence + ?Sized>(geometry: &G) -> String {
    let count = geometry.point_count();
    let mut enc = PolylineEncoder::with_capacity(count);
    for i in 0..count {
        enc.push(geometry.coordinate_at(i));
    }
    enc.finish()
}

/// Decode `polyline` straight into a native geometry.
pub fn decode_geometry<G: FromCoordinates>(polyline: &str) -> Result<G, PolylineError> {
    codec::decode(polyline).map(G::from_coordinates)
}

// ---------------------------------------------------------------------------
// LineString
// ---------------------------------------------------------------------------

/// An owned route geometry: an ordered list of decoded coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    points: Vec<Coordinate>,
}

impl LineString {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_polyline(&self) -> String {
        encode_geometry(self)
    }

    pub fn from_polyline(polyline: &str) -> Result<Self, PolylineError> {
        decode_geometry(polyline)
    }
}

impl<C: Into<Coordinate>> FromIterator<C> for LineString {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl PointSequence for LineString {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn coordinate_at(&self, index: usize) -> Coordinate {
        self.points[index]
    }
}

impl FromCoordinates for LineString {
    fn from_coordinates(coordinates: Vec<Coordinate>) -> Self {
        Self::new(coordinates)
    }
}
