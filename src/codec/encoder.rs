// Polyline encoder: point composition and the sequence fold.
//
// Latitude and longitude keep independent delta state. Each point emits
// the latitude chunk run first, then the longitude run; state carries over
// from point to point for the whole sequence.

use super::value::ValueEncoder;
use crate::coordinate::Coordinate;

/// Upper bound on the up-front reservation; longer inputs grow on demand.
const MAX_PRESIZE_POINTS: usize = 1 << 20;

// ---------------------------------------------------------------------------
// Point encoder
// ---------------------------------------------------------------------------

/// Two per-axis delta encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointEncoder {
    latitude: ValueEncoder,
    longitude: ValueEncoder,
}

impl PointEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `coordinate` (latitude, then longitude) to `out`.
    pub fn encode(&mut self, coordinate: Coordinate, out: &mut String) {
        self.latitude.encode(coordinate.latitude, out);
        self.longitude.encode(coordinate.longitude, out);
    }
}

// ---------------------------------------------------------------------------
// Streaming encoder
// ---------------------------------------------------------------------------

/// Incremental polyline encoder.
///
/// # Example
/// ```
/// use gpolyline::codec::PolylineEncoder;
/// let mut enc = PolylineEncoder::new();
/// enc.push((38.5, -120.2));
/// enc.push((40.7, -120.95));
/// enc.push((43.252, -126.453));
/// assert_eq!(enc.finish(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolylineEncoder {
    points: PointEncoder,
    output: String,
    count: usize,
}

impl PolylineEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for roughly `points` more coordinates.
    pub fn with_capacity(points: usize) -> Self {
        // Typical route deltas need 4-6 chars per point.
        Self {
            output: String::with_capacity(points.min(MAX_PRESIZE_POINTS).saturating_mul(6)),
            ..Self::default()
        }
    }

    pub fn push<C: Into<Coordinate>>(&mut self, coordinate: C) {
        self.points.encode(coordinate.into(), &mut self.output);
        self.count += 1;
    }

    /// Number of points encoded so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Encoded output so far.
    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> String {
        log::trace!(
            "encoded {} points into {} chars",
            self.count,
            self.output.len()
        );
        self.output
    }
}

impl<C: Into<Coordinate>> Extend<C> for PolylineEncoder {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        for c in iter {
            self.push(c);
        }
    }
}

// ---------------------------------------------------------------------------
// Sequence encode
// ---------------------------------------------------------------------------

/// Encode an ordered sequence of coordinates. Never fails; an empty
/// sequence yields an empty string.
pub fn encode<I>(coordinates: I) -> String
where
    I: IntoIterator,
    I::Item: Into<Coordinate>,
{
    let iter = coordinates.into_iter();
    let mut enc = PolylineEncoder::with_capacity(iter.size_hint().0);
    enc.extend(iter);
    enc.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
