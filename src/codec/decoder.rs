// Polyline decoder: validation pass plus lazy point iteration.
//
// Decoding is two-phase. `EncodedPolyline::new` scans the whole input once,
// rejecting characters outside '?'..='~', chunk runs wider than 64 bits and
// inputs that stop mid-coordinate. Iteration then walks the validated bytes
// one point at a time. Each iterator owns its own cursor and running totals,
// so a validated polyline can be iterated any number of times.

use std::iter::FusedIterator;

use super::value::{self, ValueDecoder, ValueError};
use crate::coordinate::Coordinate;
use crate::error::PolylineError;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `polyline` without producing coordinates.
pub fn validate(polyline: &str) -> Result<(), PolylineError> {
    scan(polyline).map(|_| ())
}

/// Validate and count the coordinates in `polyline`.
fn scan(polyline: &str) -> Result<usize, PolylineError> {
    check_alphabet(polyline)?;

    // Alphabet is ASCII from here on: byte offsets are character offsets.
    let data = polyline.as_bytes();
    let mut cursor = 0usize;
    let mut values = 0usize;
    while cursor < data.len() {
        let (_, len) =
            value::read_u64(&data[cursor..]).map_err(|e| value_error(polyline, cursor, e))?;
        cursor += len;
        values += 1;
    }

    if values % 2 == 1 {
        log::debug!("rejecting polyline: odd value count {values}");
        return Err(PolylineError::TruncatedInput {
            polyline: polyline.to_owned(),
            position: data.len(),
        });
    }
    Ok(values / 2)
}

fn check_alphabet(polyline: &str) -> Result<(), PolylineError> {
    let bad = polyline
        .chars()
        .enumerate()
        .find(|&(_, c)| !value::is_valid_char(c));
    match bad {
        Some((position, character)) => {
            log::debug!("rejecting polyline: {character:?} at position {position}");
            Err(PolylineError::InvalidCharacter {
                polyline: polyline.to_owned(),
                position,
                character,
            })
        }
        None => Ok(()),
    }
}

/// Character offset of byte offset `byte_offset`.
fn char_offset(polyline: &str, byte_offset: usize) -> usize {
    polyline
        .get(..byte_offset)
        .map_or(byte_offset, |prefix| prefix.chars().count())
}

/// Map a value-codec error for the chunk run starting at byte `start`.
fn value_error(polyline: &str, start: usize, err: ValueError) -> PolylineError {
    match err {
        ValueError::Truncated => PolylineError::TruncatedInput {
            polyline: polyline.to_owned(),
            position: char_offset(polyline, polyline.len()),
        },
        ValueError::Overflow => PolylineError::ValueOverflow {
            polyline: polyline.to_owned(),
            position: char_offset(polyline, start),
        },
        ValueError::InvalidByte { offset, .. } => PolylineError::InvalidCharacter {
            polyline: polyline.to_owned(),
            position: char_offset(polyline, offset),
            character: polyline
                .get(offset..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        },
    }
}

// ---------------------------------------------------------------------------
// Point decoding step
// ---------------------------------------------------------------------------

/// Decode state for one pass over a polyline: per-axis running totals and
/// the shared cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointDecoder {
    latitude: ValueDecoder,
    longitude: ValueDecoder,
    cursor: usize,
}

impl PointDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset of the next unread chunk.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Decode the next point of `polyline`.
    ///
    /// Returns `Ok(None)` at end of input. A latitude without a matching
    /// longitude is `TruncatedInput`.
    pub fn next_point(&mut self, polyline: &str) -> Result<Option<Coordinate>, PolylineError> {
        let data = polyline.as_bytes();

        let start = self.cursor;
        let latitude = match self.latitude.next_value(data, &mut self.cursor) {
            Ok(Some(v)) => v,
            Ok(None) => return Ok(None),
            Err(e) => return Err(value_error(polyline, start, e)),
        };

        let start = self.cursor;
        let longitude = match self.longitude.next_value(data, &mut self.cursor) {
            Ok(Some(v)) => v,
            Ok(None) => {
                return Err(PolylineError::TruncatedInput {
                    polyline: polyline.to_owned(),
                    position: char_offset(polyline, start),
                });
            }
            Err(e) => return Err(value_error(polyline, start, e)),
        };

        Ok(Some(Coordinate::new(latitude, longitude)))
    }
}

// ---------------------------------------------------------------------------
// Iterator
// ---------------------------------------------------------------------------

/// Single-pass, forward-only iterator over the points of a polyline.
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct Coordinates<'a> {
    polyline: &'a str,
    state: PointDecoder,
    done: bool,
}

impl<'a> Coordinates<'a> {
    fn new(polyline: &'a str) -> Self {
        Self {
            polyline,
            state: PointDecoder::new(),
            done: false,
        }
    }
}

impl Iterator for Coordinates<'_> {
    type Item = Result<Coordinate, PolylineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.state.next_point(self.polyline) {
            Ok(Some(c)) => {
                log::trace!("decoded point {c} (cursor {})", self.state.cursor());
                Some(Ok(c))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // Every point takes at least two characters; a trailing error adds one item.
        let remaining = self.polyline.len().saturating_sub(self.state.cursor());
        (0, Some(remaining.div_ceil(2)))
    }
}

impl FusedIterator for Coordinates<'_> {}

/// Iterate `polyline` without the validation pass. Invalid characters are
/// reported when the iterator reaches them.
pub fn decode_unchecked(polyline: &str) -> Coordinates<'_> {
    Coordinates::new(polyline)
}

// ---------------------------------------------------------------------------
// Validated polyline
// ---------------------------------------------------------------------------

/// A polyline string that passed validation.
///
/// Every iterator from [`EncodedPolyline::iter`] starts from the beginning
/// and yields only `Ok` items.
///
/// # Example
/// ```
/// use gpolyline::codec::EncodedPolyline;
/// let line = EncodedPolyline::new("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
/// assert_eq!(line.len(), 3);
/// let first = line.iter().next().unwrap().unwrap();
/// assert_eq!((first.latitude, first.longitude), (38.5, -120.2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedPolyline<'a> {
    polyline: &'a str,
    len: usize,
}

impl<'a> EncodedPolyline<'a> {
    pub fn new(polyline: &'a str) -> Result<Self, PolylineError> {
        let len = scan(polyline)?;
        Ok(Self { polyline, len })
    }

    pub fn as_str(&self) -> &'a str {
        self.polyline
    }

    /// Number of coordinates.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> Coordinates<'a> {
        Coordinates::new(self.polyline)
    }

    /// Decode every coordinate.
    pub fn to_vec(&self) -> Result<Vec<Coordinate>, PolylineError> {
        let mut out = Vec::with_capacity(self.len);
        for c in self.iter() {
            out.push(c?);
        }
        Ok(out)
    }
}

impl<'a> IntoIterator for &EncodedPolyline<'a> {
    type Item = Result<Coordinate, PolylineError>;
    type IntoIter = Coordinates<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Validate and decode `polyline` into coordinates.
pub fn decode(polyline: &str) -> Result<Vec<Coordinate>, PolylineError> {
    EncodedPolyline::new(polyline)?.to_vec()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
