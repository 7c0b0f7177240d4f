//! gpolyline: Google Encoded Polyline Algorithm Format codec in Rust.
//!
//! The crate provides:
//! - The polyline codec (`codec`): value, point and sequence encoding,
//!   validation and lazy decoding
//! - Geometry adapter traits (`geometry`)
//! - Stream/file helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! Coordinates are `(latitude, longitude)` pairs in decimal degrees, carried
//! at the format's fixed precision of five decimal places.
//!
//! # Quick Start
//!
//! ```
//! use gpolyline::{Coordinate, decode, encode};
//!
//! let route = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
//! let encoded = encode(route);
//! assert_eq!(encoded, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//!
//! let decoded = decode(&encoded).unwrap();
//! assert_eq!(decoded[0], Coordinate::new(38.5, -120.2));
//! ```

pub mod codec;
pub mod coordinate;
pub mod error;
pub mod geometry;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::{EncodedPolyline, PolylineEncoder, decode, encode, validate};
pub use coordinate::Coordinate;
pub use error::PolylineError;
pub use geometry::{FromCoordinates, LineString, PointSequence, decode_geometry, encode_geometry};
