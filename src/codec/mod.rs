// Encoded Polyline Algorithm Format codec.
//
// # Modules
//
// - `value`  : Single-value delta codec (fixed point, zig-zag, 5-bit chunks)
// - `encoder`: Point composition and sequence encoding
// - `decoder`: Validation, point decoding step and lazy iteration

pub mod decoder;
pub mod encoder;
pub mod value;

// Re-export key types for convenience.
pub use decoder::{Coordinates, EncodedPolyline, PointDecoder, decode, decode_unchecked, validate};
pub use encoder::{PointEncoder, PolylineEncoder, encode};
pub use value::{PRECISION_FACTOR, ValueDecoder, ValueEncoder, ValueError};
