// Single-value delta codec.
//
// One axis value is carried as a zig-zagged signed delta from the previous
// fixed-point value on the same axis, split into 5-bit chunks emitted
// least-significant first. Each chunk carries bit 0x20 when more chunks
// follow and is offset by 63 into the printable range '?'..='~'.

use thiserror::Error;

/// Scale between decimal degrees and the fixed-point integers on the wire.
pub const PRECISION_FACTOR: f64 = 1e5;

/// Offset added to every 6-bit chunk ('?').
pub const CHAR_OFFSET: u8 = 63;

/// Highest valid encoded byte ('~').
pub const MAX_CHAR: u8 = CHAR_OFFSET + 63;

/// Maximum encoded length for a 64-bit value (ceil(64/5) = 13).
pub const MAX_ENCODED_LEN: usize = 13;

const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: u8 = 0x1F;
const CONTINUATION_BIT: u8 = 0x20;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Input ended while the continuation bit was still set.
    #[error("value truncated (input ends inside a chunk run)")]
    Truncated,
    /// The chunk run carries more than 64 bits of payload.
    #[error("value overflows 64 bits")]
    Overflow,
    /// A byte outside '?'..='~'. Only reachable when validation was skipped.
    #[error("byte {byte:#04x} at offset {offset} is outside the polyline alphabet")]
    InvalidByte { offset: usize, byte: u8 },
}

impl ValueError {
    fn offset_by(self, base: usize) -> Self {
        match self {
            Self::InvalidByte { offset, byte } => Self::InvalidByte {
                offset: base + offset,
                byte,
            },
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed point and zig-zag
// ---------------------------------------------------------------------------

/// `round(value * 1e5)`, rounding half away from zero.
///
/// Products outside the `i64` range saturate; NaN maps to 0.
#[inline]
pub fn to_fixed(value: f64) -> i64 {
    (value * PRECISION_FACTOR).round() as i64
}

/// Inverse of [`to_fixed`] (exact for every value `to_fixed` produced).
#[inline]
pub fn from_fixed(value: i64) -> f64 {
    value as f64 / PRECISION_FACTOR
}

/// Map a signed delta onto the non-negative integers: non-negative deltas
/// become even, negative deltas odd.
#[inline]
pub fn zigzag_encode(delta: i64) -> u64 {
    let shifted = (delta as u64) << 1;
    if delta < 0 { !shifted } else { shifted }
}

#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    let half = (value >> 1) as i64;
    if value & 1 == 1 { !half } else { half }
}

#[inline]
pub fn is_valid_byte(byte: u8) -> bool {
    (CHAR_OFFSET..=MAX_CHAR).contains(&byte)
}

#[inline]
pub fn is_valid_char(c: char) -> bool {
    ('?'..='~').contains(&c)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `num` as a chunk run into the front of `buf`.
/// Returns the number of bytes written (1..=13).
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_ENCODED_LEN]) -> usize {
    let mut i = 0;
    loop {
        let mut chunk = num as u8 & CHUNK_MASK;
        num >>= CHUNK_BITS;
        if num != 0 {
            chunk |= CONTINUATION_BIT;
        }
        buf[i] = chunk + CHAR_OFFSET;
        i += 1;
        if num == 0 {
            return i;
        }
    }
}

/// Encode `num` and append it to `out`.
pub fn write_u64(out: &mut String, num: u64) {
    let mut buf = [0u8; MAX_ENCODED_LEN];
    let len = encode_u64(num, &mut buf);
    out.extend(buf[..len].iter().map(|&b| char::from(b)));
}

/// Zig-zag `delta` and append it to `out`.
pub fn write_delta(out: &mut String, delta: i64) {
    write_u64(out, zigzag_encode(delta));
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode one chunk run from the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), ValueError> {
    let mut val: u64 = 0;
    let mut shift: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if !is_valid_byte(byte) {
            return Err(ValueError::InvalidByte { offset: i, byte });
        }
        let raw = byte - CHAR_OFFSET;
        let chunk = u64::from(raw & CHUNK_MASK);
        if shift >= u64::BITS || (chunk << shift) >> shift != chunk {
            return Err(ValueError::Overflow);
        }
        val |= chunk << shift;
        shift += CHUNK_BITS;
        if raw & CONTINUATION_BIT == 0 {
            return Ok((val, i + 1));
        }
    }
    Err(ValueError::Truncated)
}

/// Decode one zig-zagged delta from the front of `data`.
pub fn read_delta(data: &[u8]) -> Result<(i64, usize), ValueError> {
    let (val, len) = read_u64(data)?;
    Ok((zigzag_decode(val), len))
}

/// Encoded length in characters of `num`.
#[inline]
pub fn encoded_len(num: u64) -> usize {
    let bits = u64::BITS - num.leading_zeros();
    bits.max(1).div_ceil(CHUNK_BITS) as usize
}

// ---------------------------------------------------------------------------
// Per-axis state
// ---------------------------------------------------------------------------

/// Encoder state for one axis: the last absolute fixed-point value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueEncoder {
    previous: i64,
}

impl ValueEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the delta from the previous value to `coordinate` and remember
    /// `coordinate` as the new reference.
    pub fn encode(&mut self, coordinate: f64, out: &mut String) {
        let value = to_fixed(coordinate);
        let delta = value.wrapping_sub(self.previous);
        self.previous = value;
        write_delta(out, delta);
    }

    pub fn previous(&self) -> i64 {
        self.previous
    }
}

/// Decoder state for one axis: the running fixed-point total.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDecoder {
    total: i64,
}

impl ValueDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the chunk run at `*cursor`, add it to the running total and
    /// advance the cursor past it.
    ///
    /// Returns `Ok(None)` when the cursor is already at the end of `data`.
    pub fn next_value(
        &mut self,
        data: &[u8],
        cursor: &mut usize,
    ) -> Result<Option<f64>, ValueError> {
        if *cursor >= data.len() {
            return Ok(None);
        }
        let (delta, len) = read_delta(&data[*cursor..]).map_err(|e| e.offset_by(*cursor))?;
        *cursor += len;
        self.total = self.total.wrapping_add(delta);
        Ok(Some(from_fixed(self.total)))
    }

    pub fn total(&self) -> i64 {
        self.total
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_str(num: u64) -> String {
        let mut s = String::new();
        write_u64(&mut s, num);
        s
    }

    #[test]
    fn roundtrip_u64() {
        let cases: &[u64] = &[
            0,
            1,
            31,
            32,
            1023,
            1024,
            200_000,
            u32::MAX as u64,
            u64::MAX - 1,
            u64::MAX,
        ];
        let mut buf = [0u8; MAX_ENCODED_LEN];
        for &val in cases {
            let len = encode_u64(val, &mut buf);
            let (decoded, consumed) = read_u64(&buf[..len]).unwrap();
            assert_eq!(decoded, val, "roundtrip failed for {val}");
            assert_eq!(consumed, len, "length mismatch for {val}");
            assert_eq!(encoded_len(val), len, "encoded_len mismatch for {val}");
        }
    }

    #[test]
    fn chunks_are_little_endian() {
        // 200000 = chunks 0, 10, 3, 6 (low to high)
        assert_eq!(encode_str(200_000), "_ibE");
    }

    #[test]
    fn single_chunk_values() {
        for val in 0..32u64 {
            let s = encode_str(val);
            assert_eq!(s.len(), 1);
            assert_eq!(s.as_bytes()[0], val as u8 + CHAR_OFFSET);
        }
    }

    #[test]
    fn max_value_uses_thirteen_chunks() {
        let s = encode_str(u64::MAX);
        assert_eq!(s, format!("{}N", "~".repeat(12)));
        assert_eq!(read_u64(s.as_bytes()), Ok((u64::MAX, 13)));
    }

    #[test]
    fn zigzag_mapping() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(-100_000), 199_999);
        for d in [0, 1, -1, 17, -17, i64::MAX, i64::MIN, i64::MIN + 1] {
            assert_eq!(zigzag_decode(zigzag_encode(d)), d, "zigzag {d}");
        }
    }

    #[test]
    fn fixed_point_rounds_half_away_from_zero() {
        assert_eq!(to_fixed(38.5), 3_850_000);
        assert_eq!(to_fixed(-120.95), -12_095_000);
        assert_eq!(to_fixed(0.000005), 1);
        assert_eq!(to_fixed(-0.000005), -1);
        assert_eq!(to_fixed(0.0000049), 0);
        assert_eq!(to_fixed(0.000025), 3);
        assert_eq!(to_fixed(-0.000025), -3);
        assert_eq!(from_fixed(4_325_200), 43.252);
    }

    #[test]
    fn negative_delta_decodes_negative() {
        let mut out = String::new();
        write_delta(&mut out, -75_000);
        let (delta, len) = read_delta(out.as_bytes()).unwrap();
        assert_eq!(delta, -75_000);
        assert_eq!(len, out.len());
    }

    #[test]
    fn overflow_detection() {
        let too_long = "~".repeat(14);
        assert_eq!(read_u64(too_long.as_bytes()), Err(ValueError::Overflow));

        // 13th chunk may only carry 4 bits.
        let wide = format!("{}O", "~".repeat(12));
        assert_eq!(read_u64(wide.as_bytes()), Err(ValueError::Overflow));
    }

    #[test]
    fn truncated_detection() {
        assert_eq!(read_u64(b"~~"), Err(ValueError::Truncated));
        assert_eq!(read_u64(b""), Err(ValueError::Truncated));
    }

    #[test]
    fn invalid_byte_detection() {
        assert_eq!(
            read_u64(b"_ i"),
            Err(ValueError::InvalidByte {
                offset: 1,
                byte: b' '
            })
        );
        assert_eq!(
            read_u64(&[0xFF]),
            Err(ValueError::InvalidByte {
                offset: 0,
                byte: 0xFF
            })
        );
    }

    #[test]
    fn encoder_tracks_previous_value() {
        let mut enc = ValueEncoder::new();
        let mut out = String::new();
        enc.encode(38.5, &mut out);
        assert_eq!(out, "_p~iF");
        assert_eq!(enc.previous(), 3_850_000);
        out.clear();
        enc.encode(40.7, &mut out);
        assert_eq!(out, "_ulL");
    }

    #[test]
    fn decoder_accumulates_and_advances() {
        let data = b"_p~iF_ulL";
        let mut dec = ValueDecoder::new();
        let mut cursor = 0;
        assert_eq!(dec.next_value(data, &mut cursor), Ok(Some(38.5)));
        assert_eq!(cursor, 5);
        assert_eq!(dec.next_value(data, &mut cursor), Ok(Some(40.7)));
        assert_eq!(cursor, data.len());
        assert_eq!(dec.total(), 4_070_000);
        assert_eq!(dec.next_value(data, &mut cursor), Ok(None));
    }

    #[test]
    fn decoder_reports_absolute_offsets() {
        let data = b"??_\x01";
        let mut dec = ValueDecoder::new();
        let mut cursor = 2;
        assert_eq!(
            dec.next_value(data, &mut cursor),
            Err(ValueError::InvalidByte {
                offset: 3,
                byte: 0x01
            })
        );
    }
}
