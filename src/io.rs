// Stream and file helpers around the codec.
//
// Coordinate text is one point per line, `lat,lng` (comma and/or
// whitespace separated). Blank lines and `#` comments are skipped.
// Encoded polyline text is trimmed of surrounding whitespace.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::codec::{EncodedPolyline, PolylineEncoder};
use crate::coordinate::Coordinate;
use crate::error::PolylineError;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by the encode helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    /// Number of coordinates read.
    pub points: usize,
    /// Length of the encoded polyline in characters.
    pub encoded_len: usize,
}

/// Statistics returned by the decode helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// Length of the encoded input (after trimming).
    pub encoded_len: usize,
    /// Number of coordinates written.
    pub points: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for stream and file operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A coordinate line could not be parsed (1-based line number).
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("decode error: {0}")]
    Decode(#[from] PolylineError),
}

const BUF_SIZE: usize = 64 * 1024;

/// Decimal places used when writing coordinates; matches the wire precision.
const WRITE_DECIMALS: usize = 5;

// ---------------------------------------------------------------------------
// Coordinate text
// ---------------------------------------------------------------------------

/// Parse one `lat,lng` line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_coordinate_line(line: &str) -> Result<Option<Coordinate>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty());
    let (Some(lat), Some(lng), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(format!("expected 'lat,lng', got '{line}'"));
    };
    let latitude: f64 = lat
        .parse()
        .map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let longitude: f64 = lng
        .parse()
        .map_err(|e| format!("invalid longitude '{lng}': {e}"))?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(format!("non-finite coordinate '{line}'"));
    }
    Ok(Some(Coordinate::new(latitude, longitude)))
}

/// Read every coordinate from `reader`.
pub fn read_coordinates<R: BufRead>(reader: R) -> Result<Vec<Coordinate>, IoError> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_coordinate_line(&line) {
            Ok(Some(c)) => out.push(c),
            Ok(None) => {}
            Err(message) => return Err(IoError::Parse { line: i + 1, message }),
        }
    }
    Ok(out)
}

/// Write coordinates as `lat,lng` lines.
pub fn write_coordinates<W: Write>(writer: &mut W, coordinates: &[Coordinate]) -> io::Result<()> {
    for c in coordinates {
        writeln!(
            writer,
            "{:.prec$},{:.prec$}",
            c.latitude,
            c.longitude,
            prec = WRITE_DECIMALS
        )?;
    }
    Ok(())
}

/// Read an encoded polyline, trimming surrounding whitespace.
///
/// Bytes that are not UTF-8 are reported as an invalid character at the
/// offset where the valid prefix ends.
pub fn read_polyline<R: Read>(mut reader: R) -> Result<String, IoError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let bytes = buf.trim_ascii();
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            let position = std::str::from_utf8(valid).map_or(0, |s| s.chars().count());
            Err(PolylineError::InvalidCharacter {
                polyline: String::from_utf8_lossy(bytes).into_owned(),
                position,
                character: char::REPLACEMENT_CHARACTER,
            }
            .into())
        }
    }
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Parse every coordinate line from `reader` into an encoder.
///
/// Nothing is written anywhere, so callers can open their output only
/// once the whole input parsed.
pub fn encode_lines<R: BufRead>(reader: R) -> Result<PolylineEncoder, IoError> {
    let mut enc = PolylineEncoder::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_coordinate_line(&line) {
            Ok(Some(c)) => enc.push(c),
            Ok(None) => {}
            Err(message) => return Err(IoError::Parse { line: i + 1, message }),
        }
    }
    Ok(enc)
}

/// Write a finished encoder's polyline and a trailing newline to `writer`.
pub fn write_encoded<W: Write>(writer: &mut W, enc: PolylineEncoder) -> Result<EncodeStats, IoError> {
    let points = enc.len();
    let encoded = enc.finish();
    writeln!(writer, "{encoded}")?;
    writer.flush()?;
    Ok(EncodeStats {
        points,
        encoded_len: encoded.len(),
    })
}

/// Read coordinate text from `reader`, write the encoded polyline and a
/// trailing newline to `writer`.
pub fn encode_stream<R: BufRead, W: Write>(reader: R, writer: &mut W) -> Result<EncodeStats, IoError> {
    let enc = encode_lines(reader)?;
    write_encoded(writer, enc)
}

/// Read an encoded polyline from `reader`, write its coordinates as text.
///
/// Validation happens before anything is written.
pub fn decode_stream<R: Read, W: Write>(reader: R, writer: &mut W) -> Result<DecodeStats, IoError> {
    let polyline = read_polyline(reader)?;
    let coordinates = EncodedPolyline::new(&polyline)?.to_vec()?;
    write_coordinates(writer, &coordinates)?;
    writer.flush()?;
    Ok(DecodeStats {
        encoded_len: polyline.len(),
        points: coordinates.len(),
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Encode the coordinate file at `input_path` into `output_path`.
///
/// The output file is only created once every input line parsed.
pub fn encode_file(input_path: &Path, output_path: &Path) -> Result<EncodeStats, IoError> {
    let reader = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let enc = encode_lines(reader)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    write_encoded(&mut writer, enc)
}

/// Decode the polyline file at `input_path` into coordinate text at `output_path`.
///
/// The output file is only created once the input validated.
pub fn decode_file(input_path: &Path, output_path: &Path) -> Result<DecodeStats, IoError> {
    let polyline = read_polyline(File::open(input_path)?)?;
    let coordinates = EncodedPolyline::new(&polyline)?.to_vec()?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    write_coordinates(&mut writer, &coordinates)?;
    writer.flush()?;
    Ok(DecodeStats {
        encoded_len: polyline.len(),
        points: coordinates.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";
    const REFERENCE_TEXT: &str = "38.5,-120.2\n40.7, -120.95\n# comment\n\n43.252 -126.453\n";

    #[test]
    fn parse_lines() {
        assert_eq!(
            parse_coordinate_line(" 1.5 , -2 "),
            Ok(Some(Coordinate::new(1.5, -2.0)))
        );
        assert_eq!(parse_coordinate_line("# x"), Ok(None));
        assert_eq!(parse_coordinate_line("   "), Ok(None));
        assert!(parse_coordinate_line("1.5").is_err());
        assert!(parse_coordinate_line("1,2,3").is_err());
        assert!(parse_coordinate_line("a,2").is_err());
        assert!(parse_coordinate_line("NaN,2").is_err());
    }

    #[test]
    fn read_reports_line_numbers() {
        let err = read_coordinates("1,2\n\nbogus\n".as_bytes()).unwrap_err();
        match err {
            IoError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn encode_stream_reference() {
        let mut out = Vec::new();
        let stats = encode_stream(REFERENCE_TEXT.as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{REFERENCE}\n"));
        assert_eq!(stats.points, 3);
        assert_eq!(stats.encoded_len, REFERENCE.len());
    }

    #[test]
    fn decode_stream_reference() {
        let mut out = Vec::new();
        let input = format!("  {REFERENCE}\n");
        let stats = decode_stream(input.as_bytes(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "38.50000,-120.20000\n40.70000,-120.95000\n43.25200,-126.45300\n"
        );
        assert_eq!(stats.points, 3);
        assert_eq!(stats.encoded_len, REFERENCE.len());
    }

    #[test]
    fn decode_stream_writes_nothing_on_error() {
        let mut out = Vec::new();
        let err = decode_stream("_p~iF~ps|U_ulL".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(
            err,
            IoError::Decode(PolylineError::TruncatedInput { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn encode_decode_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let coords = dir.path().join("route.txt");
        let encoded = dir.path().join("route.polyline");
        let decoded = dir.path().join("decoded.txt");
        std::fs::write(&coords, REFERENCE_TEXT).unwrap();

        let enc = encode_file(&coords, &encoded).unwrap();
        assert_eq!(enc.points, 3);
        assert_eq!(
            std::fs::read_to_string(&encoded).unwrap().trim(),
            REFERENCE
        );

        let dec = decode_file(&encoded, &decoded).unwrap();
        assert_eq!(dec.points, 3);
        let back = read_coordinates(BufReader::new(File::open(&decoded).unwrap())).unwrap();
        assert_eq!(back[2], Coordinate::new(43.252, -126.453));
    }

    #[test]
    fn encode_file_leaves_output_untouched_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("route.txt");
        let fresh = dir.path().join("fresh.polyline");
        let existing = dir.path().join("existing.polyline");
        std::fs::write(&input, "38.5,-120.2\nbogus\n").unwrap();
        std::fs::write(&existing, "previous").unwrap();

        let err = encode_file(&input, &fresh).unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 2, .. }));
        assert!(!fresh.exists());

        assert!(encode_file(&input, &existing).is_err());
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "previous");
    }

    #[test]
    fn read_polyline_reports_non_utf8_position() {
        let mut input = b"  _p~iF~ps|U".to_vec();
        input.push(0xFF);
        match read_polyline(&input[..]).unwrap_err() {
            IoError::Decode(PolylineError::InvalidCharacter {
                position,
                character,
                ..
            }) => {
                assert_eq!(position, 10);
                assert_eq!(character, char::REPLACEMENT_CHARACTER);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_file_leaves_no_output_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.polyline");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "_p~iF ~ps|U").unwrap();
        assert!(decode_file(&input, &output).is_err());
        assert!(!output.exists());
    }
}
