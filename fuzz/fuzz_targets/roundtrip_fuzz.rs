#![no_main]
use libfuzzer_sys::fuzz_target;
use gpolyline::{Coordinate, decode, encode};

fuzz_target!(|data: &[u8]| {
    // Interpret input as pairs of i32 fixed-point values.
    let points: Vec<Coordinate> = data
        .chunks_exact(8)
        .map(|c| {
            let lat = i32::from_le_bytes([c[0], c[1], c[2], c[3]]);
            let lng = i32::from_le_bytes([c[4], c[5], c[6], c[7]]);
            Coordinate::new(f64::from(lat) / 1e5, f64::from(lng) / 1e5)
        })
        .collect();

    let encoded = encode(&points);
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded, points);
    assert_eq!(encode(&decoded), encoded);
});
