use gpolyline::{LineString, decode, encode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let route = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];

    let encoded = encode(route);
    let restored = decode(&encoded)?;
    assert_eq!(restored.len(), route.len());

    let line = LineString::from_polyline(&encoded)?;
    assert_eq!(line.to_polyline(), encoded);

    println!(
        "encoded {} points -> {} chars ({encoded}) -> restored {} points",
        route.len(),
        encoded.len(),
        restored.len()
    );

    Ok(())
}
