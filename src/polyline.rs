/* Encoded polyline codec at 1e5 precision, lat before lng.

The bit-level work is done by the `polyline` crate. This module adds the
checks route steps need on top of it: bytes are validated up front so the
error can point at the offending one, and every decoded coordinate must be a
real lat/lng.
*/
use geo_types::Coord;

use crate::error::Error;
use crate::route_step::Coordinate;

const PRECISION_DIGITS: u32 = 5;
const PRECISION: f64 = 1e5;
const MIN_CHAR: u8 = 63;
const MAX_CHAR: u8 = 126;
const CONTINUATION_BIT: u8 = 0x20;
// a full 360 degree delta at 1e5 fits in 6 groups
const MAX_GROUPS_PER_VALUE: usize = 7;

fn malformed(position: Option<usize>, reason: impl Into<String>) -> Error {
    Error::MalformedGeometry {
        position,
        reason: reason.into(),
    }
}

fn in_range(c: &Coordinate) -> bool {
    c.latitude.abs() <= 90.0 && c.longitude.abs() <= 180.0
}

// normalise to the nearest 1e5 step so decoded values compare equal to their
// decimal literals
fn quantise(c: Coordinate) -> Coordinate {
    Coordinate::new(
        (c.latitude * PRECISION).round() / PRECISION,
        (c.longitude * PRECISION).round() / PRECISION,
    )
}

// Structural checks before the running sums are touched: printable bytes,
// no value longer than a lat/lng delta can need, complete lat/lng pairs.
fn validate(bytes: &[u8]) -> Result<(), Error> {
    let mut groups = 0;
    let mut values = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if !(MIN_CHAR..=MAX_CHAR).contains(&byte) {
            return Err(malformed(Some(i), "character out of range"));
        }
        groups += 1;
        if groups > MAX_GROUPS_PER_VALUE {
            return Err(malformed(Some(i), "value too long"));
        }
        if (byte - MIN_CHAR) & CONTINUATION_BIT == 0 {
            groups = 0;
            values += 1;
        }
    }
    if groups != 0 {
        return Err(malformed(Some(bytes.len()), "unterminated value"));
    }
    if values % 2 != 0 {
        return Err(malformed(Some(bytes.len()), "latitude without longitude"));
    }
    Ok(())
}

/// Decodes an encoded polyline. An empty string is an empty path.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, Error> {
    validate(encoded.as_bytes())?;
    let line = ::polyline::decode_polyline(encoded, PRECISION_DIGITS)
        .map_err(|e| malformed(None, e.to_string()))?;
    let mut coordinates = Vec::with_capacity(line.0.len());
    for (i, coord) in line.into_iter().enumerate() {
        let coordinate = quantise(Coordinate::from(coord));
        if !in_range(&coordinate) {
            return Err(malformed(
                Some(i),
                format!(
                    "coordinate out of range: ({}, {})",
                    coordinate.latitude, coordinate.longitude
                ),
            ));
        }
        coordinates.push(coordinate);
    }
    Ok(coordinates)
}

/// Fails only for coordinates outside lat ±90 / lng ±180.
pub fn encode(coordinates: &[Coordinate]) -> Result<String, Error> {
    ::polyline::encode_coordinates(
        coordinates.iter().copied().map(Coord::from),
        PRECISION_DIGITS,
    )
    .map_err(|e| malformed(None, e.to_string()))
}
