//! Encoded polyline decoding for routing provider geometry.
//!
//! The provider encodes a point sequence as a variable-length, delta-coded,
//! zig-zag-signed ASCII stream: each character carries 5 payload bits offset
//! by 63, with the 6th bit flagging continuation. When elevation is included,
//! three delta streams are interleaved per point - latitude, longitude,
//! elevation, strictly in that order. Latitude/longitude are scaled by 1e-5,
//! elevation by 1e-2. Running totals accumulate across the whole stream, so
//! decoding is strictly sequential.
//!
//! Malformed input (truncated varint, character outside `63..=126`, stream
//! ending mid-point) aborts the whole decode with
//! [`RoutePlanError::DecodeError`]; no point is ever silently dropped.

use crate::error::{Result, RoutePlanError};
use crate::HikePoint;

const COORD_SCALE: f64 = 1e5;
const ELEVATION_SCALE: f64 = 1e2;

/// Decode an encoded polyline into route points.
///
/// With `include_elevation` set, each point consumes three deltas; otherwise
/// two, and elevation is reported as 0.0. An empty string decodes to an empty
/// point list.
///
/// # Example
/// ```
/// use hike_planner::polyline;
///
/// let points = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@", false).unwrap();
/// assert_eq!(points.len(), 3);
/// assert!((points[0].latitude - 38.5).abs() < 1e-9);
/// assert!((points[0].longitude - -120.2).abs() < 1e-9);
/// ```
pub fn decode(encoded: &str, include_elevation: bool) -> Result<Vec<HikePoint>> {
    let bytes = encoded.as_bytes();
    let mut pos = 0usize;

    let mut lat = 0i64;
    let mut lng = 0i64;
    let mut ele = 0i64;
    let mut points = Vec::new();

    while pos < bytes.len() {
        lat += read_delta(bytes, &mut pos)?;
        lng += read_delta(bytes, &mut pos)?;
        if include_elevation {
            ele += read_delta(bytes, &mut pos)?;
        }

        points.push(HikePoint::new(
            lat as f64 / COORD_SCALE,
            lng as f64 / COORD_SCALE,
            if include_elevation {
                ele as f64 / ELEVATION_SCALE
            } else {
                0.0
            },
        ));
    }

    Ok(points)
}

/// Encode route points as a polyline, the exact inverse of [`decode`].
///
/// No provider consumed by this engine accepts an encoded upload; the encoder
/// exists for symmetry and round-trip testing.
pub fn encode(points: &[HikePoint], include_elevation: bool) -> String {
    let mut out = String::new();
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;
    let mut prev_ele = 0i64;

    for point in points {
        let lat = (point.latitude * COORD_SCALE).round() as i64;
        let lng = (point.longitude * COORD_SCALE).round() as i64;

        write_delta(&mut out, lat - prev_lat);
        write_delta(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;

        if include_elevation {
            let ele = (point.elevation * ELEVATION_SCALE).round() as i64;
            write_delta(&mut out, ele - prev_ele);
            prev_ele = ele;
        }
    }

    out
}

/// Read one zig-zag-signed varint starting at `*pos`.
fn read_delta(bytes: &[u8], pos: &mut usize) -> Result<i64> {
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*pos).ok_or_else(|| RoutePlanError::DecodeError {
            offset: *pos,
            message: "stream ends inside a value".to_string(),
        })?;
        if !(63..=126).contains(&byte) {
            return Err(RoutePlanError::DecodeError {
                offset: *pos,
                message: format!("character 0x{:02x} outside encoding range", byte),
            });
        }
        *pos += 1;

        let chunk = (byte - 63) as u64;
        result |= (chunk & 0x1f) << shift;
        if chunk & 0x20 == 0 {
            break;
        }
        shift += 5;
        if shift > 60 {
            return Err(RoutePlanError::DecodeError {
                offset: *pos,
                message: "value exceeds 64 bits".to_string(),
            });
        }
    }

    // Zig-zag: low bit is the sign.
    let value = result as i64;
    Ok(if value & 1 == 1 {
        !(value >> 1)
    } else {
        value >> 1
    })
}

/// Append one zig-zag-signed varint.
fn write_delta(out: &mut String, delta: i64) {
    let mut value = ((delta << 1) ^ (delta >> 63)) as u64;
    while value >= 0x20 {
        out.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }
    out.push((value as u8 + 63) as char);
}

#[cfg(test)]
mod tests {
    use super::*;

    // The reference vector from the polyline algorithm documentation.
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_decode_reference_vector() {
        let points = decode(REFERENCE, false).unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];

        assert_eq!(points.len(), expected.len());
        for (point, (lat, lng)) in points.iter().zip(expected) {
            assert!(approx_eq(point.latitude, lat, 1e-9));
            assert!(approx_eq(point.longitude, lng, 1e-9));
            assert_eq!(point.elevation, 0.0);
        }
    }

    #[test]
    fn test_decode_empty_stream() {
        assert_eq!(decode("", true).unwrap(), vec![]);
    }

    #[test]
    fn test_round_trip_with_elevation() {
        let points = vec![
            HikePoint::new(45.0, 6.0, 1500.0),
            HikePoint::new(45.1, 6.05, 1520.5),
            HikePoint::new(45.09993, 6.05001, 1499.99),
        ];

        let encoded = encode(&points, true);
        let decoded = decode(&encoded, true).unwrap();

        assert_eq!(decoded.len(), points.len());
        for (d, p) in decoded.iter().zip(&points) {
            assert!(approx_eq(d.latitude, p.latitude, 1e-6));
            assert!(approx_eq(d.longitude, p.longitude, 1e-6));
            assert!(approx_eq(d.elevation, p.elevation, 1e-3));
        }
    }

    #[test]
    fn test_round_trip_negative_deltas() {
        let points = vec![
            HikePoint::new(-33.86, 151.21, 10.0),
            HikePoint::new(-33.87, 151.19, -2.5),
        ];
        let decoded = decode(&encode(&points, true), true).unwrap();
        assert!(approx_eq(decoded[1].latitude, -33.87, 1e-6));
        assert!(approx_eq(decoded[1].elevation, -2.5, 1e-3));
    }

    #[test]
    fn test_truncated_varint_fails() {
        // A lone continuation byte: the value never terminates.
        let err = decode("_", false).unwrap_err();
        assert!(matches!(err, RoutePlanError::DecodeError { offset: 1, .. }));
    }

    #[test]
    fn test_stream_ending_mid_point_fails() {
        // Full latitude value, then EOF where the longitude should start.
        let err = decode("_p~iF", false).unwrap_err();
        assert!(matches!(err, RoutePlanError::DecodeError { offset: 5, .. }));
    }

    #[test]
    fn test_out_of_range_character_fails() {
        let err = decode("_p~iF~ps|U!", false).unwrap_err();
        assert!(matches!(err, RoutePlanError::DecodeError { offset: 10, .. }));
    }

    #[test]
    fn test_missing_elevation_stream_fails() {
        // Valid without elevation, truncated when a third delta is expected.
        assert!(decode("_p~iF~ps|U", false).is_ok());
        assert!(decode("_p~iF~ps|U", true).is_err());
    }
}
