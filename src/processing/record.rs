//! Decoding of raw attribute records into points.

use crate::error::{GeoError, Result};
use geobatch_types::point::{Attributes, GeoPoint};
use serde_json::Value;

/// A decoded input record: field name to value, in source order.
pub type RawRecord = serde_json::Map<String, Value>;

/// Keys accepted for latitude, in lookup order.
pub const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];
/// Keys accepted for longitude, in lookup order.
pub const LONGITUDE_KEYS: &[&str] = &["longitude", "lon", "lng"];

/// Anything the batch processor can turn into a point.
///
/// Conversion failures are counted as item errors by the chunk processor;
/// they never abort a chunk.
pub trait Record {
    fn to_geo_point(&self) -> Result<GeoPoint>;
}

impl Record for GeoPoint {
    fn to_geo_point(&self) -> Result<GeoPoint> {
        Ok(self.clone())
    }
}

impl Record for RawRecord {
    fn to_geo_point(&self) -> Result<GeoPoint> {
        decode_record(self)
    }
}

impl Record for Value {
    fn to_geo_point(&self) -> Result<GeoPoint> {
        match self {
            Value::Object(map) => decode_record(map),
            other => Err(GeoError::InvalidField {
                field: "record".to_string(),
                reason: format!("expected a JSON object, got {}", json_type(other)),
            }),
        }
    }
}

/// Decode a raw record into an unprocessed [`GeoPoint`].
///
/// Latitude is read from the first present key of [`LATITUDE_KEYS`] and
/// longitude from [`LONGITUDE_KEYS`]. Numbers and numeric strings are
/// accepted. Every other field is kept verbatim, in order, as an attribute;
/// unused coordinate aliases are discarded rather than passed through.
/// Range checks are left to validation.
///
/// # Examples
///
/// ```
/// use geobatch::processing::record::{RawRecord, decode_record};
/// use serde_json::json;
///
/// let record: RawRecord = serde_json::from_value(json!({
///     "id": 17,
///     "lat": "40.7128",
///     "lng": -74.0060,
///     "name": "New York",
/// }))?;
///
/// let point = decode_record(&record)?;
/// assert_eq!(point.latitude, 40.7128);
/// assert_eq!(point.longitude, -74.0060);
/// assert_eq!(point.attributes.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode_record(record: &RawRecord) -> Result<GeoPoint> {
    let latitude = read_coordinate(record, LATITUDE_KEYS)?;
    let longitude = read_coordinate(record, LONGITUDE_KEYS)?;

    let attributes: Attributes = record
        .iter()
        .filter(|(k, _)| !is_coordinate_key(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(GeoPoint::with_attributes(latitude, longitude, attributes))
}

fn is_coordinate_key(key: &str) -> bool {
    LATITUDE_KEYS.contains(&key) || LONGITUDE_KEYS.contains(&key)
}

fn read_coordinate(record: &RawRecord, keys: &[&'static str]) -> Result<f64> {
    let Some((key, value)) = keys
        .iter()
        .find_map(|&k| record.get(k).filter(|v| !v.is_null()).map(|v| (k, v)))
    else {
        return Err(GeoError::MissingField(keys[0].to_string()));
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| GeoError::InvalidField {
        field: key.to_string(),
        reason: format!("expected a number, got {}", value),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
