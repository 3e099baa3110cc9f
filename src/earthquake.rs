// src/earthquake.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ParseError, QuakeError};
use crate::types::PagerLevel;

/// Optional descriptive data the service attaches to each event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventMetadata {
    pub mag_type: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub detail: Option<String>,
    pub status: Option<String>,
    pub tsunami: bool,
    pub significance: Option<i64>,
    pub cdi: Option<f64>,
    pub net: Option<String>,
    pub code: Option<String>,
}

/// One event from the catalog.
///
/// Only ever built by the response parser, so every instance carries the
/// full set of required fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Earthquake {
    id: String,
    magnitude: f64,
    latitude: f64,
    longitude: f64,
    depth_km: f64,
    time: DateTime<Utc>,
    updated: DateTime<Utc>,
    place: String,
    pager_level: Option<PagerLevel>,
    intensity: Option<f64>,
    reports: Option<u64>,
    metadata: EventMetadata,
}

impl Earthquake {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn depth_km(&self) -> f64 {
        self.depth_km
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn pager_level(&self) -> Option<PagerLevel> {
        self.pager_level
    }

    /// Maximum reported Modified Mercalli Intensity.
    pub fn intensity(&self) -> Option<f64> {
        self.intensity
    }

    /// Number of public felt reports.
    pub fn reports(&self) -> Option<u64> {
        self.reports
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

impl fmt::Display for Earthquake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "M {} - {}", self.magnitude, self.place)?;
        writeln!(f, "Time: {}", self.time)?;
        writeln!(
            f,
            "Location: {}, {} at {} km depth",
            self.latitude, self.longitude, self.depth_km
        )?;
        if let Some(level) = self.pager_level {
            writeln!(f, "PAGER level: {}", level)?;
        }
        if let Some(intensity) = self.intensity {
            writeln!(f, "Intensity: {}", intensity)?;
        }
        if let Some(reports) = self.reports {
            writeln!(f, "Reports: {}", reports)?;
        }
        write!(f, "ID: {}", self.id)
    }
}

// Fields are pulled out of the feature one at a time so that a missing or
// mistyped value is reported by its own name and the feature index.

type Object = Map<String, Value>;

fn required<T>(value: Option<T>, index: usize, field: &'static str) -> Result<T, ParseError> {
    value.ok_or(ParseError::MissingField { index, field })
}

/// Reads `name` from `object`. Absent and `null` both yield `None`.
fn optional<T: DeserializeOwned>(
    object: &Object,
    index: usize,
    name: &'static str,
) -> Result<Option<T>, ParseError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => <T as Deserialize>::deserialize(value)
            .map(Some)
            .map_err(|e| ParseError::InvalidField {
                index,
                field: name,
                reason: e.to_string(),
            }),
    }
}

fn nested<'a>(
    object: &'a Object,
    index: usize,
    name: &'static str,
) -> Result<Option<&'a Object>, ParseError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(ParseError::InvalidField {
            index,
            field: name,
            reason: format!("expected an object, got {}", other),
        }),
    }
}

fn timestamp(millis: i64, index: usize, field: &'static str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| ParseError::InvalidField {
        index,
        field,
        reason: format!("{} is not a representable epoch timestamp", millis),
    })
}

fn parse_feature(index: usize, value: Value) -> Result<Earthquake, ParseError> {
    let feature = match value {
        Value::Object(feature) => feature,
        other => {
            return Err(ParseError::InvalidField {
                index,
                field: "feature",
                reason: format!("expected an object, got {}", other),
            })
        }
    };

    let id = required(optional::<String>(&feature, index, "id")?, index, "id")?;
    let props = required(nested(&feature, index, "properties")?, index, "properties")?;
    let coordinates = match nested(&feature, index, "geometry")? {
        Some(geometry) => optional::<Vec<Option<f64>>>(geometry, index, "coordinates")?,
        None => None,
    };
    let coordinates = required(coordinates, index, "coordinates")?;
    let coordinate = |position: usize, field: &'static str| {
        required(coordinates.get(position).copied().flatten(), index, field)
    };

    let pager_level = optional::<String>(props, index, "alert")?
        .map(|alert| {
            alert
                .parse::<PagerLevel>()
                .map_err(|e| ParseError::InvalidField {
                    index,
                    field: "alert",
                    reason: e.constraint,
                })
        })
        .transpose()?;

    let time = required(optional::<i64>(props, index, "time")?, index, "time")?;
    let updated = required(optional::<i64>(props, index, "updated")?, index, "updated")?;

    Ok(Earthquake {
        magnitude: required(optional(props, index, "mag")?, index, "mag")?,
        place: required(optional(props, index, "place")?, index, "place")?,
        time: timestamp(time, index, "time")?,
        updated: timestamp(updated, index, "updated")?,
        longitude: coordinate(0, "longitude")?,
        latitude: coordinate(1, "latitude")?,
        depth_km: coordinate(2, "depth")?,
        id,
        pager_level,
        intensity: optional(props, index, "mmi")?,
        reports: optional(props, index, "felt")?,
        metadata: EventMetadata {
            mag_type: optional(props, index, "magType")?,
            title: optional(props, index, "title")?,
            url: optional(props, index, "url")?,
            detail: optional(props, index, "detail")?,
            status: optional(props, index, "status")?,
            tsunami: optional::<i64>(props, index, "tsunami")?.unwrap_or(0) != 0,
            significance: optional(props, index, "sig")?,
            cdi: optional(props, index, "cdi")?,
            net: optional(props, index, "net")?,
            code: optional(props, index, "code")?,
        },
    })
}

/// A successful status with an error document in the body, e.g.
/// `{"metadata": {"status": 400, "error": "..."}}`.
fn error_in_body(json: &Value) -> Option<QuakeError> {
    let status = json.pointer("/metadata/status").and_then(Value::as_u64)?;
    if status < 400 {
        return None;
    }
    let status = u16::try_from(status).unwrap_or(u16::MAX);
    Some(QuakeError::from_response(status, &json.to_string()))
}

/// Parses a GeoJSON feature collection into events, in service order.
///
/// Any malformed feature fails the whole parse; partial results are never returned.
pub fn parse_features(body: &str) -> Result<Vec<Earthquake>, QuakeError> {
    let json: Value = serde_json::from_str(body).map_err(ParseError::Json)?;
    if let Some(err) = error_in_body(&json) {
        return Err(err);
    }

    let features = match json {
        Value::Object(mut map) => match map.remove("features") {
            Some(Value::Array(features)) => features,
            _ => {
                return Err(ParseError::UnexpectedShape(
                    "feature collection has no 'features' array".to_string(),
                )
                .into())
            }
        },
        other => {
            return Err(ParseError::UnexpectedShape(format!(
                "expected a feature collection object, got {}",
                other
            ))
            .into())
        }
    };

    features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(index, feature).map_err(QuakeError::from))
        .collect()
}

/// Parses a count response such as `{"count": 42, "maxAllowed": 20000}`.
pub fn parse_count(body: &str) -> Result<u64, QuakeError> {
    let json: Value = serde_json::from_str(body).map_err(ParseError::Json)?;
    if let Some(err) = error_in_body(&json) {
        return Err(err);
    }
    json.get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| ParseError::MissingCount.into())
}
