// src/filter.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::error::ValidationError;
use crate::types::range::{check_positive, check_within};
use crate::types::{convert, DistanceUnit, Range};

/// Service parameter name -> canonical value. Sorted, so serialization is deterministic.
pub type QueryParams = BTreeMap<&'static str, String>;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_INTENSITY: f64 = 0.0;
pub const MAX_INTENSITY: f64 = 12.0;

// Realistic limits the service accepts. Values beyond them are clamped
// rather than rejected, since they select the same events.
pub(crate) const MIN_DEPTH_KM: f64 = -100.0;
pub(crate) const MAX_DEPTH_KM: f64 = 9999.0;
pub(crate) const MIN_MAGNITUDE: f64 = -5.0;
pub(crate) const MAX_MAGNITUDE: f64 = 12.0;
pub(crate) const MAX_RADIUS_KM: f64 = 99999.0;

// The service defaults `starttime` to thirty days before now, so an
// end-only range is anchored thirty days before its own end instead.
const DEFAULT_DAYS_GAP: i64 = 30;

/// The five kinds of sub-filter an `EarthquakeFilter` can hold, one of each at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
    Time,
    Location,
    Depth,
    Magnitude,
    Intensity,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Time => "time",
            FilterKind::Location => "location",
            FilterKind::Depth => "depth",
            FilterKind::Magnitude => "magnitude",
            FilterKind::Intensity => "intensity",
        };
        f.write_str(name)
    }
}

/// Capability shared by every sub-filter.
pub trait SubFilter {
    fn kind(&self) -> FilterKind;

    /// Re-checks the invariants the constructor enforced.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Renders the filter as service query parameters, in the service's native units.
    fn to_params(&self) -> QueryParams;
}

pub(crate) fn format_number(value: f64) -> String {
    value.to_string()
}

pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn check_finite_range(field: &str, range: &Range<f64>) -> Result<(), ValidationError> {
    for value in [range.min(), range.max()].into_iter().flatten() {
        if !value.is_finite() {
            return Err(ValidationError::new(
                field,
                format!("{} is not a finite number", value),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Filters on when an event occurred and when its record was last updated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeFilter {
    occurred: Range<DateTime<Utc>>,
    updated: Range<DateTime<Utc>>,
}

impl TimeFilter {
    /// Events that occurred within `[start, end]`. Either bound may be omitted.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        Self::from_ranges(Range::new("time", start, end)?, Range::unbounded())
    }

    /// Builds a filter from explicit occurrence and update ranges.
    ///
    /// The service can only bound the update time from below (`updatedafter`),
    /// so an update range with a maximum is rejected.
    pub fn from_ranges(
        occurred: Range<DateTime<Utc>>,
        updated: Range<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        let filter = TimeFilter { occurred, updated };
        filter.validate()?;
        Ok(filter)
    }

    /// Only match events whose record changed at or after `updated`.
    pub fn updated_after(mut self, updated: DateTime<Utc>) -> Self {
        // A lone lower bound is always ordered.
        if let Ok(range) = Range::new("updated", Some(updated), None) {
            self.updated = range;
        }
        self
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.occurred.min()
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.occurred.max()
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated.min()
    }
}

impl SubFilter for TimeFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Time
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.updated.max().is_some() {
            return Err(ValidationError::new(
                "updated",
                "an upper bound on the update time is not supported by the catalog service",
            ));
        }
        Ok(())
    }

    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        let start = self.start().or_else(|| {
            self.end().map(|end| {
                end.checked_sub_signed(Duration::days(DEFAULT_DAYS_GAP))
                    .unwrap_or(end)
            })
        });
        if let Some(start) = start {
            params.insert("starttime", format_time(&start));
        }
        if let Some(end) = self.end() {
            params.insert("endtime", format_time(&end));
        }
        if let Some(updated) = self.updated() {
            params.insert("updatedafter", format_time(&updated));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    min_latitude: f64,
    max_latitude: f64,
    min_longitude: f64,
    max_longitude: f64,
}

impl Rectangle {
    pub fn min_latitude(&self) -> f64 {
        self.min_latitude
    }

    pub fn max_latitude(&self) -> f64 {
        self.max_latitude
    }

    pub fn min_longitude(&self) -> f64 {
        self.min_longitude
    }

    pub fn max_longitude(&self) -> f64 {
        self.max_longitude
    }
}

/// A circle around a point, with its radius in a caller-chosen unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    latitude: f64,
    longitude: f64,
    radius: f64,
    unit: DistanceUnit,
}

impl Circle {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Radius in the unit the caller supplied.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn radius_km(&self) -> f64 {
        convert(self.radius, self.unit, DistanceUnit::Kilometers)
    }

    pub fn radius_mi(&self) -> f64 {
        convert(self.radius, self.unit, DistanceUnit::Miles)
    }
}

/// Restricts events to a geographic region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationFilter {
    Rectangle(Rectangle),
    Circle(Circle),
}

impl LocationFilter {
    pub fn rectangle(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Result<Self, ValidationError> {
        let filter = LocationFilter::Rectangle(Rectangle {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        });
        filter.validate()?;
        Ok(filter)
    }

    pub fn circle(
        latitude: f64,
        longitude: f64,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Self, ValidationError> {
        let filter = LocationFilter::Circle(Circle {
            latitude,
            longitude,
            radius,
            unit,
        });
        filter.validate()?;
        Ok(filter)
    }
}

impl SubFilter for LocationFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Location
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            LocationFilter::Rectangle(rect) => {
                check_within("minlatitude", rect.min_latitude, MIN_LATITUDE, MAX_LATITUDE)?;
                check_within("maxlatitude", rect.max_latitude, MIN_LATITUDE, MAX_LATITUDE)?;
                check_within("minlongitude", rect.min_longitude, MIN_LONGITUDE, MAX_LONGITUDE)?;
                check_within("maxlongitude", rect.max_longitude, MIN_LONGITUDE, MAX_LONGITUDE)?;
                Range::new("latitude", Some(rect.min_latitude), Some(rect.max_latitude))?;
                Range::new("longitude", Some(rect.min_longitude), Some(rect.max_longitude))?;
            }
            LocationFilter::Circle(circle) => {
                check_within("latitude", circle.latitude, MIN_LATITUDE, MAX_LATITUDE)?;
                check_within("longitude", circle.longitude, MIN_LONGITUDE, MAX_LONGITUDE)?;
                check_positive("radius", circle.radius)?;
            }
        }
        Ok(())
    }

    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        match self {
            LocationFilter::Rectangle(rect) => {
                params.insert("minlatitude", format_number(rect.min_latitude));
                params.insert("maxlatitude", format_number(rect.max_latitude));
                params.insert("minlongitude", format_number(rect.min_longitude));
                params.insert("maxlongitude", format_number(rect.max_longitude));
            }
            LocationFilter::Circle(circle) => {
                params.insert("latitude", format_number(circle.latitude));
                params.insert("longitude", format_number(circle.longitude));
                params.insert(
                    "maxradiuskm",
                    format_number(circle.radius_km().min(MAX_RADIUS_KM)),
                );
            }
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Depth
// ---------------------------------------------------------------------------

/// Filters on hypocentre depth. Bounds stay in the caller's unit until serialization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthFilter {
    range: Range<f64>,
    unit: DistanceUnit,
}

impl DepthFilter {
    pub fn new(
        min: Option<f64>,
        max: Option<f64>,
        unit: DistanceUnit,
    ) -> Result<Self, ValidationError> {
        let filter = DepthFilter {
            range: Range::new("depth", min, max)?,
            unit,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn min_km(&self) -> Option<f64> {
        self.in_unit(DistanceUnit::Kilometers).min()
    }

    pub fn max_km(&self) -> Option<f64> {
        self.in_unit(DistanceUnit::Kilometers).max()
    }

    pub fn min_mi(&self) -> Option<f64> {
        self.in_unit(DistanceUnit::Miles).min()
    }

    pub fn max_mi(&self) -> Option<f64> {
        self.in_unit(DistanceUnit::Miles).max()
    }

    fn in_unit(&self, unit: DistanceUnit) -> Range<f64> {
        self.range.map(|v| convert(v, self.unit, unit))
    }
}

impl SubFilter for DepthFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Depth
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_finite_range("depth", &self.range)
    }

    fn to_params(&self) -> QueryParams {
        let km = self
            .in_unit(DistanceUnit::Kilometers)
            .map(|v| v.clamp(MIN_DEPTH_KM, MAX_DEPTH_KM));
        let mut params = QueryParams::new();
        if let Some(min) = km.min() {
            params.insert("mindepth", format_number(min));
        }
        if let Some(max) = km.max() {
            params.insert("maxdepth", format_number(max));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Magnitude / intensity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagnitudeFilter {
    range: Range<f64>,
}

impl MagnitudeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, ValidationError> {
        let filter = MagnitudeFilter {
            range: Range::new("magnitude", min, max)?,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn min(&self) -> Option<f64> {
        self.range.min()
    }

    pub fn max(&self) -> Option<f64> {
        self.range.max()
    }
}

impl SubFilter for MagnitudeFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Magnitude
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_finite_range("magnitude", &self.range)
    }

    fn to_params(&self) -> QueryParams {
        let clamped = self.range.map(|v| v.clamp(MIN_MAGNITUDE, MAX_MAGNITUDE));
        let mut params = QueryParams::new();
        if let Some(min) = clamped.min() {
            params.insert("minmagnitude", format_number(min));
        }
        if let Some(max) = clamped.max() {
            params.insert("maxmagnitude", format_number(max));
        }
        params
    }
}

/// Filters on the maximum Modified Mercalli Intensity, within `[0, 12]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntensityFilter {
    range: Range<f64>,
}

impl IntensityFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, ValidationError> {
        let filter = IntensityFilter {
            range: Range::new("intensity", min, max)?,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn min(&self) -> Option<f64> {
        self.range.min()
    }

    pub fn max(&self) -> Option<f64> {
        self.range.max()
    }
}

impl SubFilter for IntensityFilter {
    fn kind(&self) -> FilterKind {
        FilterKind::Intensity
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.range
            .within("intensity", MIN_INTENSITY, MAX_INTENSITY)
            .map(|_| ())
    }

    fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(min) = self.range.min() {
            params.insert("minmmi", format_number(min));
        }
        if let Some(max) = self.range.max() {
            params.insert("maxmmi", format_number(max));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Closed set of sub-filters
// ---------------------------------------------------------------------------

/// Any one sub-filter, as accepted by `EarthquakeFilter::new`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Time(TimeFilter),
    Location(LocationFilter),
    Depth(DepthFilter),
    Magnitude(MagnitudeFilter),
    Intensity(IntensityFilter),
}

impl Filter {
    fn as_sub_filter(&self) -> &dyn SubFilter {
        match self {
            Filter::Time(f) => f,
            Filter::Location(f) => f,
            Filter::Depth(f) => f,
            Filter::Magnitude(f) => f,
            Filter::Intensity(f) => f,
        }
    }
}

impl SubFilter for Filter {
    fn kind(&self) -> FilterKind {
        self.as_sub_filter().kind()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.as_sub_filter().validate()
    }

    fn to_params(&self) -> QueryParams {
        self.as_sub_filter().to_params()
    }
}

macro_rules! impl_from_sub_filter {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Filter {
                fn from(filter: $ty) -> Self {
                    Filter::$variant(filter)
                }
            }
        )*
    };
}

impl_from_sub_filter! {
    Time => TimeFilter,
    Location => LocationFilter,
    Depth => DepthFilter,
    Magnitude => MagnitudeFilter,
    Intensity => IntensityFilter,
}
