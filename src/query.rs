// src/query.rs

use std::fmt;

use crate::error::{QuakeError, ValidationError};
use crate::filter::{
    format_number, DepthFilter, Filter, FilterKind, IntensityFilter, LocationFilter,
    MagnitudeFilter, QueryParams, SubFilter, TimeFilter,
};
use crate::types::PagerLevel;

// The service has no upper limit on felt reports; this is never reached in practice.
const MAX_REPORTS: u64 = 999_999_999;

/// Scalar search options, validated independently by `EarthquakeFilter::new`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// One of `green`, `yellow`, `orange`, `red` (case-insensitive).
    pub pager_level: Option<String>,
    /// Minimum number of public felt reports; must not be negative.
    pub min_reports: Option<i64>,
}

impl FilterOptions {
    pub fn pager_level(mut self, level: impl Into<String>) -> Self {
        self.pager_level = Some(level.into());
        self
    }

    pub fn min_reports(mut self, min_reports: i64) -> Self {
        self.min_reports = Some(min_reports);
        self
    }
}

/// The complete set of criteria for one catalog search.
///
/// Holds at most one sub-filter of each kind plus the scalar options. Every
/// value inside has already been validated, so a constructed filter can
/// always be turned into query parameters.
///
/// ```rust
/// use equake_rs::{
///     DepthFilter, DistanceUnit, EarthquakeFilter, Filter, FilterOptions, MagnitudeFilter,
/// };
///
/// # fn main() -> Result<(), equake_rs::ValidationError> {
/// let filter = EarthquakeFilter::new(
///     vec![
///         Filter::from(DepthFilter::new(Some(100.0), Some(200.0), DistanceUnit::Kilometers)?),
///         Filter::from(MagnitudeFilter::new(Some(5.0), Some(7.0))?),
///     ],
///     FilterOptions::default().pager_level("orange").min_reports(100),
/// )?;
/// assert!(filter.depth().is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarthquakeFilter {
    time: Option<TimeFilter>,
    location: Option<LocationFilter>,
    depth: Option<DepthFilter>,
    magnitude: Option<MagnitudeFilter>,
    intensity: Option<IntensityFilter>,
    pager_level: Option<PagerLevel>,
    min_reports: Option<u64>,
}

impl EarthquakeFilter {
    /// Creates a filter from any number of sub-filters (at most one per kind)
    /// and the scalar options.
    pub fn new<I>(filters: I, options: FilterOptions) -> Result<Self, ValidationError>
    where
        I: IntoIterator,
        I::Item: Into<Filter>,
    {
        let mut earthquake_filter = EarthquakeFilter {
            pager_level: options
                .pager_level
                .as_deref()
                .map(str::parse::<PagerLevel>)
                .transpose()?,
            min_reports: options.min_reports.map(validate_min_reports).transpose()?,
            ..EarthquakeFilter::default()
        };
        for filter in filters {
            earthquake_filter = earthquake_filter.with(filter)?;
        }
        Ok(earthquake_filter)
    }

    /// Adds one sub-filter, failing if a filter of the same kind is already present.
    pub fn with(mut self, filter: impl Into<Filter>) -> Result<Self, ValidationError> {
        let filter = filter.into();
        filter.validate()?;
        if self.filters().any(|existing| existing.kind() == filter.kind()) {
            return Err(ValidationError::new(
                "filters",
                format!("duplicate filter kind: {}", filter.kind()),
            ));
        }
        match filter {
            Filter::Time(f) => self.time = Some(f),
            Filter::Location(f) => self.location = Some(f),
            Filter::Depth(f) => self.depth = Some(f),
            Filter::Magnitude(f) => self.magnitude = Some(f),
            Filter::Intensity(f) => self.intensity = Some(f),
        }
        Ok(self)
    }

    pub fn time(&self) -> Option<&TimeFilter> {
        self.time.as_ref()
    }

    pub fn location(&self) -> Option<&LocationFilter> {
        self.location.as_ref()
    }

    pub fn depth(&self) -> Option<&DepthFilter> {
        self.depth.as_ref()
    }

    pub fn magnitude(&self) -> Option<&MagnitudeFilter> {
        self.magnitude.as_ref()
    }

    pub fn intensity(&self) -> Option<&IntensityFilter> {
        self.intensity.as_ref()
    }

    pub fn pager_level(&self) -> Option<PagerLevel> {
        self.pager_level
    }

    pub fn min_reports(&self) -> Option<u64> {
        self.min_reports
    }

    /// The sub-filters that are present, in a fixed kind order.
    pub fn filters(&self) -> impl Iterator<Item = Filter> + '_ {
        [
            self.time.map(Filter::Time),
            self.location.map(Filter::Location),
            self.depth.map(Filter::Depth),
            self.magnitude.map(Filter::Magnitude),
            self.intensity.map(Filter::Intensity),
        ]
        .into_iter()
        .flatten()
    }

    /// Merges every sub-filter's parameters with the scalar options.
    ///
    /// Sub-filters own disjoint parameter names, so a collision means the
    /// filter set itself is broken and is reported as `InternalConsistency`.
    pub fn to_query_params(&self) -> Result<QueryParams, QuakeError> {
        let mut params = QueryParams::new();
        let mut owners: Vec<(&'static str, FilterKind)> = Vec::new();

        for filter in self.filters() {
            for (key, value) in filter.to_params() {
                if let Some((_, owner)) = owners.iter().find(|(k, _)| *k == key) {
                    return Err(QuakeError::InternalConsistency(format!(
                        "parameter '{}' emitted by both {} and {} filters",
                        key,
                        owner,
                        filter.kind()
                    )));
                }
                owners.push((key, filter.kind()));
                params.insert(key, value);
            }
        }

        for (key, value) in self.scalar_params() {
            if params.insert(key, value).is_some() {
                return Err(QuakeError::InternalConsistency(format!(
                    "parameter '{}' emitted by a sub-filter and a scalar option",
                    key
                )));
            }
        }

        log::debug!("Filter produced {} query parameters", params.len());
        Ok(params)
    }

    fn scalar_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(level) = self.pager_level {
            params.insert("alertlevel", level.as_str().to_string());
        }
        if let Some(min_reports) = self.min_reports {
            params.insert("minfelt", min_reports.min(MAX_REPORTS).to_string());
        }
        params
    }
}

fn validate_min_reports(min_reports: i64) -> Result<u64, ValidationError> {
    u64::try_from(min_reports).map_err(|_| {
        ValidationError::new(
            "min_reports",
            format!("invalid min_reports {} (must not be negative)", min_reports),
        )
    })
}

impl fmt::Display for EarthquakeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----- Earthquake Filter -----")?;
        if let Some(time) = &self.time {
            let show = |t: Option<chrono::DateTime<chrono::Utc>>| {
                t.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
            };
            writeln!(
                f,
                "Time: {} to {} (updated after {})",
                show(time.start()),
                show(time.end()),
                show(time.updated())
            )?;
        }
        match &self.location {
            Some(LocationFilter::Rectangle(rect)) => writeln!(
                f,
                "Location: latitude {} to {}, longitude {} to {}",
                rect.min_latitude(),
                rect.max_latitude(),
                rect.min_longitude(),
                rect.max_longitude()
            )?,
            Some(LocationFilter::Circle(circle)) => writeln!(
                f,
                "Location: within {} {} of ({}, {})",
                circle.radius(),
                circle.unit(),
                circle.latitude(),
                circle.longitude()
            )?,
            None => {}
        }
        let bound = |v: Option<f64>| v.map(format_number).unwrap_or_else(|| "-".to_string());
        if let Some(depth) = &self.depth {
            writeln!(
                f,
                "Depth: {} to {} km",
                bound(depth.min_km()),
                bound(depth.max_km())
            )?;
        }
        if let Some(magnitude) = &self.magnitude {
            writeln!(
                f,
                "Magnitude: {} to {}",
                bound(magnitude.min()),
                bound(magnitude.max())
            )?;
        }
        if let Some(intensity) = &self.intensity {
            writeln!(
                f,
                "Intensity: {} to {}",
                bound(intensity.min()),
                bound(intensity.max())
            )?;
        }
        if let Some(level) = self.pager_level {
            writeln!(f, "PAGER level: {}", level)?;
        }
        if let Some(min_reports) = self.min_reports {
            writeln!(f, "Minimum reports: {}", min_reports)?;
        }
        Ok(())
    }
}
