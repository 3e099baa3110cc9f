// src/requests.rs

use url::form_urlencoded;
use url::Url;

use crate::error::{QuakeError, ValidationError};
use crate::filter::QueryParams;
use crate::query::EarthquakeFilter;

/// Largest page the service will return for one feature query.
pub const MAX_LIMIT: u32 = 20_000;

const FORMAT: (&str, &str) = ("format", "geojson");
const EVENT_TYPE: (&str, &str) = ("eventtype", "earthquake");

/// Which catalog operation a query is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Full GeoJSON feature collection (`/query`).
    Features,
    /// Count-only answer (`/count`).
    Count,
}

impl QueryMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            QueryMode::Features => "query",
            QueryMode::Count => "count",
        }
    }
}

/// Serializes parameters into a canonical query string (no leading `?`).
///
/// Keys are emitted in sorted order and values are form-urlencoded. The fixed
/// `format=geojson` and `eventtype=earthquake` pairs are always present.
/// `limit` is dropped in count mode since the count operation ignores it.
pub fn to_query_string(params: &QueryParams, mode: QueryMode) -> String {
    let mut all = params.clone();
    for (key, value) in [FORMAT, EVENT_TYPE] {
        all.insert(key, value.to_string());
    }
    if mode == QueryMode::Count {
        all.remove("limit");
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &all {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Validates a caller-supplied result limit and caps it at the service maximum.
pub fn checked_limit(limit: u32) -> Result<u32, ValidationError> {
    if limit == 0 {
        return Err(ValidationError::new("limit", "limit must be at least 1"));
    }
    Ok(limit.min(MAX_LIMIT))
}

/// Builds the full request URL for `filter` against `base_url`.
pub(crate) fn build_url(
    base_url: &Url,
    filter: &EarthquakeFilter,
    mode: QueryMode,
    limit: Option<u32>,
) -> Result<Url, QuakeError> {
    let mut params = filter.to_query_params()?;
    if let Some(limit) = limit {
        params.insert("limit", checked_limit(limit)?.to_string());
    }

    let mut url = base_url.join(mode.endpoint()).map_err(|e| {
        QuakeError::InvalidUrl(format!(
            "Failed to join base URL '{}' with endpoint '{}': {}",
            base_url,
            mode.endpoint(),
            e
        ))
    })?;
    url.set_query(Some(&to_query_string(&params, mode)));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_params_are_always_present() {
        let query = to_query_string(&QueryParams::new(), QueryMode::Features);
        assert_eq!(query, "eventtype=earthquake&format=geojson");
    }

    #[test]
    fn values_are_escaped() {
        let mut params = QueryParams::new();
        params.insert("starttime", "2020-01-01T00:00:00Z".to_string());
        let query = to_query_string(&params, QueryMode::Features);
        assert!(query.contains("starttime=2020-01-01T00%3A00%3A00Z"));
    }

    #[test]
    fn count_mode_drops_limit() {
        let mut params = QueryParams::new();
        params.insert("limit", "10".to_string());
        assert!(!to_query_string(&params, QueryMode::Count).contains("limit"));
        assert!(to_query_string(&params, QueryMode::Features).contains("limit=10"));
    }

    #[test]
    fn limit_is_capped_and_must_be_positive() {
        assert_eq!(checked_limit(25_000), Ok(MAX_LIMIT));
        assert_eq!(checked_limit(1), Ok(1));
        assert_eq!(checked_limit(0).unwrap_err().field, "limit");
    }

    #[test]
    fn url_uses_mode_endpoint() {
        let base = Url::parse("https://earthquake.usgs.gov/fdsnws/event/1/").unwrap();
        let url = build_url(&base, &EarthquakeFilter::default(), QueryMode::Count, None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://earthquake.usgs.gov/fdsnws/event/1/count?eventtype=earthquake&format=geojson"
        );
    }
}
