pub mod client;
pub mod config;
pub mod earthquake;
pub mod error;
pub mod filter;
pub mod query;
pub mod requests;
pub mod types;

pub use client::{count, get, HttpTransport, QuakeClient, RawResponse, Transport};
pub use config::QuakeConfig;
pub use earthquake::{Earthquake, EventMetadata};
pub use error::{ParseError, QuakeError, ValidationError};
pub use filter::{
    DepthFilter, Filter, FilterKind, IntensityFilter, LocationFilter, MagnitudeFilter,
    QueryParams, SubFilter, TimeFilter,
};
pub use query::{EarthquakeFilter, FilterOptions};
pub use requests::{to_query_string, QueryMode};

// Re-export key types from the types module if needed directly
pub use types::{convert, DistanceUnit, PagerLevel, Range};
