//! Names of the logical columns shared between the measurement dataset and the
//! aggregation results. The schema is a fixed contract with the data-loading
//! side; operations address columns through these constants only.

/// Unique station identifier.
pub const STATION_ID: &str = "station_id";
/// Calendar year of the measurement (integer column).
pub const YEAR: &str = "year";
/// Area name at the granularity under query, after renaming.
pub const AREA: &str = "area";
/// Observed temperature value.
pub const TEMPERATURE: &str = "temperature";
/// Per-station reference temperature (mean over the pivot interval).
pub const PIVOT_TEMP: &str = "pivot_temp";

/// Mean of the value column within a group.
pub const MEAN: &str = "mean";
/// Sample standard deviation within a group; null when fewer than two values.
pub const STDDEV: &str = "stddev";
/// Number of contributing stations within a group; zero when no data.
pub const STATIONS: &str = "stations";
/// Trailing running mean over the seven-year window ending at the row's year.
pub const RUNNING_MEAN: &str = "running_mean";
/// Per-row difference between the observed value and the station's pivot.
pub const DIFF: &str = "diff";
