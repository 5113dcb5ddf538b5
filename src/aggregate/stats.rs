//! Aggregation queries over the climate measurement dataset.
//!
//! All operations compose polars lazy plans (filter, group_by, agg, rolling,
//! join, sort) and materialize a small `DataFrame` meant for direct plotting.
//! Results are always aligned against a complete key domain (all areas or all
//! years), so callers never have to gap-fill: keys without data appear with
//! null mean/stddev and a station count of zero.

use crate::aggregate::error::AggregateError;
use crate::columns;
use bon::bon;
use log::debug;
use polars::prelude::*;

/// Column holding the per-year value sum while building the running mean.
const VALUE_SUM: &str = "value_sum";
/// Column holding the per-year non-null value count while building the running mean.
const VALUE_COUNT: &str = "value_count";
const WINDOW_SUM: &str = "window_sum";
const WINDOW_COUNT: &str = "window_count";

/// Client for the statistical queries over a measurement dataset.
///
/// Wraps the measurement `LazyFrame` once; every operation clones the logical
/// plan, so a single `ClimateStats` can serve any number of queries. The
/// measurement frame must follow the fixed schema described in [`crate::columns`]:
/// a station id column, an integer `year` column, one or more area-name columns,
/// one or more value columns, and (for [`ClimateStats::anomaly_stats`]) a
/// `pivot_temp` column.
///
/// # Examples
///
/// ```
/// use klimastat::{ClimateStats, columns};
/// use polars::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let measurements = df!(
///     columns::STATION_ID => ["a", "b", "c"],
///     columns::YEAR => [2000i64, 2000, 2000],
///     "state" => [Some("Bayern"), Some("Bayern"), None],
///     columns::TEMPERATURE => [Some(10.0), Some(20.0), Some(99.0)],
/// )?;
/// let areas = df!(columns::AREA => ["Bayern", "Sachsen"])?;
///
/// let stats = ClimateStats::new(measurements.lazy());
/// let out = stats
///     .spatial_stats()
///     .year(2000)
///     .value_col(columns::TEMPERATURE)
///     .area_col("state")
///     .areas(areas.lazy())
///     .call()?;
///
/// // One row per known area; Sachsen has no data and shows 0 stations.
/// assert_eq!(out.height(), 2);
/// # Ok(())
/// # }
/// ```
pub struct ClimateStats {
    measurements: LazyFrame,
}

#[bon]
impl ClimateStats {
    /// Creates a stats client over the given measurement frame.
    pub fn new(measurements: LazyFrame) -> Self {
        Self { measurements }
    }

    /// Mean, sample standard deviation, and station count of `value_col` per
    /// area, for a single `year`.
    ///
    /// Rows with a null area or null value are excluded before grouping. The
    /// result is left-joined onto `areas` (a one-column frame named `area`
    /// listing every legal area name), so areas without measurements appear
    /// with null `mean`/`stddev` and `stations` 0. Areas with a single
    /// measurement keep a null `stddev`.
    ///
    /// # Errors
    ///
    /// Any polars failure (unknown column, join dtype mismatch) propagates as
    /// [`AggregateError`]; the schema is a fixed contract, so these are
    /// configuration errors rather than recoverable conditions.
    #[builder]
    pub fn spatial_stats(
        &self,
        year: i32,
        value_col: &str,
        area_col: &str,
        areas: LazyFrame,
    ) -> Result<DataFrame, AggregateError> {
        debug!("spatial_stats: year={year} value={value_col} area_col={area_col}");
        let grouped = self
            .measurements
            .clone()
            .filter(col(area_col).is_not_null())
            .filter(col(columns::YEAR).eq(lit(year)))
            .filter(col(value_col).is_not_null())
            .group_by([col(area_col)])
            .agg([
                col(value_col).mean().alias(columns::MEAN),
                col(value_col).std(1).alias(columns::STDDEV),
                col(value_col).count().alias(columns::STATIONS),
            ])
            .rename([area_col], [columns::AREA], false);

        areas
            .join(
                grouped,
                [col(columns::AREA)],
                [col(columns::AREA)],
                JoinArgs::new(JoinType::Left),
            )
            .with_column(col(columns::STATIONS).fill_null(lit(0u32)))
            .collect()
            .map_err(|source| AggregateError::Collect {
                operation: "spatial",
                source,
            })
    }

    /// Mean, sample standard deviation, and station count of `value_col` per
    /// year, restricted to one `area`.
    ///
    /// The result is left-joined onto `years` (a one-column frame named `year`
    /// listing the full year domain, same integer dtype as the measurement
    /// year column) and sorted ascending, so every known year appears exactly
    /// once. Years without measurements carry null `mean`/`stddev` and
    /// `stations` 0; the count only reflects non-null values.
    #[builder]
    pub fn temporal_stats(
        &self,
        value_col: &str,
        area: &str,
        area_col: &str,
        years: LazyFrame,
    ) -> Result<DataFrame, AggregateError> {
        debug!("temporal_stats: value={value_col} area={area} area_col={area_col}");
        let grouped = self
            .measurements
            .clone()
            .filter(col(area_col).eq(lit(area)))
            .group_by([col(columns::YEAR)])
            .agg([
                col(value_col).mean().alias(columns::MEAN),
                col(value_col).std(1).alias(columns::STDDEV),
                col(value_col).count().alias(columns::STATIONS),
            ]);

        years
            .join(
                grouped,
                [col(columns::YEAR)],
                [col(columns::YEAR)],
                JoinArgs::new(JoinType::Left),
            )
            .with_column(col(columns::STATIONS).fill_null(lit(0u32)))
            .sort([columns::YEAR], Default::default())
            .collect()
            .map_err(|source| AggregateError::Collect {
                operation: "temporal",
                source,
            })
    }

    /// Trailing running mean of `value_col` per year, restricted to one `area`.
    ///
    /// For each year `Y` present in the data, the running mean averages every
    /// value with a year in `[Y - 6, Y]` for the area. The window is
    /// range-based on the year value, not on a row count: years missing from
    /// the data shrink the window contents rather than pulling older rows in,
    /// and early years simply average over however many years exist so far.
    ///
    /// Years in the `years` domain with no measurement rows at all appear in
    /// the output with a null `running_mean` after the join.
    #[builder]
    pub fn running_mean(
        &self,
        value_col: &str,
        area: &str,
        area_col: &str,
        years: LazyFrame,
    ) -> Result<DataFrame, AggregateError> {
        debug!("running_mean: value={value_col} area={area} area_col={area_col}");
        // Pre-aggregating per year keeps the rolling window one row per year,
        // which sidesteps the per-row dedup the row-level window would need.
        let per_year = self
            .measurements
            .clone()
            .filter(col(area_col).eq(lit(area)))
            .group_by([col(columns::YEAR)])
            .agg([
                col(value_col).sum().alias(VALUE_SUM),
                col(value_col).count().alias(VALUE_COUNT),
            ])
            .sort([columns::YEAR], Default::default());

        let running = per_year
            .rolling(
                col(columns::YEAR),
                Vec::<Expr>::new(),
                RollingGroupOptions {
                    period: Duration::parse("7i"),
                    offset: Duration::parse("-7i"),
                    closed_window: ClosedWindow::Right,
                    ..Default::default()
                },
            )
            .agg([
                col(VALUE_SUM).sum().alias(WINDOW_SUM),
                col(VALUE_COUNT).sum().alias(WINDOW_COUNT),
            ])
            // A window can span only rows whose values are all null; the mean
            // must stay null there, not 0/0.
            .with_column(
                when(col(WINDOW_COUNT).gt(lit(0)))
                    .then(col(WINDOW_SUM) / col(WINDOW_COUNT))
                    .otherwise(lit(NULL))
                    .alias(columns::RUNNING_MEAN),
            )
            .select([col(columns::YEAR), col(columns::RUNNING_MEAN)]);

        years
            .join(
                running,
                [col(columns::YEAR)],
                [col(columns::YEAR)],
                JoinArgs::new(JoinType::Left),
            )
            .sort([columns::YEAR], Default::default())
            .collect()
            .map_err(|source| AggregateError::Collect {
                operation: "running mean",
                source,
            })
    }

    /// Mean, sample standard deviation, and station count of the per-row
    /// temperature anomaly (observed temperature minus the station's pivot
    /// temperature) per year, restricted to one `area`.
    ///
    /// Rows whose station has no pivot temperature yield a null difference and
    /// therefore do not contribute to any aggregate. Output shape and
    /// null/zero semantics match [`ClimateStats::temporal_stats`].
    #[builder]
    pub fn anomaly_stats(
        &self,
        area: &str,
        area_col: &str,
        years: LazyFrame,
    ) -> Result<DataFrame, AggregateError> {
        debug!("anomaly_stats: area={area} area_col={area_col}");
        let grouped = self
            .measurements
            .clone()
            .filter(col(area_col).eq(lit(area)))
            .with_column(
                (col(columns::TEMPERATURE) - col(columns::PIVOT_TEMP)).alias(columns::DIFF),
            )
            .group_by([col(columns::YEAR)])
            .agg([
                col(columns::DIFF).mean().alias(columns::MEAN),
                col(columns::DIFF).std(1).alias(columns::STDDEV),
                col(columns::DIFF).count().alias(columns::STATIONS),
            ]);

        years
            .join(
                grouped,
                [col(columns::YEAR)],
                [col(columns::YEAR)],
                JoinArgs::new(JoinType::Left),
            )
            .with_column(col(columns::STATIONS).fill_null(lit(0u32)))
            .sort([columns::YEAR], Default::default())
            .collect()
            .map_err(|source| AggregateError::Collect {
                operation: "anomaly",
                source,
            })
    }

    /// Per-station reference temperature: the mean temperature over the
    /// inclusive interval `[start_year, end_year]`.
    ///
    /// Returned lazily with columns `station_id` and `pivot_temp`. Stations
    /// without any observation in the interval are absent from the result, so
    /// callers joining it back must treat missing stations as null (see
    /// [`ClimateStats::attach_pivot_means`]).
    #[builder]
    pub fn pivot_means(&self, start_year: i32, end_year: i32) -> LazyFrame {
        self.measurements
            .clone()
            .filter(col(columns::YEAR).gt_eq(lit(start_year)))
            .filter(col(columns::YEAR).lt_eq(lit(end_year)))
            .group_by([col(columns::STATION_ID)])
            .agg([col(columns::TEMPERATURE).mean().alias(columns::PIVOT_TEMP)])
    }

    /// Left-joins the pivot temperatures for `[start_year, end_year]` back
    /// onto the measurements and returns a new client over the result.
    ///
    /// Stations without reference observations get a null `pivot_temp`, which
    /// [`ClimateStats::anomaly_stats`] then skips row by row.
    #[builder]
    pub fn attach_pivot_means(&self, start_year: i32, end_year: i32) -> ClimateStats {
        let pivots = self
            .pivot_means()
            .start_year(start_year)
            .end_year(end_year)
            .call();
        let joined = self.measurements.clone().join(
            pivots,
            [col(columns::STATION_ID)],
            [col(columns::STATION_ID)],
            JoinArgs::new(JoinType::Left),
        );
        ClimateStats::new(joined)
    }
}
