//! Daily temperature history and per-row validation
//!
//! Raw archive rows are validated one at a time into either a
//! [`DailyObservation`] or a [`RowRejection`]. Accepted rows are collected into
//! a [`HistorySeries`], which is always sorted by date and holds at most one
//! observation per day.

use crate::TempcastError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One day of observed temperatures in Celsius
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Arithmetic mean of `temp_min` and `temp_max`
    pub temp_mean: f64,
}

impl DailyObservation {
    #[must_use]
    pub fn new(date: NaiveDate, temp_min: f64, temp_max: f64) -> Self {
        Self {
            date,
            temp_min,
            temp_max,
            temp_mean: (temp_min + temp_max) / 2.0,
        }
    }
}

/// Why a raw archive row was dropped
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Maximum temperature was null or absent
    MissingMax,
    /// Minimum temperature was null or absent
    MissingMin,
    /// A temperature was present but not a number
    NonNumeric,
    /// A temperature parsed to NaN or infinity
    NonFinite,
    /// The time axis entry was not a calendar date
    UnparseableDate,
    /// The date fell outside the requested window
    OutsideRange,
    /// An earlier row already covered this date
    DuplicateDate,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::MissingMax => "missing maximum temperature",
            RejectionReason::MissingMin => "missing minimum temperature",
            RejectionReason::NonNumeric => "non-numeric temperature",
            RejectionReason::NonFinite => "non-finite temperature",
            RejectionReason::UnparseableDate => "unparseable date",
            RejectionReason::OutsideRange => "date outside requested range",
            RejectionReason::DuplicateDate => "duplicate date",
        };
        f.write_str(text)
    }
}

/// A raw archive row that did not become an observation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// Index of the row in the archive response
    pub row: usize,
    /// Time axis entry exactly as received
    pub date: String,
    pub reason: RejectionReason,
}

/// Parse a time axis entry. Accepts plain dates and `T`-separated datetimes.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
            .ok()
            .map(|dt| dt.date())
    })
}

/// Read a temperature cell. Numeric strings are accepted the way a lenient
/// numeric coercion would accept them.
fn read_temperature(value: Option<&Value>, missing: RejectionReason) -> Result<f64, RejectionReason> {
    let number = match value {
        None | Some(Value::Null) => return Err(missing),
        Some(Value::Number(n)) => n.as_f64().ok_or(RejectionReason::NonNumeric)?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| RejectionReason::NonNumeric)?,
        Some(_) => return Err(RejectionReason::NonNumeric),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(RejectionReason::NonFinite)
    }
}

/// Validate a single archive row in isolation.
///
/// Range and duplicate checks need the whole window and are done by
/// [`HistoryBuilder`].
pub fn validate_row(
    row: usize,
    time: &str,
    max: Option<&Value>,
    min: Option<&Value>,
) -> Result<DailyObservation, RowRejection> {
    let reject = |reason| RowRejection {
        row,
        date: time.to_string(),
        reason,
    };

    let date = parse_day(time).ok_or_else(|| reject(RejectionReason::UnparseableDate))?;
    let temp_max = read_temperature(max, RejectionReason::MissingMax).map_err(reject)?;
    let temp_min = read_temperature(min, RejectionReason::MissingMin).map_err(reject)?;

    Ok(DailyObservation::new(date, temp_min, temp_max))
}

/// Ordered, duplicate-free series of daily observations
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct HistorySeries {
    observations: Vec<DailyObservation>,
}

impl HistorySeries {
    /// An empty series, the "no data available" signal
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from observations in any order.
    ///
    /// # Errors
    /// Returns a validation error if two observations share a date.
    pub fn from_observations(
        observations: impl IntoIterator<Item = DailyObservation>,
    ) -> crate::Result<Self> {
        let mut by_date = BTreeMap::new();
        for observation in observations {
            if by_date.insert(observation.date, observation).is_some() {
                return Err(TempcastError::validation(format!(
                    "duplicate observation for {}",
                    observation.date
                )));
            }
        }
        Ok(Self {
            observations: by_date.into_values().collect(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    #[must_use]
    pub fn observations(&self) -> &[DailyObservation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyObservation> {
        self.observations.iter()
    }

    /// Earliest date in the series
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    /// Latest date in the series
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Days between `date` and the first date of the series. Negative for
    /// dates before the series starts, `None` for an empty series.
    #[must_use]
    pub fn day_index(&self, date: NaiveDate) -> Option<i64> {
        self.first_date()
            .map(|first| date.signed_duration_since(first).num_days())
    }

    /// `(day_index, temp_mean)` pairs in date order
    pub fn training_points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        let first = self.first_date();
        self.observations.iter().filter_map(move |o| {
            first.map(|first| (o.date.signed_duration_since(first).num_days(), o.temp_mean))
        })
    }
}

impl<'a> IntoIterator for &'a HistorySeries {
    type Item = &'a DailyObservation;
    type IntoIter = std::slice::Iter<'a, DailyObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// A fetched history with an account of every dropped row
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct HistoryReport {
    pub series: HistorySeries,
    pub rejected: Vec<RowRejection>,
}

impl HistoryReport {
    /// Report for a response that carried no daily data at all
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows that were dropped
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.rejected.len()
    }
}

/// Accumulates validated rows for the closed window `[start, end]`
#[derive(Debug)]
pub struct HistoryBuilder {
    start: NaiveDate,
    end: NaiveDate,
    accepted: BTreeMap<NaiveDate, DailyObservation>,
    rejected: Vec<RowRejection>,
}

impl HistoryBuilder {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            accepted: BTreeMap::new(),
            rejected: Vec::new(),
        }
    }

    /// Validate and record one raw row
    pub fn push_row(&mut self, row: usize, time: &str, max: Option<&Value>, min: Option<&Value>) {
        let outcome = validate_row(row, time, max, min).and_then(|observation| {
            let reject = |reason| RowRejection {
                row,
                date: time.to_string(),
                reason,
            };
            if observation.date < self.start || observation.date > self.end {
                Err(reject(RejectionReason::OutsideRange))
            } else if self.accepted.contains_key(&observation.date) {
                Err(reject(RejectionReason::DuplicateDate))
            } else {
                Ok(observation)
            }
        });

        match outcome {
            Ok(observation) => {
                self.accepted.insert(observation.date, observation);
            }
            Err(rejection) => self.rejected.push(rejection),
        }
    }

    #[must_use]
    pub fn finish(self) -> HistoryReport {
        HistoryReport {
            series: HistorySeries {
                observations: self.accepted.into_values().collect(),
            },
            rejected: self.rejected,
        }
    }
}
