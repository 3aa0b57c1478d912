//! Baseline demand sources: historical aggregation, fixed profiles, and the
//! built-in fallback.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::SimError;
use crate::profile::{HOURS_PER_DAY, HourlyProfile};
use crate::sim::types::BaselineOrigin;

/// Typical day with a quiet night and morning and evening peaks (m³/h).
const FALLBACK_PROFILE: [f64; HOURS_PER_DAY] = [
    10.0, 8.0, 6.0, 5.0, 4.0, 3.0, 3.0, 4.0, 15.0, 25.0, 20.0, 18.0, 16.0, 15.0, 14.0, 16.0, 20.0,
    25.0, 30.0, 28.0, 22.0, 18.0, 14.0, 12.0,
];

/// Timestamp layout of the delivery meter exports.
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// The built-in baseline. Always available.
pub fn fallback_profile() -> HourlyProfile {
    HourlyProfile::from_raw(FALLBACK_PROFILE)
}

/// Supplier of a 24-hour baseline profile.
///
/// Implementations may fail; the simulator decides whether to fall back.
pub trait BaselineSource: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// How results of this source are labelled in simulation output.
    fn origin(&self) -> BaselineOrigin;

    /// Produces the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataUnavailable`] when the data cannot be
    /// obtained.
    fn fetch(&self) -> Result<HourlyProfile, SimError>;
}

/// A profile supplied up front, e.g. from configuration.
#[derive(Debug, Clone)]
pub struct FixedBaseline {
    profile: HourlyProfile,
}

impl FixedBaseline {
    pub fn new(profile: HourlyProfile) -> Self {
        Self { profile }
    }
}

impl BaselineSource for FixedBaseline {
    fn name(&self) -> &str {
        "configured profile"
    }

    fn origin(&self) -> BaselineOrigin {
        BaselineOrigin::Custom
    }

    fn fetch(&self) -> Result<HourlyProfile, SimError> {
        Ok(self.profile)
    }
}

/// Coverage of a loaded delivery history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    /// Date of the earliest usable reading.
    pub first_day: NaiveDate,
    /// Date of the latest usable reading.
    pub last_day: NaiveDate,
    /// Clock hours from the first to the last reading, both included.
    pub hours: u64,
    /// Sum of all usable flow readings (m³).
    pub total_delivery: f64,
}

impl fmt::Display for HistorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} ({} h, {:.1} m3 delivered)",
            self.first_day, self.last_day, self.hours, self.total_delivery
        )
    }
}

/// Historical delivery data in CSV form: `timestamp,outflow_m3`.
///
/// Readings are summed per clock hour. Every clock hour between the first and
/// the last reading counts, with hours lacking readings contributing zero.
/// The baseline for each hour of day is the mean over those hourly sums.
#[derive(Debug, Clone)]
pub struct CsvHistory {
    path: PathBuf,
}

impl CsvHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file into a baseline together with its coverage.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataUnavailable`] if the file cannot be opened or
    /// holds no usable rows.
    pub fn load(&self) -> Result<(HourlyProfile, HistorySummary), SimError> {
        let file = File::open(&self.path).map_err(|e| {
            SimError::DataUnavailable(format!("cannot read \"{}\": {e}", self.path.display()))
        })?;
        Self::summarize_reader(file)
    }

    /// Aggregates delivery readings from any CSV reader into a baseline.
    ///
    /// # Errors
    ///
    /// See [`CsvHistory::summarize_reader`].
    pub fn profile_from_reader(reader: impl Read) -> Result<HourlyProfile, SimError> {
        Self::summarize_reader(reader).map(|(profile, _)| profile)
    }

    /// Aggregates delivery readings into a baseline and reports the covered
    /// date range and total delivery.
    ///
    /// Rows with an unparseable timestamp are skipped; unparseable flow
    /// values count as zero.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataUnavailable`] if the CSV is unreadable or has
    /// no usable rows.
    pub fn summarize_reader(
        reader: impl Read,
    ) -> Result<(HourlyProfile, HistorySummary), SimError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut buckets: BTreeMap<(NaiveDate, u32), f64> = BTreeMap::new();
        let mut skipped = 0_usize;
        for record in rdr.records() {
            let record =
                record.map_err(|e| SimError::DataUnavailable(format!("invalid CSV: {e}")))?;
            let Some(ts) = record
                .get(0)
                .and_then(|raw| NaiveDateTime::parse_from_str(raw, HISTORY_TIMESTAMP_FORMAT).ok())
            else {
                skipped += 1;
                continue;
            };
            let flow = record
                .get(1)
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(0.0);
            *buckets.entry((ts.date(), ts.hour())).or_insert(0.0) += flow;
        }

        if skipped > 0 {
            log::debug!("skipped {skipped} history rows with unparseable timestamps");
        }

        let (Some(first), Some(last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
            return Err(SimError::DataUnavailable(
                "history contains no usable rows".to_string(),
            ));
        };

        let span_hours = (last.0 - first.0).num_days() * HOURS_PER_DAY as i64
            + i64::from(last.1)
            - i64::from(first.1)
            + 1;
        let mut counts = [0_u64; HOURS_PER_DAY];
        for i in 0..span_hours {
            let hour = (i64::from(first.1) + i).rem_euclid(HOURS_PER_DAY as i64) as usize;
            counts[hour] += 1;
        }

        let mut sums = [0.0; HOURS_PER_DAY];
        for ((_, hour), flow) in &buckets {
            sums[*hour as usize] += flow;
        }
        let summary = HistorySummary {
            first_day: first.0,
            last_day: last.0,
            hours: span_hours.unsigned_abs(),
            total_delivery: sums.iter().sum(),
        };

        let means: [Option<f64>; HOURS_PER_DAY] =
            std::array::from_fn(|h| (counts[h] > 0).then(|| sums[h] / counts[h] as f64));

        log::info!("aggregated delivery history: {summary}");
        let profile = HourlyProfile::new(fill_missing_hours(&means))?;
        Ok((profile, summary))
    }
}

impl BaselineSource for CsvHistory {
    fn name(&self) -> &str {
        "csv history"
    }

    fn origin(&self) -> BaselineOrigin {
        BaselineOrigin::History
    }

    fn fetch(&self) -> Result<HourlyProfile, SimError> {
        self.load().map(|(profile, _)| profile)
    }
}

/// Linearly interpolates missing hours between known neighbours.
///
/// Leading and trailing gaps take the nearest known value. At least one
/// value must be present.
fn fill_missing_hours(means: &[Option<f64>; HOURS_PER_DAY]) -> [f64; HOURS_PER_DAY] {
    std::array::from_fn(|h| {
        if let Some(v) = means[h] {
            return v;
        }
        let prev = (0..h).rev().find_map(|i| means[i].map(|v| (i, v)));
        let next = (h + 1..HOURS_PER_DAY).find_map(|i| means[i].map(|v| (i, v)));
        match (prev, next) {
            (Some((i0, v0)), Some((i1, v1))) => {
                v0 + (v1 - v0) * (h - i0) as f64 / (i1 - i0) as f64
            }
            (Some((_, v)), None) | (None, Some((_, v))) => v,
            (None, None) => 0.0,
        }
    })
}

/// Runs another source on a worker thread and gives up after `timeout`.
///
/// One attempt only; a timeout is reported as unavailable data. A worker
/// that outlives its timeout finishes in the background and its result is
/// discarded.
pub struct TimedSource {
    inner: Arc<dyn BaselineSource>,
    timeout: Duration,
}

impl TimedSource {
    pub fn new(inner: Arc<dyn BaselineSource>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl BaselineSource for TimedSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn origin(&self) -> BaselineOrigin {
        self.inner.origin()
    }

    fn fetch(&self) -> Result<HourlyProfile, SimError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name("baseline-fetch".to_string())
            .spawn(move || {
                // receiver may be gone after a timeout
                let _ = tx.send(inner.fetch());
            })
            .map_err(|e| SimError::DataUnavailable(format!("cannot spawn fetch worker: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(SimError::DataUnavailable(format!(
                "{} timed out after {} ms",
                self.inner.name(),
                self.timeout.as_millis()
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SimError::DataUnavailable(format!(
                "{} worker exited without a result",
                self.inner.name()
            ))),
        }
    }
}
