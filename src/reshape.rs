//! Reshaping the wide feed into per-country series and per-date snapshots.

use crate::data::feed::Feed;
use crate::error::{DataError, DataResult};
use crate::names::{normalize_key, AliasTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, BTreeMap, HashMap};

/// Header date format, e.g. `1/22/20`
pub const DATE_FORMAT: &str = "%m/%d/%y";

/// Value substituted for malformed or missing cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFloor {
    Zero,
    /// Used with a logarithmic case axis, which cannot show zero
    One,
}

impl CaseFloor {
    #[inline(always)]
    pub fn value(self) -> u64 {
        match self {
            CaseFloor::Zero => 0,
            CaseFloor::One => 1,
        }
    }
}

/// Parse a column label; anything that is not `M/D/YY` is not a date.
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label.trim(), DATE_FORMAT).ok()
}

/// Parse a case cell. Decimals truncate; empty, negative and garbage cells
/// become the floor.
pub fn parse_cases(cell: Option<&str>, floor: CaseFloor) -> u64 {
    let Some(raw) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return floor.value();
    };
    if let Ok(v) = raw.parse::<u64>() {
        return v;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v.trunc() as u64,
        _ => floor.value(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Observation {
    pub date: NaiveDate,
    pub cases: u64,
}

impl Observation {
    pub fn new(date: NaiveDate, cases: u64) -> Self {
        Self { date, cases }
    }

    /// Cases as a signed value for delta arithmetic, saturating at `i64::MAX`
    pub fn signed_cases(&self) -> i64 {
        i64::try_from(self.cases).unwrap_or(i64::MAX)
    }
}

/// Observations for one country, ascending by date with unique dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountrySeries {
    observations: Vec<Observation>,
}

impl CountrySeries {
    /// Sort by date once, then sum observations that share a date.
    pub fn from_unsorted(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);

        let mut merged: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match merged.last_mut() {
                Some(last) if last.date == obs.date => {
                    last.cases = last.cases.saturating_add(obs.cases);
                }
                _ => merged.push(obs),
            }
        }

        Self {
            observations: merged,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn get(&self, idx: usize) -> Option<&Observation> {
        self.observations.get(idx)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// `cases[idx] - cases[idx - 1]`, zero baseline for the first sample.
    /// Corrections in the feed make this negative; it is not clamped.
    pub fn daily_delta(&self, idx: usize) -> Option<i64> {
        let current = self.observations.get(idx)?.signed_cases();
        let previous = idx
            .checked_sub(1)
            .and_then(|prev| self.observations.get(prev))
            .map_or(0, Observation::signed_cases);
        Some(current.saturating_sub(previous))
    }
}

/// Output of [`reshape`].
#[derive(Debug, Clone, Default)]
pub struct Reshaped {
    /// Every aggregated observation, country-name order then date order
    pub observations: Vec<Observation>,
    /// Keyed by the exact feed name
    pub series_by_country: BTreeMap<String, CountrySeries>,
    /// Distinct parsed dates across the feed, ascending
    pub dates: Vec<NaiveDate>,
    /// Normalized key to feed name; on collision the first name in name order wins
    keys: HashMap<String, String>,
}

impl Reshaped {
    pub fn country_count(&self) -> usize {
        self.series_by_country.len()
    }

    /// Series lookup through the shared normalization, so geometry names
    /// resolve the same way they do against a snapshot.
    pub fn series_for_key(&self, name: &str, aliases: &AliasTable) -> Option<(&str, &CountrySeries)> {
        let feed_name = self.keys.get(&aliases.resolve_key(name))?;
        self.series_by_country
            .get_key_value(feed_name)
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn max_cases(&self) -> u64 {
        self.observations.iter().map(|o| o.cases).max().unwrap_or(0)
    }

    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }
}

/// Parsed date of every value column, `None` for labels that are not dates.
fn parse_columns(feed: &Feed) -> Vec<Option<NaiveDate>> {
    feed.date_labels()
        .iter()
        .map(|label| {
            let date = parse_date_label(label);
            if date.is_none() {
                tracing::debug!(label = %label, "skipping non-date column");
            }
            date
        })
        .collect()
}

/// Group by country, sum sub-regions per date, sort each series by date.
pub fn reshape(feed: &Feed, floor: CaseFloor) -> Reshaped {
    let columns = parse_columns(feed);

    let mut grouped: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();
    for row in feed.rows() {
        let bucket = grouped.entry(row.region.as_str()).or_default();
        for (idx, date) in columns.iter().enumerate() {
            if let Some(date) = date {
                bucket.push(Observation::new(*date, parse_cases(row.cell(idx), floor)));
            }
        }
    }

    let mut observations = Vec::new();
    let mut series_by_country = BTreeMap::new();
    let mut keys = HashMap::new();
    for (country, raw) in grouped {
        let series = CountrySeries::from_unsorted(raw);
        observations.extend_from_slice(series.observations());
        match keys.entry(normalize_key(country)) {
            Entry::Vacant(slot) => {
                slot.insert(country.to_string());
            }
            Entry::Occupied(slot) => tracing::warn!(
                kept = %slot.get(),
                ignored = %country,
                "feed names collide after normalization"
            ),
        }
        series_by_country.insert(country.to_string(), series);
    }

    let mut dates: Vec<NaiveDate> = columns.into_iter().flatten().collect();
    dates.sort_unstable();
    dates.dedup();

    tracing::info!(
        countries = series_by_country.len(),
        observations = observations.len(),
        dates = dates.len(),
        "reshaped case feed"
    );

    Reshaped {
        observations,
        series_by_country,
        dates,
        keys,
    }
}

/// Map coloring value for one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseValue {
    Cases(u64),
    /// No feed record matched the geometry, as opposed to zero cases
    NoData,
}

impl CaseValue {
    pub fn cases(self) -> Option<u64> {
        match self {
            CaseValue::Cases(v) => Some(v),
            CaseValue::NoData => None,
        }
    }
}

/// Per-country totals for one date.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub label: String,
    values: HashMap<String, u64>,
}

impl Snapshot {
    /// Value by normalized feed key
    pub fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    /// Value for a geometry name, through the alias table
    pub fn resolve(&self, geometry_name: &str, aliases: &AliasTable) -> CaseValue {
        match self.get(&aliases.resolve_key(geometry_name)) {
            Some(v) => CaseValue::Cases(v),
            None => CaseValue::NoData,
        }
    }

    pub fn max_value(&self) -> u64 {
        self.values.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolve a date label to its date: exact label first, then parsed-date
/// equality, so `01/01/21` finds `1/1/21`.
fn find_date(feed: &Feed, target: &str) -> Option<NaiveDate> {
    let labels = feed.date_labels();
    match labels.iter().find(|l| *l == target.trim()) {
        Some(label) => parse_date_label(label),
        None => {
            let wanted = parse_date_label(target)?;
            labels
                .iter()
                .any(|l| parse_date_label(l) == Some(wanted))
                .then_some(wanted)
        }
    }
}

/// Sum each country's rows on the target date. Every column parsing to that
/// date contributes, the same way [`reshape`] merges them.
pub fn snapshot(feed: &Feed, target_date: &str, floor: CaseFloor) -> DataResult<Snapshot> {
    let date = find_date(feed, target_date).ok_or_else(|| DataError::UnknownDate(target_date.to_string()))?;
    let columns: Vec<usize> = feed
        .date_labels()
        .iter()
        .enumerate()
        .filter(|(_, label)| parse_date_label(label) == Some(date))
        .map(|(idx, _)| idx)
        .collect();
    let label = columns
        .first()
        .map(|&idx| feed.date_labels()[idx].clone())
        .ok_or_else(|| DataError::UnknownDate(target_date.to_string()))?;

    let mut values: HashMap<String, u64> = HashMap::new();
    for row in feed.rows() {
        let total = values.entry(normalize_key(&row.region)).or_insert(0);
        for &column in &columns {
            *total = total.saturating_add(parse_cases(row.cell(column), floor));
        }
    }

    Ok(Snapshot {
        date,
        label,
        values,
    })
}

/// Label in the feed's own format for a date
pub fn format_date_label(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}/{}/{:02}", date.month(), date.day(), date.year() % 100)
}
