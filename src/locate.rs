//! Nearest-sample lookup driving the chart tooltip.

use crate::error::{DataError, DataResult};
use crate::reshape::{CountrySeries, Observation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which value a located sample reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cumulative,
    Daily,
}

impl Metric {
    pub fn toggle(self) -> Self {
        match self {
            Metric::Cumulative => Metric::Daily,
            Metric::Daily => Metric::Cumulative,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Cumulative => "cumulative",
            Metric::Daily => "daily",
        }
    }
}

/// A sample found by [`locate`], still tied to its series so the daily
/// delta can be derived.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    series: &'a CountrySeries,
    index: usize,
}

impl<'a> Located<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn observation(&self) -> Observation {
        self.series.observations()[self.index]
    }

    /// Change from the preceding sample (zero baseline at the start)
    pub fn daily_delta(&self) -> i64 {
        self.series.daily_delta(self.index).unwrap_or(0)
    }

    pub fn value(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Cumulative => self.observation().signed_cases(),
            Metric::Daily => self.daily_delta(),
        }
    }
}

/// Sample nearest to `query`. Ties go to the earlier sample; queries past
/// either end return the boundary sample.
pub fn locate(series: &CountrySeries, query: NaiveDate) -> DataResult<Located<'_>> {
    let observations = series.observations();
    if observations.is_empty() {
        return Err(DataError::EmptySeries);
    }

    let insertion = observations.partition_point(|o| o.date < query);
    let before = insertion.checked_sub(1);
    let after = (insertion < observations.len()).then_some(insertion);

    let index = match (before, after) {
        (Some(b), Some(a)) => {
            let to_before = query - observations[b].date;
            let to_after = observations[a].date - query;
            if to_after < to_before {
                a
            } else {
                b
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return Err(DataError::EmptySeries),
    };

    Ok(Located { series, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, d).unwrap()
    }

    fn series() -> CountrySeries {
        CountrySeries::from_unsorted(vec![
            Observation::new(date(1, 1), 100),
            Observation::new(date(1, 2), 150),
            Observation::new(date(1, 4), 300),
        ])
    }

    #[test]
    fn test_midpoint_tie_returns_earlier() {
        let s = series();
        let found = locate(&s, date(1, 3)).unwrap();
        assert_eq!(found.observation(), Observation::new(date(1, 2), 150));
    }

    #[test]
    fn test_exact_match() {
        let s = series();
        assert_eq!(locate(&s, date(1, 4)).unwrap().index(), 2);
        assert_eq!(locate(&s, date(1, 1)).unwrap().index(), 0);
    }

    #[test]
    fn test_strictly_closer_after_wins() {
        let s = CountrySeries::from_unsorted(vec![
            Observation::new(date(1, 1), 1),
            Observation::new(date(1, 5), 2),
        ]);
        assert_eq!(locate(&s, date(1, 4)).unwrap().index(), 1);
        assert_eq!(locate(&s, date(1, 3)).unwrap().index(), 0);
        assert_eq!(locate(&s, date(1, 2)).unwrap().index(), 0);
    }

    #[test]
    fn test_boundaries() {
        let s = series();
        assert_eq!(locate(&s, date(1, 1).pred_opt().unwrap()).unwrap().index(), 0);
        assert_eq!(locate(&s, date(6, 1)).unwrap().index(), 2);
    }

    #[test]
    fn test_single_sample() {
        let s = CountrySeries::from_unsorted(vec![Observation::new(date(3, 3), 9)]);
        assert_eq!(locate(&s, date(1, 1)).unwrap().index(), 0);
        assert_eq!(locate(&s, date(9, 9)).unwrap().index(), 0);
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let s = CountrySeries::default();
        assert!(matches!(locate(&s, date(1, 1)), Err(DataError::EmptySeries)));
    }

    #[test]
    fn test_daily_metric() {
        let s = series();
        let found = locate(&s, date(1, 4)).unwrap();
        assert_eq!(found.value(Metric::Cumulative), 300);
        assert_eq!(found.value(Metric::Daily), 150);

        let first = locate(&s, date(1, 1)).unwrap();
        assert_eq!(first.value(Metric::Daily), 100);
    }

    #[test]
    fn test_negative_delta_is_not_clamped() {
        let s = CountrySeries::from_unsorted(vec![
            Observation::new(date(1, 1), 500),
            Observation::new(date(1, 2), 480),
        ]);
        let found = locate(&s, date(1, 2)).unwrap();
        assert_eq!(found.daily_delta(), -20);
    }

    #[test]
    fn test_huge_counts_stay_non_negative() {
        let s = CountrySeries::from_unsorted(vec![
            Observation::new(date(1, 1), 1),
            Observation::new(date(1, 2), 1 << 63),
        ]);
        let found = locate(&s, date(1, 2)).unwrap();
        assert_eq!(found.value(Metric::Cumulative), i64::MAX);
        assert_eq!(found.value(Metric::Daily), i64::MAX - 1);
    }
}
