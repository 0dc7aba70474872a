use chrono::NaiveDate;
use proptest::prelude::*;
use tui_covid::data::feed::{Feed, RawRow};
use tui_covid::locate::locate;
use tui_covid::names::{normalize_key, AliasTable};
use tui_covid::reshape::{reshape, snapshot, CaseFloor, CaseValue, CountrySeries, Observation};

const COUNTRIES: [&str; 4] = ["Alpha", "Beta", "Gamma", "United States"];
const LABELS: [&str; 6] = ["1/3/21", "1/1/21", "remarks", "1/2/21", "1/10/21", "1/5/21"];

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0u32..100_000).prop_map(|v| v.to_string()),
        1 => Just(String::new()),
        1 => Just("n/a".to_string()),
        1 => Just("-12".to_string()),
        1 => Just("7.5".to_string()),
    ]
}

fn row_strategy() -> impl Strategy<Value = (usize, Vec<String>)> {
    (
        0..COUNTRIES.len(),
        prop::collection::vec(cell_strategy(), 0..=LABELS.len()),
    )
}

fn feed_from(rows: &[(usize, Vec<String>)]) -> Feed {
    let labels = LABELS.iter().map(|s| s.to_string()).collect();
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, (country, cells))| {
            RawRow::new(COUNTRIES[*country], Some(format!("region {i}")), cells.clone())
        })
        .collect();
    Feed::new(labels, rows)
}

fn floor_strategy() -> impl Strategy<Value = CaseFloor> {
    prop_oneof![Just(CaseFloor::Zero), Just(CaseFloor::One)]
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, m, d).unwrap()
}

proptest! {
    #[test]
    fn series_dates_are_strictly_ascending(
        rows in prop::collection::vec(row_strategy(), 1..12),
        floor in floor_strategy(),
    ) {
        let reshaped = reshape(&feed_from(&rows), floor);
        for series in reshaped.series_by_country.values() {
            prop_assert_eq!(series.len(), 5);
            for pair in series.observations().windows(2) {
                prop_assert!(pair[0].date < pair[1].date);
            }
        }
    }

    #[test]
    fn reshape_ignores_row_order(
        (rows, shuffled) in prop::collection::vec(row_strategy(), 1..12)
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle())),
        floor in floor_strategy(),
    ) {
        let a = feed_from(&rows);
        let b = feed_from(&shuffled);

        let (ra, rb) = (reshape(&a, floor), reshape(&b, floor));
        prop_assert_eq!(&ra.series_by_country, &rb.series_by_country);
        prop_assert_eq!(&ra.observations, &rb.observations);

        let (sa, sb) = (snapshot(&a, "1/2/21", floor).unwrap(), snapshot(&b, "1/2/21", floor).unwrap());
        for country in COUNTRIES {
            let key = normalize_key(country);
            prop_assert_eq!(sa.get(&key), sb.get(&key));
        }
    }

    #[test]
    fn sub_regions_sum_per_date(
        rows in prop::collection::vec(row_strategy(), 1..12),
        floor in floor_strategy(),
    ) {
        let feed = feed_from(&rows);
        let reshaped = reshape(&feed, floor);
        let snap = snapshot(&feed, "1/10/21", floor).unwrap();

        for (name, series) in &reshaped.series_by_country {
            let at = series
                .observations()
                .iter()
                .find(|o| o.date == date(1, 10))
                .map(|o| o.cases);
            prop_assert_eq!(at, snap.get(&normalize_key(name)));
        }
    }

    #[test]
    fn locate_returns_earliest_nearest_sample(
        days in prop::collection::btree_set(0i64..200, 1..20),
        query in -20i64..220,
    ) {
        let start = date(1, 1);
        let series = CountrySeries::from_unsorted(
            days.iter()
                .map(|d| Observation::new(start + chrono::Duration::days(*d), *d as u64))
                .collect(),
        );
        let q = start + chrono::Duration::days(query);

        let found = locate(&series, q).unwrap();
        let distance = |o: &Observation| (o.date - q).num_days().abs();
        let best = series.observations().iter().map(distance).min().unwrap();
        let first_best = series
            .observations()
            .iter()
            .position(|o| distance(o) == best)
            .unwrap();

        prop_assert_eq!(found.index(), first_best);
    }

    #[test]
    fn alias_lookup_matches_direct_lookup(cases in 0u64..1_000_000) {
        let feed = Feed::new(
            vec!["1/1/21".to_string()],
            vec![RawRow::new("US", None, vec![cases.to_string()])],
        );
        let snap = snapshot(&feed, "1/1/21", CaseFloor::Zero).unwrap();
        let aliases = AliasTable::builtin();

        prop_assert_eq!(snap.resolve("United States of America", &aliases), CaseValue::Cases(cases));
        prop_assert_eq!(snap.get("US"), Some(cases));
        prop_assert_eq!(snap.resolve("Narnia", &aliases), CaseValue::NoData);
    }
}

#[test]
fn worked_example_tie_goes_to_earlier_sample() {
    let series = CountrySeries::from_unsorted(vec![
        Observation::new(date(1, 1), 100),
        Observation::new(date(1, 2), 150),
        Observation::new(date(1, 4), 300),
    ]);
    let found = locate(&series, date(1, 3)).unwrap();
    assert_eq!(found.observation(), Observation::new(date(1, 2), 150));
}

#[test]
fn two_sub_regions_sum_to_one_observation() {
    let feed = Feed::from_reader(
        "Province/State,Country/Region,Lat,Long,1/1/21\nA,Land,0,0,5\nB,Land,0,0,7\n".as_bytes(),
    )
    .unwrap();
    let reshaped = reshape(&feed, CaseFloor::Zero);
    assert_eq!(
        reshaped.series_by_country["Land"].observations(),
        &[Observation::new(date(1, 1), 12)]
    );
}
