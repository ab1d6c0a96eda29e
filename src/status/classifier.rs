//! Dataset classification
//!
//! Pure transforms over the fetched records. `classify` tags every record
//! with freshness and completeness severities against a single reference
//! instant; the remaining functions derive the views the dashboard shows.

use std::collections::BTreeSet;

use super::types::{DataStatus, DatasetRecord, GroupField, RawRecord, Severity};

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Upper age bounds for `created-status`, evaluated in order
const CREATED_THRESHOLDS: [(i64, Severity); 3] = [
    (6 * HOUR_MS, Severity::Fresh),
    (12 * HOUR_MS, Severity::Warn),
    (24 * HOUR_MS, Severity::Stale),
];

/// Upper age bounds for `time-coverage-status`, evaluated in order
const COVERAGE_THRESHOLDS: [(i64, Severity); 4] = [
    (12 * HOUR_MS, Severity::Fresh),
    (24 * HOUR_MS, Severity::Warn),
    (36 * HOUR_MS, Severity::Stale),
    (72 * HOUR_MS, Severity::Info),
];

/// Default number of rows in the latest-updates view
pub const LATEST_LIMIT: usize = 15;

/// First threshold whose bound exceeds `age` wins
fn first_match(age: i64, thresholds: &[(i64, Severity)]) -> Option<Severity> {
    thresholds
        .iter()
        .find(|(bound, _)| age < *bound)
        .map(|(_, severity)| *severity)
}

/// Severity of a record's creation time; anything older than a day is stale
pub fn created_status(created: Option<i64>, now_ms: i64) -> Option<Severity> {
    created.map(|ts| {
        first_match(now_ms.saturating_sub(ts), &CREATED_THRESHOLDS).unwrap_or(Severity::Stale)
    })
}

/// Severity of a record's time coverage end
pub fn time_coverage_status(end: Option<i64>, now_ms: i64) -> Option<Severity> {
    end.map(|ts| {
        first_match(now_ms.saturating_sub(ts), &COVERAGE_THRESHOLDS).unwrap_or(Severity::Dormant)
    })
}

/// Degraded when either downstream endpoint is missing
pub fn data_status(record: &RawRecord) -> Option<DataStatus> {
    record.is_incomplete().then_some(DataStatus::Degraded)
}

/// Tag every record against the same reference instant
pub fn classify(records: &[RawRecord], now_ms: i64) -> Vec<DatasetRecord> {
    records
        .iter()
        .map(|raw| DatasetRecord {
            created_status: created_status(raw.created, now_ms),
            time_coverage_status: time_coverage_status(raw.end, now_ms),
            data_status: data_status(raw),
            raw: raw.clone(),
        })
        .collect()
}

/// Stable sort by lowercase name
pub fn sort_by_name(records: &mut [DatasetRecord]) {
    records.sort_by_cached_key(|r| r.raw.name.to_lowercase());
}

/// Records with a degraded data status
pub fn incomplete(records: &[DatasetRecord]) -> Vec<DatasetRecord> {
    records.iter().filter(|r| r.is_degraded()).cloned().collect()
}

/// Most recent `end` first, records without an end last, at most `limit`
pub fn latest_updated(records: &[DatasetRecord], limit: usize) -> Vec<DatasetRecord> {
    let mut sorted: Vec<DatasetRecord> = records.to_vec();
    sorted.sort_by(|a, b| match (a.raw.end, b.raw.end) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted.truncate(limit);
    sorted
}

/// Unique non-null values of a group field in ascending order
pub fn distinct_group_values(records: &[DatasetRecord], field: GroupField) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.raw.group_value(field))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Records whose group field equals `value` exactly
///
/// An empty result is meaningful to callers: the dashboard treats it as a
/// no-op rather than clearing the current view.
pub fn filter_by_field(
    records: &[DatasetRecord],
    field: GroupField,
    value: &str,
) -> Vec<DatasetRecord> {
    records
        .iter()
        .filter(|r| r.raw.group_value(field) == Some(value))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_704_470_400_000;

    fn hours_ago(h: i64) -> i64 {
        NOW - h * HOUR_MS
    }

    fn record(name: &str) -> RawRecord {
        RawRecord::new(name).endpoints("tds", "tabledap")
    }

    #[test]
    fn test_created_status_thresholds() {
        assert_eq!(created_status(Some(hours_ago(0)), NOW), Some(Severity::Fresh));
        assert_eq!(created_status(Some(NOW - 6 * HOUR_MS + 1), NOW), Some(Severity::Fresh));
        assert_eq!(created_status(Some(hours_ago(6)), NOW), Some(Severity::Warn));
        assert_eq!(created_status(Some(hours_ago(11)), NOW), Some(Severity::Warn));
        assert_eq!(created_status(Some(hours_ago(12)), NOW), Some(Severity::Stale));
        assert_eq!(created_status(Some(hours_ago(23)), NOW), Some(Severity::Stale));
        assert_eq!(created_status(Some(hours_ago(24 * 30)), NOW), Some(Severity::Stale));
        assert_eq!(created_status(None, NOW), None);
    }

    #[test]
    fn test_time_coverage_thresholds() {
        assert_eq!(time_coverage_status(Some(hours_ago(1)), NOW), Some(Severity::Fresh));
        assert_eq!(time_coverage_status(Some(hours_ago(12)), NOW), Some(Severity::Warn));
        assert_eq!(time_coverage_status(Some(hours_ago(24)), NOW), Some(Severity::Stale));
        assert_eq!(time_coverage_status(Some(hours_ago(36)), NOW), Some(Severity::Info));
        assert_eq!(time_coverage_status(Some(hours_ago(71)), NOW), Some(Severity::Info));
        assert_eq!(time_coverage_status(Some(hours_ago(72)), NOW), Some(Severity::Dormant));
        assert_eq!(time_coverage_status(None, NOW), None);
    }

    #[test]
    fn test_future_timestamps_are_fresh() {
        assert_eq!(created_status(Some(NOW + HOUR_MS), NOW), Some(Severity::Fresh));
        assert_eq!(time_coverage_status(Some(NOW + HOUR_MS), NOW), Some(Severity::Fresh));
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"name": "bad-clock", "created": -1e300, "end": 1e300, "tds": "t", "tabledap": "e"}"#,
        )
        .unwrap();
        assert_eq!(raw.created, Some(i64::MIN));

        let records = classify(&[raw], NOW);
        assert_eq!(records[0].created_status, Some(Severity::Stale));
        assert_eq!(records[0].time_coverage_status, Some(Severity::Fresh));

        assert_eq!(created_status(Some(i64::MAX), i64::MIN), Some(Severity::Fresh));
        assert_eq!(time_coverage_status(Some(i64::MIN), i64::MAX), Some(Severity::Dormant));
    }

    #[test]
    fn test_data_status_requires_both_endpoints() {
        let complete = record("a");
        let mut no_tds = record("b");
        no_tds.tds = None;
        let mut no_erddap = record("c");
        no_erddap.tabledap = None;

        assert_eq!(data_status(&complete), None);
        assert_eq!(data_status(&no_tds), Some(DataStatus::Degraded));
        assert_eq!(data_status(&no_erddap), Some(DataStatus::Degraded));
        assert_eq!(data_status(&RawRecord::new("d")), Some(DataStatus::Degraded));
    }

    #[test]
    fn test_classify_seven_hour_scenario() {
        let created = NOW - 7 * HOUR_MS;
        let mut missing_tds = record("glider-b").created(created);
        missing_tds.tds = None;
        let raw = vec![
            record("glider-a").created(created),
            missing_tds,
            record("glider-c"),
        ];

        let classified = classify(&raw, NOW);

        assert_eq!(classified[0].created_status, Some(Severity::Warn));
        assert_eq!(classified[2].created_status, None);
        assert_eq!(incomplete(&classified).len(), 1);
        assert_eq!(incomplete(&classified)[0].name(), "glider-b");
    }

    #[test]
    fn test_classify_does_not_mutate_input() {
        let raw = vec![record("a").created(hours_ago(1))];
        let before = raw.clone();
        let _ = classify(&raw, NOW);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_incomplete_is_idempotent_subset() {
        let mut partial = record("b");
        partial.tabledap = None;
        let classified = classify(&[record("a"), partial, RawRecord::new("c")], NOW);

        let once = incomplete(&classified);
        let twice = incomplete(&once);

        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
        assert!(once.iter().all(|r| classified.contains(r) && r.is_degraded()));
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut classified = classify(
            &[record("sg501"), record("Amelia"), record("ru29"), record("blue")],
            NOW,
        );
        sort_by_name(&mut classified);

        let names: Vec<&str> = classified.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Amelia", "blue", "ru29", "sg501"]);
    }

    #[test]
    fn test_latest_updated_orders_by_end_with_nulls_last() {
        let classified = classify(
            &[
                record("old").coverage(hours_ago(100), hours_ago(50)),
                record("none"),
                record("new").coverage(hours_ago(10), hours_ago(1)),
                record("mid").coverage(hours_ago(30), hours_ago(20)),
            ],
            NOW,
        );

        let latest = latest_updated(&classified, LATEST_LIMIT);
        let names: Vec<&str> = latest.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["new", "mid", "old", "none"]);
    }

    #[test]
    fn test_latest_updated_respects_limit() {
        let raw: Vec<RawRecord> = (0..40)
            .map(|i| record(&format!("glider-{:02}", i)).coverage(hours_ago(100), hours_ago(i)))
            .collect();
        let classified = classify(&raw, NOW);

        let latest = latest_updated(&classified, LATEST_LIMIT);
        assert_eq!(latest.len(), 15);
        assert!(latest
            .windows(2)
            .all(|w| w[0].raw.end >= w[1].raw.end));
        assert!(latest.iter().all(|r| classified.contains(r)));
    }

    #[test]
    fn test_latest_updated_is_stable_for_ties() {
        let end = hours_ago(3);
        let classified = classify(
            &[
                record("a").coverage(hours_ago(9), end),
                record("b").coverage(hours_ago(9), end),
                record("c").coverage(hours_ago(9), end),
            ],
            NOW,
        );
        let names: Vec<String> = latest_updated(&classified, 2)
            .into_iter()
            .map(|r| r.raw.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_distinct_group_values() {
        let classified = classify(
            &[
                record("a").group(GroupField::Institution, "Rutgers"),
                record("b").group(GroupField::Institution, "rutgers"),
                record("c").group(GroupField::Institution, "Rutgers"),
                record("d"),
                record("e").group(GroupField::Institution, "NAVO"),
            ],
            NOW,
        );

        let values = distinct_group_values(&classified, GroupField::Institution);
        assert_eq!(values, vec!["NAVO", "Rutgers", "rutgers"]);
        assert!(values.len() <= classified.len());
        assert!(distinct_group_values(&classified, GroupField::WmoId).is_empty());
    }

    #[test]
    fn test_filter_by_field_exact_match() {
        let classified = classify(
            &[
                record("a").group(GroupField::Provider, "usf"),
                record("b").group(GroupField::Provider, "USF"),
                record("c").group(GroupField::Provider, "usf"),
            ],
            NOW,
        );

        let matched = filter_by_field(&classified, GroupField::Provider, "usf");
        assert_eq!(matched.len(), 2);
        assert!(filter_by_field(&classified, GroupField::Provider, "us").is_empty());
        assert!(filter_by_field(&classified, GroupField::Operator, "usf").is_empty());
    }
}
