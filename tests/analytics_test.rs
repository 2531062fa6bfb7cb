//! Aggregation behavior over whole snapshots

use chrono::{DateTime, Duration, TimeZone, Utc};
use lead_tracker::analytics::*;
use lead_tracker::models::{LeadRecord, LeadStatus, DEFAULT_SOURCE};

fn lead(id: u64, status: &str, created_at: DateTime<Utc>) -> LeadRecord {
    LeadRecord {
        id,
        name: format!("Lead {}", id),
        email: format!("lead{}@example.com", id),
        source: DEFAULT_SOURCE.to_string(),
        status: status.to_string(),
        notes: String::new(),
        created_at,
    }
}

fn noon(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

fn utc_engine() -> AggregationEngine {
    AggregationEngine::new(TimelineBucketer::new(BucketZone::Utc, DEFAULT_DATE_FORMAT).unwrap())
}

/// 4 New, 3 Contacted, 3 Converted spread over two days
fn mixed_snapshot() -> Vec<LeadRecord> {
    let statuses = [
        "New", "New", "New", "New", "Contacted", "Contacted", "Contacted", "Converted",
        "Converted", "Converted",
    ];
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| lead(i as u64 + 1, status, noon(1 + (i as u32 % 2))))
        .collect()
}

#[test]
fn test_empty_snapshot() {
    let metrics = utc_engine().aggregate(&[]).unwrap();

    assert_eq!(metrics.total, 0);
    assert_eq!(metrics.conversion_rate, 0.0);
    assert_eq!(metrics.engagement_rate, 0.0);
    assert_eq!(metrics.contact_to_convert_ratio, 0.0);
    assert!(metrics.timeline.is_empty());

    let listed: Vec<_> = metrics.status_distribution.iter().map(|s| s.status).collect();
    assert_eq!(listed, LeadStatus::ALL.to_vec());
    assert!(metrics.status_distribution.iter().all(|s| s.count == 0));
    assert_eq!(metrics, DerivedMetrics::default());
}

#[test]
fn test_counts_partition_total() {
    let metrics = utc_engine().aggregate(&mixed_snapshot()).unwrap();

    assert_eq!(metrics.total, 10);
    assert_eq!(
        metrics.new_count + metrics.contacted_count + metrics.converted_count,
        metrics.total
    );
    for entry in &metrics.status_distribution {
        assert_eq!(entry.count, metrics.count_for(entry.status));
    }
}

#[test]
fn test_reference_rates() {
    let metrics = utc_engine().aggregate(&mixed_snapshot()).unwrap();

    assert_eq!(metrics.new_count, 4);
    assert_eq!(metrics.contacted_count, 3);
    assert_eq!(metrics.converted_count, 3);
    assert_eq!(metrics.conversion_rate, 30.0);
    assert_eq!(metrics.engagement_rate, 60.0);
    assert_eq!(metrics.contact_to_convert_ratio, 1.0);
}

#[test]
fn test_aggregate_is_idempotent() {
    let snapshot = mixed_snapshot();
    let engine = utc_engine();

    let first = engine.aggregate(&snapshot).unwrap();
    let second = engine.aggregate(&snapshot).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_same_day_collapses_to_one_bucket() {
    let base = Utc.with_ymd_and_hms(2026, 3, 5, 0, 30, 0).unwrap();
    let snapshot: Vec<_> = (0..5)
        .map(|i| lead(i + 1, "New", base + Duration::hours(i as i64 * 4)))
        .collect();

    let metrics = utc_engine().aggregate(&snapshot).unwrap();
    assert_eq!(metrics.timeline.len(), 1);
    assert_eq!(metrics.timeline[0].count, 5);
    assert_eq!(metrics.timeline[0].label, "2026-03-05");
}

#[test]
fn test_three_days_keep_chronological_order() {
    let snapshot = vec![
        lead(1, "New", noon(1)),
        lead(2, "Contacted", noon(2)),
        lead(3, "New", noon(2)),
        lead(4, "Converted", noon(3)),
    ];

    let metrics = utc_engine().aggregate(&snapshot).unwrap();
    let labels: Vec<_> = metrics.timeline.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2026-03-01", "2026-03-02", "2026-03-03"]);
    let counts: Vec<_> = metrics.timeline.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 2, 1]);
}

#[test]
fn test_newest_first_snapshot_gives_newest_first_timeline() {
    let snapshot = vec![
        lead(3, "New", noon(3)),
        lead(2, "New", noon(2)),
        lead(1, "New", noon(1)),
    ];

    let metrics = utc_engine().aggregate(&snapshot).unwrap();
    let labels: Vec<_> = metrics.timeline.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2026-03-03", "2026-03-02", "2026-03-01"]);
}

#[test]
fn test_bucket_zone_changes_grouping() {
    // same UTC day; 15:30 and 01:30 next day in Kolkata (+05:30)
    let snapshot = vec![
        lead(1, "New", Utc.with_ymd_and_hms(2026, 3, 5, 10, 0, 0).unwrap()),
        lead(2, "New", Utc.with_ymd_and_hms(2026, 3, 5, 20, 0, 0).unwrap()),
    ];

    let utc = utc_engine().aggregate(&snapshot).unwrap();
    assert_eq!(utc.timeline.len(), 1);

    let kolkata = AggregationEngine::new(
        TimelineBucketer::new("Asia/Kolkata".parse().unwrap(), DEFAULT_DATE_FORMAT).unwrap(),
    )
    .aggregate(&snapshot)
    .unwrap();
    let labels: Vec<_> = kolkata.timeline.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["2026-03-05", "2026-03-06"]);
}

#[test]
fn test_unknown_status_fails_whole_snapshot() {
    let mut snapshot = mixed_snapshot();
    snapshot.push(lead(77, "Archived", noon(4)));

    let err = utc_engine().aggregate(&snapshot).unwrap_err();
    assert_eq!(
        err,
        AnalyticsError::DataIntegrity {
            lead_id: 77,
            status: "Archived".to_string(),
        }
    );
    assert!(err.to_string().contains("77"));
}

#[test]
fn test_status_matching_is_case_sensitive() {
    let snapshot = vec![lead(5, "converted", noon(1))];
    assert!(matches!(
        utc_engine().aggregate(&snapshot),
        Err(AnalyticsError::DataIntegrity { lead_id: 5, .. })
    ));
}

#[test]
fn test_zero_rate_denominators() {
    assert_eq!(RateCalculator::rate(0, 0), 0.0);
    assert_eq!(RateCalculator::rate(12, 0), 0.0);
    assert_eq!(RateCalculator::ratio(5, 0), 0.0);

    let only_new = vec![lead(1, "New", noon(1)), lead(2, "New", noon(1))];
    let metrics = utc_engine().aggregate(&only_new).unwrap();
    assert_eq!(metrics.contact_to_convert_ratio, 0.0);
    assert_eq!(metrics.engagement_rate, 0.0);
}

#[test]
fn test_csv_export_of_aggregate() {
    let metrics = utc_engine().aggregate(&mixed_snapshot()).unwrap();
    let csv = String::from_utf8(MetricsExporter::export(&metrics, ExportFormat::Csv).unwrap())
        .unwrap();

    assert!(csv.contains("\"conversion_rate\",\"30.0\""));
    assert!(csv.contains("Status,Count"));
    assert!(csv.contains("\"Contacted\",\"3\""));
    assert!(csv.contains("Date,Count"));
    assert!(csv.contains("\"2026-03-01\",\"5\""));
}

#[test]
fn test_json_snapshot_round_trip_through_engine() {
    let raw = r#"[
        {"id": 1, "name": "Ada", "email": "ada@example.com", "status": "Contacted",
         "created_at": "2026-03-01T09:00:00Z"},
        {"id": 2, "name": "Grace", "email": "grace@example.com", "source": "Referral",
         "status": "Converted", "notes": "signed", "created_at": "2026-03-01T15:00:00Z"}
    ]"#;
    let records: Vec<LeadRecord> = serde_json::from_str(raw).unwrap();
    assert_eq!(records[0].source, DEFAULT_SOURCE);

    let metrics = utc_engine().aggregate(&records).unwrap();
    assert_eq!(metrics.engagement_rate, 100.0);
    assert_eq!(metrics.contact_to_convert_ratio, 1.0);
}
