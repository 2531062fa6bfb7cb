//! Lead aggregation engine

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::metrics::{DerivedMetrics, StatusCount, METRICS_SCHEMA_VERSION};
use crate::analytics::rates::RateCalculator;
use crate::analytics::timeline::{BucketZone, TimelineBucketer, DEFAULT_DATE_FORMAT};
use crate::models::{LeadRecord, LeadStatus};
use serde::{Deserialize, Serialize};

/// Configuration for the aggregation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// `local`, `utc` or an IANA zone name
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// strftime pattern for timeline labels
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            date_format: default_date_format(),
        }
    }
}

fn default_time_zone() -> String {
    "local".to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

/// Derives [`DerivedMetrics`] from lead snapshots.
///
/// Holds only its bucketing configuration; every call recomputes from the
/// snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    bucketer: TimelineBucketer,
}

impl AggregationEngine {
    pub fn new(bucketer: TimelineBucketer) -> Self {
        Self { bucketer }
    }

    /// Build from configuration, validating zone and label pattern
    pub fn from_config(config: &AnalyticsConfig) -> AnalyticsResult<Self> {
        let zone: BucketZone = config.time_zone.parse()?;
        let bucketer = TimelineBucketer::new(zone, config.date_format.clone())?;
        Ok(Self::new(bucketer))
    }

    pub fn zone(&self) -> BucketZone {
        self.bucketer.zone()
    }

    /// Aggregate a snapshot.
    ///
    /// Fails as a whole on the first record whose status is outside the
    /// enumeration; no partial metrics are produced.
    pub fn aggregate(&self, records: &[LeadRecord]) -> AnalyticsResult<DerivedMetrics> {
        let mut counts = [0u64; LeadStatus::ALL.len()];
        let mut engaged = 0u64;

        for record in records {
            let status = record.status().ok_or_else(|| AnalyticsError::DataIntegrity {
                lead_id: record.id,
                status: record.status.clone(),
            })?;
            counts[status.index()] += 1;
            if status.is_engaged() {
                engaged += 1;
            }
        }

        let total = records.len() as u64;
        let new_count = counts[LeadStatus::New.index()];
        let contacted_count = counts[LeadStatus::Contacted.index()];
        let converted_count = counts[LeadStatus::Converted.index()];

        let status_distribution = LeadStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: counts[status.index()],
            })
            .collect();

        let timeline = self.bucketer.bucket(records.iter().map(|r| &r.created_at));

        let metrics = DerivedMetrics {
            schema_version: METRICS_SCHEMA_VERSION,
            status_distribution,
            timeline,
            total,
            new_count,
            contacted_count,
            converted_count,
            conversion_rate: RateCalculator::rate(converted_count, total),
            engagement_rate: RateCalculator::rate(engaged, total),
            contact_to_convert_ratio: RateCalculator::ratio(converted_count, contacted_count),
        };

        tracing::debug!(
            total,
            new = new_count,
            contacted = contacted_count,
            converted = converted_count,
            days = metrics.timeline.len(),
            "Aggregated lead snapshot"
        );

        Ok(metrics)
    }
}

/// Aggregate with the default engine (ambient local zone, ISO date labels)
pub fn aggregate(records: &[LeadRecord]) -> AnalyticsResult<DerivedMetrics> {
    AggregationEngine::default().aggregate(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc_engine() -> AggregationEngine {
        AggregationEngine::new(TimelineBucketer::new(BucketZone::Utc, DEFAULT_DATE_FORMAT).unwrap())
    }

    fn record(id: u64, status: &str, day: u32) -> LeadRecord {
        LeadRecord {
            id,
            name: format!("Lead {}", id),
            email: format!("lead{}@example.com", id),
            source: "Website".to_string(),
            status: status.to_string(),
            notes: String::new(),
            created_at: Utc.with_ymd_and_hms(2026, 5, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_analytics_config_default() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.time_zone, "local");
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(AggregationEngine::from_config(&config).unwrap().zone(), BucketZone::Local);
    }

    #[test]
    fn test_from_config_rejects_unknown_zone() {
        let config = AnalyticsConfig {
            time_zone: "Nowhere/Special".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            AggregationEngine::from_config(&config),
            Err(AnalyticsError::InvalidTimeZone(_))
        ));
    }

    #[test]
    fn test_from_config_rejects_time_label_format() {
        let config = AnalyticsConfig {
            time_zone: "utc".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
        };
        assert!(matches!(
            AggregationEngine::from_config(&config),
            Err(AnalyticsError::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn test_single_record() {
        let metrics = utc_engine().aggregate(&[record(1, "Contacted", 2)]).unwrap();
        assert_eq!(metrics.total, 1);
        assert_eq!(metrics.contacted_count, 1);
        assert_eq!(metrics.engagement_rate, 100.0);
        assert_eq!(metrics.conversion_rate, 0.0);
        assert_eq!(metrics.contact_to_convert_ratio, 0.0);
        assert_eq!(metrics.timeline.len(), 1);
    }

    #[test]
    fn test_all_converted_has_zero_ratio_denominator() {
        let records = vec![record(1, "Converted", 1), record(2, "Converted", 1)];
        let metrics = utc_engine().aggregate(&records).unwrap();
        assert_eq!(metrics.conversion_rate, 100.0);
        assert_eq!(metrics.contact_to_convert_ratio, 0.0);
    }

    #[test]
    fn test_invalid_status_names_the_record() {
        let records = vec![record(1, "New", 1), record(9, "Archived", 1)];
        let err = utc_engine().aggregate(&records).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::DataIntegrity {
                lead_id: 9,
                status: "Archived".to_string()
            }
        );
    }
}
