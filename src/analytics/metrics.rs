//! Derived lead metrics

use crate::analytics::timeline::TimelineBucket;
use crate::models::LeadStatus;
use serde::{Deserialize, Serialize};

/// Version of the [`DerivedMetrics`] layout
pub const METRICS_SCHEMA_VERSION: u32 = 1;

/// Count of leads in one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: LeadStatus,
    pub count: u64,
}

/// Metrics derived from one lead snapshot.
///
/// Produced fresh by every aggregation and replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub schema_version: u32,

    /// Always `New`, `Contacted`, `Converted`, zero counts included
    pub status_distribution: Vec<StatusCount>,

    /// One bucket per calendar day with at least one lead
    pub timeline: Vec<TimelineBucket>,

    pub total: u64,
    pub new_count: u64,
    pub contacted_count: u64,
    pub converted_count: u64,

    /// Converted over total (percentage, one decimal)
    pub conversion_rate: f64,

    /// Contacted or converted over total (percentage, one decimal)
    pub engagement_rate: f64,

    /// Converted over contacted (two decimals)
    pub contact_to_convert_ratio: f64,
}

impl DerivedMetrics {
    /// Count recorded for `status`
    pub fn count_for(&self, status: LeadStatus) -> u64 {
        match status {
            LeadStatus::New => self.new_count,
            LeadStatus::Contacted => self.contacted_count,
            LeadStatus::Converted => self.converted_count,
        }
    }

    /// One-line operator summary
    pub fn summary(&self) -> String {
        format!(
            "{} leads: {} new, {} contacted, {} converted ({:.1}% conversion, {:.1}% engagement)",
            self.total,
            self.new_count,
            self.contacted_count,
            self.converted_count,
            self.conversion_rate,
            self.engagement_rate
        )
    }
}

impl Default for DerivedMetrics {
    fn default() -> Self {
        Self {
            schema_version: METRICS_SCHEMA_VERSION,
            status_distribution: LeadStatus::ALL
                .iter()
                .map(|&status| StatusCount { status, count: 0 })
                .collect(),
            timeline: Vec::new(),
            total: 0,
            new_count: 0,
            contacted_count: 0,
            converted_count: 0,
            conversion_rate: 0.0,
            engagement_rate: 0.0,
            contact_to_convert_ratio: 0.0,
        }
    }
}
