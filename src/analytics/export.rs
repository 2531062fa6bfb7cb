//! Metrics export formats

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::metrics::DerivedMetrics;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Export format for derived metrics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(AnalyticsError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Renders [`DerivedMetrics`] for files and downloads
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics to bytes in the given format
    pub fn export(metrics: &DerivedMetrics, format: ExportFormat) -> AnalyticsResult<Vec<u8>> {
        match format {
            ExportFormat::Json => Self::export_json(metrics),
            ExportFormat::Csv => Ok(Self::export_csv(metrics).into_bytes()),
        }
    }

    fn export_json(metrics: &DerivedMetrics) -> AnalyticsResult<Vec<u8>> {
        serde_json::to_vec_pretty(metrics)
            .map_err(|e| AnalyticsError::ExportFailed(format!("JSON serialization failed: {}", e)))
    }

    /// Three blocks: totals and rates, status distribution, timeline
    fn export_csv(metrics: &DerivedMetrics) -> String {
        let mut csv = String::new();

        csv.push_str("Metric,Value\n");
        let rows = [
            ("schema_version", metrics.schema_version.to_string()),
            ("total", metrics.total.to_string()),
            ("new_count", metrics.new_count.to_string()),
            ("contacted_count", metrics.contacted_count.to_string()),
            ("converted_count", metrics.converted_count.to_string()),
            ("conversion_rate", format!("{:.1}", metrics.conversion_rate)),
            ("engagement_rate", format!("{:.1}", metrics.engagement_rate)),
            (
                "contact_to_convert_ratio",
                format!("{:.2}", metrics.contact_to_convert_ratio),
            ),
        ];
        for (key, value) in rows {
            push_row(&mut csv, key, &value);
        }

        csv.push('\n');
        csv.push_str("Status,Count\n");
        for entry in &metrics.status_distribution {
            push_row(&mut csv, entry.status.as_ref(), &entry.count.to_string());
        }

        csv.push('\n');
        csv.push_str("Date,Count\n");
        for bucket in &metrics.timeline {
            push_row(&mut csv, &bucket.label, &bucket.count.to_string());
        }

        csv
    }
}

fn push_row(csv: &mut String, key: &str, value: &str) {
    csv.push_str(&format!("\"{}\",\"{}\"\n", escape_csv(key), escape_csv(value)));
}

/// Escape CSV special characters
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
