//! Error types for analytics operations

use crate::error::AppError;
use crate::models::LeadId;

/// Result type for analytics operations
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur in analytics operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    /// A record carries a status outside the enumerated set
    #[error("Data integrity error: lead {lead_id} has unknown status '{status}'")]
    DataIntegrity { lead_id: LeadId, status: String },

    /// Time zone name could not be resolved
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    /// Timeline label pattern is not a valid strftime pattern
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    /// Unsupported export format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Export failed
    #[error("Export failed: {0}")]
    ExportFailed(String),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::DataIntegrity { .. } => AppError::DataIntegrity(err.to_string()),
            AnalyticsError::InvalidTimeZone(msg) | AnalyticsError::InvalidDateFormat(msg) => {
                AppError::Configuration(msg)
            }
            AnalyticsError::UnsupportedFormat(msg) => AppError::Validation(msg),
            AnalyticsError::ExportFailed(msg) => AppError::Serialization(msg),
        }
    }
}
