//! Lead aggregation engine
//!
//! Turns a snapshot of lead records into a [`DerivedMetrics`] value: a status
//! distribution, a calendar-day acquisition timeline, and the conversion,
//! engagement and contact-to-convert figures.
//!
//! # Guarantees
//!
//! - **Pure**: output depends only on the snapshot and the engine's zone and
//!   label settings; there is no cache and no incremental path
//! - **Total**: empty or single-status snapshots produce zero-valued rates,
//!   never a division artifact
//! - **Strict**: a record with a status outside `New | Contacted | Converted`
//!   fails the whole call with [`AnalyticsError::DataIntegrity`]
//!
//! # Example
//!
//! ```no_run
//! use lead_tracker::analytics::{AggregationEngine, BucketZone, TimelineBucketer};
//! use lead_tracker::models::LeadRecord;
//!
//! fn refresh(snapshot: &[LeadRecord]) -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = AggregationEngine::new(TimelineBucketer::new(BucketZone::Utc, "%Y-%m-%d")?);
//!     let metrics = engine.aggregate(snapshot)?;
//!     println!("{}", metrics.summary());
//!     Ok(())
//! }
//! ```

mod engine;
mod error;
mod export;
mod metrics;
mod rates;
mod timeline;

pub use engine::{aggregate, AggregationEngine, AnalyticsConfig};
pub use error::{AnalyticsError, AnalyticsResult};
pub use export::{ExportFormat, MetricsExporter};
pub use metrics::{DerivedMetrics, StatusCount, METRICS_SCHEMA_VERSION};
pub use rates::RateCalculator;
pub use timeline::{BucketZone, TimelineBucket, TimelineBucketer, DEFAULT_DATE_FORMAT};
