use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};
use validator::Validate;

/// Identifier assigned by the store on creation
pub type LeadId = u64;

/// Source recorded when a lead arrives without one
pub const DEFAULT_SOURCE: &str = "Website";

/// Lifecycle stage of a lead.
///
/// Any stage may be set from any other; there is no enforced order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Converted,
}

impl LeadStatus {
    /// Fixed presentation order
    pub const ALL: [LeadStatus; 3] = [LeadStatus::New, LeadStatus::Contacted, LeadStatus::Converted];

    /// Position in [`LeadStatus::ALL`]
    pub fn index(self) -> usize {
        match self {
            LeadStatus::New => 0,
            LeadStatus::Contacted => 1,
            LeadStatus::Converted => 2,
        }
    }

    /// Whether the lead has moved beyond `New`
    pub fn is_engaged(self) -> bool {
        !matches!(self, LeadStatus::New)
    }
}

/// One inbound inquiry as read from the store.
///
/// `status` holds the stored value verbatim so a snapshot can carry a
/// corrupt row; use [`LeadRecord::status`] to get the typed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    #[serde(default = "default_source")]
    pub source: String,
    pub status: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    /// Build a fresh record the way the store does on creation
    pub fn from_new(id: LeadId, lead: NewLead, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: lead.name,
            email: lead.email,
            source: DEFAULT_SOURCE.to_string(),
            status: LeadStatus::New.to_string(),
            notes: lead.message,
            created_at,
        }
    }

    /// Parse the stored status, `None` if it is outside the enumeration
    pub fn status(&self) -> Option<LeadStatus> {
        LeadStatus::from_str(&self.status).ok()
    }

    /// Apply an operator update in place
    pub fn apply(&mut self, update: LeadUpdate) {
        self.status = update.status.to_string();
        self.notes = update.notes;
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Contact form submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewLead {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email, length(max = 255))]
    pub email: String,

    #[serde(default)]
    pub message: String,
}

impl NewLead {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Operator edit: both fields are replaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub status: LeadStatus,
    #[serde(default)]
    pub notes: String,
}
