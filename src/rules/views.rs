//! Serialization views over the canonical rule form.
//!
//! Two explicit projections instead of annotation-driven visibility: the
//! public/read view carries identity and audit fields, the write view only
//! what a client may set. The `code` payload exposes the identical field set
//! through both. Unknown incoming fields are ignored on either view, so the
//! schema can grow without breaking old clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::config::{default_sampling_rate, Audit, AutomationRule, EvaluatorCode};

/// Read view: the full envelope as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub name: String,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(flatten)]
    pub code: EvaluatorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
}

impl PublicRule {
    pub fn into_rule(self) -> AutomationRule {
        AutomationRule {
            id: self.id,
            project_id: self.project_id,
            project_name: self.project_name,
            name: self.name,
            sampling_rate: self.sampling_rate,
            code: self.code,
            audit: Audit {
                created_at: self.created_at,
                created_by: self.created_by,
                last_updated_at: self.last_updated_at,
                last_updated_by: self.last_updated_by,
            },
        }
    }
}

impl From<&AutomationRule> for PublicRule {
    fn from(rule: &AutomationRule) -> Self {
        Self {
            id: rule.id.clone(),
            project_id: rule.project_id.clone(),
            project_name: rule.project_name.clone(),
            name: rule.name.clone(),
            sampling_rate: rule.sampling_rate,
            code: rule.code.clone(),
            created_at: rule.audit.created_at,
            created_by: rule.audit.created_by.clone(),
            last_updated_at: rule.audit.last_updated_at,
            last_updated_by: rule.audit.last_updated_by.clone(),
        }
    }
}

/// Write view: identity and audit are server-assigned, so a client supplies
/// only the name, the sampling rate, and the kind-tagged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRule {
    pub name: String,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(flatten)]
    pub code: EvaluatorCode,
}

impl WriteRule {
    pub fn into_rule(self) -> AutomationRule {
        AutomationRule {
            id: None,
            project_id: None,
            project_name: None,
            name: self.name,
            sampling_rate: self.sampling_rate,
            code: self.code,
            audit: Audit::default(),
        }
    }
}

impl From<&AutomationRule> for WriteRule {
    fn from(rule: &AutomationRule) -> Self {
        Self {
            name: rule.name.clone(),
            sampling_rate: rule.sampling_rate,
            code: rule.code.clone(),
        }
    }
}
