//! `app.bsky.labeler.service` record export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{Blurs, DefaultSetting, LabelBook, LabelValueDefinition, Locale, Severity};

pub const LABELER_SERVICE_TYPE: &str = "app.bsky.labeler.service";

const DEFAULT_SUBJECT_TYPES: &[&str] = &["record"];
const DEFAULT_SUBJECT_COLLECTIONS: &[&str] = &["app.bsky.feed.post", "app.bsky.actor.profile"];
const DEFAULT_REASON_TYPES: &[&str] = &["com.atproto.moderation.defs#reasonOther"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelerServiceRecord {
    #[serde(rename = "$type")]
    pub record_type: String,
    pub policies: Policies,
    pub subject_types: Vec<String>,
    pub subject_collections: Vec<String>,
    pub reason_types: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policies {
    pub label_values: Vec<String>,
    pub label_value_definitions: Vec<RecordLabelDefinition>,
}

/// A definition as it appears inside the record (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLabelDefinition {
    pub identifier: String,
    pub severity: Severity,
    pub blurs: Blurs,
    pub default_setting: DefaultSetting,
    pub locales: Vec<Locale>,
}

impl From<LabelValueDefinition> for RecordLabelDefinition {
    fn from(d: LabelValueDefinition) -> Self {
        Self {
            identifier: d.identifier,
            severity: d.severity,
            blurs: d.blurs,
            default_setting: d.default_setting,
            locales: d.locales,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl LabelerServiceRecord {
    /// Record declaring every label in `definitions`, with the default report scope
    /// (records in posts and profiles, reason "other").
    pub fn new(definitions: Vec<LabelValueDefinition>, created_at: DateTime<Utc>) -> Self {
        let label_values = definitions.iter().map(|d| d.identifier.clone()).collect();
        Self {
            record_type: LABELER_SERVICE_TYPE.to_string(),
            policies: Policies {
                label_values,
                label_value_definitions: definitions.into_iter().map(Into::into).collect(),
            },
            subject_types: strings(DEFAULT_SUBJECT_TYPES),
            subject_collections: strings(DEFAULT_SUBJECT_COLLECTIONS),
            reason_types: strings(DEFAULT_REASON_TYPES),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub async fn from_book(book: &LabelBook) -> Self {
        Self::new(book.all().await, Utc::now())
    }

    /// Adds global label values (e.g. `porn`) that have no custom definition.
    pub fn with_global_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            let v = v.into();
            if !self.policies.label_values.contains(&v) {
                self.policies.label_values.push(v);
            }
        }
        self
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
