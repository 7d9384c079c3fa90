use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("identifier '{0}' must be snake_case (lowercase letters, digits, underscores; starting with a letter)")]
    InvalidIdentifier(String),
    #[error("label '{0}' needs at least one locale")]
    MissingLocales(String),
    #[error("label '{identifier}': locale '{lang}' has an empty name")]
    EmptyLocaleName { identifier: String, lang: String },
    #[error("label '{0}' already exists")]
    Duplicate(String),
}

/// What clients blur when the label applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blurs {
    Content,
    Media,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Alert,
    #[default]
    Inform,
    None,
}

/// Visibility before the subscriber changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultSetting {
    Hide,
    Warn,
    #[default]
    Ignore,
}

/// Human-readable copy for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    #[serde(default = "default_lang")]
    pub lang: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_lang() -> String {
    "en".to_string()
}

impl Locale {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lang: default_lang(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelValueDefinition {
    pub identifier: String,
    #[serde(default)]
    pub blurs: Blurs,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub default_setting: DefaultSetting,
    pub locales: Vec<Locale>,
}

impl LabelValueDefinition {
    pub fn new(identifier: impl Into<String>, locale: Locale) -> Self {
        Self {
            identifier: identifier.into(),
            blurs: Blurs::default(),
            severity: Severity::default(),
            default_setting: DefaultSetting::default(),
            locales: vec![locale],
        }
    }

    pub fn validate(&self) -> Result<(), LabelError> {
        if !is_snake_case(&self.identifier) {
            return Err(LabelError::InvalidIdentifier(self.identifier.clone()));
        }
        if self.locales.is_empty() {
            return Err(LabelError::MissingLocales(self.identifier.clone()));
        }
        if let Some(l) = self.locales.iter().find(|l| l.name.trim().is_empty()) {
            return Err(LabelError::EmptyLocaleName {
                identifier: self.identifier.clone(),
                lang: l.lang.clone(),
            });
        }
        Ok(())
    }
}

fn is_snake_case(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: omitted fields take their defaults (none / inform / ignore, lang "en").
    #[test]
    fn deserialize_applies_defaults() {
        let def: LabelValueDefinition = serde_json::from_value(json!({
            "identifier": "spider",
            "locales": [{"name": "Spider Warning"}]
        }))
        .unwrap();
        assert_eq!(def.blurs, Blurs::None);
        assert_eq!(def.severity, Severity::Inform);
        assert_eq!(def.default_setting, DefaultSetting::Ignore);
        assert_eq!(def.locales[0].lang, "en");
        assert_eq!(def.locales[0].description, None);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let r: Result<LabelValueDefinition, _> = serde_json::from_value(json!({
            "identifier": "x",
            "severity": "critical",
            "locales": [{"name": "X"}]
        }));
        assert!(r.is_err());
    }

    #[test]
    fn validate_checks_identifier_and_locales() {
        let ok = LabelValueDefinition::new("misinfo_2024", Locale::new("Misinformation"));
        assert!(ok.validate().is_ok());

        let bad = LabelValueDefinition::new("Misinfo-Label", Locale::new("M"));
        assert_eq!(
            bad.validate(),
            Err(LabelError::InvalidIdentifier("Misinfo-Label".into()))
        );

        let mut empty = LabelValueDefinition::new("spam", Locale::new("Spam"));
        empty.locales.clear();
        assert_eq!(empty.validate(), Err(LabelError::MissingLocales("spam".into())));

        let blank = LabelValueDefinition::new("spam", Locale::new("  ").with_lang("fr"));
        assert!(matches!(blank.validate(), Err(LabelError::EmptyLocaleName { lang, .. }) if lang == "fr"));
    }

    #[test]
    fn serializes_snake_case_values() {
        let mut def = LabelValueDefinition::new("spider", Locale::new("Spider"));
        def.blurs = Blurs::Media;
        def.severity = Severity::Alert;
        def.default_setting = DefaultSetting::Warn;
        let v = serde_json::to_value(&def).unwrap();
        assert_eq!(v["blurs"], "media");
        assert_eq!(v["severity"], "alert");
        assert_eq!(v["default_setting"], "warn");
    }
}
