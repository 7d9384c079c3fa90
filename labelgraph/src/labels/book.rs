use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{LabelError, LabelValueDefinition};

/// Label definitions shared between tools and the caller. Cloning shares the storage.
#[derive(Debug, Clone, Default)]
pub struct LabelBook {
    labels: Arc<RwLock<BTreeMap<String, LabelValueDefinition>>>,
}

impl LabelBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, identifier: &str) -> Option<LabelValueDefinition> {
        self.labels.read().await.get(identifier).cloned()
    }

    /// Validates and stores `label`; an existing identifier is rejected.
    pub async fn insert(&self, label: LabelValueDefinition) -> Result<(), LabelError> {
        label.validate()?;
        let mut labels = self.labels.write().await;
        if labels.contains_key(&label.identifier) {
            return Err(LabelError::Duplicate(label.identifier));
        }
        labels.insert(label.identifier.clone(), label);
        Ok(())
    }

    /// Identifiers in sorted order.
    pub async fn identifiers(&self) -> Vec<String> {
        self.labels.read().await.keys().cloned().collect()
    }

    pub async fn all(&self) -> Vec<LabelValueDefinition> {
        self.labels.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.labels.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.labels.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Locale;

    #[tokio::test]
    async fn insert_get_and_reject_duplicates() {
        let book = LabelBook::new();
        let shared = book.clone();
        book.insert(LabelValueDefinition::new("spider", Locale::new("Spider")))
            .await
            .unwrap();
        book.insert(LabelValueDefinition::new("ants", Locale::new("Ants")))
            .await
            .unwrap();
        assert_eq!(shared.identifiers().await, vec!["ants", "spider"]);
        assert_eq!(shared.get("spider").await.unwrap().locales[0].name, "Spider");

        let dup = book
            .insert(LabelValueDefinition::new("spider", Locale::new("Again")))
            .await;
        assert_eq!(dup, Err(LabelError::Duplicate("spider".into())));
        assert_eq!(book.len().await, 2);
    }

    #[tokio::test]
    async fn invalid_label_is_not_stored() {
        let book = LabelBook::new();
        assert!(book
            .insert(LabelValueDefinition::new("Bad Id", Locale::new("x")))
            .await
            .is_err());
        assert!(book.is_empty().await);
    }
}
