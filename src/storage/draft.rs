use super::KeyValueStore;
use crate::form::Form;

/// Unsaved create-form text kept across restarts. Purely a convenience:
/// store failures are logged and otherwise ignored.
pub struct DraftCache {
    store: Box<dyn KeyValueStore>,
    prefix: String,
}

impl DraftCache {
    pub fn new(store: Box<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Store key for a field name, e.g. `foodbridge_item_name`
    pub fn key(&self, field_name: &str) -> String {
        format!("{}{}", self.prefix, field_name)
    }

    pub fn get(&self, field_name: &str) -> Option<String> {
        match self.store.get(&self.key(field_name)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Draft read failed for {}: {}", field_name, e);
                None
            }
        }
    }

    /// Prefill empty text fields from saved drafts. Fields that already
    /// hold a value are left alone. Returns how many fields were filled.
    pub fn restore(&self, form: &mut Form) -> usize {
        let targets: Vec<_> = form
            .text_like()
            .filter(|f| f.value.is_empty())
            .map(|f| f.id)
            .collect();

        let mut restored = 0;
        for id in targets {
            if let Some(saved) = self.get(id.name()).filter(|v| !v.is_empty()) {
                form.set_value(id, saved);
                restored += 1;
            }
        }
        if restored > 0 {
            tracing::debug!("Restored {} draft field(s)", restored);
        }
        restored
    }

    pub fn save(&mut self, field_name: &str, value: &str) {
        let key = self.key(field_name);
        if let Err(e) = self.store.set(&key, value) {
            tracing::debug!("Draft write failed for {}: {}", key, e);
        }
    }

    /// Drop the drafts of every text field on the form
    pub fn clear(&mut self, form: &Form) {
        let names: Vec<&'static str> = form.text_like().map(|f| f.id.name()).collect();
        for name in names {
            let key = self.key(name);
            if let Err(e) = self.store.remove(&key) {
                tracing::debug!("Draft clear failed for {}: {}", key, e);
            }
        }
        tracing::debug!("Cleared create-form drafts");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldId;
    use crate::storage::{MemoryStore, Result, StoreError};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_keys_are_namespaced() {
        let cache = DraftCache::new(Box::new(MemoryStore::new()), "foodbridge_");
        assert_eq!(cache.key("item_name"), "foodbridge_item_name");
    }

    #[test]
    fn test_restore_fills_only_empty_fields() {
        let mut cache = DraftCache::new(Box::new(MemoryStore::new()), "foodbridge_");
        cache.save("item_name", "Cassava");
        cache.save("contact", "draft@example.com");

        let mut form = Form::create();
        form.set_value(FieldId::Contact, "server@example.com");

        assert_eq!(cache.restore(&mut form), 1);
        assert_eq!(form.value(FieldId::ItemName), "Cassava");
        assert_eq!(form.value(FieldId::Contact), "server@example.com");
    }

    #[test]
    fn test_empty_draft_is_not_applied() {
        let mut cache = DraftCache::new(Box::new(MemoryStore::new()), "foodbridge_");
        cache.save("quantity", "");

        let mut form = Form::create();
        assert_eq!(cache.restore(&mut form), 0);
    }

    #[test]
    fn test_clear_removes_every_tracked_field() {
        let mut cache = DraftCache::new(Box::new(MemoryStore::new()), "foodbridge_");
        cache.save("item_name", "Beans");
        cache.save("quantity", "3 bags");
        cache.save("contact", "0803");

        cache.clear(&Form::create());

        assert_eq!(cache.get("item_name"), None);
        assert_eq!(cache.get("quantity"), None);
        assert_eq!(cache.get("contact"), None);
    }

    #[test]
    fn test_broken_store_fails_silently() {
        let mut cache = DraftCache::new(Box::new(BrokenStore), "foodbridge_");
        cache.save("item_name", "Rice");
        cache.clear(&Form::create());

        let mut form = Form::create();
        assert_eq!(cache.restore(&mut form), 0);
        assert_eq!(form.value(FieldId::ItemName), "");
    }
}
