//! Per-cycle cache of fetched documents
//!
//! The owner clears it once per polling cycle so every document is fetched
//! at most once per cycle, however many subscriptions reference it.

use crate::fetch::DocumentSource;
use cellwatch_core::Result;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: HashMap<String, Arc<str>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached markup for `document_id`, fetching it on a miss.
    ///
    /// Failed fetches are not cached.
    pub fn get_or_fetch(
        &mut self,
        source: &dyn DocumentSource,
        document_id: &str,
    ) -> Result<Arc<str>> {
        if let Some(raw) = self.documents.get(document_id) {
            return Ok(Arc::clone(raw));
        }
        let raw: Arc<str> = source.fetch(document_id)?.into();
        self.documents
            .insert(document_id.to_string(), Arc::clone(&raw));
        Ok(raw)
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwatch_core::SheetError;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl DocumentSource for CountingSource {
        fn fetch(&self, document_id: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            if document_id == "down" {
                return Err(SheetError::DocumentUnavailable {
                    document: document_id.to_string(),
                    reason: "HTTP 404".to_string(),
                });
            }
            Ok(format!("<p>{}</p>", document_id))
        }
    }

    #[test]
    fn test_fetch_once_until_cleared() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let mut cache = DocumentCache::new();

        assert_eq!(&*cache.get_or_fetch(&source, "a").unwrap(), "<p>a</p>");
        assert_eq!(&*cache.get_or_fetch(&source, "a").unwrap(), "<p>a</p>");
        assert_eq!(source.calls.get(), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        cache.get_or_fetch(&source, "a").unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let mut cache = DocumentCache::new();

        assert!(cache.get_or_fetch(&source, "down").is_err());
        assert!(cache.get_or_fetch(&source, "down").is_err());
        assert_eq!(source.calls.get(), 2);
        assert!(cache.is_empty());
    }
}
