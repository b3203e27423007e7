//! Keyword reference resolution.

use crate::models::{IdHash, normalize_term};
use crate::storage::ObjectStore;
use std::sync::Arc;

/// Resolves keyword id hashes to normalized terms.
///
/// Never fails: pruned keywords are skipped quietly and store errors are
/// logged and skipped. An input whose references are all missing resolves
/// to an empty list, which scores a similarity of zero downstream.
#[derive(Clone)]
pub struct KeywordResolver {
    store: Arc<dyn ObjectStore>,
}

impl KeywordResolver {
    /// Creates a resolver over the given object store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Resolves each reference to its keyword term, in input order.
    pub fn resolve_terms(&self, keyword_refs: &[IdHash]) -> Vec<String> {
        let mut terms = Vec::with_capacity(keyword_refs.len());
        for id in keyword_refs {
            match self.store.get_keyword(id) {
                Ok(Some(keyword)) => terms.push(normalize_term(&keyword.term)),
                Ok(None) => {
                    tracing::debug!(keyword = %id, "Keyword not found, skipping");
                },
                Err(e) => {
                    tracing::warn!(keyword = %id, error = %e, "Failed to fetch keyword, skipping");
                },
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Keyword, Subject};
    use crate::storage::InMemoryStore;
    use crate::{Error, Result};

    struct FailingStore;

    impl ObjectStore for FailingStore {
        fn get_keyword(&self, _id: &IdHash) -> Result<Option<Keyword>> {
            Err(Error::StoreUnavailable {
                operation: "get_keyword".to_string(),
                cause: "offline".to_string(),
            })
        }

        fn get_subject(&self, _id: &IdHash) -> Result<Option<Subject>> {
            Ok(None)
        }

        fn subject_id_hash(&self, subject: &Subject) -> Result<IdHash> {
            Ok(IdHash::new(subject.id.clone()))
        }
    }

    #[test]
    fn test_resolves_in_order() {
        let store = Arc::new(InMemoryStore::new());
        let a = store.store_keyword(Keyword::new("Schema")).unwrap();
        let b = store.store_keyword(Keyword::new("database")).unwrap();

        let resolver = KeywordResolver::new(store);
        assert_eq!(resolver.resolve_terms(&[a, b]), vec!["schema", "database"]);
    }

    #[test]
    fn test_skips_missing() {
        let store = Arc::new(InMemoryStore::new());
        let a = store.store_keyword(Keyword::new("schema")).unwrap();
        let resolver = KeywordResolver::new(store);

        let terms = resolver.resolve_terms(&[IdHash::new("pruned"), a]);
        assert_eq!(terms, vec!["schema"]);
        assert!(resolver.resolve_terms(&[IdHash::new("gone")]).is_empty());
    }

    #[test]
    fn test_store_errors_yield_empty() {
        let resolver = KeywordResolver::new(Arc::new(FailingStore));
        assert!(resolver.resolve_terms(&[IdHash::new("a"), IdHash::new("b")]).is_empty());
    }
}
