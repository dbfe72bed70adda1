use crate::document::DocId;
use crate::engine::{ExecutionPolicy, SearchEngine};
use std::collections::HashSet;

/// Documents whose set of indexed words equals that of a lower id.
/// Word counts and order are ignored.
pub fn find_duplicates(engine: &SearchEngine) -> Vec<DocId> {
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    let mut duplicates = Vec::new();
    for id in engine {
        let words: Vec<&str> = engine.word_frequencies(id).keys().map(|term| &**term).collect();
        if !seen.insert(words) {
            duplicates.push(id);
        }
    }
    duplicates
}

/// Remove every duplicate reported by [`find_duplicates`], returning the ids
/// removed in ascending order.
pub fn remove_duplicates(engine: &mut SearchEngine) -> Vec<DocId> {
    let duplicates = find_duplicates(engine);
    for &id in &duplicates {
        tracing::info!(id, "found duplicate document");
        engine.remove_document(id, ExecutionPolicy::Sequential);
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;

    #[test]
    fn removes_documents_with_equal_word_sets() {
        let mut engine = SearchEngine::from_stop_words_text("and with").unwrap();
        let docs = [
            (1, "funny pet and nasty rat"),
            (2, "funny pet with curly hair"),
            (3, "funny pet with curly hair"),
            (4, "funny pet and curly hair"),
            (5, "funny funny pet and nasty nasty rat"),
            (6, "funny pet and not very nasty rat"),
            (7, "very nasty rat and not very funny pet"),
            (8, "pet with rat and rat and rat"),
            (9, "nasty rat with curly hair"),
        ];
        for (id, text) in docs {
            engine.add_document(id, text, DocumentStatus::Actual, &[1, 2]).unwrap();
        }
        assert_eq!(engine.document_count(), 9);
        let removed = remove_duplicates(&mut engine);
        assert_eq!(removed, vec![3, 4, 5, 7]);
        assert_eq!(engine.document_count(), 5);
        assert_eq!(engine.document_ids().collect::<Vec<_>>(), vec![1, 2, 6, 8, 9]);
        assert!(find_duplicates(&engine).is_empty());
    }
}
