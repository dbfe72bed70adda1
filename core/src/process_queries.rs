use crate::document::Document;
use crate::engine::{ExecutionPolicy, SearchEngine};
use crate::error::Result;
use rayon::prelude::*;

/// Run every query against `engine` on the rayon pool. Results keep the input
/// order; the first malformed query fails the whole batch.
pub fn process_queries<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| engine.find_top_documents_actual(query.as_ref(), ExecutionPolicy::Sequential))
        .collect()
}

/// [`process_queries`] flattened: query order first, then rank order.
pub fn process_queries_joined<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(engine, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;

    fn engine() -> SearchEngine {
        let mut engine = SearchEngine::from_stop_words_text("and with").unwrap();
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (id, text) in (1..).zip(texts) {
            engine.add_document(id, text, DocumentStatus::Actual, &[1, 2]).unwrap();
        }
        engine
    }

    #[test]
    fn batch_matches_individual_calls() {
        let engine = engine();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let batch = process_queries(&engine, &queries).unwrap();
        assert_eq!(batch.len(), 3);
        for (query, hits) in queries.iter().zip(&batch) {
            let single =
                engine.find_top_documents_actual(query, ExecutionPolicy::Sequential).unwrap();
            assert_eq!(&single, hits);
        }
        assert_eq!(batch[0].len(), 3);
        assert_eq!(batch[1].len(), 5);
        assert_eq!(batch[2].len(), 2);
    }

    #[test]
    fn joined_flattens_in_query_order() {
        let engine = engine();
        let queries = vec!["curly hair".to_string(), "nasty rat -not".to_string()];
        let joined = process_queries_joined(&engine, &queries).unwrap();
        assert_eq!(joined.len(), 5);
        let ids: Vec<_> = joined.iter().map(|d| d.id).collect();
        assert_eq!(&ids[..2], &[2, 5]);
    }

    #[test]
    fn malformed_query_fails_batch() {
        let engine = engine();
        assert!(process_queries(&engine, &["rat", "-"]).is_err());
    }
}
